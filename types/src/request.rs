use crate::filter::{Where, WhereDocument};
use crate::include::Include;
use crate::record::Embedding;
use serde::Serialize;

/// Selection of records for a get.
///
/// Pagination is either `limit`/`offset` or `page`/`page_size`; when both page fields are set and
/// non zero they replace any explicit limit and offset. Page fields never go on the wire
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GetRequest {
    pub ids: Option<Vec<String>>,
    pub r#where: Where,
    pub sort: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub where_document: WhereDocument,
    pub include: Vec<Include>,
    #[serde(skip)]
    pub page: Option<u32>,
    #[serde(skip)]
    pub page_size: Option<u32>,
}

impl Default for GetRequest {
    fn default() -> Self {
        Self {
            ids: None,
            r#where: Where::default(),
            sort: None,
            limit: None,
            offset: None,
            where_document: WhereDocument::default(),
            include: Include::default_get(),
            page: None,
            page_size: None,
        }
    }
}

impl GetRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(mut self, ids: Vec<String>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn filter(mut self, filter: Where) -> Self {
        self.r#where = filter;
        self
    }

    pub fn where_document(mut self, filter: WhereDocument) -> Self {
        self.where_document = filter;
        self
    }

    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// 1-based page number
    pub fn page(mut self, page: u32, page_size: u32) -> Self {
        self.page = Some(page);
        self.page_size = Some(page_size);
        self
    }

    pub fn include(mut self, include: Vec<Include>) -> Self {
        self.include = include;
        self
    }

    /// folds page/page_size into offset/limit
    pub fn paginated(mut self) -> Self {
        if let (Some(page), Some(page_size)) = (self.page, self.page_size) {
            if page > 0 && page_size > 0 {
                self.offset = Some((page - 1).saturating_mul(page_size));
                self.limit = Some(page_size);
            }
        }
        self
    }
}

/// Nearest neighbour search for one or more embeddings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRequest {
    pub query_embeddings: Vec<Embedding>,
    pub n_results: u32,
    pub r#where: Where,
    pub where_document: WhereDocument,
    pub include: Vec<Include>,
}

impl QueryRequest {
    pub fn new(query_embeddings: Vec<Embedding>) -> Self {
        Self {
            query_embeddings,
            n_results: 10,
            r#where: Where::default(),
            where_document: WhereDocument::default(),
            include: Include::default_query(),
        }
    }

    pub fn n_results(mut self, n_results: u32) -> Self {
        self.n_results = n_results;
        self
    }

    pub fn filter(mut self, filter: Where) -> Self {
        self.r#where = filter;
        self
    }

    pub fn where_document(mut self, filter: WhereDocument) -> Self {
        self.where_document = filter;
        self
    }

    pub fn include(mut self, include: Vec<Include>) -> Self {
        self.include = include;
        self
    }
}

/// Records to delete, by id and/or filter
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeleteRequest {
    pub r#where: Where,
    pub ids: Option<Vec<String>>,
    pub where_document: WhereDocument,
}

impl DeleteRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(mut self, ids: Vec<String>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn filter(mut self, filter: Where) -> Self {
        self.r#where = filter;
        self
    }

    pub fn where_document(mut self, filter: WhereDocument) -> Self {
        self.where_document = filter;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_page_overrides_limit_and_offset() {
        let request = GetRequest::new().limit(3).offset(99).page(2, 10).paginated();
        assert_eq!(request.offset, Some(10));
        assert_eq!(request.limit, Some(10));
    }

    #[test]
    fn test_incomplete_or_zero_page_is_ignored() {
        let mut request = GetRequest::new().limit(3).offset(4);
        request.page = Some(2);
        let request = request.paginated();
        assert_eq!((request.limit, request.offset), (Some(3), Some(4)));

        let request = GetRequest::new().limit(3).page(0, 10).paginated();
        assert_eq!((request.limit, request.offset), (Some(3), None));
    }

    #[test]
    fn test_get_wire_layout() {
        let request = GetRequest::new().ids(vec!["a".into()]).page(1, 5).paginated();
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"ids":["a"],"where":{},"sort":null,"limit":5,"offset":0,"where_document":{},"include":["metadatas","documents"]}"#
        );
    }

    #[test]
    fn test_query_and_delete_wire_layout() {
        let query = QueryRequest::new(vec![vec![0.5, 0.25]]).n_results(2);
        assert_eq!(
            serde_json::to_string(&query).unwrap(),
            r#"{"query_embeddings":[[0.5,0.25]],"n_results":2,"where":{},"where_document":{},"include":["metadatas","documents","distances"]}"#
        );
        let delete = DeleteRequest::new().ids(vec!["x".into()]);
        assert_eq!(
            serde_json::to_string(&delete).unwrap(),
            r#"{"where":{},"ids":["x"],"where_document":{}}"#
        );
    }
}
