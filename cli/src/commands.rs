use crate::config::cli::Commands;
use crossterm::style::Stylize;
use serde::Serialize;
use serde_json::Value;
use std::io::{self, Write};
use thiserror::Error;
use vecstore_client_rs::prelude::{ClientError, VecStoreClient};

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("Could not render response: {0}")]
    Render(#[from] serde_json::Error),
}

fn to_value<T: Serialize>(value: T) -> Result<Value, CliError> {
    Ok(serde_json::to_value(value)?)
}

/// Runs a single command against a running client
pub async fn run(client: &VecStoreClient, command: &Commands) -> Result<Value, CliError> {
    log::debug!("Running {command:?}");
    match command {
        Commands::Heartbeat => to_value(client.heartbeat().await?),
        Commands::Version => to_value(client.version().await?),
        Commands::ListCollections(args) => {
            to_value(client.list_collections(args.limit, args.offset, None, None).await?)
        }
        Commands::CountCollections => to_value(client.count_collections(None, None).await?),
        Commands::GetCollection(args) => to_value(
            client
                .get_collection(args.name.as_deref(), args.id, None, None)
                .await?,
        ),
        Commands::Count(args) => to_value(client.count(args.id).await?),
        Commands::Peek(args) => to_value(client.peek(args.id, args.n).await?),
    }
}

pub fn render(result: &Result<Value, CliError>) -> String {
    match result {
        Ok(value) => match serde_json::to_string_pretty(value) {
            Ok(pretty) => format!("{}", pretty.green()),
            Err(err) => format!("{}", err.to_string().red()),
        },
        Err(err) => format!("{}", err.to_string().red()),
    }
}

/// Writes the rendered result once and reports whether the command succeeded
pub fn report(result: &Result<Value, CliError>, out: &mut impl Write) -> io::Result<bool> {
    writeln!(out, "{}", render(result))?;
    Ok(result.is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_success_is_rendered_as_pretty_json() {
        let mut out = Vec::new();
        assert!(report(&Ok(json!({"count": 3})), &mut out).unwrap());
        let written = String::from_utf8(out).unwrap();
        assert!(written.contains("\"count\": 3"));
    }

    #[test]
    fn test_failure_is_reported_exactly_once() {
        let failed = Err(CliError::Client(ClientError::InvalidUrl("http://".into())));
        let mut out = Vec::new();
        assert!(!report(&failed, &mut out).unwrap());
        let written = String::from_utf8(out).unwrap();
        assert_eq!(written.lines().count(), 1);
        assert_eq!(written.matches("http://").count(), 1);
    }
}
