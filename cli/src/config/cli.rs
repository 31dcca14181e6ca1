use clap::{Args, Parser, Subcommand};
use tracer::LogFormat;
use vecstore_client_rs::prelude::{ClientConfig, Uuid};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub commands: Commands,

    #[command(flatten)]
    pub client: ClientConfig,

    /// Log level or tracing directives, e.g `vecstore_client_rs=debug,warn`
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Shape of the log lines written to stderr
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Otel collector to export spans to. Spans are not exported when unset
    #[arg(long, global = true)]
    pub otel_endpoint: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Server time in nanoseconds
    Heartbeat,
    /// Server version
    Version,
    ListCollections(ListCollections),
    CountCollections,
    GetCollection(GetCollection),
    /// Number of records in a collection
    Count(CollectionRef),
    /// First records of a collection with their embeddings
    Peek(Peek),
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct ListCollections {
    #[arg(long)]
    pub limit: Option<u32>,

    #[arg(long)]
    pub offset: Option<u32>,
}

#[derive(Args, Debug, Clone, PartialEq)]
#[group(required = true, multiple = false)]
pub struct GetCollection {
    /// Collection name
    #[arg(long)]
    pub name: Option<String>,

    /// Collection id
    #[arg(long)]
    pub id: Option<Uuid>,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct CollectionRef {
    pub id: Uuid,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct Peek {
    pub id: Uuid,

    /// Number of records to show
    #[arg(long, default_value_t = 10)]
    pub n: u32,
}
