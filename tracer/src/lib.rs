use clap::ValueEnum;
use opentelemetry::{KeyValue, global};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    Resource,
    trace::{self, Sampler},
};
use thiserror::Error;
use tracing::Subscriber;
use tracing::subscriber::set_global_default;
use tracing_subscriber::{
    EnvFilter, Registry, fmt::MakeWriter, layer::SubscriberExt, registry::LookupSpan,
};

const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Error, Debug)]
pub enum TracerError {
    #[error("Invalid log level {0}")]
    InvalidLogLevel(String),
    #[error("Could not build otel pipeline: {0}")]
    Pipeline(#[from] opentelemetry::trace::TraceError),
    #[error("Could not forward log records: {0}")]
    LogBridge(#[from] log::SetLoggerError),
    #[error("Failed to set default subscriber: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Shape of the log lines written to stderr
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

fn env_filter(log_level: Option<&str>) -> Result<EnvFilter, TracerError> {
    let directives = log_level.unwrap_or(DEFAULT_LOG_LEVEL);
    EnvFilter::try_new(directives).map_err(|_| TracerError::InvalidLogLevel(directives.to_string()))
}

fn subscriber<W>(
    env_filter: EnvFilter,
    format: LogFormat,
    writer: W,
) -> impl Subscriber + for<'span> LookupSpan<'span> + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Clone + Send + Sync + 'static,
{
    let pretty_layer = (format == LogFormat::Pretty).then(|| {
        tracing_subscriber::fmt::layer()
            .pretty()
            .with_writer(writer.clone())
            .with_thread_names(true)
    });
    let json_layer = (format == LogFormat::Json).then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .with_level(true)
            .with_current_span(true)
            .with_thread_names(true)
    });
    Registry::default()
        .with(env_filter)
        .with(pretty_layer)
        .with(json_layer)
}

/// Installs the global subscriber: a filtered pretty or json layer on stderr plus, when
/// `otel_url` is given, spans exported over otlp. `log` records are forwarded into the same
/// subscriber. Must be called from within a tokio runtime when exporting
pub fn init_tracing(
    service_name: &'static str,
    log_level: Option<&str>,
    format: LogFormat,
    otel_url: Option<&str>,
) -> Result<(), TracerError> {
    let env_filter = env_filter(log_level)?;

    let otel_tracer = otel_url
        .map(|url| {
            opentelemetry_otlp::new_pipeline()
                .tracing()
                .with_exporter(
                    opentelemetry_otlp::new_exporter()
                        .tonic()
                        .with_endpoint(url),
                )
                .with_trace_config(
                    trace::config()
                        .with_sampler(Sampler::AlwaysOn)
                        .with_resource(Resource::new(vec![KeyValue::new(
                            "service.name",
                            service_name,
                        )])),
                )
                .install_batch(opentelemetry_sdk::runtime::Tokio)
        })
        .transpose()?;
    let otel_layer = otel_tracer.map(|tracer| tracing_opentelemetry::layer().with_tracer(tracer));

    tracing_log::LogTracer::init()?;
    set_global_default(subscriber(env_filter, format, std::io::stderr).with(otel_layer))?;
    Ok(())
}

/// Flushes pending spans, a no-op when no exporter was installed
pub fn shutdown_tracing() {
    global::shutdown_tracer_provider();
}
