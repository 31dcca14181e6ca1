use clap::Parser;
use std::io;
use std::process::ExitCode;
use vecstore_cli::{commands, config::cli::Cli};
use vecstore_client_rs::prelude::VecStoreClient;

#[tokio::main]
async fn main() -> std::io::Result<ExitCode> {
    let cli = Cli::parse();

    tracer::init_tracing(
        "vecstore-cli",
        cli.log_level.as_deref(),
        cli.log_format,
        cli.otel_endpoint.as_deref(),
    )
    .map_err(io::Error::other)?;

    let client = VecStoreClient::connect(cli.client)
        .await
        .map_err(io::Error::other)?;
    let result = commands::run(&client, &cli.commands).await;
    client.close().await;
    tracer::shutdown_tracing();

    // errors are reported by `report` alone, main only carries the exit status
    if commands::report(&result, &mut io::stdout())? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
