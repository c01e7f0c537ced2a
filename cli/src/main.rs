use anyhow::Result;
use clap::Parser;
use presentation::cli::{Cli, CliApp};
use shared::telemetry::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = infrastructure::config::Config::load()?;
    let mut app = CliApp::new(config);
    app.run(cli).await
}
