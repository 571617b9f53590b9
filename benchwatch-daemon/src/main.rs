use anyhow::Result;
use clap::Parser;

use benchwatch_daemon::app::Exporter;
use benchwatch_daemon::cli::{Command, DaemonCli};
use benchwatch_daemon::{logging, report_cmd};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = DaemonCli::parse();
    let config = cli.resolve_config().await?;

    if cli.validate {
        println!("configuration is valid");
        return Ok(());
    }

    logging::init_tracing(&config.general)?;

    if let Some(Command::Report { input, output_dir }) = &cli.command {
        let run = report_cmd::generate_report(&config, input, output_dir).await?;
        for line in report_cmd::summary_lines(&run) {
            println!("{line}");
        }
        return Ok(());
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "benchwatch starting");
    Exporter::build(config)?.run().await
}
