use clap::Parser;
use docsite_index::Config;
use docsite_index::cli::Cli;
use docsite_index::commands;
use std::io::Write;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    // Logs go to stderr so command output on stdout stays machine-readable
    docsite_index::tracing::init(config.log_level.as_deref());
    tracing::debug!(config = ?config, "Loaded configuration");

    let output = commands::execute(&cli, &config).await.inspect_err(|e| {
        tracing::error!("Command failed: {:#}", e);
    })?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.text.as_bytes())?;
    stdout.flush()?;

    Ok(if output.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
