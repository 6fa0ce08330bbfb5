use anyhow::Result;
use clap::Parser;
use scribetwin::app::dispatch::dispatch;
use scribetwin::cli::Cli;
use scribetwin::config::Config;
use std::path::Path;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Both aws-lc-rs and ring may be linked; pick ring explicitly.
    if let Err(e) = rustls::crypto::ring::default_provider().install_default() {
        eprintln!("Warning: Failed to install default crypto provider: {e:?}");
    }

    let cli = Cli::parse();
    let config = match cli.config.as_deref() {
        Some(path) => Config::load_or_init_at(Path::new(path))?,
        None => Config::load_or_init()?,
    };

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        config.observability.log_level.into()
    };
    // stdout carries `generate` events, so logs go to stderr.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    dispatch(cli, config).await
}
