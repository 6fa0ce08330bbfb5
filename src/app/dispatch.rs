use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::error::PipelineError;
use crate::pipeline::{EventSink, GenerationRequest, Orchestrator, PipelineEvent, Services};
use crate::transport::gateway::run_gateway;
use anyhow::{Context, Result};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

pub async fn dispatch(cli: Cli, mut config: Config) -> Result<()> {
    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.gateway.host = host;
            }
            if let Some(port) = port {
                config.gateway.port = port;
            }
            let host = config.gateway.host.clone();
            let port = config.gateway.port;
            let services = Arc::new(Services::from_config(config)?);
            run_gateway(&host, port, services).await
        }
        Commands::Generate {
            topic,
            style_source,
        } => {
            let style_source = style_source
                .or_else(|| config.corpus.default_style_source.clone())
                .context("no style source: pass --style-source or set [corpus] default_style_source")?;
            let request = GenerationRequest::new(&topic, &style_source)?;
            let services = Arc::new(Services::from_config(config)?);
            run_generate(services, &request).await
        }
    }
}

async fn run_generate(services: Arc<Services>, request: &GenerationRequest) -> Result<()> {
    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_cancel.cancel();
        }
    });

    let sink = StdoutSink;
    let mut orchestrator = Orchestrator::new(services);
    match orchestrator.run(request, &sink, &cancel).await {
        Ok(_) | Err(PipelineError::ConnectionClosed) => Ok(()),
        Err(err) => Err(err.into()),
    }
}

/// Writes each event as one JSON line on stdout.
struct StdoutSink;

impl EventSink for StdoutSink {
    fn emit<'a>(
        &'a self,
        event: PipelineEvent,
    ) -> Pin<Box<dyn Future<Output = Result<(), PipelineError>> + Send + 'a>> {
        Box::pin(async move {
            let line = serde_json::to_string(&event)
                .map_err(|e| PipelineError::GenerationService {
                    stage: "output".into(),
                    message: e.to_string(),
                })?;
            let mut stdout = tokio::io::stdout();
            stdout
                .write_all(format!("{line}\n").as_bytes())
                .await
                .map_err(|_| PipelineError::ConnectionClosed)?;
            stdout
                .flush()
                .await
                .map_err(|_| PipelineError::ConnectionClosed)
        })
    }
}
