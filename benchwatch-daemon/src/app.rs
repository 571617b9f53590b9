//! Exporter assembly and lifecycle.
//!
//! [`Exporter`] wires the validated configuration into a [`ScanWatcher`],
//! installs the Prometheus recorder, runs the watcher on its own task and
//! cancels it when a shutdown signal arrives.
//!
//! # Startup
//!
//! 1. Validate configuration
//! 2. Install the Prometheus recorder and HTTP listener (if enabled)
//! 3. Build the watcher
//! 4. Publish `cis_scan_info`
//! 5. Spawn the watcher (initial file, then periodic polling)
//!
//! # Shutdown
//!
//! `SIGTERM`/`SIGINT` cancels the watcher's `CancellationToken`. A file that is
//! already being processed completes before the task exits.

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use benchwatch_core::config::BenchwatchConfig;
use benchwatch_ingest::{GaugeSink, IngestConfig, RecorderSink, ScanWatcher, ScanWatcherBuilder};

use crate::metrics_server;

/// Exporter name reported in `cis_scan_info`.
pub const EXPORTER_NAME: &str = "benchwatch";

/// Exporter version reported in `cis_scan_info`.
pub const EXPORTER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// The assembled exporter.
pub struct Exporter {
    config: BenchwatchConfig,
    watcher: ScanWatcher,
}

impl Exporter {
    /// Build the exporter, installing the global Prometheus recorder when
    /// `[metrics].enabled` is set.
    ///
    /// # Errors
    ///
    /// - Configuration validation fails
    /// - The recorder cannot be installed (address in use, already installed)
    /// - The watcher configuration is rejected
    pub fn build(config: BenchwatchConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;

        if config.metrics.enabled {
            metrics_server::install_metrics_recorder(&config.metrics)?;
        } else {
            tracing::info!("metrics endpoint disabled, gauges will not be exported");
        }

        Self::build_with_sink(config, Arc::new(RecorderSink))
    }

    /// Build the exporter against an explicit gauge sink.
    ///
    /// Does not touch the global recorder.
    pub fn build_with_sink(config: BenchwatchConfig, sink: Arc<dyn GaugeSink>) -> Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;

        let ingest_config = IngestConfig::from_core(&config);
        let watcher = ScanWatcherBuilder::new()
            .config(ingest_config)
            .sink(sink)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build scan watcher: {}", e))?;

        tracing::info!(
            results_dir = %config.watch.results_dir,
            environment = %config.watch.environment,
            poll_interval_secs = config.watch.poll_interval_secs,
            status_policy = %config.classifier.status_policy,
            section_strategy = %config.classifier.section_strategy,
            "exporter initialized"
        );

        Ok(Self { config, watcher })
    }

    pub fn config(&self) -> &BenchwatchConfig {
        &self.config
    }

    /// Run until `SIGTERM` or `SIGINT`.
    ///
    /// # Errors
    ///
    /// Returns an error if signal handlers cannot be installed or the
    /// watcher task fails.
    pub async fn run(self) -> Result<()> {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = signal(SignalKind::terminate())
            .map_err(|e| anyhow::anyhow!("failed to install SIGTERM handler: {}", e))?;
        let mut sigint = signal(SignalKind::interrupt())
            .map_err(|e| anyhow::anyhow!("failed to install SIGINT handler: {}", e))?;

        self.run_until(async move {
            let signal = tokio::select! {
                _ = sigterm.recv() => "SIGTERM",
                _ = sigint.recv() => "SIGINT",
            };
            tracing::info!(signal = signal, "shutdown signal received");
        })
        .await
    }

    /// Run until `shutdown` completes, then cancel the watcher and wait for it.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let Self { config, watcher } = self;

        let info = watcher
            .publisher()
            .publish_scan_info(EXPORTER_VERSION, EXPORTER_NAME);
        if !info.is_complete() {
            tracing::warn!(failures = info.failures.len(), "scan info gauge not published");
        }

        let cancel = CancellationToken::new();
        let worker = tokio::spawn(watcher.run(cancel.clone()));
        tracing::info!(
            results_dir = %config.watch.results_dir,
            "benchwatch running"
        );

        shutdown.await;

        tracing::info!("stopping scan watcher");
        cancel.cancel();
        worker
            .await
            .map_err(|e| anyhow::anyhow!("scan watcher task failed: {}", e))?;

        tracing::info!("benchwatch shut down");
        Ok(())
    }
}
