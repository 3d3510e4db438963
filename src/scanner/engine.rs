//! Scan scheduling.
//!
//! A fixed pool of `min(concurrency, ports)` workers pulls ports off a shared
//! cursor, so at most `concurrency` probes are ever in flight. Each worker
//! drives its port through the [`RetryPolicy`] and hands the settled outcome
//! to a single collector, which owns the [`ResultAggregator`] and the
//! [`ProgressReporter`].

use crate::config::ScanConfig;
use crate::error::{ProbeError, ScanResult};
use crate::scanner::aggregator::{ResultAggregator, ScanReport, ScanStatus};
use crate::scanner::probe::{Probe, TcpConnectProbe};
use crate::scanner::progress::ProgressReporter;
use crate::scanner::retry::{RetryPolicy, Settled};
use crate::types::{Port, ScanTarget};
use futures::future::join_all;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::instrument::WithSubscriber;
use tracing::{debug, error, info, trace, Dispatch};

/// Runs scans against a single host with a shared probe and configuration.
pub struct Scanner {
    probe: Arc<dyn Probe>,
    config: ScanConfig,
    progress: ProgressReporter,
    dispatch: Option<Dispatch>,
}

impl Scanner {
    pub fn new(probe: Arc<dyn Probe>, config: ScanConfig) -> Self {
        Self {
            probe,
            config,
            progress: ProgressReporter::hidden(),
            dispatch: None,
        }
    }

    /// Scanner using plain TCP connect probes.
    pub fn tcp(config: ScanConfig) -> Self {
        Self::new(Arc::new(TcpConnectProbe::default()), config)
    }

    /// Report progress through `progress` instead of a hidden counter.
    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    /// Emit this scanner's events to `dispatch` rather than the global subscriber.
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn progress(&self) -> &ProgressReporter {
        &self.progress
    }

    /// Scan every port of `target` and return the sealed report.
    ///
    /// Invalid configuration is rejected before any probe runs. Per-port
    /// failures never surface as errors: they are folded into the report.
    /// Cancelling `cancel` stops dispatch and returns a partial report with
    /// [`ScanStatus::Interrupted`]. In-flight attempts finish; ports waiting
    /// out a retry backoff are left out of the report.
    pub async fn run(
        &self,
        target: &ScanTarget,
        cancel: CancellationToken,
    ) -> ScanResult<ScanReport> {
        match &self.dispatch {
            Some(dispatch) => {
                self.execute(target, cancel)
                    .with_subscriber(dispatch.clone())
                    .await
            }
            None => self.execute(target, cancel).await,
        }
    }

    async fn execute(
        &self,
        target: &ScanTarget,
        cancel: CancellationToken,
    ) -> ScanResult<ScanReport> {
        self.config.validate()?;

        let total = target.port_count();
        let workers = self.config.concurrency.min(total);
        let mut aggregator = ResultAggregator::new(target);
        self.progress.start(total as u64);
        self.progress.note(target.host());

        info!(
            scan = %aggregator.id().short(),
            host = target.host(),
            ports = total,
            workers,
            timeout_ms = self.config.timeout.as_millis() as u64,
            max_retries = self.config.max_retries,
            worst_case_per_port_ms = self.config.worst_case_per_port().as_millis() as u64,
            "starting scan"
        );

        if let Err(e) = self.probe.resolve(target.host()).await {
            error!(host = target.host(), error = %e, "unable to resolve host, no ports scanned");
            return Ok(self.seal(aggregator, Some(e), false));
        }

        let stop = cancel.child_token();
        let (tx, mut rx) = mpsc::channel::<Settled>(workers.max(1));
        let handles = self.spawn_workers(target, workers, &stop, tx);

        let mut host_failure = None;
        while let Some(settled) = rx.recv().await {
            let outcome = settled.outcome;
            info!(
                port = %outcome.port,
                state = %outcome.state,
                service = outcome.service.as_deref().unwrap_or("-"),
                attempts = outcome.attempts,
                "port settled"
            );
            if let Err(e) = aggregator.record(outcome) {
                stop.cancel();
                return Err(e);
            }
            self.progress.advance();

            if let Some(e) = settled.host_failure {
                if host_failure.is_none() {
                    error!(host = target.host(), error = %e, "host resolution failed mid-scan, stopping dispatch");
                    host_failure = Some(e);
                }
            }
        }

        for result in join_all(handles).await {
            result?;
        }

        let interrupted = cancel.is_cancelled();
        if interrupted && host_failure.is_none() {
            info!(
                finished = aggregator.recorded(),
                ports = total,
                "scan interrupted"
            );
        }

        Ok(self.seal(aggregator, host_failure, interrupted))
    }

    fn spawn_workers(
        &self,
        target: &ScanTarget,
        workers: usize,
        stop: &CancellationToken,
        tx: mpsc::Sender<Settled>,
    ) -> Vec<tokio::task::JoinHandle<()>> {
        let ports: Arc<[Port]> = Arc::from(target.ports());
        let host: Arc<str> = Arc::from(target.host());
        let cursor = Arc::new(AtomicUsize::new(0));
        let policy = RetryPolicy::from_config(&self.config);

        (0..workers)
            .map(|worker| {
                let probe = Arc::clone(&self.probe);
                let ports = Arc::clone(&ports);
                let host = Arc::clone(&host);
                let cursor = Arc::clone(&cursor);
                let stop = stop.clone();
                let tx = tx.clone();

                let task = async move {
                    while !stop.is_cancelled() {
                        let index = cursor.fetch_add(1, Ordering::SeqCst);
                        let Some(&port) = ports.get(index) else {
                            break;
                        };

                        let Some(settled) =
                            policy.attempt(probe.as_ref(), &host, port, &stop).await
                        else {
                            break;
                        };
                        if settled.host_failure.is_some() {
                            stop.cancel();
                        }
                        if tx.send(settled).await.is_err() {
                            break;
                        }
                    }
                    trace!(worker, "worker finished");
                };
                tokio::spawn(task.with_current_subscriber())
            })
            .collect()
    }

    /// A host failure wins over cancellation. Otherwise the scan is
    /// interrupted if the caller cancelled or any port never settled.
    fn seal(
        &self,
        aggregator: ResultAggregator,
        host_failure: Option<ProbeError>,
        interrupted: bool,
    ) -> ScanReport {
        let status = match host_failure {
            Some(e) => {
                for _ in aggregator.missing() {
                    self.progress.advance();
                }
                ScanStatus::HostUnresolved {
                    reason: unresolved_reason(e),
                }
            }
            None if interrupted || aggregator.missing().next().is_some() => {
                ScanStatus::Interrupted
            }
            None => ScanStatus::Completed,
        };

        let report = aggregator.finalize(status);
        self.progress.finish(report.status.to_string());
        match report.status {
            ScanStatus::HostUnresolved { .. } => error!("{}", report.summary()),
            _ => info!("{}", report.summary()),
        }
        debug!(scan = %report.id, duration_ms = report.duration_ms, "report sealed");
        report
    }
}

fn unresolved_reason(error: ProbeError) -> String {
    match error {
        ProbeError::ResolutionFailed { reason, .. } => reason,
        other => other.to_string(),
    }
}
