//! Bounded retry around a single probe.
//!
//! Each port moves through `Attempting -> {Succeeded | Retrying | Failed}`.
//! Only timeouts are retried; refusals are definitive and resolution failures
//! are escalated to the scheduler as host-wide.

use crate::config::{Backoff, ScanConfig};
use crate::error::ProbeError;
use crate::scanner::probe::{ConnectOutcome, Probe};
use crate::scanner::PortOutcome;
use crate::services::ServiceTable;
use crate::types::Port;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Terminal result of driving one port to completion.
#[derive(Debug)]
pub struct Settled {
    pub outcome: PortOutcome,
    /// Present when the failure applies to every port on the host.
    pub host_failure: Option<ProbeError>,
}

impl Settled {
    fn port(outcome: PortOutcome) -> Self {
        Self {
            outcome,
            host_failure: None,
        }
    }
}

enum AttemptState {
    Attempting { attempt: u32 },
    Retrying { after: u32 },
    Succeeded(PortOutcome),
    Failed(PortOutcome, Option<ProbeError>),
    Abandoned { after: u32 },
}

/// Retry settings extracted from a [`ScanConfig`].
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    timeout: Duration,
    attempt_limit: u32,
    retry_backoff: Duration,
    backoff: Backoff,
}

impl RetryPolicy {
    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            timeout: config.timeout,
            attempt_limit: config.attempt_limit(),
            retry_backoff: config.retry_backoff,
            backoff: config.backoff,
        }
    }

    /// Probe `port` until it reaches a terminal outcome.
    ///
    /// Cancellation interrupts a pending backoff sleep. The port never
    /// settles in that case and `None` is returned.
    pub async fn attempt(
        &self,
        probe: &dyn Probe,
        host: &str,
        port: Port,
        cancel: &CancellationToken,
    ) -> Option<Settled> {
        let mut state = AttemptState::Attempting { attempt: 1 };

        loop {
            state = match state {
                AttemptState::Attempting { attempt } => {
                    let result = probe.probe(host, port, self.timeout).await;
                    debug!(%port, attempt, ?result, "connect attempt finished");
                    self.transition(port, attempt, result)
                }
                AttemptState::Retrying { after } => {
                    let delay = self.backoff.delay(self.retry_backoff, after);
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => AttemptState::Attempting { attempt: after + 1 },
                        _ = cancel.cancelled() => AttemptState::Abandoned { after },
                    }
                }
                AttemptState::Succeeded(outcome) => return Some(Settled::port(outcome)),
                AttemptState::Failed(outcome, host_failure) => {
                    return Some(Settled {
                        outcome,
                        host_failure,
                    })
                }
                AttemptState::Abandoned { after } => {
                    debug!(%port, attempts = after, "retry abandoned on cancellation");
                    return None;
                }
            };
        }
    }

    fn transition(
        &self,
        port: Port,
        attempt: u32,
        result: Result<ConnectOutcome, ProbeError>,
    ) -> AttemptState {
        match result {
            Ok(ConnectOutcome::Connected) => AttemptState::Succeeded(PortOutcome::open(
                port,
                ServiceTable::lookup(port),
                attempt,
            )),
            // A refusal is definitive: recorded as a single attempt even
            // when earlier attempts timed out.
            Ok(ConnectOutcome::Refused) => AttemptState::Succeeded(PortOutcome::closed(port, 1)),
            Err(e) if e.is_transient() && attempt < self.attempt_limit => {
                debug!(%port, attempt, limit = self.attempt_limit, "timed out, retrying");
                AttemptState::Retrying { after: attempt }
            }
            Err(e) if e.is_host_wide() => {
                AttemptState::Failed(PortOutcome::unreachable(port, attempt), Some(e))
            }
            Err(e) => {
                debug!(%port, attempt, error = %e, "giving up on port");
                AttemptState::Failed(PortOutcome::unreachable(port, attempt), None)
            }
        }
    }
}
