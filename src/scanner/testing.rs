//! Scripted probe for deterministic engine tests.

use crate::error::{ProbeError, ProbeResult};
use crate::scanner::probe::{ConnectOutcome, Probe};
use crate::types::Port;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// How a scripted port answers a connect attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Behavior {
    Open,
    Refuse,
    /// Never answers; the attempt ends when the timeout elapses.
    Silent,
    Unresolvable,
    Unreachable,
}

pub(crate) struct ScriptedProbe {
    fallback: Behavior,
    scripts: Mutex<HashMap<Port, VecDeque<Behavior>>>,
    delays: HashMap<Port, Duration>,
    default_delay: Duration,
    resolve_fails: bool,
    calls: Mutex<HashMap<Port, u32>>,
    completions: Mutex<Vec<Port>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedProbe {
    pub(crate) fn new(fallback: Behavior) -> Self {
        Self {
            fallback,
            scripts: Mutex::new(HashMap::new()),
            delays: HashMap::new(),
            default_delay: Duration::ZERO,
            resolve_fails: false,
            calls: Mutex::new(HashMap::new()),
            completions: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Answers for successive attempts on `port`; the last one repeats.
    pub(crate) fn with_script(self, port: Port, behaviors: Vec<Behavior>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(port, behaviors.into_iter().collect());
        self
    }

    pub(crate) fn with_behavior(self, port: Port, behavior: Behavior) -> Self {
        self.with_script(port, vec![behavior])
    }

    /// Latency before a non-silent answer on `port`.
    pub(crate) fn with_delay(mut self, port: Port, delay: Duration) -> Self {
        self.delays.insert(port, delay);
        self
    }

    pub(crate) fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    pub(crate) fn failing_resolution(mut self) -> Self {
        self.resolve_fails = true;
        self
    }

    pub(crate) fn calls_for(&self, port: Port) -> u32 {
        self.calls.lock().unwrap().get(&port).copied().unwrap_or(0)
    }

    pub(crate) fn total_calls(&self) -> u32 {
        self.calls.lock().unwrap().values().sum()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Ports in the order their attempts finished.
    pub(crate) fn completion_order(&self) -> Vec<Port> {
        self.completions.lock().unwrap().clone()
    }

    fn next_behavior(&self, port: Port) -> Behavior {
        let mut scripts = self.scripts.lock().unwrap();
        match scripts.get_mut(&port) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or(self.fallback),
            Some(queue) => queue.front().copied().unwrap_or(self.fallback),
            None => self.fallback,
        }
    }
}

#[async_trait]
impl Probe for ScriptedProbe {
    async fn resolve(&self, host: &str) -> ProbeResult<()> {
        if self.resolve_fails {
            return Err(ProbeError::ResolutionFailed {
                host: host.to_string(),
                reason: "NXDOMAIN".to_string(),
            });
        }
        Ok(())
    }

    async fn probe(
        &self,
        host: &str,
        port: Port,
        timeout: Duration,
    ) -> ProbeResult<ConnectOutcome> {
        *self.calls.lock().unwrap().entry(port).or_insert(0) += 1;
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let behavior = self.next_behavior(port);
        let delay = self.delays.get(&port).copied().unwrap_or(self.default_delay);
        let result = match behavior {
            Behavior::Silent => {
                tokio::time::sleep(timeout).await;
                Err(ProbeError::TimedOut)
            }
            Behavior::Open => {
                tokio::time::sleep(delay).await;
                Ok(ConnectOutcome::Connected)
            }
            Behavior::Refuse => {
                tokio::time::sleep(delay).await;
                Ok(ConnectOutcome::Refused)
            }
            Behavior::Unresolvable => Err(ProbeError::ResolutionFailed {
                host: host.to_string(),
                reason: "NXDOMAIN".to_string(),
            }),
            Behavior::Unreachable => Err(ProbeError::Unreachable(std::io::Error::new(
                std::io::ErrorKind::Other,
                "no route to host",
            ))),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.completions.lock().unwrap().push(port);
        result
    }
}

/// Assert that `start.elapsed()` is `expected` within one timer tick.
pub(crate) fn assert_elapsed(start: Instant, expected: Duration) {
    let elapsed = start.elapsed();
    assert!(
        elapsed >= expected && elapsed <= expected + Duration::from_millis(5),
        "elapsed {:?}, expected {:?}",
        elapsed,
        expected
    );
}
