//! Host name resolution for scan targets.
//!
//! IP literals bypass DNS. Host names are looked up once through the system
//! resolver configuration and cached for the lifetime of the resolver.

use crate::error::{ProbeError, ProbeResult};
use std::collections::HashMap;
use std::net::IpAddr;
use std::time::Duration;
use tokio::sync::Mutex;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::{system_conf, TokioAsyncResolver};

/// Resolves and caches host addresses.
pub struct HostResolver {
    lookup_timeout: Duration,
    cache: Mutex<HashMap<String, IpAddr>>,
}

impl HostResolver {
    /// Create a resolver whose DNS queries give up after `lookup_timeout`.
    pub fn new(lookup_timeout: Duration) -> Self {
        Self {
            lookup_timeout,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve `host` to a single address.
    ///
    /// Successful lookups are cached; failures are not.
    pub async fn resolve(&self, host: &str) -> ProbeResult<IpAddr> {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(ip);
        }

        // Held across the lookup so concurrent workers share one query.
        let mut cache = self.cache.lock().await;
        if let Some(ip) = cache.get(host) {
            return Ok(*ip);
        }

        let ip = self.lookup(host).await?;
        tracing::debug!(host, %ip, "resolved host");
        cache.insert(host.to_string(), ip);
        Ok(ip)
    }

    async fn lookup(&self, host: &str) -> ProbeResult<IpAddr> {
        let (config, mut opts) = system_conf::read_system_conf()
            .unwrap_or_else(|_| (ResolverConfig::default(), ResolverOpts::default()));
        opts.timeout = self.lookup_timeout;
        opts.attempts = 1;

        let resolver = TokioAsyncResolver::tokio(config, opts);
        let response =
            resolver
                .lookup_ip(host)
                .await
                .map_err(|e| ProbeError::ResolutionFailed {
                    host: host.to_string(),
                    reason: e.to_string(),
                })?;

        response
            .iter()
            .next()
            .ok_or_else(|| ProbeError::ResolutionFailed {
                host: host.to_string(),
                reason: "no addresses found".to_string(),
            })
    }
}

impl Default for HostResolver {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}
