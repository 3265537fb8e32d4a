use std::env;

use tsfacet_aggregate::{KeyOrder, PoolConfig};

/// Segment scan settings.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Worker threads for parallel segment scans. `None` uses rayon's global pool.
    pub threads: Option<usize>,
    /// Documents visited between cancellation checks.
    pub cancel_check_interval: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            threads: None,
            cancel_check_interval: 4096,
        }
    }
}

/// Run-time configuration of a [`crate::LatestFacetExecutor`] (no hidden constants).
#[derive(Debug, Clone, Default)]
pub struct FacetConfig {
    pub pool: PoolConfig,
    pub scan: ScanConfig,
    pub key_order: KeyOrder,
}

impl FacetConfig {
    /// Defaults overridden by `TSFACET_*` environment variables.
    ///
    /// Recognised knobs: `TSFACET_THREADS`, `TSFACET_POOL_MAX`,
    /// `TSFACET_POOL_CAPACITY`, `TSFACET_POOL_MAX_RETAINED`,
    /// `TSFACET_CANCEL_CHECK_INTERVAL`. Unset or
    /// unparseable values keep the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parse = |key: &str| -> Option<usize> {
            let raw = lookup(key)?;
            match raw.trim().replace('_', "").parse::<usize>() {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!(key, value = %raw, "ignoring unparseable facet setting");
                    None
                }
            }
        };

        let mut config = Self::default();
        if let Some(threads) = parse("TSFACET_THREADS") {
            config.scan.threads = (threads > 0).then_some(threads);
        }
        if let Some(max) = parse("TSFACET_POOL_MAX") {
            config.pool.max_pooled_maps = max;
        }
        if let Some(capacity) = parse("TSFACET_POOL_CAPACITY") {
            config.pool.initial_capacity = capacity;
        }
        if let Some(retained) = parse("TSFACET_POOL_MAX_RETAINED") {
            config.pool.max_retained_capacity = retained;
        }
        if let Some(interval) = parse("TSFACET_CANCEL_CHECK_INTERVAL") {
            config.scan.cancel_check_interval = interval.max(1);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_without_overrides() {
        let config = FacetConfig::from_lookup(lookup(&[]));
        assert_eq!(config.scan.threads, None);
        assert_eq!(config.scan.cancel_check_interval, 4096);
        assert_eq!(config.pool.max_pooled_maps, 64);
        assert_eq!(config.pool.initial_capacity, 1024);
        assert_eq!(config.pool.max_retained_capacity, 1 << 16);
        assert_eq!(config.key_order, KeyOrder::Ascending);
    }

    #[test]
    fn overrides_are_applied_and_garbage_ignored() {
        let config = FacetConfig::from_lookup(lookup(&[
            ("TSFACET_THREADS", "4"),
            ("TSFACET_POOL_MAX", "8"),
            ("TSFACET_POOL_CAPACITY", "65_536"),
            ("TSFACET_POOL_MAX_RETAINED", "4096"),
            ("TSFACET_CANCEL_CHECK_INTERVAL", "many"),
        ]));
        assert_eq!(config.scan.threads, Some(4));
        assert_eq!(config.pool.max_pooled_maps, 8);
        assert_eq!(config.pool.initial_capacity, 65_536);
        assert_eq!(config.pool.max_retained_capacity, 4096);
        assert_eq!(config.scan.cancel_check_interval, 4096);

        let config = FacetConfig::from_lookup(lookup(&[
            ("TSFACET_THREADS", "0"),
            ("TSFACET_CANCEL_CHECK_INTERVAL", "0"),
        ]));
        assert_eq!(config.scan.threads, None);
        assert_eq!(config.scan.cancel_check_interval, 1);
    }
}
