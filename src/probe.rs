//! Availability probe for the optional payroll module.
//!
//! Payroll endpoints are only enabled on some bexio subscriptions. Rather
//! than letting every payroll tool fail with a raw 403, the gateway probes
//! `/employee?limit=1` once and caches the verdict for the lifetime of the
//! owning client.

use serde_json::json;
use std::sync::Mutex;

use crate::error::{ErrorCode, McpError, McpResult};

/// Cached verdict of the payroll availability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    /// No probe has run yet.
    Unknown,
    /// The probe succeeded; payroll calls proceed without re-probing.
    Available,
    /// The probe got 403/404; payroll calls fail fast without re-probing.
    Unavailable,
}

/// Tri-state cache, one per gateway instance.
///
/// Tests may pre-seed the cache with [`FeatureProbe::seeded`] to exercise
/// either branch without a live upstream.
#[derive(Debug)]
pub struct FeatureProbe {
    state: Mutex<ProbeState>,
}

impl Default for FeatureProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureProbe {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ProbeState::Unknown),
        }
    }

    /// Creates a probe with a pre-determined verdict.
    pub fn seeded(state: ProbeState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    pub fn state(&self) -> ProbeState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set(&self, state: ProbeState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = state;
    }

    /// Classifies a probe outcome and updates the cache.
    ///
    /// 403/404 cache `Unavailable` and return the instructive error; any
    /// other failure is passed through uncached so a transient outage does
    /// not disable the module for the rest of the process.
    pub fn record(&self, outcome: Result<(), McpError>) -> McpResult<()> {
        match outcome {
            Ok(()) => {
                self.set(ProbeState::Available);
                Ok(())
            }
            Err(err) => {
                if err.code == ErrorCode::UpstreamError
                    && matches!(err.status_code, Some(403) | Some(404))
                {
                    self.set(ProbeState::Unavailable);
                    Err(payroll_unavailable_error())
                } else {
                    Err(err)
                }
            }
        }
    }

    /// Returns an early verdict when one is cached, `None` when a probe is
    /// still needed.
    pub fn cached_verdict(&self) -> Option<McpResult<()>> {
        match self.state() {
            ProbeState::Available => Some(Ok(())),
            ProbeState::Unavailable => Some(Err(payroll_unavailable_error())),
            ProbeState::Unknown => None,
        }
    }
}

/// The friendly error returned whenever payroll is known to be disabled.
pub fn payroll_unavailable_error() -> McpError {
    McpError::upstream(
        "The Payroll module is not available on this bexio account.\n\n\
         Payroll tools cover employees, absences and payroll documents. \
         To use them:\n\
         1. Log in to bexio and open Settings > Subscription\n\
         2. Add the Payroll module to your plan\n\
         3. Ensure the API token has payroll permissions\n\n\
         All other tools keep working without it",
        Some(403),
        Some(json!({ "module": "payroll", "probe_endpoint": "/employee" })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unknown() {
        assert_eq!(FeatureProbe::new().state(), ProbeState::Unknown);
    }

    #[test]
    fn forbidden_probe_caches_unavailable() {
        let probe = FeatureProbe::new();
        let err = probe
            .record(Err(McpError::upstream("Forbidden", Some(403), None)))
            .unwrap_err();
        assert!(err.message.contains("Payroll module is not available"));
        assert_eq!(probe.state(), ProbeState::Unavailable);

        // Subsequent calls answer from the cache.
        assert!(probe.cached_verdict().unwrap().is_err());
    }

    #[test]
    fn transient_failure_does_not_cache() {
        let probe = FeatureProbe::new();
        let err = probe
            .record(Err(McpError::upstream(
                "Service Unavailable",
                Some(503),
                None,
            )))
            .unwrap_err();
        assert!(err.message.contains("Service Unavailable"));
        assert_eq!(probe.state(), ProbeState::Unknown);
        assert!(probe.cached_verdict().is_none());
    }

    #[test]
    fn success_caches_available() {
        let probe = FeatureProbe::new();
        probe.record(Ok(())).unwrap();
        assert_eq!(probe.state(), ProbeState::Available);
        assert!(probe.cached_verdict().unwrap().is_ok());
    }

    #[test]
    fn seeded_probe_skips_the_network() {
        let probe = FeatureProbe::seeded(ProbeState::Unavailable);
        assert!(probe.cached_verdict().unwrap().is_err());
    }
}
