//! Scripted latency and failure injection.

use serde::{Deserialize, Serialize};

/// Chaos parameters for one exercise, as carried in its manifest
/// (`{"slowMs": 0, "failOnFirst": false, "everyN": null}`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ChaosConfig {
    /// Delay applied to every intercepted call before processing.
    pub slow_ms: u64,

    /// Fail the first intercepted call of a session with a 500, then behave
    /// normally.
    pub fail_on_first: bool,

    /// Fail every Nth intercepted call (counted across the session) with a
    /// 500. `None` disables periodic failures.
    pub every_n: Option<u32>,
}

impl Default for ChaosConfig {
    fn default() -> Self {
        ChaosConfig {
            slow_ms: 300,
            fail_on_first: false,
            every_n: None,
        }
    }
}

impl ChaosConfig {
    /// No latency, no failures. What most tests want.
    pub fn quiet() -> Self {
        ChaosConfig {
            slow_ms: 0,
            fail_on_first: false,
            every_n: None,
        }
    }
}

/// Per-session chaos state: the pending first-call failure and the periodic
/// counter. Reset together with the mock DB, never by individual requests.
#[derive(Debug, Clone)]
pub struct ChaosState {
    config: ChaosConfig,
    first_pending: bool,
    counter: u32,
}

impl ChaosState {
    pub fn new(config: ChaosConfig) -> Self {
        ChaosState {
            first_pending: config.fail_on_first,
            counter: 0,
            config,
        }
    }

    pub fn config(&self) -> &ChaosConfig {
        &self.config
    }

    /// Account for one intercepted call. Returns the failure message when
    /// this call should be answered with an injected 500.
    pub fn next_failure(&mut self) -> Option<&'static str> {
        if self.first_pending {
            self.first_pending = false;
            return Some("Injected failure");
        }

        if let Some(n) = self.config.every_n {
            if n > 0 {
                self.counter += 1;
                if self.counter % n == 0 {
                    return Some("Periodic failure");
                }
            }
        }

        None
    }

    /// Back to the configured initial state.
    pub fn reset(&mut self) {
        self.first_pending = self.config.fail_on_first;
        self.counter = 0;
    }
}
