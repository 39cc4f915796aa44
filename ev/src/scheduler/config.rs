//! Scheduler timing configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Shortest delay the loop re-arms with between steps
pub const MIN_STEP: Duration = Duration::from_millis(1);

/// Timing of the simulated event loop
///
/// Defaults: 80ms before the first tick, 60ms per macrotask, 12ms per
/// microtask, 40ms between ticks. The step delays never go below
/// [`MIN_STEP`], so a zero in the config cannot stall the clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Delay between `start()` and the first tick
    #[serde(rename = "startup-delay-ms", default = "default_startup_delay_ms")]
    pub startup_delay_ms: u64,

    /// Pause after a tick before the next one begins
    #[serde(rename = "inter-tick-ms", default = "default_inter_tick_ms")]
    pub inter_tick_ms: u64,

    /// Simulated execution time of one macrotask
    #[serde(rename = "macro-exec-ms", default = "default_macro_exec_ms")]
    pub macro_exec_ms: u64,

    /// Simulated execution time of one microtask
    #[serde(rename = "micro-exec-ms", default = "default_micro_exec_ms")]
    pub micro_exec_ms: u64,

    /// Number of most recent log entries kept
    #[serde(rename = "log-capacity", default = "default_log_capacity")]
    pub log_capacity: usize,

    /// Ready delay given to RAF items
    #[serde(rename = "raf-delay-ms", default)]
    pub raf_delay_ms: u64,
}

fn default_startup_delay_ms() -> u64 {
    80
}

fn default_inter_tick_ms() -> u64 {
    40
}

fn default_macro_exec_ms() -> u64 {
    60
}

fn default_micro_exec_ms() -> u64 {
    12
}

fn default_log_capacity() -> usize {
    200
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            startup_delay_ms: default_startup_delay_ms(),
            inter_tick_ms: default_inter_tick_ms(),
            macro_exec_ms: default_macro_exec_ms(),
            micro_exec_ms: default_micro_exec_ms(),
            log_capacity: default_log_capacity(),
            raf_delay_ms: 0,
        }
    }
}

impl SchedulerConfig {
    pub fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.startup_delay_ms)
    }

    pub fn inter_tick(&self) -> Duration {
        Duration::from_millis(self.inter_tick_ms).max(MIN_STEP)
    }

    pub fn macro_exec(&self) -> Duration {
        Duration::from_millis(self.macro_exec_ms).max(MIN_STEP)
    }

    pub fn micro_exec(&self) -> Duration {
        Duration::from_millis(self.micro_exec_ms).max(MIN_STEP)
    }

    pub fn raf_delay(&self) -> Duration {
        Duration::from_millis(self.raf_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SchedulerConfig::default();
        assert_eq!(config.startup_delay(), Duration::from_millis(80));
        assert_eq!(config.inter_tick(), Duration::from_millis(40));
        assert_eq!(config.macro_exec(), Duration::from_millis(60));
        assert_eq!(config.micro_exec(), Duration::from_millis(12));
        assert_eq!(config.log_capacity, 200);
        assert_eq!(config.raf_delay(), Duration::ZERO);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: SchedulerConfig = serde_yaml::from_str("macro-exec-ms: 5\nraf-delay-ms: 16\n").unwrap();
        assert_eq!(config.macro_exec_ms, 5);
        assert_eq!(config.raf_delay_ms, 16);
        assert_eq!(config.micro_exec_ms, 12);
        assert_eq!(config.log_capacity, 200);
    }

    #[test]
    fn test_zero_step_delays_floor_at_min_step() {
        let config: SchedulerConfig =
            serde_yaml::from_str("startup-delay-ms: 0\ninter-tick-ms: 0\nmacro-exec-ms: 0\nmicro-exec-ms: 0\n").unwrap();
        assert_eq!(config.startup_delay(), Duration::ZERO);
        assert_eq!(config.inter_tick(), MIN_STEP);
        assert_eq!(config.macro_exec(), MIN_STEP);
        assert_eq!(config.micro_exec(), MIN_STEP);
    }
}
