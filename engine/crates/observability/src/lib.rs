use tracing_subscriber::{fmt, EnvFilter};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// Forward a free-form status line (e.g. a respawn summary) into the log.
pub fn log_line(line: &str) {
    tracing::info!(target: "mud::status", "{}", line);
}

/// Counters reported by the periodic respawn and autosave loops.
#[derive(Debug, Clone, Default)]
pub struct LoopMetrics {
    pub loop_name: &'static str,
    pub iteration: u64,
    pub duration_us: u128,
    pub items: usize,
}

impl LoopMetrics {
    pub fn log(&self) {
        const SLOW_LOOP_US: u128 = 50_000;
        if self.duration_us > SLOW_LOOP_US {
            tracing::warn!(
                loop_name = self.loop_name,
                iteration = self.iteration,
                duration_us = self.duration_us,
                items = self.items,
                "background loop slow ({}us > {}us)",
                self.duration_us,
                SLOW_LOOP_US
            );
        } else {
            tracing::debug!(
                loop_name = self.loop_name,
                iteration = self.iteration,
                duration_us = self.duration_us,
                items = self.items,
                "background loop completed"
            );
        }
    }
}
