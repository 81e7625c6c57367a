use log::Level;

use crate::{EvaluationContext, Observation, Observer};

/// An [`Observer`] that writes one `log` record per flag evaluation.
///
/// Successful evaluations are logged at the configured level (`Debug` by default). Failed
/// evaluations are always logged at `Warn`.
///
/// ```
/// # use flaghook::LogObserver;
/// let observer = LogObserver::new().level(log::Level::Info);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LogObserver {
    level: Level,
}

impl LogObserver {
    pub fn new() -> LogObserver {
        LogObserver {
            level: Level::Debug,
        }
    }

    /// Set the level used for successful evaluations.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }
}

impl Default for LogObserver {
    fn default() -> Self {
        LogObserver::new()
    }
}

impl<C: EvaluationContext> Observer<C> for LogObserver {
    fn observe(&self, observation: &Observation<'_, C>) {
        let elapsed_ms = observation.elapsed.as_secs_f64() * 1000.0;

        if let Some(err) = observation.error {
            log::warn!(target: "flaghook",
                       flag_key = observation.key,
                       context_key = observation.context.key(),
                       elapsed_ms,
                       reason = observation.detail.reason,
                       callsite_default = observation.callsite_default;
                       "flag evaluation failed: {err}");
            return;
        }

        log::log!(target: "flaghook", self.level,
                  flag_key = observation.key,
                  context_key = observation.context.key(),
                  elapsed_ms,
                  reason = observation.detail.reason,
                  callsite_default = observation.callsite_default,
                  value = observation.detail.value;
                  "evaluated a flag");
    }
}
