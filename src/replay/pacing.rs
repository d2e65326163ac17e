use std::time::Duration;

use rand::Rng;

use crate::foundation::error::{RetypeError, RetypeResult};
use crate::replay::engine::StepKind;

/// Probability of an extra pause after typing whitespace.
pub const DEFAULT_PAUSE_PROBABILITY: f64 = 0.3;

/// Delay bounds and pause jitter for replay pacing.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PacingConfig {
    /// Shortest delay between two steps.
    pub min_delay: Duration,
    /// Longest delay between two steps; drawn occasionally as a deliberate pause.
    pub max_delay: Duration,
    /// Chance of an extra pause after a whitespace step, in `[0, 1]`.
    pub pause_probability: f64,
    /// Shortest extra pause.
    pub pause_min: Duration,
    /// Longest extra pause.
    pub pause_max: Duration,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(10),
            max_delay: Duration::from_secs(1),
            pause_probability: DEFAULT_PAUSE_PROBABILITY,
            pause_min: Duration::from_millis(200),
            pause_max: Duration::from_millis(500),
        }
    }
}

impl PacingConfig {
    pub fn validate(&self) -> RetypeResult<()> {
        if self.min_delay > self.max_delay {
            return Err(RetypeError::config(format!(
                "min delay {:?} exceeds max delay {:?}",
                self.min_delay, self.max_delay
            )));
        }
        if !(0.0..=1.0).contains(&self.pause_probability) {
            return Err(RetypeError::config(
                "pause probability must be within [0, 1]",
            ));
        }
        if self.pause_min > self.pause_max {
            return Err(RetypeError::config("pause min exceeds pause max"));
        }
        Ok(())
    }

    /// Config with constant zero delays and no pauses.
    pub fn instant() -> Self {
        Self {
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            pause_probability: 0.0,
            pause_min: Duration::ZERO,
            pause_max: Duration::ZERO,
        }
    }
}

/// Draw the base delay before the next step.
///
/// The draw is `exp(U(-100, 0)) * (max - min) + min`, which almost always lands near `min`.
/// Draws above `0.8 * max` snap to `max` (a deliberate long pause); anything else is redrawn
/// uniformly between `min` and the first draw. The result is always within `[min, max]`.
pub fn next_delay<R: Rng + ?Sized>(min: Duration, max: Duration, rng: &mut R) -> Duration {
    if max <= min {
        return min;
    }
    let lo = min.as_secs_f64();
    let hi = max.as_secs_f64();

    let first = rng.gen_range(-100.0..=0.0f64).exp() * (hi - lo) + lo;
    if first > 0.8 * hi {
        return max;
    }
    if first <= lo {
        return min;
    }
    Duration::from_secs_f64(rng.gen_range(lo..=first)).clamp(min, max)
}

/// Stateful pacing source: base delays plus whitespace pauses, driven by an injected RNG.
#[derive(Debug, Clone)]
pub struct Pacer<R> {
    config: PacingConfig,
    rng: R,
}

impl<R: Rng> Pacer<R> {
    pub fn new(config: PacingConfig, rng: R) -> RetypeResult<Self> {
        config.validate()?;
        Ok(Self { config, rng })
    }

    pub fn config(&self) -> &PacingConfig {
        &self.config
    }

    /// Delay before the very first step, uniform in `[min, max]`.
    pub fn initial_delay(&mut self) -> Duration {
        let PacingConfig {
            min_delay,
            max_delay,
            ..
        } = self.config;
        if max_delay <= min_delay {
            return min_delay;
        }
        Duration::from_secs_f64(
            self.rng
                .gen_range(min_delay.as_secs_f64()..=max_delay.as_secs_f64()),
        )
        .clamp(min_delay, max_delay)
    }

    /// Delay after a step of kind `step`.
    pub fn delay_after(&mut self, step: StepKind) -> Duration {
        let mut delay = next_delay(self.config.min_delay, self.config.max_delay, &mut self.rng);
        if step == StepKind::Whitespace
            && self.config.pause_probability > 0.0
            && self.rng.gen_bool(self.config.pause_probability)
        {
            delay += self.pause();
        }
        delay
    }

    fn pause(&mut self) -> Duration {
        let (lo, hi) = (self.config.pause_min, self.config.pause_max);
        if hi <= lo {
            return lo;
        }
        Duration::from_secs_f64(self.rng.gen_range(lo.as_secs_f64()..=hi.as_secs_f64()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/replay/pacing.rs"]
mod tests;
