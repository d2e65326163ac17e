use std::time::{Duration, Instant};

/// Source of elapsed time between ticks of the capture loop.
pub trait Clock {
    /// Block until the next tick if needed and return the time elapsed since the previous one.
    /// The first call reports one frame.
    fn tick(&mut self) -> Duration;
}

/// Wall-clock pacing at a fixed frame interval.
///
/// Slow frames are not caught up: a late tick reports the full elapsed time, so more replay
/// steps land in the next frame.
#[derive(Debug, Clone)]
pub struct RealtimeClock {
    frame: Duration,
    last: Option<Instant>,
}

impl RealtimeClock {
    pub fn new(frame: Duration) -> Self {
        Self { frame, last: None }
    }
}

impl Clock for RealtimeClock {
    fn tick(&mut self) -> Duration {
        let Some(last) = self.last else {
            self.last = Some(Instant::now());
            return self.frame;
        };
        let target = last + self.frame;
        let now = Instant::now();
        if target > now {
            std::thread::sleep(target - now);
        }
        let now = Instant::now();
        self.last = Some(now);
        now - last
    }
}

/// Clock that advances exactly one frame per tick without sleeping.
#[derive(Debug, Clone)]
pub struct SimulatedClock {
    frame: Duration,
    elapsed: Duration,
}

impl SimulatedClock {
    pub fn new(frame: Duration) -> Self {
        Self {
            frame,
            elapsed: Duration::ZERO,
        }
    }

    /// Total simulated time handed out so far.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

impl Clock for SimulatedClock {
    fn tick(&mut self) -> Duration {
        self.elapsed += self.frame;
        self.frame
    }
}

impl<C: Clock + ?Sized> Clock for &mut C {
    fn tick(&mut self) -> Duration {
        (**self).tick()
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn tick(&mut self) -> Duration {
        (**self).tick()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/clock.rs"]
mod tests;
