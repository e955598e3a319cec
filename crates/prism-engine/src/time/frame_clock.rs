use std::time::{Duration, Instant};

/// Frame timing snapshot, refreshed before every frame-driver invocation.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct FrameTime {
    /// Seconds since the previous tick. Never negative.
    pub delta: f32,

    /// Seconds since the clock started. Never decreases.
    pub elapsed: f32,

    /// Number of ticks taken before this one.
    pub frame_index: u64,
}

/// Monotonic frame clock.
///
/// `elapsed` accumulates raw deltas, so it tracks wall time between `reset`s.
/// Optional clamps only shape the reported `delta`; they never feed back into
/// `elapsed`.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    elapsed: Duration,
    frame_index: u64,
    clamps: Option<(Duration, Duration)>,
}

impl FrameClock {
    /// Creates an unclamped clock starting now.
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Creates an unclamped clock whose baseline is `start`.
    pub fn starting_at(start: Instant) -> Self {
        Self {
            last: start,
            elapsed: Duration::ZERO,
            frame_index: 0,
            clamps: None,
        }
    }

    /// Creates a clock that clamps reported deltas to `[dt_min, dt_max]`.
    ///
    /// Useful when a stall (debugger, minimized window) should not turn into one
    /// huge animation step.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            clamps: Some((dt_min, dt_max)),
            ..Self::new()
        }
    }

    /// Resets the baseline so the time since the last tick is not counted.
    pub fn reset(&mut self) {
        self.reset_at(Instant::now());
    }

    pub fn reset_at(&mut self, now: Instant) {
        self.last = self.last.max(now);
    }

    /// Seconds since start as of the last tick.
    pub fn elapsed(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Advances the clock to the current instant.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// Advances the clock to `now`.
    ///
    /// An instant earlier than the previous tick yields a zero delta and leaves
    /// the baseline untouched.
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let raw = now.saturating_duration_since(self.last);
        self.last = self.last.max(now);
        self.elapsed += raw;

        let dt = match self.clamps {
            Some((lo, hi)) => raw.clamp(lo, hi),
            None => raw,
        };

        let ft = FrameTime {
            delta: dt.as_secs_f32(),
            elapsed: self.elapsed.as_secs_f32(),
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration { Duration::from_millis(v) }

    #[test]
    fn first_tick_reports_gap_since_start() {
        let t0 = Instant::now();
        let mut clock = FrameClock::starting_at(t0);
        let ft = clock.tick_at(t0 + ms(16));
        assert!((ft.delta - 0.016).abs() < 1e-6);
        assert!((ft.elapsed - 0.016).abs() < 1e-6);
        assert_eq!(ft.frame_index, 0);
    }

    #[test]
    fn monotonic_over_thousand_ticks_with_varying_gaps() {
        let t0 = Instant::now();
        let mut clock = FrameClock::starting_at(t0);
        let mut now = t0;
        let mut prev_elapsed = 0.0f32;

        for i in 0..1000u64 {
            // Irregular gaps, including zero-length ones and an occasional long stall.
            let gap = match i % 7 {
                0 => ms(0),
                3 => ms(250 + i % 13),
                _ => Duration::from_micros(1_000 + (i * 7_919) % 40_000),
            };
            now += gap;

            // Every 50th tick is fed a stale instant.
            let sample = if i % 50 == 49 { now - ms(5) } else { now };
            let ft = clock.tick_at(sample);

            assert!(ft.delta >= 0.0, "negative delta at tick {i}");
            assert!(ft.elapsed >= prev_elapsed, "elapsed went backwards at tick {i}");
            assert_eq!(ft.frame_index, i);
            prev_elapsed = ft.elapsed;
        }

        let wall = now.duration_since(t0).as_secs_f32();
        assert!((prev_elapsed - wall).abs() < 1e-2);
    }

    #[test]
    fn stale_instant_yields_zero_delta() {
        let t0 = Instant::now();
        let mut clock = FrameClock::starting_at(t0);
        clock.tick_at(t0 + ms(100));
        let ft = clock.tick_at(t0 + ms(40));
        assert_eq!(ft.delta, 0.0);
        assert!((ft.elapsed - 0.1).abs() < 1e-6);
    }

    #[test]
    fn clamps_shape_delta_only() {
        let mut clock = FrameClock::with_clamps(ms(1), ms(100));
        let t0 = clock.last;
        let ft = clock.tick_at(t0 + ms(1_000));
        assert!((ft.delta - 0.1).abs() < 1e-6);
        assert!((ft.elapsed - 1.0).abs() < 1e-6);

        let ft = clock.tick_at(t0 + ms(1_000));
        assert!((ft.delta - 0.001).abs() < 1e-6);
    }

    #[test]
    fn reset_skips_the_gap() {
        let t0 = Instant::now();
        let mut clock = FrameClock::starting_at(t0);
        clock.tick_at(t0 + ms(10));
        clock.reset_at(t0 + ms(5_000));
        let ft = clock.tick_at(t0 + ms(5_020));
        assert!((ft.delta - 0.02).abs() < 1e-6);
        assert!((ft.elapsed - 0.03).abs() < 1e-6);
    }
}
