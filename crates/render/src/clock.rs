/// Turns absolute timestamps into per-frame durations.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    last: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the previous tick. The first tick returns 0, and a
    /// timestamp earlier than the previous one counts as no time passing.
    pub fn tick(&mut self, now: f64) -> f32 {
        let dt = match self.last {
            Some(last) => (now - last).max(0.0) as f32,
            None => 0.0,
        };
        self.last = Some(now);
        dt
    }
}
