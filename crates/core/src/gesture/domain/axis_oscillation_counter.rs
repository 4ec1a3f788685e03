/// Counts back-and-forth excursions of a 1-D signal around a baseline.
///
/// A "forth" crossing is registered when the displacement from the
/// baseline rises to `threshold` or beyond; a "back" crossing when it
/// falls strictly below `-threshold`. One oscillation needs one of each.
#[derive(Debug, Clone)]
pub struct AxisOscillationCounter {
    threshold: f64,
    baseline: f64,
    last_delta: f64,
    forth_count: u32,
    back_count: u32,
}

impl AxisOscillationCounter {
    pub fn new(threshold: f64) -> Self {
        debug_assert!(threshold > 0.0, "threshold must be positive");
        Self {
            threshold,
            baseline: 0.0,
            last_delta: 0.0,
            forth_count: 0,
            back_count: 0,
        }
    }

    /// Re-baselines at `position` and clears all counts.
    pub fn start(&mut self, position: f64) {
        self.baseline = position;
        self.last_delta = 0.0;
        self.forth_count = 0;
        self.back_count = 0;
    }

    pub fn update(&mut self, position: f64) {
        let prev = self.last_delta;
        let delta = position - self.baseline;
        if prev < self.threshold && delta >= self.threshold {
            self.forth_count += 1;
        } else if prev > -self.threshold && delta < -self.threshold {
            self.back_count += 1;
        }
        self.last_delta = delta;
    }

    pub fn oscillation_count(&self) -> u32 {
        self.forth_count.min(self.back_count)
    }

    /// Zeroes the counts; baseline and last displacement are kept.
    pub fn reset_counts(&mut self) {
        self.forth_count = 0;
        self.back_count = 0;
    }

    pub fn forth_count(&self) -> u32 {
        self.forth_count
    }

    pub fn back_count(&self) -> u32 {
        self.back_count
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn baseline(&self) -> f64 {
        self.baseline
    }
}
