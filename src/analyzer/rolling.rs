use std::collections::VecDeque;

/// Sliding-window accumulator with O(1) amortized mean and sample standard deviation.
///
/// Running sums are rebuilt from the buffered values every time the window
/// turns over completely, so floating point drift stays bounded for long series.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    period: usize,
    window: VecDeque<f64>,
    sum: f64,
    sum_sq: f64,
    nonzero: usize,
    evicted: usize,
}

impl RollingWindow {
    /// `period` must be non-zero.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "rolling window period must be non-zero");
        Self {
            period,
            window: VecDeque::with_capacity(period + 1),
            sum: 0.0,
            sum_sq: 0.0,
            nonzero: 0,
            evicted: 0,
        }
    }

    pub fn push(&mut self, value: f64) {
        self.window.push_back(value);
        self.sum += value;
        self.sum_sq += value * value;
        if value != 0.0 {
            self.nonzero += 1;
        }

        if self.window.len() > self.period {
            if let Some(oldest) = self.window.pop_front() {
                self.sum -= oldest;
                self.sum_sq -= oldest * oldest;
                if oldest != 0.0 {
                    self.nonzero -= 1;
                }
            }
            self.evicted += 1;
            if self.evicted >= self.period {
                self.refresh();
            }
        }

        // An all-zero window must average to exactly zero.
        if self.nonzero == 0 {
            self.sum = 0.0;
            self.sum_sq = 0.0;
        }
    }

    fn refresh(&mut self) {
        self.sum = self.window.iter().sum();
        self.sum_sq = self.window.iter().map(|v| v * v).sum();
        self.evicted = 0;
    }

    pub fn is_full(&self) -> bool {
        self.window.len() == self.period
    }

    pub fn mean(&self) -> Option<f64> {
        if !self.is_full() {
            return None;
        }
        Some(self.sum / self.period as f64)
    }

    /// Sample standard deviation (N-1 denominator). Undefined for a period of 1.
    pub fn sample_std(&self) -> Option<f64> {
        if !self.is_full() || self.period < 2 {
            return None;
        }
        let n = self.period as f64;
        let variance = (self.sum_sq - self.sum * self.sum / n) / (n - 1.0);
        Some(variance.max(0.0).sqrt())
    }
}
