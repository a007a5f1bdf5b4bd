use crate::analyzer::rolling::RollingWindow;

/// Exponential moving average seeded by the first value.
#[derive(Debug, Clone)]
pub struct Ema {
    alpha: f64,
    state: Option<f64>,
}

impl Ema {
    /// Smoothing factor is `2 / (span + 1)`.
    pub fn new(span: usize) -> Self {
        Self {
            alpha: 2.0 / (span as f64 + 1.0),
            state: None,
        }
    }

    pub fn next(&mut self, value: f64) -> f64 {
        let next = match self.state {
            Some(prev) => value * self.alpha + prev * (1.0 - self.alpha),
            None => value,
        };
        self.state = Some(next);
        next
    }
}

/// RSI over plain rolling means of gains and losses (no Wilder smoothing).
#[derive(Debug, Clone)]
pub struct Rsi {
    prev_close: Option<f64>,
    gains: RollingWindow,
    losses: RollingWindow,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self {
            prev_close: None,
            gains: RollingWindow::new(period),
            losses: RollingWindow::new(period),
        }
    }

    pub fn next(&mut self, close: f64) -> Option<f64> {
        // The first bar has no delta and counts as neither gain nor loss.
        let delta = self.prev_close.map_or(0.0, |prev| close - prev);
        self.prev_close = Some(close);
        self.gains.push(delta.max(0.0));
        self.losses.push((-delta).max(0.0));

        let avg_gain = self.gains.mean()?;
        let avg_loss = self.losses.mean()?;
        Some(rsi_from_averages(avg_gain, avg_loss))
    }
}

/// `100 - 100 / (1 + gain / loss)`, pinned to 100 when there are no losses.
pub fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdValue {
    pub macd: f64,
    pub signal: f64,
}

/// MACD line (fast EMA minus slow EMA) and its signal EMA.
#[derive(Debug, Clone)]
pub struct Macd {
    fast: Ema,
    slow: Ema,
    signal: Ema,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        Self {
            fast: Ema::new(fast),
            slow: Ema::new(slow),
            signal: Ema::new(signal),
        }
    }

    pub fn next(&mut self, close: f64) -> MacdValue {
        let macd = self.fast.next(close) - self.slow.next(close);
        let signal = self.signal.next(macd);
        MacdValue { macd, signal }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bands {
    pub middle: f64,
    pub std_dev: f64,
    pub upper: f64,
    pub lower: f64,
}

/// Bollinger bands: rolling mean plus/minus `width` sample deviations.
#[derive(Debug, Clone)]
pub struct Bollinger {
    window: RollingWindow,
    width: f64,
}

impl Bollinger {
    pub fn new(period: usize, width: f64) -> Self {
        Self {
            window: RollingWindow::new(period),
            width,
        }
    }

    pub fn next(&mut self, close: f64) -> Option<Bands> {
        self.window.push(close);
        let middle = self.window.mean()?;
        let std_dev = self.window.sample_std()?;
        Some(Bands {
            middle,
            std_dev,
            upper: middle + self.width * std_dev,
            lower: middle - self.width * std_dev,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_seeds_with_first_value() {
        let mut ema = Ema::new(20);
        assert_eq!(ema.next(100.0), 100.0);
        let alpha = 2.0 / 21.0;
        let expected = 110.0 * alpha + 100.0 * (1.0 - alpha);
        assert_eq!(ema.next(110.0), expected);
    }

    #[test]
    fn rsi_undefined_until_window_full() {
        let mut rsi = Rsi::new(14);
        for i in 0..13 {
            assert_eq!(rsi.next(100.0 + i as f64), None);
        }
        assert!(rsi.next(113.0).is_some());
    }

    #[test]
    fn rsi_is_100_without_losses() {
        let mut rsi = Rsi::new(14);
        let mut last = None;
        for i in 0..30 {
            last = rsi.next(50.0 + i as f64 * 0.5);
        }
        assert_eq!(last, Some(100.0));
    }

    #[test]
    fn rsi_flat_market_reports_100() {
        let mut rsi = Rsi::new(14);
        let mut last = None;
        for _ in 0..20 {
            last = rsi.next(42.0);
        }
        assert_eq!(last, Some(100.0));
    }

    #[test]
    fn rsi_is_zero_without_gains() {
        let mut rsi = Rsi::new(14);
        let mut last = None;
        for i in 0..30 {
            last = rsi.next(200.0 - i as f64);
        }
        assert_eq!(last, Some(0.0));
    }

    #[test]
    fn rsi_uses_plain_rolling_mean() {
        // Deltas alternate +2 / -1 after the leading zero delta.
        let closes: Vec<f64> = (0..40)
            .scan(100.0, |price, i| {
                if i > 0 {
                    *price += if i % 2 == 1 { 2.0 } else { -1.0 };
                }
                Some(*price)
            })
            .collect();
        let mut rsi = Rsi::new(14);
        let values: Vec<Option<f64>> = closes.iter().map(|&c| rsi.next(c)).collect();
        // Index 13: deltas[0..=13] = 0, then 7 gains and 6 losses.
        let first = values[13].unwrap();
        assert!((first - rsi_from_averages(14.0 / 14.0, 6.0 / 14.0)).abs() < 1e-12);
        // Index 20: 7 gains, 7 losses.
        let later = values[20].unwrap();
        assert!((later - 100.0 * 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn macd_starts_at_zero() {
        let mut macd = Macd::new(12, 26, 9);
        let first = macd.next(100.0);
        assert_eq!(first, MacdValue { macd: 0.0, signal: 0.0 });
        let second = macd.next(101.0);
        assert!(second.macd > 0.0);
        assert!(second.signal > 0.0 && second.signal < second.macd);
    }

    #[test]
    fn bollinger_width_is_four_deviations() {
        let mut bb = Bollinger::new(20, 2.0);
        let mut last = None;
        for i in 0..25 {
            last = bb.next(100.0 + (i % 5) as f64);
        }
        let bands = last.unwrap();
        assert!(((bands.upper - bands.lower) - 4.0 * bands.std_dev).abs() < 1e-9);
        assert!(bands.lower < bands.middle && bands.middle < bands.upper);
    }
}
