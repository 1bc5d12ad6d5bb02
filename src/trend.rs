/// Ordinary least-squares line through `(i, values[i])`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendLine {
    /// `None` when fewer than two points or any value is not finite.
    pub fn fit(values: &[f64]) -> Option<Self> {
        if values.len() < 2 || values.iter().any(|v| !v.is_finite()) {
            return None;
        }

        let n = values.len() as f64;
        let mean_x = (n - 1.0) / 2.0;
        let mean_y = values.iter().sum::<f64>() / n;

        let (mut sxy, mut sxx) = (0.0, 0.0);
        for (i, &y) in values.iter().enumerate() {
            let dx = i as f64 - mean_x;
            sxy += dx * (y - mean_y);
            sxx += dx * dx;
        }

        let slope = sxy / sxx;
        Some(Self {
            slope,
            intercept: mean_y - slope * mean_x,
        })
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// Fitted values at positions `0..n`.
    pub fn fitted(&self, n: usize) -> Vec<f64> {
        (0..n).map(|i| self.predict(i as f64)).collect()
    }
}
