//! Running means of metric values

use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, Default)]
struct Running {
    sum: f64,
    count: usize,
}

/// Running mean per metric name, reset at epoch boundaries
#[derive(Clone, Debug, Default)]
pub struct MetricsTracker {
    values: BTreeMap<String, Running>,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one observation of `name`
    pub fn update(&mut self, name: &str, value: f32) {
        let entry = self.values.entry(name.to_string()).or_default();
        entry.sum += f64::from(value);
        entry.count += 1;
    }

    /// Current mean of `name`
    pub fn mean(&self, name: &str) -> Option<f32> {
        self.values.get(name).filter(|r| r.count > 0).map(|r| (r.sum / r.count as f64) as f32)
    }

    /// Means of every tracked metric
    pub fn means(&self) -> BTreeMap<String, f32> {
        self.values
            .iter()
            .filter(|(_, r)| r.count > 0)
            .map(|(name, r)| (name.clone(), (r.sum / r.count as f64) as f32))
            .collect()
    }

    /// Forget all observations
    pub fn reset(&mut self) {
        self.values.clear();
    }
}
