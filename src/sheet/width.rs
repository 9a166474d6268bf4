//! Column width measurement and fitting.

use std::collections::BTreeMap;

/// Total width budget for a worksheet and the shrink step used to meet it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidthBudget {
    /// Maximum sum of column widths, in character units
    pub total: f64,

    /// Columns at or above this fraction of the widest column are shrunk
    pub threshold: f64,

    /// Multiplier applied to shrunk columns
    pub factor: f64,
}

impl WidthBudget {
    /// Create a budget with the default shrink step.
    pub fn new(total: f64) -> Self {
        Self {
            total: total.max(0.0),
            ..Self::default()
        }
    }

    /// Set the shrink threshold (fraction of the widest column).
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold.clamp(0.01, 1.0);
        self
    }

    /// Set the shrink factor.
    pub fn with_factor(mut self, factor: f64) -> Self {
        self.factor = factor.clamp(0.01, 0.99);
        self
    }
}

impl Default for WidthBudget {
    fn default() -> Self {
        Self {
            total: 190.0,
            threshold: 0.9,
            factor: 0.7,
        }
    }
}

/// Observed maximum width per column.
///
/// Columns that were never observed read as zero, so [`to_vec`](Self::to_vec)
/// always yields contiguous widths starting at column 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnWidthMap {
    widths: BTreeMap<u32, f64>,
}

impl ColumnWidthMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a width for a column, keeping the maximum seen so far.
    pub fn observe(&mut self, column: u32, width: f64) {
        let entry = self.widths.entry(column).or_insert(0.0);
        if width > *entry {
            *entry = width;
        }
    }

    /// Width of a column (0 if never observed).
    pub fn get(&self, column: u32) -> f64 {
        self.widths.get(&column).copied().unwrap_or(0.0)
    }

    /// Number of columns, counting from 0 to the highest observed column.
    pub fn len(&self) -> usize {
        self.widths
            .keys()
            .next_back()
            .map(|last| *last as usize + 1)
            .unwrap_or(0)
    }

    /// Check if no column has been observed.
    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    /// Sum of all widths.
    pub fn total(&self) -> f64 {
        self.widths.values().sum()
    }

    /// Contiguous widths for columns `0..len()`.
    pub fn to_vec(&self) -> Vec<f64> {
        (0..self.len() as u32).map(|c| self.get(c)).collect()
    }
}

/// Shrink column widths until their sum fits the budget.
///
/// Each pass shrinks every column within `threshold` of the widest one by
/// `factor`, so near-ties shrink together. Widths already within budget are
/// returned unchanged. No per-column floor is applied.
pub fn fit_columns(widths: &[f64], budget: &WidthBudget) -> Vec<f64> {
    let total_budget = budget.total.max(0.0);
    let threshold_ratio = budget.threshold.clamp(0.01, 1.0);
    let factor = budget.factor.clamp(0.01, 0.99);

    let mut widths: Vec<f64> = widths.iter().map(|w| w.max(0.0)).collect();
    let mut passes = 0;
    while widths.iter().sum::<f64>() > total_budget {
        let widest = widths.iter().copied().fold(0.0, f64::max);
        if widest <= 0.0 {
            break;
        }
        let threshold = widest * threshold_ratio;
        for width in widths.iter_mut().filter(|w| **w >= threshold) {
            *width *= factor;
        }
        passes += 1;
    }

    if passes > 0 {
        log::debug!(
            "Fitted {} columns in {} passes (total {:.1})",
            widths.len(),
            passes,
            widths.iter().sum::<f64>()
        );
    }
    widths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_map_contiguous() {
        let mut map = ColumnWidthMap::new();
        map.observe(2, 5.0);
        map.observe(0, 3.0);
        map.observe(0, 1.0);

        assert_eq!(map.len(), 3);
        assert_eq!(map.to_vec(), vec![3.0, 0.0, 5.0]);
        assert_eq!(map.total(), 8.0);
    }

    #[test]
    fn test_width_map_empty() {
        let map = ColumnWidthMap::new();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
        assert!(map.to_vec().is_empty());
    }

    #[test]
    fn test_small_table_unchanged() {
        let widths = vec![10.0, 20.0, 30.0];
        assert_eq!(fit_columns(&widths, &WidthBudget::default()), widths);
    }

    #[test]
    fn test_single_wide_column_shrinks() {
        let fitted = fit_columns(&[300.0, 10.0], &WidthBudget::default());
        // 300 -> 210 -> 147
        assert!((fitted[0] - 147.0).abs() < 1e-9);
        assert_eq!(fitted[1], 10.0);
    }

    #[test]
    fn test_near_ties_shrink_together() {
        let fitted = fit_columns(&[100.0, 95.0, 10.0], &WidthBudget::default());
        assert!((fitted[0] - 70.0).abs() < 1e-9);
        assert!((fitted[1] - 66.5).abs() < 1e-9);
        assert_eq!(fitted[2], 10.0);
    }

    #[test]
    fn test_many_columns_fit_budget() {
        let widths = vec![12.0; 200];
        let fitted = fit_columns(&widths, &WidthBudget::default());
        assert!(fitted.iter().sum::<f64>() <= 190.0);
        assert!(fitted.iter().all(|w| *w > 0.0));
    }

    #[test]
    fn test_custom_budget() {
        let budget = WidthBudget::new(50.0).with_factor(0.5).with_threshold(1.0);
        let fitted = fit_columns(&[40.0, 20.0], &budget);
        assert_eq!(fitted, vec![20.0, 20.0]);
    }
}
