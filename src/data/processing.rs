use super::record::UnifiedDataset;
use tracing::debug;

/// Applies the price transformation to an extracted dataset.
///
/// Only `price` changes; every other field, and the row order, pass through
/// untouched.
///
/// # Rounding rule
/// Prices are rounded to `decimals` places with round-half-away-from-zero,
/// applied to the binary `f64` value scaled by `10^decimals` (this is what
/// [`f64::round`] does). An exact tie such as `0.125` becomes `0.13`. Ties are
/// judged on the scaled product, so `2.005` (stored as `2.00499…`, but whose
/// product with 100 is exactly `200.5`) becomes `2.01`. Rounding an
/// already-rounded price leaves it unchanged.
pub struct DataProcessor {
    decimals: u32,
}

impl DataProcessor {
    /// Creates a new `DataProcessor` rounding prices to `decimals` places.
    pub fn new(decimals: u32) -> Self {
        Self { decimals }
    }

    /// Rounds every price in the dataset in place and returns it.
    ///
    /// # Arguments
    /// * `dataset` - The extracted records, consumed and reused
    ///
    /// # Returns
    /// The same records in the same order with rounded prices
    pub fn process(&self, mut dataset: UnifiedDataset) -> UnifiedDataset {
        for record in dataset.records_mut() {
            record.price = round_to(record.price, self.decimals);
        }

        debug!(rows = dataset.len(), decimals = self.decimals, "rounded prices");
        dataset
    }
}

/// Rounds `value` to `decimals` places, half away from zero.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let rounded = (value * factor).round() / factor;
    // very large values overflow the scaled form; leave them as they are
    if rounded.is_finite() {
        rounded
    } else {
        value
    }
}
