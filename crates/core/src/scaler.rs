//! Per-column standardisation fitted at training time and replayed at inference.

use crate::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// Standard scaler: `(x - mean) / scale`, with the population standard deviation as scale.
///
/// Constant columns get a scale of `1.0` so they map to zero instead of dividing by zero.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    /// Fits column means and scales over `rows`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Training` if `rows` is empty or ragged.
    pub fn fit(rows: &[Vec<f64>]) -> CoreResult<Self> {
        let width = rows
            .first()
            .map(Vec::len)
            .ok_or_else(|| CoreError::Training("cannot fit a scaler on zero rows".into()))?;
        if rows.iter().any(|r| r.len() != width) {
            return Err(CoreError::Training("rows must share the same width".into()));
        }

        let n = rows.len() as f64;
        let mut mean = vec![0.0; width];
        for row in rows {
            for (m, v) in mean.iter_mut().zip(row) {
                *m += v;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut variance = vec![0.0; width];
        for row in rows {
            for ((var, v), m) in variance.iter_mut().zip(row).zip(&mean) {
                *var += (v - m).powi(2);
            }
        }
        let scale = variance
            .into_iter()
            .map(|var| {
                let std = (var / n).sqrt();
                if std > f64::EPSILON {
                    std
                } else {
                    1.0
                }
            })
            .collect();

        Ok(Self { mean, scale })
    }

    /// Identity scaler for `width` columns.
    pub fn identity(width: usize) -> Self {
        Self {
            mean: vec![0.0; width],
            scale: vec![1.0; width],
        }
    }

    pub fn transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(v, (m, s))| (v - m) / s)
            .collect()
    }

    pub fn transform_all(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.iter().map(|r| self.transform(r)).collect()
    }

    pub(crate) fn validate(&self, width: usize) -> Result<(), String> {
        if self.mean.len() != width || self.scale.len() != width {
            return Err(format!(
                "scaler covers {} columns, expected {width}",
                self.mean.len()
            ));
        }
        if self
            .scale
            .iter()
            .chain(&self.mean)
            .any(|v| !v.is_finite())
            || self.scale.iter().any(|s| *s <= 0.0)
        {
            return Err("scaler contains non-finite or non-positive values".into());
        }
        Ok(())
    }
}
