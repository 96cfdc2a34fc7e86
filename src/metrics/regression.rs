use nalgebra::DVector;

use crate::data::dataset::RealNumber;
use crate::error::GlassboxError;

pub trait RegressionMetrics<T: RealNumber> {
    fn mse(&self, y_true: &DVector<T>, y_pred: &DVector<T>) -> Result<T, GlassboxError> {
        if y_true.len() != y_pred.len() {
            return Err(GlassboxError::invalid_input(
                "Predictions and labels are of different sizes.",
            ));
        }
        if y_true.is_empty() {
            return Err(GlassboxError::invalid_input(
                "Cannot score an empty prediction vector.",
            ));
        }

        let n = T::from_usize(y_true.len())
            .ok_or_else(|| GlassboxError::invalid_input("Couldn't transform from usize"))?;
        let errors = y_pred - y_true;
        let errors_sq = errors.component_mul(&errors);

        Ok(errors_sq.sum() / n)
    }

    /// Coefficient of determination: the fraction of variance in
    /// `y_true` reproduced by `y_pred`.
    ///
    /// When `y_true` has zero variance the ratio is undefined; the
    /// score is defined as exactly 1.0 if the residuals are all zero,
    /// and `DegenerateInput` is reported otherwise.
    fn r2(&self, y_true: &DVector<T>, y_pred: &DVector<T>) -> Result<T, GlassboxError> {
        if y_true.len() != y_pred.len() {
            return Err(GlassboxError::invalid_input(
                "Predictions and labels are of different sizes.",
            ));
        }
        if y_true.is_empty() {
            return Err(GlassboxError::invalid_input(
                "Cannot score an empty prediction vector.",
            ));
        }

        let n = T::from_usize(y_true.len())
            .ok_or_else(|| GlassboxError::invalid_input("Couldn't transform from usize"))?;
        let y_true_mean = y_true.sum() / n;

        let ss_res = y_true
            .iter()
            .zip(y_pred.iter())
            .fold(T::zero(), |acc, (&y_t, &y_p)| {
                acc + (y_t - y_p) * (y_t - y_p)
            });
        let ss_tot = y_true.iter().fold(T::zero(), |acc, &y_t| {
            acc + (y_t - y_true_mean) * (y_t - y_true_mean)
        });

        if ss_tot == T::zero() {
            if ss_res == T::zero() {
                return Ok(T::one());
            }
            return Err(GlassboxError::degenerate_input(
                "target has zero variance but the residuals are nonzero",
            ));
        }

        Ok(T::one() - ss_res / ss_tot)
    }
}
