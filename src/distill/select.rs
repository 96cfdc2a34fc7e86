//! Choosing the final surrogate out of a depth sweep.
use super::sweep::{DepthFit, SweepResult};
use crate::data::dataset::RealNumber;
use crate::error::GlassboxError;

/// How the final surrogate is chosen from a sweep.
///
/// `MaxRSquared` automates the choice; `FixedDepth` matches the manual
/// workflow of reading the R²-versus-depth curve and picking a depth
/// that trades fidelity for readability.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// The depth with the highest R²; ties go to the shallowest tree.
    MaxRSquared,
    /// An externally supplied depth.
    FixedDepth(usize),
}

impl<T: RealNumber> SweepResult<T> {
    /// Picks a depth's fit according to `policy`.
    ///
    /// # Errors
    ///
    /// `DepthNotFound` when a fixed depth was never swept.
    pub fn select(&self, policy: SelectionPolicy) -> Result<&DepthFit<T>, GlassboxError> {
        let depth = self.selected_depth(policy)?;
        Ok(&self.fits[&depth])
    }

    /// Like [`select`](Self::select), but consumes the sweep so the
    /// chosen tree can outlive it.
    pub fn into_selected(mut self, policy: SelectionPolicy) -> Result<DepthFit<T>, GlassboxError> {
        let depth = self.selected_depth(policy)?;
        Ok(self.fits.remove(&depth).unwrap())
    }

    fn selected_depth(&self, policy: SelectionPolicy) -> Result<usize, GlassboxError> {
        match policy {
            SelectionPolicy::MaxRSquared => {
                let mut best: Option<(usize, T)> = None;
                // Ascending depth order plus a strict comparison keeps
                // the shallowest tree on equal scores.
                for (&depth, fit) in &self.fits {
                    let improves = best.map_or(true, |(_, score)| fit.r_squared > score);
                    if improves {
                        best = Some((depth, fit.r_squared));
                    }
                }
                best.map(|(depth, _)| depth).ok_or_else(|| {
                    GlassboxError::invalid_input("Cannot select from an empty sweep result.")
                })
            }
            SelectionPolicy::FixedDepth(depth) => {
                if self.fits.contains_key(&depth) {
                    Ok(depth)
                } else {
                    Err(GlassboxError::DepthNotFound { depth })
                }
            }
        }
    }
}
