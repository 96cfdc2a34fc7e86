//! Depth sweep over surrogate trees.
//!
//! Grows one tree per candidate depth against the black-box model's
//! predictions and scores each with in-sample R². Scoring on the very
//! rows the tree was grown from is deliberate: the sweep measures how
//! well a tree of a given depth *can* represent the black box, not how
//! it would generalize.
use std::collections::BTreeMap;

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::{
    data::dataset::{Dataset, RealNumber},
    error::GlassboxError,
    metrics::regression::RegressionMetrics,
    trees::regressor::DecisionTreeRegressor,
};

/// One candidate depth's outcome: the fitted surrogate, its in-sample
/// predictions, and the share of variance in the black box's output it
/// reproduces.
#[derive(Debug)]
pub struct DepthFit<T: RealNumber> {
    pub tree: DecisionTreeRegressor<T>,
    pub predictions: DVector<T>,
    pub r_squared: T,
}

/// Per-depth results of a sweep, keyed by candidate depth.
pub struct SweepResult<T: RealNumber> {
    pub(crate) fits: BTreeMap<usize, DepthFit<T>>,
}

impl<T: RealNumber> SweepResult<T> {
    pub fn depths(&self) -> Vec<usize> {
        self.fits.keys().copied().collect()
    }

    pub fn fit_at(&self, depth: usize) -> Option<&DepthFit<T>> {
        self.fits.get(&depth)
    }

    /// The depth → R² mapping in ascending depth order, ready for a
    /// fit-versus-complexity plot.
    pub fn r_squared_curve(&self) -> Vec<(usize, T)> {
        self.fits
            .iter()
            .map(|(&depth, fit)| (depth, fit.r_squared))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.fits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fits.is_empty()
    }
}

/// Grows one surrogate tree per candidate depth. Depths are fitted
/// independently, in parallel, and merged on the calling thread.
pub struct DepthSweep {
    candidate_depths: Vec<usize>,
    min_node_size: usize,
}

impl DepthSweep {
    /// # Errors
    ///
    /// Returns an error if the candidate list is empty or
    /// `min_node_size` is less than 1.
    pub fn new(candidate_depths: Vec<usize>, min_node_size: usize) -> Result<Self, GlassboxError> {
        if candidate_depths.is_empty() {
            return Err(GlassboxError::invalid_input(
                "The candidate depth list must not be empty.",
            ));
        }
        if min_node_size < 1 {
            return Err(GlassboxError::invalid_input(
                "The minimum node size must be greater than 0.",
            ));
        }
        Ok(Self {
            candidate_depths,
            min_node_size,
        })
    }

    /// Fits a tree per candidate depth to `black_box_predictions` and
    /// scores each in-sample.
    ///
    /// # Errors
    ///
    /// Returns an error if the matrix and prediction vector disagree on
    /// the number of rows or the data is empty.
    pub fn run<T: RealNumber>(
        &self,
        features: &DMatrix<T>,
        black_box_predictions: &DVector<T>,
    ) -> Result<SweepResult<T>, GlassboxError> {
        // The surrogate is trained on the black box's own predictions,
        // not on ground truth.
        let dataset = Dataset::try_new(features.clone(), black_box_predictions.clone())?;
        if !dataset.is_not_empty() {
            return Err(GlassboxError::invalid_input(
                "Cannot sweep over an empty dataset.",
            ));
        }

        let fits: Result<Vec<_>, GlassboxError> = self
            .candidate_depths
            .par_iter()
            .map(|&depth| {
                let mut tree = DecisionTreeRegressor::with_params(depth, self.min_node_size)?;
                tree.fit(&dataset)?;
                let predictions = tree.predict(&dataset.x)?;
                let r_squared = tree.r2(&dataset.y, &predictions)?;
                Ok((
                    depth,
                    DepthFit {
                        tree,
                        predictions,
                        r_squared,
                    },
                ))
            })
            .collect();

        let mut merged = BTreeMap::new();
        for (depth, fit) in fits? {
            merged.insert(depth, fit);
        }
        Ok(SweepResult { fits: merged })
    }
}
