//! Decision Tree Regressor
use super::{node::TreeNode, params::TreeParams};
use crate::{
    data::dataset::{Dataset, RealNumber},
    error::GlassboxError,
    metrics::regression::RegressionMetrics,
};
use nalgebra::{DMatrix, DVector};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use std::cmp::Ordering;

pub struct SplitData<T: RealNumber> {
    pub feature_index: usize,
    pub threshold: T,
    pub left: Dataset<T, T>,
    pub right: Dataset<T, T>,
    sse: T,
}

/// Greedy regression tree fit by minimizing the summed squared error of
/// each binary split. Growth is bounded only by `max_depth` and
/// `min_node_size`; there is no complexity-based pruning, so any split
/// that exists is taken no matter how small its improvement.
#[derive(Clone, Debug)]
pub struct DecisionTreeRegressor<T: RealNumber> {
    pub(crate) root: Option<Box<TreeNode<T, T>>>,
    tree_params: TreeParams,
}

impl<T: RealNumber> Default for DecisionTreeRegressor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RealNumber> RegressionMetrics<T> for DecisionTreeRegressor<T> {}

impl<T: RealNumber> DecisionTreeRegressor<T> {
    pub fn new() -> Self {
        Self {
            root: None,
            tree_params: TreeParams::new(),
        }
    }

    /// Creates a regressor with the given growth bounds.
    ///
    /// # Errors
    ///
    /// Returns an error if `min_node_size` is less than 1. A
    /// `max_depth` of 0 is accepted and produces a single-leaf stump.
    pub fn with_params(max_depth: usize, min_node_size: usize) -> Result<Self, GlassboxError> {
        let mut tree = Self::new();
        tree.tree_params.set_max_depth(max_depth);
        tree.tree_params.set_min_node_size(min_node_size)?;
        Ok(tree)
    }

    pub fn max_depth(&self) -> usize {
        self.tree_params.max_depth()
    }

    pub fn min_node_size(&self) -> usize {
        self.tree_params.min_node_size()
    }

    /// Grows the tree on `dataset`. Induction is fully deterministic:
    /// the same rows in the same order always produce the same tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the dataset is empty or its matrix and
    /// target vector disagree on the number of rows.
    pub fn fit(&mut self, dataset: &Dataset<T, T>) -> Result<(), GlassboxError> {
        if !dataset.is_not_empty() {
            return Err(GlassboxError::invalid_input(
                "Cannot fit a tree on an empty dataset.",
            ));
        }
        if dataset.x.nrows() != dataset.y.len() {
            return Err(GlassboxError::invalid_input(format!(
                "feature matrix has {} rows but the target vector has {} entries",
                dataset.x.nrows(),
                dataset.y.len()
            )));
        }
        self.root = Some(Box::new(self.build_tree(dataset, 0)));
        Ok(())
    }

    /// Predicts a target value for every row of `prediction_features`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree wasn't built yet.
    pub fn predict(&self, prediction_features: &DMatrix<T>) -> Result<DVector<T>, GlassboxError> {
        let root = self
            .root
            .as_ref()
            .ok_or_else(|| GlassboxError::invalid_input("Tree wasn't built yet."))?;
        let predictions: Vec<_> = prediction_features
            .row_iter()
            .map(|row| Self::make_prediction(row.transpose(), root))
            .collect();

        Ok(DVector::from_vec(predictions))
    }

    fn make_prediction(features: DVector<T>, node: &TreeNode<T, T>) -> T {
        if let Some(value) = &node.value {
            return *value;
        }
        match &features[node.feature_index.unwrap()] {
            x if x <= node.threshold.as_ref().unwrap() => {
                Self::make_prediction(features, node.left.as_ref().unwrap())
            }
            _ => Self::make_prediction(features, node.right.as_ref().unwrap()),
        }
    }

    fn build_tree(&self, dataset: &Dataset<T, T>, depth: usize) -> TreeNode<T, T> {
        let num_samples = dataset.nrows();

        let depth_allows_split = depth < self.tree_params.max_depth();
        let size_allows_split = num_samples >= 2 * self.tree_params.min_node_size();
        if depth_allows_split && size_allows_split {
            if let Some(split) = self.best_split(dataset) {
                let (left_node, right_node) = rayon::join(
                    || self.build_tree(&split.left, depth + 1),
                    || self.build_tree(&split.right, depth + 1),
                );
                return TreeNode {
                    feature_index: Some(split.feature_index),
                    threshold: Some(split.threshold),
                    left: Some(Box::new(left_node)),
                    right: Some(Box::new(right_node)),
                    value: None,
                    samples: num_samples,
                };
            }
        }

        TreeNode::leaf(self.mean(&dataset.y), num_samples)
    }

    /// Finds the (feature, threshold) pair minimizing the combined sum
    /// of squared errors of the two children. Candidate thresholds are
    /// the midpoints between consecutive distinct sorted values of each
    /// feature. Ties go to the lowest feature index, then the lowest
    /// threshold. Returns `None` when the targets already agree or no
    /// feature has two distinct values.
    fn best_split(&self, dataset: &Dataset<T, T>) -> Option<SplitData<T>> {
        let first_target = dataset.y[0];
        if dataset.y.iter().all(|&value| value == first_target) {
            return None;
        }

        let num_features = dataset.x.ncols();
        let candidates: Vec<_> = (0..num_features)
            .into_par_iter()
            .map(|feature_index| self.best_split_on_feature(dataset, feature_index))
            .collect();

        // collect() preserves feature order, so this sequential
        // reduction with a strict comparison keeps the tie-break
        // independent of rayon's scheduling.
        let mut best: Option<SplitData<T>> = None;
        for candidate in candidates.into_iter().flatten() {
            let improves = best
                .as_ref()
                .map_or(true, |current| candidate.sse < current.sse);
            if improves {
                best = Some(candidate);
            }
        }
        best
    }

    fn best_split_on_feature(
        &self,
        dataset: &Dataset<T, T>,
        feature_index: usize,
    ) -> Option<SplitData<T>> {
        let mut values: Vec<_> = dataset.x.column(feature_index).iter().cloned().collect();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        values.dedup();

        let two = T::one() + T::one();
        let mut best: Option<SplitData<T>> = None;
        for pair in values.windows(2) {
            let threshold = (pair[0] + pair[1]) / two;
            let (left, right) = dataset.split_on_threshold(feature_index, threshold);
            if !left.is_not_empty() || !right.is_not_empty() {
                // The midpoint of two adjacent representable values can
                // round onto one of them and push every row to one side.
                continue;
            }

            let sse = self.sum_squared_error(&left.y) + self.sum_squared_error(&right.y);
            let improves = best.as_ref().map_or(true, |current| sse < current.sse);
            if improves {
                best = Some(SplitData {
                    feature_index,
                    threshold,
                    left,
                    right,
                    sse,
                });
            }
        }
        best
    }

    fn sum_squared_error(&self, y: &DVector<T>) -> T {
        let mean = self.mean(y);
        y.iter()
            .fold(T::zero(), |acc, &value| acc + (value - mean) * (value - mean))
    }

    fn mean(&self, y: &DVector<T>) -> T {
        y.sum() / T::from_usize(y.len()).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn step_dataset() -> Dataset<f64, f64> {
        let x = DMatrix::from_vec(4, 1, vec![1.0, 2.0, 3.0, 4.0]);
        let y = DVector::from_vec(vec![10.0, 10.0, 20.0, 20.0]);
        Dataset::new(x, y)
    }

    fn max_leaf_depth(node: &TreeNode<f64, f64>, depth: usize) -> usize {
        if node.is_leaf() {
            return depth;
        }
        let left = max_leaf_depth(node.left.as_ref().unwrap(), depth + 1);
        let right = max_leaf_depth(node.right.as_ref().unwrap(), depth + 1);
        left.max(right)
    }

    fn check_partition_invariant(node: &TreeNode<f64, f64>) {
        if node.is_leaf() {
            return;
        }
        let left = node.left.as_ref().unwrap();
        let right = node.right.as_ref().unwrap();
        assert_eq!(node.samples, left.samples + right.samples);
        check_partition_invariant(left);
        check_partition_invariant(right);
    }

    #[test]
    fn test_mean() {
        let y = DVector::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let regressor: DecisionTreeRegressor<f64> = DecisionTreeRegressor::new();
        assert_eq!(regressor.mean(&y), 3.5);
    }

    #[test]
    fn test_sum_squared_error() {
        let y = DVector::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let regressor: DecisionTreeRegressor<f64> = DecisionTreeRegressor::new();
        assert_eq!(regressor.sum_squared_error(&y), 10.0);
    }

    #[test]
    fn test_with_params_rejects_zero_min_node_size() {
        let result = DecisionTreeRegressor::<f64>::with_params(3, 0);
        assert!(matches!(result, Err(GlassboxError::InvalidInput { .. })));
    }

    #[test]
    fn test_fit_empty_dataset() {
        let dataset = Dataset::new(
            DMatrix::<f64>::zeros(0, 1),
            DVector::<f64>::from_vec(vec![]),
        );
        let mut regressor = DecisionTreeRegressor::with_params(2, 1).unwrap();
        assert!(matches!(
            regressor.fit(&dataset),
            Err(GlassboxError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_predict_before_fit() {
        let regressor: DecisionTreeRegressor<f64> = DecisionTreeRegressor::new();
        let features = DMatrix::from_vec(1, 1, vec![1.0]);
        assert!(matches!(
            regressor.predict(&features),
            Err(GlassboxError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_step_function_single_split() {
        let dataset = step_dataset();
        let mut regressor = DecisionTreeRegressor::with_params(1, 1).unwrap();
        regressor.fit(&dataset).unwrap();

        let root = regressor.root.as_ref().unwrap();
        assert_eq!(root.feature_index, Some(0));
        assert_relative_eq!(root.threshold.unwrap(), 2.5);
        assert_relative_eq!(root.left.as_ref().unwrap().value.unwrap(), 10.0);
        assert_relative_eq!(root.right.as_ref().unwrap().value.unwrap(), 20.0);

        let predictions = regressor.predict(&dataset.x).unwrap();
        assert_relative_eq!(regressor.r2(&dataset.y, &predictions).unwrap(), 1.0);
    }

    #[test]
    fn test_zero_depth_stump() {
        let dataset = step_dataset();
        let mut regressor = DecisionTreeRegressor::with_params(0, 1).unwrap();
        regressor.fit(&dataset).unwrap();

        let root = regressor.root.as_ref().unwrap();
        assert!(root.is_leaf());
        assert_relative_eq!(root.value.unwrap(), 15.0);

        let predictions = regressor.predict(&dataset.x).unwrap();
        assert_relative_eq!(regressor.r2(&dataset.y, &predictions).unwrap(), 0.0);
    }

    #[test]
    fn test_constant_target_stays_leaf() {
        let x = DMatrix::from_vec(4, 1, vec![1.0, 2.0, 3.0, 4.0]);
        let y = DVector::from_vec(vec![7.0, 7.0, 7.0, 7.0]);
        let dataset = Dataset::new(x, y);

        let mut regressor = DecisionTreeRegressor::with_params(5, 1).unwrap();
        regressor.fit(&dataset).unwrap();

        let root = regressor.root.as_ref().unwrap();
        assert!(root.is_leaf());
        assert_relative_eq!(root.value.unwrap(), 7.0);

        let predictions = regressor.predict(&dataset.x).unwrap();
        assert_eq!(regressor.r2(&dataset.y, &predictions).unwrap(), 1.0);
    }

    #[test]
    fn test_single_valued_feature_cannot_split() {
        let x = DMatrix::from_vec(4, 1, vec![3.0, 3.0, 3.0, 3.0]);
        let y = DVector::from_vec(vec![1.0, 2.0, 3.0, 4.0]);
        let dataset = Dataset::new(x, y);

        let mut regressor = DecisionTreeRegressor::with_params(3, 1).unwrap();
        regressor.fit(&dataset).unwrap();
        assert!(regressor.root.as_ref().unwrap().is_leaf());
    }

    #[test]
    fn test_tiny_improvement_is_still_taken() {
        let x = DMatrix::from_vec(4, 1, vec![1.0, 2.0, 3.0, 4.0]);
        let y = DVector::from_vec(vec![10.0, 10.0, 10.0, 10.0001]);
        let dataset = Dataset::new(x, y);

        let mut regressor = DecisionTreeRegressor::with_params(3, 1).unwrap();
        regressor.fit(&dataset).unwrap();
        assert!(!regressor.root.as_ref().unwrap().is_leaf());
    }

    #[test]
    fn test_min_node_size_blocks_split() {
        let x = DMatrix::from_vec(3, 1, vec![1.0, 2.0, 3.0]);
        let y = DVector::from_vec(vec![1.0, 5.0, 9.0]);
        let dataset = Dataset::new(x, y);

        // Three rows cannot leave two on each side.
        let mut regressor = DecisionTreeRegressor::with_params(3, 2).unwrap();
        regressor.fit(&dataset).unwrap();
        assert!(regressor.root.as_ref().unwrap().is_leaf());

        let x = DMatrix::from_vec(4, 1, vec![1.0, 2.0, 3.0, 4.0]);
        let y = DVector::from_vec(vec![1.0, 5.0, 9.0, 13.0]);
        let dataset = Dataset::new(x, y);

        let mut regressor = DecisionTreeRegressor::with_params(3, 2).unwrap();
        regressor.fit(&dataset).unwrap();
        let root = regressor.root.as_ref().unwrap();
        assert!(!root.is_leaf());
        // Both children fall below 2 * min_node_size and stop there.
        assert!(root.left.as_ref().unwrap().is_leaf());
        assert!(root.right.as_ref().unwrap().is_leaf());
    }

    #[test]
    fn test_depth_bound() {
        let x = DMatrix::from_vec(8, 1, (1..=8).map(f64::from).collect());
        let y = DVector::from_vec(vec![3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0]);
        let dataset = Dataset::new(x, y);

        for max_depth in 0..4 {
            let mut regressor = DecisionTreeRegressor::with_params(max_depth, 1).unwrap();
            regressor.fit(&dataset).unwrap();
            let root = regressor.root.as_ref().unwrap();
            assert!(max_leaf_depth(root, 0) <= max_depth);
            check_partition_invariant(root);
        }
    }

    #[test]
    fn test_deterministic_induction() {
        let x = DMatrix::from_vec(6, 2, vec![
            1.0, 2.0, 3.0, 4.0, 5.0, 6.0, // feature 0
            2.0, 1.0, 2.0, 1.0, 2.0, 1.0, // feature 1
        ]);
        let y = DVector::from_vec(vec![1.0, 4.0, 9.0, 16.0, 25.0, 36.0]);
        let dataset = Dataset::new(x, y);

        let mut first = DecisionTreeRegressor::with_params(3, 1).unwrap();
        let mut second = DecisionTreeRegressor::with_params(3, 1).unwrap();
        first.fit(&dataset).unwrap();
        second.fit(&dataset).unwrap();

        assert_eq!(
            format!("{:?}", first.root),
            format!("{:?}", second.root)
        );
    }

    #[test]
    fn test_tie_breaks_prefer_lowest_feature() {
        // Both features separate the targets perfectly; the split must
        // land on feature 0.
        let x = DMatrix::from_vec(4, 2, vec![
            1.0, 1.0, 2.0, 2.0, // feature 0
            5.0, 5.0, 8.0, 8.0, // feature 1
        ]);
        let y = DVector::from_vec(vec![10.0, 10.0, 20.0, 20.0]);
        let dataset = Dataset::new(x, y);

        let mut regressor = DecisionTreeRegressor::with_params(1, 1).unwrap();
        regressor.fit(&dataset).unwrap();
        assert_eq!(regressor.root.as_ref().unwrap().feature_index, Some(0));
    }

    #[test]
    fn test_in_sample_r2_bounds() {
        let x = DMatrix::from_vec(8, 1, (1..=8).map(f64::from).collect());
        let y = DVector::from_vec(vec![3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0]);
        let dataset = Dataset::new(x, y);

        for max_depth in 0..5 {
            let mut regressor = DecisionTreeRegressor::with_params(max_depth, 1).unwrap();
            regressor.fit(&dataset).unwrap();
            let predictions = regressor.predict(&dataset.x).unwrap();
            let r2 = regressor.r2(&dataset.y, &predictions).unwrap();
            assert!((0.0..=1.0).contains(&r2), "r2 out of bounds: {r2}");
        }
    }
}
