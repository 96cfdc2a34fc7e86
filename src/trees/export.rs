//! Tree structure export for rule extraction and diagrams.
//!
//! A fitted tree serializes into a preorder sequence of [`NodeRecord`]s
//! carrying everything a rendering or reporting layer needs: the path
//! from the root, the split rule or leaf value, and the number of
//! training rows the node owned. Predictions can be re-derived from the
//! records alone, without touching the tree again.
use super::node::TreeNode;
use super::regressor::DecisionTreeRegressor;
use crate::data::dataset::RealNumber;
use crate::error::GlassboxError;
use nalgebra::{DMatrix, DVector};

/// Which side of its parent's split a node hangs on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Branch {
    Left,
    Right,
}

/// One node of an exported tree. Internal nodes carry `feature_index`
/// and `threshold`; leaves carry `value`.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeRecord<T: RealNumber> {
    pub path: Vec<Branch>,
    pub feature_index: Option<usize>,
    pub feature_name: Option<String>,
    pub threshold: Option<T>,
    pub value: Option<T>,
    pub samples: usize,
}

impl<T: RealNumber> NodeRecord<T> {
    pub fn is_leaf(&self) -> bool {
        self.value.is_some()
    }

    /// The node's side relative to its parent; `None` for the root.
    pub fn direction(&self) -> Option<Branch> {
        self.path.last().copied()
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }
}

/// Preorder (parent first, left subtree before right) record sequence
/// of a fitted tree.
pub struct TreeExport<T: RealNumber> {
    records: Vec<NodeRecord<T>>,
}

impl<T: RealNumber> DecisionTreeRegressor<T> {
    /// Serializes the fitted tree into node records.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree wasn't built yet.
    pub fn export(&self) -> Result<TreeExport<T>, GlassboxError> {
        let root = self
            .root
            .as_ref()
            .ok_or_else(|| GlassboxError::invalid_input("Tree wasn't built yet."))?;
        let mut records = Vec::new();
        collect_records(root, Vec::new(), &mut records);
        Ok(TreeExport { records })
    }
}

fn collect_records<T: RealNumber>(
    node: &TreeNode<T, T>,
    path: Vec<Branch>,
    records: &mut Vec<NodeRecord<T>>,
) {
    records.push(NodeRecord {
        path: path.clone(),
        feature_index: node.feature_index,
        feature_name: None,
        threshold: node.threshold,
        value: node.value,
        samples: node.samples,
    });
    if let (Some(left), Some(right)) = (&node.left, &node.right) {
        let mut left_path = path.clone();
        left_path.push(Branch::Left);
        collect_records(left, left_path, records);

        let mut right_path = path;
        right_path.push(Branch::Right);
        collect_records(right, right_path, records);
    }
}

impl<T: RealNumber> TreeExport<T> {
    pub fn records(&self) -> &[NodeRecord<T>] {
        &self.records
    }

    /// Attaches the upstream column schema so splits can be reported by
    /// feature name instead of index.
    ///
    /// # Errors
    ///
    /// Returns an error if a split references a feature outside the
    /// given schema.
    pub fn with_feature_names(mut self, names: &[&str]) -> Result<Self, GlassboxError> {
        for record in &mut self.records {
            if let Some(index) = record.feature_index {
                let name = names.get(index).ok_or_else(|| {
                    GlassboxError::invalid_input(format!(
                        "split on feature {index} but only {} feature names were given",
                        names.len()
                    ))
                })?;
                record.feature_name = Some((*name).to_string());
            }
        }
        Ok(self)
    }

    /// Re-derives predictions by walking the records alone. For any
    /// feature matrix this reproduces the fitted tree's own `predict`
    /// exactly.
    ///
    /// # Errors
    ///
    /// Returns an error if the record sequence does not describe a
    /// complete tree.
    pub fn predict(&self, features: &DMatrix<T>) -> Result<DVector<T>, GlassboxError> {
        let mut predictions = Vec::with_capacity(features.nrows());
        for row in features.row_iter() {
            let mut path: Vec<Branch> = Vec::new();
            loop {
                let record = self.find(&path).ok_or_else(|| {
                    GlassboxError::invalid_input("export does not describe a complete tree")
                })?;
                if let Some(value) = record.value {
                    predictions.push(value);
                    break;
                }
                let feature_index = record.feature_index.unwrap();
                let threshold = record.threshold.unwrap();
                if row[feature_index] <= threshold {
                    path.push(Branch::Left);
                } else {
                    path.push(Branch::Right);
                }
            }
        }
        Ok(DVector::from_vec(predictions))
    }

    /// Renders one human-readable rule line per leaf, in preorder.
    pub fn rules(&self) -> Vec<String> {
        self.records
            .iter()
            .filter(|record| record.is_leaf())
            .map(|leaf| {
                let conditions: Vec<String> = (0..leaf.path.len())
                    .map(|prefix_len| {
                        let parent = self.find(&leaf.path[..prefix_len]).unwrap();
                        let feature = parent
                            .feature_name
                            .clone()
                            .unwrap_or_else(|| format!("x{}", parent.feature_index.unwrap()));
                        let comparison = match leaf.path[prefix_len] {
                            Branch::Left => "<=",
                            Branch::Right => ">",
                        };
                        format!("{} {} {}", feature, comparison, parent.threshold.unwrap())
                    })
                    .collect();

                let value = leaf.value.unwrap();
                if conditions.is_empty() {
                    format!("predict {} ({} rows)", value, leaf.samples)
                } else {
                    format!(
                        "if {} then predict {} ({} rows)",
                        conditions.join(" and "),
                        value,
                        leaf.samples
                    )
                }
            })
            .collect()
    }

    fn find(&self, path: &[Branch]) -> Option<&NodeRecord<T>> {
        self.records.iter().find(|record| record.path == path)
    }
}
