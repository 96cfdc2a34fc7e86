use crate::error::GlassboxError;

/// Growth bounds for a surrogate tree.
///
/// `max_depth` is the only depth control; 0 is legal and produces a
/// single-leaf stump. `min_node_size` is the per-child row floor: a
/// node with fewer than `2 * min_node_size` rows is never split. There
/// is deliberately no minimum-improvement parameter; a split is
/// accepted whenever one exists.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_node_size: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeParams {
    pub fn new() -> Self {
        Self {
            max_depth: 3,
            min_node_size: 1,
        }
    }

    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth;
    }

    pub fn set_min_node_size(&mut self, min_node_size: usize) -> Result<(), GlassboxError> {
        if min_node_size < 1 {
            return Err(GlassboxError::invalid_input(
                "The minimum node size must be greater than 0.",
            ));
        }
        self.min_node_size = min_node_size;
        Ok(())
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn min_node_size(&self) -> usize {
        self.min_node_size
    }
}
