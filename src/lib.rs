//! # Glassbox
//!
//! `glassbox` approximates a black-box regression model with a small,
//! human-interpretable surrogate: a regression decision tree fit to the
//! black box's own predictions. A depth sweep grows one tree per
//! candidate depth, scores each by the variance in the black box's
//! output it reproduces (R²), and the selected tree exports into split
//! rules and leaf values ready for diagrams or reports.
//!
//! ## Getting Started
//!
//! To use `glassbox`, add the following to your `Cargo.toml` file:
//!
//! ```toml
//! [dependencies]
//! glassbox = "*"
//! ```
//!
//! ## Example Usage
//!
//! As a quick example, here's how to distill a surrogate for a model
//! whose predictions step from 10 to 20 at x = 2.5:
//!
//! ```rust
//! use glassbox::distill::select::SelectionPolicy;
//! use glassbox::distill::sweep::DepthSweep;
//! use nalgebra::{DMatrix, DVector};
//!
//! // Feature matrix and the black-box model's predictions, row for row.
//! let x = DMatrix::from_vec(4, 1, vec![1.0, 2.0, 3.0, 4.0]);
//! let y_hat = DVector::from_vec(vec![10.0, 10.0, 20.0, 20.0]);
//!
//! let sweep = DepthSweep::new(vec![1, 2, 3], 1).unwrap();
//! let result = sweep.run(&x, &y_hat).unwrap();
//!
//! for (depth, r_squared) in result.r_squared_curve() {
//!     println!("depth {depth}: R^2 = {r_squared:.3}");
//! }
//!
//! let surrogate = result.into_selected(SelectionPolicy::MaxRSquared).unwrap();
//! for rule in surrogate.tree.export().unwrap().rules() {
//!     println!("{rule}");
//! }
//! ```

/// Dataset container shared by induction and scoring
pub mod data;
/// Depth sweep and surrogate selection
pub mod distill;
/// Error kinds reported by fallible operations
pub mod error;
/// Functions for evaluating surrogate fidelity
pub mod metrics;
/// Regression trees and structure export
pub mod trees;
