//! # Ensemble Model
//!
//! Constraint-based metabolic model used as the member type of an ensemble.
//!
//! The ensemble algorithms only depend on the [`MetabolicModel`] capability
//! set; [`Model`] is the in-memory implementation shipped with the workspace.
//!
//! ## Example
//!
//! ```rust
//! use ensemble_model::{ComponentKind, MetabolicModel, Model, Reaction};
//!
//! let model = Model::new("iJO1366")
//!     .with_reaction(Reaction::new("PGI").with_bounds(-1000.0, 1000.0))
//!     .with_reaction(Reaction::new("ATPM").with_bounds(8.39, 8.39));
//!
//! assert_eq!(model.component_ids(ComponentKind::Reaction), vec!["PGI", "ATPM"]);
//! ```

mod error;
mod model;
mod types;

pub use error::{ModelError, Result};
pub use model::{MetabolicModel, Model};
pub use types::{ComponentKind, Metabolite, Reaction, DEFAULT_LOWER_BOUND, DEFAULT_UPPER_BOUND};
