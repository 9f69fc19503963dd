//! # Ensemble Core
//!
//! Compact representation of a family of related metabolic models: one shared
//! base model plus the sparse set of ways members differ from it.
//!
//! ## Features
//!
//! - **Base union** - every reaction that appears in any member
//! - **Feature catalog** - deduplicated variants of reaction bounds
//! - **State matrix** - which variant each member uses, stored sparsely
//! - **Incremental merge** - fold new model batches in without re-scanning
//!   existing members
//!
//! ## Architecture
//!
//! ```text
//! Model[]
//!     │
//!     ├──> Base Builder
//!     │      └─ Union of reactions, first definition wins
//!     │
//!     ├──> Feature Extractor
//!     │      └─ Distinct non-base values per component
//!     │
//!     ├──> State Builder
//!     │      └─ member × feature activity
//!     │
//!     └──> Ensemble
//!            ├─ concurrent: one batch pass
//!            └─ iterative: batch per group, then merge
//!                   ├─ components: in both / only old / only new
//!                   └─ features: in both / only old / only new
//! ```
//!
//! ## Example
//!
//! ```rust
//! use ensemble_core::{Ensemble, EnsembleConfig};
//! use ensemble_model::{Model, Reaction};
//!
//! fn strain(id: &str, upper_bound: f64) -> Model {
//!     Model::new(id).with_reaction(Reaction::new("R1").with_bounds(0.0, upper_bound))
//! }
//!
//! let models = vec![strain("m1", 10.0), strain("m2", 10.0), strain("m3", 20.0)];
//! let ensemble = Ensemble::new(models, "strains", EnsembleConfig::default()).unwrap();
//!
//! assert_eq!(ensemble.features().len(), 1);
//! assert!(ensemble.states().get("m3", "R1_0"));
//! assert!(!ensemble.states().get("m1", "R1_0"));
//! ```

mod base;
mod component;
mod config;
mod ensemble;
mod error;
mod feature;
mod merge;
mod states;
mod table;

pub use base::build_base;
pub use component::AttributeValues;
pub use config::{EnsembleConfig, JoinMethod};
pub use ensemble::{Ensemble, EnsembleState, EnsembleStats};
pub use error::{EnsembleError, Result};
pub use feature::{extract_features, Feature, FeatureCatalog};
pub use merge::ComponentPartition;
pub use states::{build_states, StateMatrix};
pub use table::{FeatureRow, FeatureTable, StateRow, StateTable};

// Re-export model types for convenience
pub use ensemble_model::{ComponentKind, MetabolicModel, Model, Reaction};
