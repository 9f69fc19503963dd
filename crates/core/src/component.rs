//! Comparison keys per component kind.
//!
//! Every place that reads or writes the attributes a feature is defined by
//! goes through [`resolve`] and [`apply`], which match exhaustively on
//! [`ComponentKind`]. Supporting a new kind means adding an
//! [`AttributeValues`] variant and filling in both matches.

use crate::error::{EnsembleError, Result};
use ensemble_model::{ComponentKind, MetabolicModel, Reaction};
use serde::{Deserialize, Serialize};

/// Attribute values that define one variant of a component
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AttributeValues {
    Reaction { lower_bound: f64, upper_bound: f64 },
}

impl AttributeValues {
    pub fn from_reaction(reaction: &Reaction) -> Self {
        AttributeValues::Reaction {
            lower_bound: reaction.lower_bound,
            upper_bound: reaction.upper_bound,
        }
    }

    pub fn kind(&self) -> ComponentKind {
        match self {
            AttributeValues::Reaction { .. } => ComponentKind::Reaction,
        }
    }

    /// Every attribute is a finite number; NaN never compares equal
    pub fn is_finite(&self) -> bool {
        self.pairs().iter().all(|(_, value)| value.is_finite())
    }

    /// (attribute name, value) pairs in declaration order
    pub fn pairs(&self) -> Vec<(&'static str, f64)> {
        match *self {
            AttributeValues::Reaction {
                lower_bound,
                upper_bound,
            } => vec![("lower_bound", lower_bound), ("upper_bound", upper_bound)],
        }
    }
}

/// Read the comparison values of a component; `None` if the model lacks it
pub fn resolve<M: MetabolicModel>(
    model: &M,
    kind: ComponentKind,
    component_id: &str,
) -> Result<Option<AttributeValues>> {
    match kind {
        ComponentKind::Reaction => Ok(model.reaction(component_id).map(AttributeValues::from_reaction)),
        ComponentKind::Metabolite | ComponentKind::Gene => {
            Err(EnsembleError::unsupported(kind, component_id))
        }
    }
}

/// Write variant values onto a model's component
pub fn apply<M: MetabolicModel>(model: &mut M, component_id: &str, values: &AttributeValues) -> Result<()> {
    match *values {
        AttributeValues::Reaction {
            lower_bound,
            upper_bound,
        } => {
            let reaction = model
                .reaction_mut(component_id)
                .ok_or_else(|| EnsembleError::ComponentNotFound(component_id.to_string()))?;
            reaction.lower_bound = lower_bound;
            reaction.upper_bound = upper_bound;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ensemble_model::Model;

    #[test]
    fn test_resolve_reaction_bounds() {
        let model = Model::new("m").with_reaction(Reaction::new("R1").with_bounds(-5.0, 10.0));
        let values = resolve(&model, ComponentKind::Reaction, "R1").unwrap();
        assert_eq!(
            values,
            Some(AttributeValues::Reaction {
                lower_bound: -5.0,
                upper_bound: 10.0
            })
        );
        assert_eq!(resolve(&model, ComponentKind::Reaction, "R2").unwrap(), None);
    }

    #[test]
    fn test_non_reaction_kinds_unsupported() {
        let model = Model::new("m");
        for kind in [ComponentKind::Metabolite, ComponentKind::Gene] {
            assert!(matches!(
                resolve(&model, kind, "atp_c"),
                Err(EnsembleError::UnsupportedFeatureType { .. })
            ));
        }
    }

    #[test]
    fn test_apply_missing_component() {
        let mut model = Model::new("m");
        let values = AttributeValues::Reaction {
            lower_bound: 0.0,
            upper_bound: 1.0,
        };
        assert!(matches!(
            apply(&mut model, "R9", &values),
            Err(EnsembleError::ComponentNotFound(_))
        ));
    }
}
