use crate::error::{EnsembleError, Result};
use ensemble_model::{ComponentKind, MetabolicModel};
use std::collections::HashSet;

/// Reject models the ensemble cannot key by member id
pub(crate) fn check_models<M: MetabolicModel>(models: &[M]) -> Result<()> {
    for (position, model) in models.iter().enumerate() {
        if model.id().trim().is_empty() {
            return Err(EnsembleError::configuration(format!(
                "model at position {position} has an empty identifier"
            )));
        }
    }
    Ok(())
}

/// Build the base model: the union of every reaction across `models`.
///
/// Starts from a copy of the first model; each later model contributes only
/// the reactions whose ids are not yet present, so a reaction's definition
/// comes from the first model that has it. With no models an empty base named
/// `base_id` is returned, and `base_id` is then required.
pub fn build_base<M: MetabolicModel>(models: &[M], base_id: Option<&str>) -> Result<M> {
    check_models(models)?;

    let Some((first, rest)) = models.split_first() else {
        let id = base_id.ok_or_else(|| {
            EnsembleError::configuration("cannot build a base model from an empty model list without a base id")
        })?;
        return Ok(M::empty(id));
    };

    let mut base = first.clone();
    if let Some(id) = base_id {
        base.set_id(id);
    }

    let mut known: HashSet<String> = base
        .component_ids(ComponentKind::Reaction)
        .into_iter()
        .collect();

    for model in rest {
        let reactions_to_add: Vec<_> = model
            .component_ids(ComponentKind::Reaction)
            .into_iter()
            .filter(|id| known.insert(id.clone()))
            .filter_map(|id| model.reaction(&id).cloned())
            .collect();

        if !reactions_to_add.is_empty() {
            log::debug!(
                "Model {} contributes {} new reactions to base {}",
                model.id(),
                reactions_to_add.len(),
                base.id()
            );
            base.add_reactions(reactions_to_add);
        }
    }
    base.repair();

    Ok(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ensemble_model::{Model, Reaction};
    use pretty_assertions::assert_eq;

    fn model(id: &str, reactions: &[(&str, f64, f64)]) -> Model {
        reactions.iter().fold(Model::new(id), |m, (rxn, lb, ub)| {
            m.with_reaction(Reaction::new(*rxn).with_bounds(*lb, *ub))
        })
    }

    #[test]
    fn test_union_keeps_first_definition() {
        let a = model("a", &[("R1", 0.0, 10.0), ("R2", 0.0, 5.0)]);
        let b = model("b", &[("R1", 0.0, 20.0), ("R3", -1.0, 1.0)]);

        let base = build_base(&[a, b], Some("ens_base_model")).unwrap();
        assert_eq!(base.id(), "ens_base_model");
        assert_eq!(
            base.component_ids(ComponentKind::Reaction),
            vec!["R1", "R2", "R3"]
        );
        assert_eq!(base.reaction("R1").map(|r| r.bounds()), Some((0.0, 10.0)));
        assert_eq!(base.reaction("R3").map(|r| r.bounds()), Some((-1.0, 1.0)));
    }

    #[test]
    fn test_union_is_idempotent() {
        let a = model("a", &[("R1", 0.0, 10.0), ("R2", 0.0, 5.0)]);
        let once = build_base(&[a.clone()], None).unwrap();
        let twice = build_base(&[a.clone(), a], None).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_list_needs_base_id() {
        let models: Vec<Model> = Vec::new();
        assert!(matches!(
            build_base(&models, None),
            Err(EnsembleError::Configuration(_))
        ));
        let base = build_base(&models, Some("empty_base_model")).unwrap();
        assert_eq!(base.id(), "empty_base_model");
        assert_eq!(base.reaction_count(), 0);
    }

    #[test]
    fn test_blank_model_id_rejected() {
        let models = vec![model("a", &[]), model("  ", &[])];
        assert!(matches!(
            build_base(&models, None),
            Err(EnsembleError::Configuration(_))
        ));
    }
}
