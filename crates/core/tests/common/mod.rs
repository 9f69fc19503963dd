#![allow(dead_code)]

use ensemble_core::{AttributeValues, Ensemble, MetabolicModel};
use ensemble_model::{ComponentKind, Model, Reaction};
use std::collections::{BTreeMap, BTreeSet};

/// Model with the given (reaction, lower, upper) entries
pub fn model(id: &str, reactions: &[(&str, f64, f64)]) -> Model {
    reactions.iter().fold(Model::new(id), |m, (rxn, lb, ub)| {
        m.with_reaction(Reaction::new(*rxn).with_bounds(*lb, *ub))
    })
}

pub fn bounds(lower_bound: f64, upper_bound: f64) -> AttributeValues {
    AttributeValues::Reaction {
        lower_bound,
        upper_bound,
    }
}

fn key(values: &AttributeValues) -> String {
    values
        .pairs()
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Ensemble content independent of row, column and variant-index order
#[derive(Debug, PartialEq)]
pub struct LogicalView {
    pub base: BTreeMap<String, String>,
    pub members: BTreeMap<String, BTreeMap<String, String>>,
    pub variants: BTreeMap<String, BTreeSet<String>>,
    pub activity: BTreeMap<(String, String), BTreeSet<String>>,
}

pub fn logical_view(ensemble: &Ensemble<Model>) -> LogicalView {
    let reaction_map = |m: &Model| -> BTreeMap<String, String> {
        m.component_ids(ComponentKind::Reaction)
            .into_iter()
            .filter_map(|id| {
                let rxn = m.reaction(&id)?;
                Some((id, key(&AttributeValues::from_reaction(rxn))))
            })
            .collect()
    };

    let members = ensemble
        .member_models()
        .expect("materialize members")
        .iter()
        .map(|m| (m.id().to_string(), reaction_map(m)))
        .collect();

    let mut variants: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let mut activity = BTreeMap::new();
    for (feature_id, feature) in ensemble.features().iter() {
        let values = key(&feature.attribute_values);
        variants
            .entry(feature.component_id.clone())
            .or_default()
            .insert(values.clone());
        let active: BTreeSet<String> = ensemble
            .member_ids()
            .into_iter()
            .filter(|member| ensemble.states().get(member, feature_id))
            .map(str::to_string)
            .collect();
        activity.insert((feature.component_id.clone(), values), active);
    }

    LogicalView {
        base: reaction_map(ensemble.base_model()),
        members,
        variants,
        activity,
    }
}

/// Every active cell matches the member's own values and no member has two
/// active variants of one component
pub fn assert_states_complete(ensemble: &Ensemble<Model>, inputs: &[Model]) {
    for input in inputs {
        for (feature_id, feature) in ensemble.features().iter() {
            let expected = match input.reaction(&feature.component_id) {
                Some(rxn) => AttributeValues::from_reaction(rxn) == feature.attribute_values,
                None => false,
            };
            assert_eq!(
                ensemble.states().get(input.id(), feature_id),
                expected,
                "member {} feature {}",
                input.id(),
                feature_id
            );
        }
    }
    ensemble
        .states()
        .validate(ensemble.features())
        .expect("mutually exclusive states");
}
