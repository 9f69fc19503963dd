//! Reconciliation of two built ensembles.
//!
//! `old` is the running ensemble, `new` was just built from a fresh model
//! batch. Neither population is re-scanned: everything is decided from the two
//! base models, the two catalogs and the two state matrices.

use crate::component::AttributeValues;
use crate::ensemble::{Ensemble, EnsembleParts, MissingReactions};
use crate::error::Result;
use crate::feature::{base_value, FeatureCatalog};
use crate::states::StateMatrix;
use ensemble_model::{ComponentKind, MetabolicModel};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Component ids split by which base model defines them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentPartition {
    pub in_both: BTreeSet<String>,
    pub only_old: BTreeSet<String>,
    pub only_new: BTreeSet<String>,
}

impl ComponentPartition {
    pub fn new<M: MetabolicModel>(old_base: &M, new_base: &M, kind: ComponentKind) -> Self {
        let old_ids: BTreeSet<String> = old_base.component_ids(kind).into_iter().collect();
        let new_ids: BTreeSet<String> = new_base.component_ids(kind).into_iter().collect();

        Self {
            in_both: old_ids.intersection(&new_ids).cloned().collect(),
            only_old: old_ids.difference(&new_ids).cloned().collect(),
            only_new: new_ids.difference(&old_ids).cloned().collect(),
        }
    }
}

/// Working copies assembled during one merge
struct MergeTarget<'a, M: MetabolicModel> {
    old: &'a Ensemble<M>,
    new: &'a Ensemble<M>,
    features: FeatureCatalog,
    states: StateMatrix,
    /// new member -> components where it has one of `new`'s features active
    new_varied: HashMap<&'a str, HashSet<&'a str>>,
}

impl<'a, M: MetabolicModel> MergeTarget<'a, M> {
    /// Copy `new`'s activity for `new_feature_id` onto merged column `target`
    fn carry_states(&mut self, new_feature_id: &str, target: &str) -> Result<()> {
        let new = self.new;
        self.states.add_feature(target);
        for member_id in new.states().member_ids() {
            if new.states().get(member_id, new_feature_id) {
                self.states.set(member_id, target, true)?;
            }
        }
        Ok(())
    }

    /// Component present in both bases
    fn reconcile_shared(&mut self, kind: ComponentKind, component_id: &str) -> Result<()> {
        let new = self.new;
        let old_reference = base_value(self.old.base_model(), kind, component_id)?;
        let new_reference = base_value(new.base_model(), kind, component_id)?;

        let new_features: Vec<(String, AttributeValues)> = new
            .features()
            .features_for(component_id)
            .filter(|feature| feature.component_type == kind)
            .map(|feature| (feature.feature_id(), feature.attribute_values))
            .collect();

        for (new_feature_id, values) in new_features {
            if values == old_reference {
                // Same value as the merged base: members using it read false
                log::debug!(
                    "Feature {} of new batch folds into base value of {}",
                    new_feature_id,
                    component_id
                );
                continue;
            }

            // Recorded by both sides resolves to the existing id
            let target = self.features.add_variant(component_id, values);
            self.carry_states(&new_feature_id, &target)?;
        }

        if new_reference == old_reference {
            return Ok(());
        }

        // Members of `new` on their own base value differ from the merged base
        let users: Vec<&str> = new
            .states()
            .member_ids()
            .filter(|member_id| {
                let varied = self
                    .new_varied
                    .get(member_id)
                    .is_some_and(|components| components.contains(component_id));
                // Members lacking the component take the merged base value
                let lacking = new
                    .missing()
                    .get(*member_id)
                    .is_some_and(|ids| ids.contains(component_id));
                !varied && !lacking
            })
            .collect();
        if users.is_empty() {
            return Ok(());
        }

        // Reuses a variant only `old` recorded when the values match
        let target = self.features.add_variant(component_id, new_reference);
        log::debug!(
            "{} members of new batch use base value of {} recorded as {}",
            users.len(),
            component_id,
            target
        );
        self.states.add_feature(&target);
        for member_id in users {
            self.states.set(member_id, &target, true)?;
        }
        Ok(())
    }

    /// Component only `new` defines; its variants carry over unchanged
    fn carry_new_only(&mut self, kind: ComponentKind, component_id: &str) -> Result<()> {
        let new_features: Vec<(String, AttributeValues)> = self
            .new
            .features()
            .features_for(component_id)
            .filter(|feature| feature.component_type == kind)
            .map(|feature| (feature.feature_id(), feature.attribute_values))
            .collect();

        for (new_feature_id, values) in new_features {
            let target = self.features.add_variant(component_id, values);
            self.carry_states(&new_feature_id, &target)?;
        }
        Ok(())
    }
}

/// Merge `new` into `old`, producing the parts of the combined ensemble.
///
/// Components only one side defines join the base as they are: members of
/// the other population are taken to use that base value. Variants already
/// recorded by `old` keep their ids; variants only `new` records get the next
/// free variant index of their component.
pub(crate) fn merge_ensembles<M: MetabolicModel>(
    old: &Ensemble<M>,
    new: &Ensemble<M>,
) -> Result<EnsembleParts<M>> {
    let reactions = ComponentPartition::new(old.base_model(), new.base_model(), ComponentKind::Reaction);

    let mut base_model = old.base_model().clone();
    let additions: Vec<_> = reactions
        .only_new
        .iter()
        .filter_map(|id| new.base_model().reaction(id).cloned())
        .collect();
    base_model.add_reactions(additions);
    base_model.repair();

    let mut states = old.states().clone();
    for member_id in new.states().member_ids() {
        states.add_member(member_id)?;
    }

    let mut missing: MissingReactions = old.missing().clone();
    if !reactions.only_new.is_empty() {
        for member_id in old.states().member_ids() {
            missing
                .entry(member_id.to_string())
                .or_default()
                .extend(reactions.only_new.iter().cloned());
        }
    }
    for member_id in new.states().member_ids() {
        let mut absent = new.missing().get(member_id).cloned().unwrap_or_default();
        absent.extend(reactions.only_old.iter().cloned());
        if !absent.is_empty() {
            missing.insert(member_id.to_string(), absent);
        }
    }

    let mut new_varied: HashMap<&str, HashSet<&str>> = HashMap::new();
    for member_id in new.states().member_ids() {
        for feature_id in new.states().active_features(member_id) {
            if let Some(feature) = new.features().get(feature_id) {
                new_varied
                    .entry(member_id)
                    .or_default()
                    .insert(feature.component_id.as_str());
            }
        }
    }

    let mut target = MergeTarget {
        old,
        new,
        features: old.features().clone(),
        states,
        new_varied,
    };

    for &kind in &old.config().tracked_kinds {
        let partition = if kind == ComponentKind::Reaction {
            reactions.clone()
        } else {
            ComponentPartition::new(old.base_model(), new.base_model(), kind)
        };

        for component_id in &partition.in_both {
            target.reconcile_shared(kind, component_id)?;
        }
        for component_id in &partition.only_new {
            target.carry_new_only(kind, component_id)?;
        }
        log::debug!(
            "Merged {} components: {} shared, {} only in old, {} only in new",
            kind,
            partition.in_both.len(),
            partition.only_old.len(),
            partition.only_new.len()
        );
    }

    target.states.validate(&target.features)?;

    Ok(EnsembleParts {
        base_model,
        features: target.features,
        states: target.states,
        missing,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ensemble_model::{Model, Reaction};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partition_component_ids() {
        let old = Model::new("old")
            .with_reaction(Reaction::new("R1"))
            .with_reaction(Reaction::new("R2"));
        let new = Model::new("new")
            .with_reaction(Reaction::new("R2"))
            .with_reaction(Reaction::new("R3"));

        let partition = ComponentPartition::new(&old, &new, ComponentKind::Reaction);
        assert_eq!(partition.in_both.into_iter().collect::<Vec<_>>(), vec!["R2"]);
        assert_eq!(partition.only_old.into_iter().collect::<Vec<_>>(), vec!["R1"]);
        assert_eq!(partition.only_new.into_iter().collect::<Vec<_>>(), vec!["R3"]);
    }
}
