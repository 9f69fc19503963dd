use crate::component::AttributeValues;
use crate::error::{EnsembleError, Result};
use crate::feature::{base_value, effective_value, FeatureCatalog};
use ensemble_model::MetabolicModel;
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;

/// Member × feature activity table.
///
/// Only active cells are stored, per member row; any (member, feature) pair
/// not recorded reads as false, so adding a column never touches existing rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateMatrix {
    /// member id -> active feature ids
    members: IndexMap<String, IndexSet<String>>,
    features: IndexSet<String>,
}

impl StateMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Row ids in insertion order
    pub fn member_ids(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    /// Column ids in insertion order
    pub fn feature_ids(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(String::as_str)
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    pub fn contains_member(&self, member_id: &str) -> bool {
        self.members.contains_key(member_id)
    }

    /// Number of active cells
    pub fn active_count(&self) -> usize {
        self.members.values().map(IndexSet::len).sum()
    }

    pub fn add_member(&mut self, member_id: &str) -> Result<()> {
        if self.members.contains_key(member_id) {
            return Err(EnsembleError::configuration(format!(
                "duplicate member id: {member_id}"
            )));
        }
        self.members.insert(member_id.to_string(), IndexSet::new());
        Ok(())
    }

    /// Add a column; existing rows read false for it
    pub fn add_feature(&mut self, feature_id: &str) {
        self.features.insert(feature_id.to_string());
    }

    pub fn set(&mut self, member_id: &str, feature_id: &str, value: bool) -> Result<()> {
        let row = self
            .members
            .get_mut(member_id)
            .ok_or_else(|| EnsembleError::UnknownMember(member_id.to_string()))?;
        if !self.features.contains(feature_id) {
            return Err(EnsembleError::Other(format!(
                "feature {feature_id} is not a column of the state matrix"
            )));
        }

        if value {
            row.insert(feature_id.to_string());
        } else {
            row.shift_remove(feature_id);
        }
        Ok(())
    }

    pub fn get(&self, member_id: &str, feature_id: &str) -> bool {
        self.members
            .get(member_id)
            .is_some_and(|row| row.contains(feature_id))
    }

    /// Active feature ids of one member, in column order
    pub fn active_features(&self, member_id: &str) -> Vec<&str> {
        let Some(row) = self.members.get(member_id) else {
            return Vec::new();
        };
        self.features
            .iter()
            .filter(|feature_id| row.contains(feature_id.as_str()))
            .map(String::as_str)
            .collect()
    }

    /// Active feature of `member_id` at `component_id`, if any
    pub fn active_at<'a>(
        &'a self,
        member_id: &str,
        component_id: &str,
        catalog: &FeatureCatalog,
    ) -> Option<&'a str> {
        self.active_features(member_id).into_iter().find(|feature_id| {
            catalog
                .get(feature_id)
                .is_some_and(|feature| feature.component_id == component_id)
        })
    }

    /// Check columns against the catalog and mutual exclusivity per component
    pub fn validate(&self, catalog: &FeatureCatalog) -> Result<()> {
        for feature_id in &self.features {
            if !catalog.contains(feature_id) {
                return Err(EnsembleError::Other(format!(
                    "state column {feature_id} has no feature in the catalog"
                )));
            }
        }

        for member_id in self.members.keys() {
            let mut seen: HashMap<&str, &str> = HashMap::new();
            for feature_id in self.active_features(member_id) {
                let Some(feature) = catalog.get(feature_id) else {
                    continue;
                };
                if let Some(first) = seen.insert(feature.component_id.as_str(), feature_id) {
                    return Err(EnsembleError::InconsistentState {
                        member_id: member_id.clone(),
                        component_id: feature.component_id.clone(),
                        first: first.to_string(),
                        second: feature_id.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Build the state matrix for `members` against a catalog extracted from `base`.
///
/// A cell is active iff the member's values for the feature's component equal
/// the feature's values exactly.
pub fn build_states<M: MetabolicModel>(
    catalog: &FeatureCatalog,
    base: &M,
    members: &[M],
) -> Result<StateMatrix> {
    let mut states = StateMatrix::new();
    for feature_id in catalog.feature_ids() {
        states.add_feature(feature_id);
    }

    let mut references: HashMap<&str, AttributeValues> = HashMap::new();
    for (_, feature) in catalog.iter() {
        if !references.contains_key(feature.component_id.as_str()) {
            let reference = base_value(base, feature.component_type, &feature.component_id)?;
            references.insert(feature.component_id.as_str(), reference);
        }
    }

    for member in members {
        states.add_member(member.id())?;
        for (feature_id, feature) in catalog.iter() {
            let reference = references[feature.component_id.as_str()];
            let value = effective_value(member, feature.component_type, &feature.component_id, reference)?;
            if value == feature.attribute_values {
                states.set(member.id(), feature_id, true)?;
            }
        }
    }

    states.validate(catalog)?;
    Ok(states)
}
