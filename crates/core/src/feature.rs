use crate::component::{resolve, AttributeValues};
use crate::error::{EnsembleError, Result};
use ensemble_model::{ComponentKind, MetabolicModel};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One recorded variant of a component's attribute values.
///
/// A feature never carries the base model's own values for its component:
/// members using the base value are simply inactive for every feature there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Component in the base model this variant applies to
    pub component_id: String,

    pub component_type: ComponentKind,

    pub attribute_values: AttributeValues,

    /// Distinguishes variants of the same component
    pub variant_index: usize,
}

impl Feature {
    pub fn new(component_id: impl Into<String>, attribute_values: AttributeValues, variant_index: usize) -> Self {
        Self {
            component_id: component_id.into(),
            component_type: attribute_values.kind(),
            attribute_values,
            variant_index,
        }
    }

    /// `<component_id>_<variant_index>`
    pub fn feature_id(&self) -> String {
        format!("{}_{}", self.component_id, self.variant_index)
    }
}

/// Feature catalog keyed by feature id, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCatalog {
    features: IndexMap<String, Feature>,
}

impl FeatureCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn get(&self, feature_id: &str) -> Option<&Feature> {
        self.features.get(feature_id)
    }

    pub fn contains(&self, feature_id: &str) -> bool {
        self.features.contains_key(feature_id)
    }

    /// (feature_id, feature) pairs in catalog order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Feature)> {
        self.features.iter().map(|(id, feature)| (id.as_str(), feature))
    }

    pub fn feature_ids(&self) -> impl Iterator<Item = &str> {
        self.features.keys().map(String::as_str)
    }

    /// All variants recorded for one component
    pub fn features_for<'a>(&'a self, component_id: &'a str) -> impl Iterator<Item = &'a Feature> + 'a {
        self.features
            .values()
            .filter(move |feature| feature.component_id == component_id)
    }

    /// Variant of `component_id` with exactly these values
    pub fn find(&self, component_id: &str, values: &AttributeValues) -> Option<&Feature> {
        self.features
            .values()
            .find(|feature| feature.component_id == component_id && feature.attribute_values == *values)
    }

    pub fn next_variant_index(&self, component_id: &str) -> usize {
        self.features_for(component_id)
            .map(|feature| feature.variant_index + 1)
            .max()
            .unwrap_or(0)
    }

    /// Components with at least one recorded variant, first-seen order
    pub fn variable_components(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for feature in self.features.values() {
            if !seen.contains(&feature.component_id.as_str()) {
                seen.push(feature.component_id.as_str());
            }
        }
        seen
    }

    /// Record a new variant of `component_id`, returning its feature id.
    ///
    /// Values already recorded for the component resolve to the existing id.
    pub fn add_variant(&mut self, component_id: &str, values: AttributeValues) -> String {
        if let Some(existing) = self.find(component_id, &values) {
            return existing.feature_id();
        }
        let feature = Feature::new(component_id, values, self.next_variant_index(component_id));
        let feature_id = feature.feature_id();
        log::debug!("New variant {} for component {}", feature_id, component_id);
        self.features.insert(feature_id.clone(), feature);
        feature_id
    }
}

/// Value a member contributes for a base component.
///
/// Members lacking the component are taken to use the base value.
pub(crate) fn effective_value<M: MetabolicModel>(
    member: &M,
    kind: ComponentKind,
    component_id: &str,
    base_value: AttributeValues,
) -> Result<AttributeValues> {
    Ok(resolve(member, kind, component_id)?.unwrap_or(base_value))
}

pub(crate) fn base_value<M: MetabolicModel>(base: &M, kind: ComponentKind, component_id: &str) -> Result<AttributeValues> {
    resolve(base, kind, component_id)?
        .ok_or_else(|| EnsembleError::ComponentNotFound(component_id.to_string()))
}

fn require_finite(model_id: &str, component_id: &str, values: &AttributeValues) -> Result<()> {
    if values.is_finite() {
        return Ok(());
    }
    Err(EnsembleError::configuration(format!(
        "model {model_id} has non-finite values for {component_id}: {values:?}"
    )))
}

/// Extract the feature catalog for `members` against `base`.
///
/// Components are visited in sorted id order and members in list order, so
/// variant indices follow first-seen order and do not depend on hashing.
pub fn extract_features<M: MetabolicModel>(
    base: &M,
    members: &[M],
    tracked_kinds: &[ComponentKind],
) -> Result<FeatureCatalog> {
    let mut catalog = FeatureCatalog::new();

    for &kind in tracked_kinds {
        let mut component_ids = base.component_ids(kind);
        component_ids.sort();

        for component_id in &component_ids {
            let reference = base_value(base, kind, component_id)?;
            require_finite(base.id(), component_id, &reference)?;
            for member in members {
                let value = effective_value(member, kind, component_id, reference)?;
                require_finite(member.id(), component_id, &value)?;
                if value != reference {
                    catalog.add_variant(component_id, value);
                }
            }
        }
    }

    log::debug!(
        "Extracted {} features over {} variable components",
        catalog.len(),
        catalog.variable_components().len()
    );
    Ok(catalog)
}
