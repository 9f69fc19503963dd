use crate::error::Result;
use crate::feature::FeatureCatalog;
use crate::states::StateMatrix;
use ensemble_model::ComponentKind;
use serde::Serialize;
use std::collections::BTreeMap;

/// One feature as a table row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    pub feature_id: String,

    #[serde(rename = "type")]
    pub component_type: ComponentKind,

    /// Component id in the base model
    pub model_identifier: String,

    /// Attribute columns, e.g. lower_bound / upper_bound
    #[serde(flatten)]
    pub attributes: BTreeMap<String, f64>,

    pub variant_index: usize,
}

/// Feature catalog in tabular form, for downstream analysis tooling
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeatureTable {
    pub rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn from_catalog(catalog: &FeatureCatalog) -> Self {
        let rows = catalog
            .iter()
            .map(|(feature_id, feature)| FeatureRow {
                feature_id: feature_id.to_string(),
                component_type: feature.component_type,
                model_identifier: feature.component_id.clone(),
                attributes: feature
                    .attribute_values
                    .pairs()
                    .into_iter()
                    .map(|(name, value)| (name.to_string(), value))
                    .collect(),
                variant_index: feature.variant_index,
            })
            .collect();
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// One member's row of the state matrix
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateRow {
    pub member_id: String,
    pub values: Vec<bool>,
}

/// Dense member × feature table; cells follow `columns` order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StateTable {
    pub columns: Vec<String>,
    pub rows: Vec<StateRow>,
}

impl StateTable {
    pub fn from_matrix(states: &StateMatrix) -> Self {
        let columns: Vec<String> = states.feature_ids().map(str::to_string).collect();
        let rows = states
            .member_ids()
            .map(|member_id| StateRow {
                member_id: member_id.to_string(),
                values: columns
                    .iter()
                    .map(|feature_id| states.get(member_id, feature_id))
                    .collect(),
            })
            .collect();
        Self { columns, rows }
    }

    /// Cell lookup; `None` if the member or feature is not in the table
    pub fn get(&self, member_id: &str, feature_id: &str) -> Option<bool> {
        let column = self.columns.iter().position(|c| c == feature_id)?;
        self.rows
            .iter()
            .find(|row| row.member_id == member_id)
            .map(|row| row.values[column])
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::AttributeValues;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_feature_table_columns() {
        let mut catalog = FeatureCatalog::new();
        catalog.add_variant(
            "PGI",
            AttributeValues::Reaction {
                lower_bound: 0.0,
                upper_bound: 20.0,
            },
        );

        let table = FeatureTable::from_catalog(&catalog);
        let json: serde_json::Value = serde_json::from_str(&table.to_json().unwrap()).unwrap();
        assert_eq!(
            json["rows"][0],
            serde_json::json!({
                "feature_id": "PGI_0",
                "type": "reaction",
                "model_identifier": "PGI",
                "lower_bound": 0.0,
                "upper_bound": 20.0,
                "variant_index": 0
            })
        );
    }

    #[test]
    fn test_state_table_is_dense() {
        let mut states = StateMatrix::new();
        states.add_member("a").unwrap();
        states.add_member("b").unwrap();
        states.add_feature("R1_0");
        states.add_feature("R2_0");
        states.set("b", "R2_0", true).unwrap();

        let table = StateTable::from_matrix(&states);
        assert_eq!(table.columns, vec!["R1_0", "R2_0"]);
        assert_eq!(table.rows[0].values, vec![false, false]);
        assert_eq!(table.rows[1].values, vec![false, true]);
        assert_eq!(table.get("b", "R2_0"), Some(true));
        assert_eq!(table.get("c", "R2_0"), None);
    }
}
