use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default flux bounds for a freshly created reaction
pub const DEFAULT_LOWER_BOUND: f64 = 0.0;
pub const DEFAULT_UPPER_BOUND: f64 = 1000.0;

/// Kind of component a model exposes in its catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Reaction,
    Metabolite,
    Gene,
}

impl ComponentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Reaction => "reaction",
            ComponentKind::Metabolite => "metabolite",
            ComponentKind::Gene => "gene",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ComponentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reaction" => Ok(ComponentKind::Reaction),
            "metabolite" => Ok(ComponentKind::Metabolite),
            "gene" => Ok(ComponentKind::Gene),
            other => Err(format!("unknown component kind: {other}")),
        }
    }
}

/// Metabolic reaction with flux bounds and stoichiometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    /// Identifier, unique within one model (e.g., "PGI")
    pub id: String,

    #[serde(default)]
    pub name: String,

    pub lower_bound: f64,
    pub upper_bound: f64,

    /// Metabolite id -> stoichiometric coefficient (negative = consumed),
    /// in document order
    #[serde(default)]
    pub metabolites: IndexMap<String, f64>,

    /// Boolean gene association, e.g. "b1241 or (b0351 and b4069)"
    #[serde(default)]
    pub gene_reaction_rule: String,
}

impl Reaction {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            lower_bound: DEFAULT_LOWER_BOUND,
            upper_bound: DEFAULT_UPPER_BOUND,
            metabolites: IndexMap::new(),
            gene_reaction_rule: String::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_bounds(mut self, lower_bound: f64, upper_bound: f64) -> Self {
        self.lower_bound = lower_bound;
        self.upper_bound = upper_bound;
        self
    }

    pub fn with_metabolite(mut self, metabolite_id: impl Into<String>, coefficient: f64) -> Self {
        self.metabolites.insert(metabolite_id.into(), coefficient);
        self
    }

    pub fn with_gene_rule(mut self, rule: impl Into<String>) -> Self {
        self.gene_reaction_rule = rule.into();
        self
    }

    /// Both bounds are finite numbers
    pub fn has_finite_bounds(&self) -> bool {
        self.lower_bound.is_finite() && self.upper_bound.is_finite()
    }

    /// Current (lower, upper) bounds
    pub fn bounds(&self) -> (f64, f64) {
        (self.lower_bound, self.upper_bound)
    }

    /// Gene identifiers named in the gene-reaction rule
    pub fn genes(&self) -> Vec<String> {
        self.gene_reaction_rule
            .split(|c: char| c.is_whitespace() || c == '(' || c == ')')
            .filter(|token| !token.is_empty())
            .filter(|token| !matches!(token.to_ascii_lowercase().as_str(), "and" | "or"))
            .map(str::to_string)
            .collect()
    }
}

/// Metabolite referenced by reactions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metabolite {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub compartment: Option<String>,

    #[serde(default)]
    pub formula: Option<String>,
}

impl Metabolite {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            compartment: None,
            formula: None,
        }
    }

    pub fn with_compartment(mut self, compartment: impl Into<String>) -> Self {
        self.compartment = Some(compartment.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gene_rule_tokens() {
        let rxn = Reaction::new("PFK").with_gene_rule("b3916 or (b1723 AND b0001)");
        assert_eq!(rxn.genes(), vec!["b3916", "b1723", "b0001"]);
    }

    #[test]
    fn test_metabolites_keep_insertion_order() {
        let rxn = Reaction::new("PGI")
            .with_metabolite("g6p_c", -1.0)
            .with_metabolite("f6p_c", 1.0);
        assert_eq!(rxn.metabolites.keys().collect::<Vec<_>>(), vec!["g6p_c", "f6p_c"]);
    }

    #[test]
    fn test_non_finite_bounds() {
        assert!(Reaction::new("R1").has_finite_bounds());
        assert!(!Reaction::new("R1").with_bounds(0.0, f64::NAN).has_finite_bounds());
        assert!(!Reaction::new("R1").with_bounds(f64::NEG_INFINITY, 0.0).has_finite_bounds());
    }

    #[test]
    fn test_component_kind_parse() {
        assert_eq!("Reaction".parse::<ComponentKind>(), Ok(ComponentKind::Reaction));
        assert_eq!(ComponentKind::Gene.to_string(), "gene");
        assert!("compartment".parse::<ComponentKind>().is_err());
    }
}
