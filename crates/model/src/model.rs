use crate::error::{ModelError, Result};
use crate::types::{ComponentKind, Metabolite, Reaction};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Capabilities an ensemble needs from a metabolic model.
///
/// Implementors own their components; the ensemble only reads identifiers and
/// reaction attributes, copies models (`Clone`), and grows a base model with
/// reactions borrowed from other members.
pub trait MetabolicModel: Clone {
    /// Create a model with no components
    fn empty(id: &str) -> Self;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: &str);

    /// Component identifiers of one kind, in model order
    fn component_ids(&self, kind: ComponentKind) -> Vec<String>;

    fn reaction(&self, id: &str) -> Option<&Reaction>;

    fn reaction_mut(&mut self, id: &str) -> Option<&mut Reaction>;

    /// Add reactions (and the metabolites they reference); existing ids are skipped
    fn add_reactions(&mut self, reactions: Vec<Reaction>);

    /// Remove reactions by id; unknown ids are ignored. Metabolites only the
    /// removed reactions referenced go with them.
    fn remove_reactions(&mut self, ids: &[String]);

    /// Rebuild internal indices after bulk edits
    fn repair(&mut self);

    fn has_component(&self, kind: ComponentKind, id: &str) -> bool {
        self.component_ids(kind).iter().any(|existing| existing == id)
    }
}

/// In-memory constraint-based model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ModelDocument", into = "ModelDocument")]
pub struct Model {
    id: String,
    name: String,
    reactions: IndexMap<String, Reaction>,
    metabolites: IndexMap<String, Metabolite>,
}

/// On-disk layout: components as lists, like common JSON model exports
#[derive(Serialize, Deserialize)]
struct ModelDocument {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    reactions: Vec<Reaction>,
    #[serde(default)]
    metabolites: Vec<Metabolite>,
}

impl From<ModelDocument> for Model {
    fn from(doc: ModelDocument) -> Self {
        let mut model = Model::new(doc.id).with_name(doc.name);
        model.metabolites = doc
            .metabolites
            .into_iter()
            .map(|met| (met.id.clone(), met))
            .collect();
        model.add_reactions(doc.reactions);
        model
    }
}

impl From<Model> for ModelDocument {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            reactions: model.reactions.into_values().collect(),
            metabolites: model.metabolites.into_values().collect(),
        }
    }
}

impl Model {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            reactions: IndexMap::new(),
            metabolites: IndexMap::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builder-style reaction insertion
    pub fn with_reaction(mut self, reaction: Reaction) -> Self {
        self.add_reactions(vec![reaction]);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn reactions(&self) -> impl Iterator<Item = &Reaction> {
        self.reactions.values()
    }

    pub fn metabolites(&self) -> impl Iterator<Item = &Metabolite> {
        self.metabolites.values()
    }

    pub fn reaction_count(&self) -> usize {
        self.reactions.len()
    }

    pub fn metabolite(&self, id: &str) -> Option<&Metabolite> {
        self.metabolites.get(id)
    }

    /// Set bounds on an existing reaction
    pub fn set_bounds(&mut self, reaction_id: &str, lower_bound: f64, upper_bound: f64) -> Result<()> {
        let reaction = self
            .reactions
            .get_mut(reaction_id)
            .ok_or_else(|| ModelError::reaction_not_found(reaction_id))?;
        reaction.lower_bound = lower_bound;
        reaction.upper_bound = upper_bound;
        Ok(())
    }

    /// Reject reactions with non-finite bounds or a lower bound above the upper
    pub fn validate(&self) -> Result<()> {
        for reaction in self.reactions.values() {
            if !reaction.has_finite_bounds() || reaction.lower_bound > reaction.upper_bound {
                return Err(ModelError::InvalidBounds {
                    id: reaction.id.clone(),
                    lower: reaction.lower_bound,
                    upper: reaction.upper_bound,
                });
            }
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let model: Model = serde_json::from_str(json)?;
        model.validate()?;
        Ok(model)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a model from a JSON document on disk
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        log::debug!("Loading model from {:?}", path.as_ref());
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        log::debug!("Saving model {} to {:?}", self.id, path.as_ref());
        std::fs::write(path, self.to_json_string()?)?;
        Ok(())
    }
}

impl MetabolicModel for Model {
    fn empty(id: &str) -> Self {
        Model::new(id)
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: &str) {
        self.id = id.to_string();
    }

    fn component_ids(&self, kind: ComponentKind) -> Vec<String> {
        match kind {
            ComponentKind::Reaction => self.reactions.keys().cloned().collect(),
            ComponentKind::Metabolite => self.metabolites.keys().cloned().collect(),
            ComponentKind::Gene => {
                let genes: IndexSet<String> = self
                    .reactions
                    .values()
                    .flat_map(|rxn| rxn.genes())
                    .collect();
                genes.into_iter().collect()
            }
        }
    }

    fn reaction(&self, id: &str) -> Option<&Reaction> {
        self.reactions.get(id)
    }

    fn reaction_mut(&mut self, id: &str) -> Option<&mut Reaction> {
        self.reactions.get_mut(id)
    }

    fn add_reactions(&mut self, reactions: Vec<Reaction>) {
        for reaction in reactions {
            if self.reactions.contains_key(&reaction.id) {
                log::warn!(
                    "Reaction {} already present in model {}, skipping",
                    reaction.id,
                    self.id
                );
                continue;
            }
            for metabolite_id in reaction.metabolites.keys() {
                if !self.metabolites.contains_key(metabolite_id) {
                    self.metabolites
                        .insert(metabolite_id.clone(), Metabolite::new(metabolite_id.clone()));
                }
            }
            self.reactions.insert(reaction.id.clone(), reaction);
        }
    }

    fn remove_reactions(&mut self, ids: &[String]) {
        let mut released: IndexSet<String> = IndexSet::new();
        for id in ids {
            if let Some(reaction) = self.reactions.shift_remove(id) {
                released.extend(reaction.metabolites.into_keys());
            }
        }

        released.retain(|metabolite_id| {
            !self
                .reactions
                .values()
                .any(|rxn| rxn.metabolites.contains_key(metabolite_id))
        });
        for metabolite_id in &released {
            self.metabolites.shift_remove(metabolite_id);
        }
    }

    fn repair(&mut self) {
        // Re-key in case ids were edited through reaction_mut
        let reactions = std::mem::take(&mut self.reactions);
        self.reactions = reactions
            .into_values()
            .map(|rxn| (rxn.id.clone(), rxn))
            .collect();

        let referenced: Vec<String> = self
            .reactions
            .values()
            .flat_map(|rxn| rxn.metabolites.keys().cloned())
            .collect();
        for metabolite_id in referenced {
            if !self.metabolites.contains_key(&metabolite_id) {
                self.metabolites
                    .insert(metabolite_id.clone(), Metabolite::new(metabolite_id));
            }
        }
    }

    fn has_component(&self, kind: ComponentKind, id: &str) -> bool {
        match kind {
            ComponentKind::Reaction => self.reactions.contains_key(id),
            ComponentKind::Metabolite => self.metabolites.contains_key(id),
            ComponentKind::Gene => self.reactions.values().any(|rxn| rxn.genes().iter().any(|g| g == id)),
        }
    }
}
