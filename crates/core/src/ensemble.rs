use crate::base::build_base;
use crate::component::apply;
use crate::config::{EnsembleConfig, JoinMethod};
use crate::error::{EnsembleError, Result};
use crate::feature::{extract_features, FeatureCatalog};
use crate::merge::merge_ensembles;
use crate::states::{build_states, StateMatrix};
use crate::table::{FeatureTable, StateTable};
use ensemble_model::{ComponentKind, MetabolicModel};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Lifecycle stage of an ensemble
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EnsembleState {
    /// No members; the base model has no components
    Empty,

    /// One member; the base model is a copy of it and there are no features
    SingleModel,

    /// Two or more members
    Populated,
}

/// Summary counts for logging and reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EnsembleStats {
    pub members: usize,
    pub base_reactions: usize,
    pub features: usize,
    pub variable_components: usize,
}

impl fmt::Display for EnsembleStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} members, {} base reactions, {} features over {} variable components",
            self.members, self.base_reactions, self.features, self.variable_components
        )
    }
}

/// Fully assembled replacement for an ensemble's owned attributes
pub(crate) struct EnsembleParts<M> {
    pub base_model: M,
    pub features: FeatureCatalog,
    pub states: StateMatrix,
    pub missing: MissingReactions,
}

/// member id -> base reactions the member does not define
pub(crate) type MissingReactions = BTreeMap<String, BTreeSet<String>>;

/// Ensemble of metabolic models.
///
/// Holds the base model (union of every member's reactions), the catalog of
/// features (recorded variants of reaction bounds), and the member × feature
/// state matrix. Every mutating operation assembles new values first and
/// swaps them in only on success, so a failed merge leaves the ensemble as it
/// was.
#[derive(Debug, Clone)]
pub struct Ensemble<M: MetabolicModel> {
    id: String,
    base_model: M,
    features: FeatureCatalog,
    states: StateMatrix,
    missing: MissingReactions,
    config: EnsembleConfig,
}

impl<M: MetabolicModel> Ensemble<M> {
    /// Build an ensemble from `models` using the configured join method.
    ///
    /// Iterative mode pulls `join_size` models at a time from the iterator,
    /// so a lazily loading iterator keeps only one group in memory.
    pub fn new(models: impl IntoIterator<Item = M>, id: &str, config: EnsembleConfig) -> Result<Self> {
        config.validate()?;
        if id.trim().is_empty() {
            return Err(EnsembleError::configuration("ensemble id must not be empty"));
        }

        let ensemble = match config.join_method {
            JoinMethod::Concurrent => {
                let models: Vec<M> = models.into_iter().collect();
                Self::build(id, &models, config)?
            }
            JoinMethod::Iterative => {
                let join_size = config.join_size;
                let mut ensemble = Self::build(id, &[], config)?;
                let mut models = models.into_iter().peekable();
                while models.peek().is_some() {
                    let group: Vec<M> = models.by_ref().take(join_size).collect();
                    ensemble.add_models(group)?;
                }
                ensemble
            }
        };

        log::info!("Built ensemble {}: {}", ensemble.id, ensemble.stats());
        Ok(ensemble)
    }

    /// Ensemble with no members
    pub fn empty(id: &str, config: EnsembleConfig) -> Result<Self> {
        Self::new(Vec::new(), id, config)
    }

    /// Batch construction: base, then features, then states, in one pass
    fn build(id: &str, models: &[M], config: EnsembleConfig) -> Result<Self> {
        let parts = Self::build_parts(id, models, &config)?;
        Ok(Self {
            id: id.to_string(),
            base_model: parts.base_model,
            features: parts.features,
            states: parts.states,
            missing: parts.missing,
            config,
        })
    }

    fn build_parts(id: &str, models: &[M], config: &EnsembleConfig) -> Result<EnsembleParts<M>> {
        let base_model = build_base(models, Some(&base_model_id(id)))?;
        let features = extract_features(&base_model, models, &config.tracked_kinds)?;
        let states = build_states(&features, &base_model, models)?;

        let base_reactions = base_model.component_ids(ComponentKind::Reaction);
        let mut missing = MissingReactions::new();
        for model in models {
            let absent: BTreeSet<String> = base_reactions
                .iter()
                .filter(|id| !model.has_component(ComponentKind::Reaction, id))
                .cloned()
                .collect();
            if !absent.is_empty() {
                missing.insert(model.id().to_string(), absent);
            }
        }

        Ok(EnsembleParts {
            base_model,
            features,
            states,
            missing,
        })
    }

    /// Fold additional models into the ensemble.
    ///
    /// The batch is built into its own ensemble and merged. When this
    /// ensemble has no features yet there is no variability to reconcile, so
    /// it is rebuilt in one batch from its members plus the new models.
    pub fn add_models(&mut self, models: impl IntoIterator<Item = M>) -> Result<()> {
        let models: Vec<M> = models.into_iter().collect();
        if models.is_empty() {
            return Ok(());
        }

        if self.features.is_empty() {
            let mut all_models = self.member_models()?;
            all_models.extend(models);
            let parts = Self::build_parts(&self.id, &all_models, &self.config)?;
            self.commit(parts);
            log::info!("Rebuilt ensemble {}: {}", self.id, self.stats());
            return Ok(());
        }

        let batch = Self::build("new_models", &models, self.config.clone())?;
        self.merge(batch)
    }

    /// Merge an already-built ensemble into this one
    pub fn merge(&mut self, other: Ensemble<M>) -> Result<()> {
        if other.is_empty() {
            return Ok(());
        }

        if self.features.is_empty() {
            return self.add_models(other.member_models()?);
        }

        let parts = merge_ensembles(self, &other)?;
        self.commit(parts);
        log::info!(
            "Merged {} members into ensemble {}: {}",
            other.states.member_count(),
            self.id,
            self.stats()
        );
        Ok(())
    }

    fn commit(&mut self, parts: EnsembleParts<M>) {
        self.base_model = parts.base_model;
        self.features = parts.features;
        self.states = parts.states;
        self.missing = parts.missing;
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn base_model(&self) -> &M {
        &self.base_model
    }

    pub fn features(&self) -> &FeatureCatalog {
        &self.features
    }

    pub fn states(&self) -> &StateMatrix {
        &self.states
    }

    pub fn config(&self) -> &EnsembleConfig {
        &self.config
    }

    /// Base reactions a member does not define, sorted
    pub fn missing_reactions(&self, member_id: &str) -> Vec<&str> {
        self.missing
            .get(member_id)
            .map(|ids| ids.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub(crate) fn missing(&self) -> &MissingReactions {
        &self.missing
    }

    pub fn member_ids(&self) -> Vec<&str> {
        self.states.member_ids().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.states.member_count() == 0
    }

    pub fn state(&self) -> EnsembleState {
        match self.states.member_count() {
            0 => EnsembleState::Empty,
            1 => EnsembleState::SingleModel,
            _ => EnsembleState::Populated,
        }
    }

    pub fn stats(&self) -> EnsembleStats {
        EnsembleStats {
            members: self.states.member_count(),
            base_reactions: self.base_model.component_ids(ComponentKind::Reaction).len(),
            features: self.features.len(),
            variable_components: self.features.variable_components().len(),
        }
    }

    /// Reconstruct one member: the base model with the member's active
    /// features applied and the reactions it lacks removed, renamed to the
    /// member id
    pub fn member_model(&self, member_id: &str) -> Result<M> {
        if !self.states.contains_member(member_id) {
            return Err(EnsembleError::UnknownMember(member_id.to_string()));
        }

        let mut model = self.base_model.clone();
        model.set_id(member_id);
        for feature_id in self.states.active_features(member_id) {
            let feature = self
                .features
                .get(feature_id)
                .ok_or_else(|| EnsembleError::Other(format!("state column {feature_id} has no feature")))?;
            apply(&mut model, &feature.component_id, &feature.attribute_values)?;
        }
        if let Some(absent) = self.missing.get(member_id) {
            let absent: Vec<String> = absent.iter().cloned().collect();
            model.remove_reactions(&absent);
            model.repair();
        }
        Ok(model)
    }

    /// Every member, reconstructed in row order
    pub fn member_models(&self) -> Result<Vec<M>> {
        self.states
            .member_ids()
            .map(|member_id| self.member_model(member_id))
            .collect()
    }

    /// Features as rows: index = feature id
    pub fn feature_table(&self) -> FeatureTable {
        FeatureTable::from_catalog(&self.features)
    }

    /// States as rows: index = member id, one boolean per feature column
    pub fn state_table(&self) -> StateTable {
        StateTable::from_matrix(&self.states)
    }
}

fn base_model_id(ensemble_id: &str) -> String {
    format!("{ensemble_id}_base_model")
}
