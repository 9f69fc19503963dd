use crate::error::{EnsembleError, Result};
use ensemble_model::ComponentKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Configuration for ensemble construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleConfig {
    /// How the input model list is joined into one ensemble
    pub join_method: JoinMethod,

    /// Models per group in iterative mode
    pub join_size: usize,

    /// Component kinds compared across members
    pub tracked_kinds: Vec<ComponentKind>,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            join_method: JoinMethod::Concurrent,
            join_size: 1,
            tracked_kinds: vec![ComponentKind::Reaction],
        }
    }
}

impl EnsembleConfig {
    /// All models held in memory, one batch pass
    pub fn concurrent() -> Self {
        Self::default()
    }

    /// Models joined `join_size` at a time through incremental merges
    pub fn iterative(join_size: usize) -> Self {
        Self {
            join_method: JoinMethod::Iterative,
            join_size,
            ..Default::default()
        }
    }

    /// Parse from a TOML document, either flat or under an `[ensemble]` table
    pub fn from_toml_str(source: &str) -> Result<Self> {
        #[derive(Deserialize)]
        struct Wrapped {
            ensemble: EnsembleConfig,
        }

        let table: toml::Table =
            toml::from_str(source).map_err(|e| EnsembleError::configuration(e.to_string()))?;
        let wrapped = table.contains_key("ensemble");
        let value = toml::Value::Table(table);
        let config = if wrapped {
            value
                .try_into::<Wrapped>()
                .map(|wrapped| wrapped.ensemble)
        } else {
            value.try_into::<EnsembleConfig>()
        }
        .map_err(|e| EnsembleError::configuration(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.join_size == 0 {
            return Err(EnsembleError::configuration("join_size must be >= 1"));
        }

        if self.tracked_kinds.is_empty() {
            return Err(EnsembleError::configuration(
                "tracked_kinds must name at least one component kind",
            ));
        }

        Ok(())
    }
}

/// Strategy for joining a model list into an ensemble
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinMethod {
    /// Every model in memory at once; a single batch construction
    Concurrent,

    /// Fixed-size groups, each built into a sub-ensemble and merged.
    /// Slower, but only one group is held in memory at a time.
    Iterative,
}

impl Default for JoinMethod {
    fn default() -> Self {
        Self::Concurrent
    }
}

impl fmt::Display for JoinMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinMethod::Concurrent => f.write_str("concurrent"),
            JoinMethod::Iterative => f.write_str("iterative"),
        }
    }
}

impl FromStr for JoinMethod {
    type Err = EnsembleError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "concurrent" => Ok(JoinMethod::Concurrent),
            "iterative" => Ok(JoinMethod::Iterative),
            other => Err(EnsembleError::configuration(format!(
                "join_method must be either 'concurrent' or 'iterative', got '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        assert!(EnsembleConfig::default().validate().is_ok());
        assert!(EnsembleConfig::iterative(4).validate().is_ok());
    }

    #[test]
    fn test_zero_join_size_rejected() {
        let config = EnsembleConfig::iterative(0);
        assert!(matches!(config.validate(), Err(EnsembleError::Configuration(_))));
    }

    #[test]
    fn test_empty_tracked_kinds_rejected() {
        let config = EnsembleConfig {
            tracked_kinds: vec![],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_join_method_parse() {
        assert_eq!("iterative".parse::<JoinMethod>().unwrap(), JoinMethod::Iterative);
        assert_eq!(JoinMethod::Concurrent.to_string(), "concurrent");
        assert!(matches!(
            "parallel".parse::<JoinMethod>(),
            Err(EnsembleError::Configuration(_))
        ));
    }

    #[test]
    fn test_from_toml_wrapped_and_flat() {
        let wrapped = EnsembleConfig::from_toml_str(
            "[ensemble]\njoin_method = \"iterative\"\njoin_size = 3\n",
        )
        .unwrap();
        assert_eq!(wrapped, EnsembleConfig::iterative(3));

        let flat = EnsembleConfig::from_toml_str("join_size = 2\n").unwrap();
        assert_eq!(flat.join_method, JoinMethod::Concurrent);
        assert_eq!(flat.join_size, 2);
        assert_eq!(flat.tracked_kinds, vec![ComponentKind::Reaction]);
    }

    #[test]
    fn test_from_toml_rejects_unknown_method() {
        let err = EnsembleConfig::from_toml_str("join_method = \"parallel\"\n").unwrap_err();
        assert!(matches!(err, EnsembleError::Configuration(_)));
    }
}
