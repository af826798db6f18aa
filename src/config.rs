use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::threshold::DEFAULT_APPROVAL_THRESHOLD;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub voting: VotingConfig,
}

/// Vote resolution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VotingConfig {
    /// Up-votes needed before a review is approved
    pub approval_threshold: usize,
    /// Longest voter id accepted, unlimited when unset
    pub max_voter_len: Option<usize>,
}

impl Default for VotingConfig {
    fn default() -> Self {
        Self {
            approval_threshold: DEFAULT_APPROVAL_THRESHOLD,
            max_voter_len: None,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            info!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        info!(
            path = %path.display(),
            approval_threshold = config.voting.approval_threshold,
            "Loaded configuration"
        );

        Ok(config)
    }

    /// Load configuration from the default location (.review-gate/config.yml)
    pub fn load_default() -> Result<Self> {
        Self::load(".review-gate/config.yml")
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.voting.approval_threshold == 0 {
            anyhow::bail!("voting.approval_threshold must be at least 1");
        }
        if self.voting.max_voter_len == Some(0) {
            anyhow::bail!("voting.max_voter_len must be at least 1");
        }
        Ok(())
    }
}
