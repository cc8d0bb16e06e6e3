//! Merge strategy selection.

use crate::error::{MergeError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How an overlap between an agent patch and a user patch is settled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// The user patch wins and the agent patch is dropped.
    #[default]
    UserPriority,
    /// The agent patch wins and the user patch is dropped.
    AgentPriority,
    /// Keep the user's text and annotate it with the agent's.
    Merge,
}

impl MergeStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeStrategy::UserPriority => "user_priority",
            MergeStrategy::AgentPriority => "agent_priority",
            MergeStrategy::Merge => "merge",
        }
    }
}

impl std::fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergeStrategy {
    type Err = MergeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "user_priority" => Ok(MergeStrategy::UserPriority),
            "agent_priority" => Ok(MergeStrategy::AgentPriority),
            "merge" => Ok(MergeStrategy::Merge),
            other => Err(MergeError::UnknownMergeStrategy(other.to_string())),
        }
    }
}

/// Configuration for the conflict merger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeConfig {
    pub strategy: MergeStrategy,
}

impl MergeConfig {
    pub fn new(strategy: MergeStrategy) -> Self {
        Self { strategy }
    }
}

/// Builder for merge configuration.
pub struct MergeConfigBuilder {
    config: MergeConfig,
}

impl MergeConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: MergeConfig::default(),
        }
    }

    pub fn strategy(mut self, strategy: MergeStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    /// Set the strategy from its snake_case name.
    pub fn strategy_name(mut self, name: &str) -> Result<Self> {
        self.config.strategy = name.parse()?;
        Ok(self)
    }

    pub fn build(self) -> MergeConfig {
        self.config
    }
}

impl Default for MergeConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_user_priority() {
        assert_eq!(MergeConfig::default().strategy, MergeStrategy::UserPriority);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(
            "agent_priority".parse::<MergeStrategy>().unwrap(),
            MergeStrategy::AgentPriority
        );
        assert_eq!(
            "last_writer".parse::<MergeStrategy>().unwrap_err(),
            MergeError::UnknownMergeStrategy("last_writer".to_string())
        );
    }

    #[test]
    fn test_builder() {
        let config = MergeConfigBuilder::new()
            .strategy_name("merge")
            .unwrap()
            .build();
        assert_eq!(config.strategy, MergeStrategy::Merge);
        assert!(MergeConfigBuilder::new().strategy_name("nope").is_err());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&MergeStrategy::UserPriority).unwrap();
        assert_eq!(json, "\"user_priority\"");
    }
}
