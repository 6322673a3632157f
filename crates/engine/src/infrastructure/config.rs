//! Engine configuration.
//!
//! Defaults come from `EngineConfig::default()` (or a serialized settings
//! document with per-field defaults); environment variables override them.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How `check_children_on_evaluation` combines with a node's own enter
/// conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChildEvaluationPolicy {
    /// Own conditions AND a satisfied child
    #[default]
    All,
    /// Own conditions OR a satisfied child
    Any,
    /// A satisfied child replaces the node's own conditions
    ChildrenOnly,
}

impl FromStr for ChildEvaluationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "any" => Ok(Self::Any),
            "children-only" | "children_only" => Ok(Self::ChildrenOnly),
            other => Err(format!("unknown child evaluation policy: {}", other)),
        }
    }
}

fn default_max_step_depth() -> usize {
    64
}

fn default_max_evaluation_depth() -> usize {
    256
}

fn default_max_evaluation_steps() -> usize {
    10_000
}

/// Traversal limits and policies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Most nodes one step may enter through automatic advancement
    #[serde(default = "default_max_step_depth")]
    pub max_step_depth: usize,

    /// Deepest chain of nodes a single condition check may walk
    #[serde(default = "default_max_evaluation_depth")]
    pub max_evaluation_depth: usize,

    /// Most edges a single condition check may evaluate, across all branches
    #[serde(default = "default_max_evaluation_steps")]
    pub max_evaluation_steps: usize,

    #[serde(default)]
    pub child_policy: ChildEvaluationPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_step_depth: default_max_step_depth(),
            max_evaluation_depth: default_max_evaluation_depth(),
            max_evaluation_steps: default_max_evaluation_steps(),
            child_policy: ChildEvaluationPolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Parse a JSON settings document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_max_step_depth(mut self, depth: usize) -> Self {
        self.max_step_depth = depth;
        self
    }

    pub fn with_max_evaluation_depth(mut self, depth: usize) -> Self {
        self.max_evaluation_depth = depth;
        self
    }

    pub fn with_max_evaluation_steps(mut self, steps: usize) -> Self {
        self.max_evaluation_steps = steps;
        self
    }

    pub fn with_child_policy(mut self, policy: ChildEvaluationPolicy) -> Self {
        self.child_policy = policy;
        self
    }

    /// Apply environment variable overrides.
    ///
    /// Supported environment variables:
    /// - DLGFLOW_MAX_STEP_DEPTH: automatic entries per step (range: 1-4096)
    /// - DLGFLOW_MAX_EVALUATION_DEPTH: condition recursion depth (range: 1-4096).
    ///   Each level is a few stack frames, so the cap stays well inside a
    ///   default thread stack.
    /// - DLGFLOW_MAX_EVALUATION_STEPS: edges per condition check (range: 1-1000000)
    /// - DLGFLOW_CHILD_POLICY: `all`, `any` or `children-only`
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(depth) = parse_ranged(&lookup, "DLGFLOW_MAX_STEP_DEPTH", 1, 4096) {
            self.max_step_depth = depth;
        }

        if let Some(depth) = parse_ranged(&lookup, "DLGFLOW_MAX_EVALUATION_DEPTH", 1, 4096) {
            self.max_evaluation_depth = depth;
        }

        if let Some(steps) = parse_ranged(&lookup, "DLGFLOW_MAX_EVALUATION_STEPS", 1, 1_000_000) {
            self.max_evaluation_steps = steps;
        }

        if let Some(val) = lookup("DLGFLOW_CHILD_POLICY") {
            match val.parse::<ChildEvaluationPolicy>() {
                Ok(policy) => {
                    self.child_policy = policy;
                    tracing::info!(?policy, "Applied DLGFLOW_CHILD_POLICY environment variable");
                }
                Err(e) => {
                    tracing::warn!(val = %val, error = %e, "DLGFLOW_CHILD_POLICY is invalid, ignoring");
                }
            }
        }
    }
}

fn parse_ranged<F>(lookup: &F, key: &str, min: usize, max: usize) -> Option<usize>
where
    F: Fn(&str) -> Option<String>,
{
    let val = lookup(key)?;
    match val.trim().parse::<usize>() {
        Ok(value) if (min..=max).contains(&value) => {
            tracing::info!(value, "Applied {} environment variable", key);
            Some(value)
        }
        Ok(value) => {
            tracing::warn!(value, "{} out of range [{}, {}], ignoring", key, min, max);
            None
        }
        Err(_) => {
            tracing::warn!(val = %val, "{} is not a valid usize, ignoring", key);
            None
        }
    }
}

/// Load `.env.local` then `.env` from the working directory when present.
pub fn load_dotenv() {
    load_dotenv_from(Path::new("."));
}

/// Variables already set in the process environment are never overridden,
/// so `.env.local` wins over `.env`.
pub fn load_dotenv_from(dir: &Path) {
    for filename in [".env.local", ".env"] {
        let path = dir.join(filename);
        if path.exists() {
            if let Err(e) = dotenvy::from_path(&path) {
                tracing::warn!(path = %path.display(), error = %e, "Failed to load env file");
            }
        }
    }
}
