//! # Profile Resolution
//!
//! A profile is a named, reusable bundle of tool configuration: which skills
//! and MCP servers are switched on, per-agent model and priority settings,
//! and model routing. Profiles can `extend` other profiles by name, and a
//! project may layer local overrides on top of a named profile.
//!
//! ## Merge Rules
//!
//! Profiles do not use the generic deep merge. Each field has its own rule
//! when a child profile is layered over its parent:
//!
//! - **skills / mcp**: the enabled and disabled lists are unions of parent
//!   and child, parent entries first.
//! - **agents**: merged per agent name. A child agent without a `model` takes
//!   the parent's; its `priority` is always its own (explicit or the default
//!   of 50), never the parent's. Agents only the parent defines are kept.
//! - **model.routing / model.overrides**: per-key, child keys win.
//! - **model.default**: always the child's own value. A profile that names no
//!   default gets [`DEFAULT_MODEL`] before merging, so it shadows any default
//!   its parent names.
//!
//! Chains are walked with the same cycle and depth rules as fragment
//! inheritance (see [`crate::inheritance`]), using profile names as
//! references.

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::defaults::{DEFAULT_AGENT_PRIORITY, DEFAULT_MODEL, DEFAULT_MODEL_ROUTING};
use crate::error::{Error, Result};
use crate::inheritance::guard_link;
use crate::merge::EnabledDisabled;
use crate::storage::ProfileStorage;

/// A profile as written by the user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Name of the parent profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(default)]
    pub skills: EnabledDisabled,
    #[serde(default)]
    pub agents: BTreeMap<String, AgentConfig>,
    #[serde(default)]
    pub mcp: EnabledDisabled,
    #[serde(default)]
    pub model: ModelConfig,
}

impl Profile {
    /// An empty profile with the given name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder-style setter for `extends`
    pub fn extending(mut self, parent: impl Into<String>) -> Self {
        self.extends = Some(parent.into());
        self
    }
}

/// Per-agent settings as written in a profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
}

/// Model settings as written in a profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing: Option<ModelRouting>,
    #[serde(default)]
    pub overrides: BTreeMap<String, String>,
}

/// Model per complexity tier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRouting {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simple: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complex: Option<String>,
}

impl ModelRouting {
    /// The built-in routing table
    pub fn defaults() -> Self {
        let mut routing = ModelRouting::default();
        for (tier, model) in DEFAULT_MODEL_ROUTING {
            *routing.slot_mut(tier) = Some(model.to_string());
        }
        routing
    }

    /// Per-tier merge where tiers set in `other` win
    pub fn merge(&self, other: &ModelRouting) -> ModelRouting {
        ModelRouting {
            simple: other.simple.clone().or_else(|| self.simple.clone()),
            standard: other.standard.clone().or_else(|| self.standard.clone()),
            complex: other.complex.clone().or_else(|| self.complex.clone()),
        }
    }

    /// Model for `tier`, falling back to the built-in table for unset tiers
    pub fn model_for(&self, tier: &str) -> Option<String> {
        let configured = match tier {
            "simple" => self.simple.clone(),
            "standard" => self.standard.clone(),
            "complex" => self.complex.clone(),
            _ => return None,
        };
        configured.or_else(|| {
            DEFAULT_MODEL_ROUTING
                .iter()
                .find(|(name, _)| *name == tier)
                .map(|(_, model)| model.to_string())
        })
    }

    fn slot_mut(&mut self, tier: &str) -> &mut Option<String> {
        match tier {
            "simple" => &mut self.simple,
            "complex" => &mut self.complex,
            _ => &mut self.standard,
        }
    }
}

/// Agent settings after resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAgent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub priority: u32,
}

impl From<&AgentConfig> for ResolvedAgent {
    fn from(config: &AgentConfig) -> Self {
        Self {
            model: config.model.clone(),
            priority: config.priority.unwrap_or(DEFAULT_AGENT_PRIORITY),
        }
    }
}

/// Model settings after resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedModel {
    pub default: String,
    pub routing: ModelRouting,
    pub overrides: BTreeMap<String, String>,
}

/// The merged, per-field view of a profile and its ancestors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedProfile {
    pub skills: EnabledDisabled,
    pub mcp: EnabledDisabled,
    pub agents: BTreeMap<String, ResolvedAgent>,
    pub model: ResolvedModel,
}

impl ResolvedProfile {
    /// Build the view of a single profile, filling defaults
    pub fn from_config(profile: &Profile) -> Self {
        Self {
            skills: profile.skills.clone(),
            mcp: profile.mcp.clone(),
            agents: profile
                .agents
                .iter()
                .map(|(name, agent)| (name.clone(), ResolvedAgent::from(agent)))
                .collect(),
            model: ResolvedModel {
                default: profile
                    .model
                    .default
                    .clone()
                    .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                routing: profile
                    .model
                    .routing
                    .clone()
                    .unwrap_or_else(ModelRouting::defaults),
                overrides: profile.model.overrides.clone(),
            },
        }
    }

    /// Layer this (child) view over `parent`
    pub fn inherit(self, parent: &ResolvedProfile) -> ResolvedProfile {
        ResolvedProfile {
            skills: parent.skills.union(&self.skills),
            mcp: parent.mcp.union(&self.mcp),
            agents: merge_agents(&parent.agents, self.agents),
            model: ResolvedModel {
                default: self.model.default,
                routing: parent.model.routing.merge(&self.model.routing),
                overrides: merge_maps(&parent.model.overrides, self.model.overrides),
            },
        }
    }

    /// Apply project-local overrides on top of this view
    pub fn apply_overrides(&self, overrides: &ProfileOverrides) -> ResolvedProfile {
        let agents = overrides
            .agents
            .iter()
            .map(|(name, agent)| (name.clone(), ResolvedAgent::from(agent)))
            .collect();

        let routing = match &overrides.model.routing {
            Some(routing) => self.model.routing.merge(routing),
            None => self.model.routing.clone(),
        };

        ResolvedProfile {
            skills: self.skills.union(&overrides.skills),
            mcp: self.mcp.union(&overrides.mcp),
            agents: merge_agents(&self.agents, agents),
            model: ResolvedModel {
                default: overrides
                    .model
                    .default
                    .clone()
                    .unwrap_or_else(|| self.model.default.clone()),
                routing,
                overrides: merge_maps(&self.model.overrides, overrides.model.overrides.clone()),
            },
        }
    }

    /// The model an agent should run with
    ///
    /// Lookup order: `model.overrides`, the agent's own model, then the
    /// profile default.
    pub fn model_for_agent(&self, agent: &str) -> &str {
        self.model
            .overrides
            .get(agent)
            .or_else(|| self.agents.get(agent).and_then(|a| a.model.as_ref()))
            .unwrap_or(&self.model.default)
    }
}

fn merge_agents(
    parent: &BTreeMap<String, ResolvedAgent>,
    child: BTreeMap<String, ResolvedAgent>,
) -> BTreeMap<String, ResolvedAgent> {
    let mut merged = parent.clone();
    for (name, agent) in child {
        let entry = match parent.get(&name) {
            // Priority deliberately does not fall back to the parent's.
            Some(inherited) => ResolvedAgent {
                model: agent.model.or_else(|| inherited.model.clone()),
                priority: agent.priority,
            },
            None => agent,
        };
        merged.insert(name, entry);
    }
    merged
}

fn merge_maps(
    parent: &BTreeMap<String, String>,
    child: BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut merged = parent.clone();
    merged.extend(child);
    merged
}

/// Project-local overrides read from an unvalidated fragment
///
/// Each section is read independently; a section with the wrong shape is
/// ignored rather than rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileOverrides {
    pub skills: EnabledDisabled,
    pub mcp: EnabledDisabled,
    pub agents: BTreeMap<String, AgentConfig>,
    pub model: ModelConfig,
}

impl ProfileOverrides {
    pub fn from_fragment(fragment: &Value) -> Self {
        let agents = match fragment.get("agents") {
            Some(Value::Object(entries)) => entries
                .iter()
                .filter_map(|(name, agent)| {
                    lenient::<AgentConfig>(agent, "agents entry").map(|agent| (name.clone(), agent))
                })
                .collect(),
            _ => BTreeMap::new(),
        };

        Self {
            skills: section(fragment, "skills"),
            mcp: section(fragment, "mcp"),
            agents,
            model: section(fragment, "model"),
        }
    }
}

fn section<T>(fragment: &Value, key: &str) -> T
where
    T: serde::de::DeserializeOwned + Default,
{
    fragment
        .get(key)
        .and_then(|value| lenient(value, key))
        .unwrap_or_default()
}

fn lenient<T: serde::de::DeserializeOwned>(value: &Value, what: &str) -> Option<T> {
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            debug!("Ignoring malformed override {}: {}", what, err);
            None
        }
    }
}

/// Result of resolving a named profile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileResolution {
    /// The profile's own configuration, as stored
    pub config: Profile,
    /// The merged view across the inheritance chain
    pub resolved: ResolvedProfile,
    /// Profile names from the root ancestor to this profile
    pub inheritance_chain: Vec<String>,
}

/// Resolves named profiles from a [`ProfileStorage`]
#[derive(Debug, Clone)]
pub struct ProfileResolver<S> {
    storage: S,
}

impl<S: ProfileStorage> ProfileResolver<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Resolve `name` and its ancestors into one view
    pub async fn resolve(&self, name: &str) -> Result<ProfileResolution> {
        let config = self.read(name).await?;

        // Walk parents nearest-first; `path` holds every name on the chain so far.
        let mut path = vec![name.to_string()];
        let mut ancestors: Vec<Profile> = Vec::new();
        let mut next = config.extends.clone();

        while let Some(parent_name) = next {
            guard_link(&parent_name, &path, ancestors.len())?;
            debug!("Resolving parent profile '{}' of '{}'", parent_name, name);

            let parent = self.read(&parent_name).await?;
            next = parent.extends.clone();
            path.push(parent_name);
            ancestors.push(parent);
        }

        let mut resolved: Option<ResolvedProfile> = None;
        for profile in ancestors.iter().rev().chain(std::iter::once(&config)) {
            let own = ResolvedProfile::from_config(profile);
            resolved = Some(match resolved {
                Some(parent) => own.inherit(&parent),
                None => own,
            });
        }
        let resolved = resolved.unwrap_or_else(|| ResolvedProfile::from_config(&config));

        path.reverse();
        Ok(ProfileResolution {
            config,
            resolved,
            inheritance_chain: path,
        })
    }

    /// Resolve `name`, then layer an unvalidated override fragment on top
    pub async fn with_overrides(&self, name: &str, overrides: &Value) -> Result<ResolvedProfile> {
        let resolution = self.resolve(name).await?;
        let overrides = ProfileOverrides::from_fragment(overrides);
        Ok(resolution.resolved.apply_overrides(&overrides))
    }

    /// All profile names known to storage, sorted
    pub async fn list(&self) -> Result<Vec<String>> {
        let mut names = self.storage.list_profiles().await?;
        names.sort();
        names.dedup();
        Ok(names)
    }

    async fn read(&self, name: &str) -> Result<Profile> {
        let mut profile = self
            .storage
            .read_profile(name)
            .await?
            .ok_or_else(|| Error::ProfileNotFound {
                name: name.to_string(),
            })?;
        if profile.name.is_empty() {
            profile.name = name.to_string();
        }
        Ok(profile)
    }
}
