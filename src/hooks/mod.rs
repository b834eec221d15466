//! # Hook Composition
//!
//! Addons, setups and the user's own configuration can each register hook
//! handlers for tool events. This module collects those registrations into
//! one deterministic, per-event list that a settings writer or hook runner
//! can consume.
//!
//! ## Process
//!
//! 1.  **Expansion**: every matcher entry of every source becomes a
//!     [`HookHandler`] with a resolved handler path, a generated name
//!     (`source:matcher-index`), a classified [`MatchType`], and concrete
//!     priority and enabled values.
//! 2.  **Filtering**: disabled handlers are dropped.
//! 3.  **Ordering**: each event's handlers are sorted by ascending priority.
//!     The sort is stable, so equal priorities keep source order and then
//!     matcher order.
//!
//! Composed handlers are plain data. Nothing in this module runs a handler;
//! [`settings::to_settings_format`] produces the command lines an external
//! runner executes.

pub mod matcher;
pub mod settings;

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use log::trace;
use serde::{Deserialize, Serialize};

use crate::defaults::DEFAULT_HOOK_PRIORITY;

pub use matcher::{sanitize, MatchType, WILDCARD};
pub use settings::{to_settings_format, SettingsHookEntry, SettingsHooks};

/// Tool lifecycle events a hook can attach to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HookEvent {
    PreToolUse,
    PostToolUse,
    Stop,
    SubagentStop,
}

impl HookEvent {
    /// Every event, in composition order
    pub const ALL: [HookEvent; 4] = [
        HookEvent::PreToolUse,
        HookEvent::PostToolUse,
        HookEvent::Stop,
        HookEvent::SubagentStop,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HookEvent::PreToolUse => "PreToolUse",
            HookEvent::PostToolUse => "PostToolUse",
            HookEvent::Stop => "Stop",
            HookEvent::SubagentStop => "SubagentStop",
        }
    }
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One list per [`HookEvent`]
///
/// Used both for a source's raw matcher entries and for composed handlers.
/// Unknown event keys are ignored when deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMap<T> {
    #[serde(rename = "PreToolUse", default = "Vec::new")]
    pub pre_tool_use: Vec<T>,
    #[serde(rename = "PostToolUse", default = "Vec::new")]
    pub post_tool_use: Vec<T>,
    #[serde(rename = "Stop", default = "Vec::new")]
    pub stop: Vec<T>,
    #[serde(rename = "SubagentStop", default = "Vec::new")]
    pub subagent_stop: Vec<T>,
}

impl<T> Default for EventMap<T> {
    fn default() -> Self {
        Self {
            pre_tool_use: Vec::new(),
            post_tool_use: Vec::new(),
            stop: Vec::new(),
            subagent_stop: Vec::new(),
        }
    }
}

impl<T> EventMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, event: HookEvent) -> &[T] {
        match event {
            HookEvent::PreToolUse => &self.pre_tool_use,
            HookEvent::PostToolUse => &self.post_tool_use,
            HookEvent::Stop => &self.stop,
            HookEvent::SubagentStop => &self.subagent_stop,
        }
    }

    pub fn get_mut(&mut self, event: HookEvent) -> &mut Vec<T> {
        match event {
            HookEvent::PreToolUse => &mut self.pre_tool_use,
            HookEvent::PostToolUse => &mut self.post_tool_use,
            HookEvent::Stop => &mut self.stop,
            HookEvent::SubagentStop => &mut self.subagent_stop,
        }
    }

    /// `(event, entries)` pairs in [`HookEvent::ALL`] order
    pub fn iter(&self) -> impl Iterator<Item = (HookEvent, &[T])> + '_ {
        HookEvent::ALL.into_iter().map(move |event| (event, self.get(event)))
    }
}

/// Kind of origin a hook source comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HookSourceType {
    Addon,
    Setup,
    User,
}

/// A hook registration as written by a source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookMatcherInput {
    pub matcher: String,
    /// Handler script path, absolute or relative to the source's base path
    pub handler: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl HookMatcherInput {
    pub fn new(matcher: impl Into<String>, handler: impl Into<String>) -> Self {
        Self {
            matcher: matcher.into(),
            handler: handler.into(),
            priority: None,
            enabled: None,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }
}

/// A named origin contributing hook registrations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookSource {
    #[serde(rename = "type")]
    pub source_type: HookSourceType,
    pub name: String,
    #[serde(default)]
    pub base_path: PathBuf,
    #[serde(default)]
    pub hooks: EventMap<HookMatcherInput>,
}

impl HookSource {
    pub fn new(
        source_type: HookSourceType,
        name: impl Into<String>,
        base_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source_type,
            name: name.into(),
            base_path: base_path.into(),
            hooks: EventMap::new(),
        }
    }

    /// Builder-style registration of one matcher entry
    pub fn with_hook(mut self, event: HookEvent, input: HookMatcherInput) -> Self {
        self.hooks.get_mut(event).push(input);
        self
    }
}

/// A composed hook handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookHandler {
    pub name: String,
    pub matcher: String,
    pub match_type: MatchType,
    pub priority: i32,
    pub enabled: bool,
    pub source: String,
    pub resolved_handler_path: PathBuf,
}

impl HookHandler {
    /// Expand the `index`-th matcher entry of `source`
    pub fn from_input(source: &HookSource, input: &HookMatcherInput, index: usize) -> Self {
        Self {
            name: format!("{}:{}-{}", source.name, sanitize(&input.matcher), index),
            matcher: input.matcher.clone(),
            match_type: MatchType::classify(&input.matcher),
            priority: input.priority.unwrap_or(DEFAULT_HOOK_PRIORITY),
            enabled: input.enabled.unwrap_or(true),
            source: source.name.clone(),
            resolved_handler_path: resolve_handler_path(&source.base_path, &input.handler),
        }
    }

    /// Whether this handler applies to `tool_name`
    pub fn matches(&self, tool_name: &str) -> bool {
        matcher::matches(&self.matcher, self.match_type, tool_name)
    }
}

/// Composed handlers per event, each list ordered by ascending priority
pub type ComposedHooks = EventMap<HookHandler>;

/// Compose the hooks of all `sources` in the order given
pub fn compose_hooks(sources: &[HookSource]) -> ComposedHooks {
    let mut composed = ComposedHooks::new();

    for source in sources {
        for (event, inputs) in source.hooks.iter() {
            for (index, input) in inputs.iter().enumerate() {
                let handler = HookHandler::from_input(source, input, index);
                if !handler.enabled {
                    trace!("Skipping disabled hook {} for {}", handler.name, event);
                    continue;
                }
                trace!("Composed hook {} for {}", handler.name, event);
                composed.get_mut(event).push(handler);
            }
        }
    }

    composed.sort_by_priority();
    composed
}

impl ComposedHooks {
    /// Stable sort of every event list by ascending priority
    pub fn sort_by_priority(&mut self) {
        for event in HookEvent::ALL {
            self.get_mut(event).sort_by_key(|handler| handler.priority);
        }
    }

    /// Whether no event has a handler
    pub fn is_empty(&self) -> bool {
        self.hook_count() == 0
    }

    /// Total number of handlers across all events
    pub fn hook_count(&self) -> usize {
        self.iter().map(|(_, handlers)| handlers.len()).sum()
    }

    /// Concatenate `other` after `self` per event, then re-sort
    pub fn merge(&self, other: &ComposedHooks) -> ComposedHooks {
        let mut merged = self.clone();
        for (event, handlers) in other.iter() {
            merged.get_mut(event).extend_from_slice(handlers);
        }
        merged.sort_by_priority();
        merged
    }

    /// Only the handlers contributed by `source`
    pub fn filter_by_source(&self, source: &str) -> ComposedHooks {
        self.retain(|handler| handler.source == source)
    }

    /// Every handler except those contributed by `source`
    pub fn remove_by_source(&self, source: &str) -> ComposedHooks {
        self.retain(|handler| handler.source != source)
    }

    /// Distinct sources present, sorted
    pub fn sources(&self) -> Vec<String> {
        self.iter()
            .flat_map(|(_, handlers)| handlers.iter().map(|handler| handler.source.clone()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Handlers of `event` that apply to `tool_name`, in execution order
    pub fn matching(&self, event: HookEvent, tool_name: &str) -> Vec<&HookHandler> {
        self.get(event)
            .iter()
            .filter(|handler| handler.enabled && handler.matches(tool_name))
            .collect()
    }

    fn retain<P>(&self, keep: P) -> ComposedHooks
    where
        P: Fn(&HookHandler) -> bool,
    {
        let mut filtered = ComposedHooks::new();
        for (event, handlers) in self.iter() {
            *filtered.get_mut(event) = handlers.iter().filter(|h| keep(*h)).cloned().collect();
        }
        filtered
    }
}

/// An empty set of composed hooks
pub fn create_empty_hooks() -> ComposedHooks {
    ComposedHooks::new()
}

pub fn is_hooks_empty(hooks: &ComposedHooks) -> bool {
    hooks.is_empty()
}

pub fn get_hook_count(hooks: &ComposedHooks) -> usize {
    hooks.hook_count()
}

pub fn merge_composed_hooks(first: &ComposedHooks, second: &ComposedHooks) -> ComposedHooks {
    first.merge(second)
}

pub fn filter_hooks_by_source(hooks: &ComposedHooks, source: &str) -> ComposedHooks {
    hooks.filter_by_source(source)
}

pub fn remove_hooks_by_source(hooks: &ComposedHooks, source: &str) -> ComposedHooks {
    hooks.remove_by_source(source)
}

pub fn get_hook_sources(hooks: &ComposedHooks) -> Vec<String> {
    hooks.sources()
}

/// Resolve a handler path against a source's base path
///
/// Absolute handlers are kept as-is. Relative handlers are joined onto
/// `base_path` and normalized lexically; the filesystem is not consulted.
pub fn resolve_handler_path(base_path: &Path, handler: &str) -> PathBuf {
    let handler_path = Path::new(handler);
    if handler_path.is_absolute() {
        return handler_path.to_path_buf();
    }
    normalize(&base_path.join(handler_path))
}

fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
