//! Settings wire format for composed hooks
//!
//! The external tool reads hooks from its settings file in this shape:
//!
//! ```json
//! {
//!   "PreToolUse": [
//!     {
//!       "matcher": "Bash",
//!       "hooks": [{ "type": "command", "command": "node \"/path/guard.js\"" }]
//!     }
//!   ]
//! }
//! ```
//!
//! Field names and nesting are a compatibility contract and must not change.
//! Entries stay minimal: `matcher` is omitted for the wildcard, and
//! `priority` / `enabled` appear only when they differ from their defaults.
//! Events without handlers are omitted entirely.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ComposedHooks, HookEvent, HookHandler, WILDCARD};
use crate::defaults::DEFAULT_HOOK_PRIORITY;
use crate::error::{Error, Result};

/// Key the hooks section lives under in a settings document
pub const SETTINGS_HOOKS_KEY: &str = "hooks";

/// Composed hooks in the settings wire format
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsHooks {
    #[serde(rename = "PreToolUse", default, skip_serializing_if = "Option::is_none")]
    pub pre_tool_use: Option<Vec<SettingsHookEntry>>,
    #[serde(rename = "PostToolUse", default, skip_serializing_if = "Option::is_none")]
    pub post_tool_use: Option<Vec<SettingsHookEntry>>,
    #[serde(rename = "Stop", default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<SettingsHookEntry>>,
    #[serde(rename = "SubagentStop", default, skip_serializing_if = "Option::is_none")]
    pub subagent_stop: Option<Vec<SettingsHookEntry>>,
}

impl SettingsHooks {
    pub fn get(&self, event: HookEvent) -> Option<&[SettingsHookEntry]> {
        let entries = match event {
            HookEvent::PreToolUse => &self.pre_tool_use,
            HookEvent::PostToolUse => &self.post_tool_use,
            HookEvent::Stop => &self.stop,
            HookEvent::SubagentStop => &self.subagent_stop,
        };
        entries.as_deref()
    }

    fn slot_mut(&mut self, event: HookEvent) -> &mut Option<Vec<SettingsHookEntry>> {
        match event {
            HookEvent::PreToolUse => &mut self.pre_tool_use,
            HookEvent::PostToolUse => &mut self.post_tool_use,
            HookEvent::Stop => &mut self.stop,
            HookEvent::SubagentStop => &mut self.subagent_stop,
        }
    }

    pub fn is_empty(&self) -> bool {
        HookEvent::ALL.iter().all(|event| self.get(*event).is_none())
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Write this hooks section into a settings document
    ///
    /// The `hooks` key is replaced wholesale; every other key of the document
    /// is left untouched. The document must be a JSON object.
    pub fn write_into(&self, settings: &mut Value) -> Result<()> {
        let hooks = self.to_value()?;
        let Value::Object(map) = settings else {
            return Err(Error::ConfigParse {
                message: "Settings document must be a JSON object".to_string(),
                hint: None,
            });
        };
        if self.is_empty() {
            map.remove(SETTINGS_HOOKS_KEY);
        } else {
            map.insert(SETTINGS_HOOKS_KEY.to_string(), hooks);
        }
        Ok(())
    }
}

/// One handler registration in the settings file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsHookEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matcher: Option<String>,
    pub hooks: Vec<SettingsCommand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// A command the external tool runs for a hook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsCommand {
    #[serde(rename = "type")]
    pub kind: String,
    pub command: String,
}

impl SettingsCommand {
    /// The `node "<path>"` command line for a handler
    pub fn for_handler(handler: &HookHandler) -> Self {
        Self {
            kind: "command".to_string(),
            command: format!("node \"{}\"", handler.resolved_handler_path.display()),
        }
    }
}

impl From<&HookHandler> for SettingsHookEntry {
    fn from(handler: &HookHandler) -> Self {
        Self {
            matcher: (handler.matcher != WILDCARD).then(|| handler.matcher.clone()),
            hooks: vec![SettingsCommand::for_handler(handler)],
            priority: (handler.priority != DEFAULT_HOOK_PRIORITY).then_some(handler.priority),
            enabled: (!handler.enabled).then_some(false),
        }
    }
}

/// Convert composed hooks to the settings wire format
pub fn to_settings_format(composed: &ComposedHooks) -> SettingsHooks {
    let mut settings = SettingsHooks::default();
    for (event, handlers) in composed.iter() {
        if handlers.is_empty() {
            continue;
        }
        *settings.slot_mut(event) = Some(handlers.iter().map(SettingsHookEntry::from).collect());
    }
    settings
}
