//! # Strata
//!
//! Layered configuration composition. Reusable configuration fragments
//! ("profiles") can extend one another, and independent sources (addons,
//! setups, the user's own config) contribute hook handlers. This library
//! resolves those layers into one final, deterministic configuration.
//!
//! ## Quick Example
//!
//! ```
//! use serde_json::json;
//! use strata::merge::merge;
//!
//! let merged = merge(&[
//!     json!({"theme": "dark", "editor": {"tabs": 4, "wrap": true}}),
//!     json!({"editor": {"tabs": 2}}),
//! ]);
//! assert_eq!(merged, json!({"theme": "dark", "editor": {"tabs": 2, "wrap": true}}));
//! ```
//!
//! ## Core Concepts
//!
//! - **Deep merge (`merge`)**: objects merge key by key, everything else
//!   (arrays included) is replaced by the later fragment. `merge::enabled`
//!   merges paired enabled/disabled name lists where disabling wins.
//! - **Inheritance (`inheritance`, `cache`, `resolvers`)**: a fragment's
//!   `extends` key names a parent, loaded through an injected async
//!   [`inheritance::Resolver`]. Chains are checked for cycles and depth.
//! - **Profiles (`profile`, `storage`)**: named profiles with per-field merge
//!   rules for skills, agents, MCP servers and model routing.
//! - **Hooks (`hooks`)**: handlers from many sources composed into one
//!   priority-ordered list per event, and converted to the settings format
//!   an external runner reads.
//!
//! Nothing in this crate runs a hook or fetches from the network. Disk access
//! is confined to the `config`, `storage` and `resolvers` adapters.

pub mod cache;
pub mod config;
pub mod defaults;
pub mod error;
pub mod hooks;
pub mod inheritance;
pub mod merge;
pub mod output;
pub mod profile;
pub mod resolvers;
pub mod storage;
pub mod suggestions;

#[cfg(test)]
mod merge_proptest;
