use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Whether the server currently runs the plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginStatus {
    Enabled,
    Disabled,
}

impl PluginStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PluginStatus::Enabled => "enabled",
            PluginStatus::Disabled => "disabled",
        }
    }

    /// Capitalised form used in table output.
    pub fn label(&self) -> &'static str {
        match self {
            PluginStatus::Enabled => "Enabled",
            PluginStatus::Disabled => "Disabled",
        }
    }
}

impl fmt::Display for PluginStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A plugin present on the audited server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPlugin {
    pub id: String,
    pub name: String,
    pub version: String,
    pub homepage_url: String,
    pub status: PluginStatus,
    pub has_server: bool,
    pub has_webapp: bool,
}

/// Marketplace metadata for a single plugin id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MarketplaceEntry {
    pub version: String,
    pub homepage_url: String,
}

/// Marketplace catalogue keyed by plugin id. A missing key means the plugin
/// is not listed.
pub type Catalogue = HashMap<String, MarketplaceEntry>;

/// Which halves of a plugin are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Server,
    Webapp,
    Both,
    Unknown,
}

impl ComponentType {
    pub fn from_components(has_server: bool, has_webapp: bool) -> Self {
        match (has_server, has_webapp) {
            (true, true) => ComponentType::Both,
            (true, false) => ComponentType::Server,
            (false, true) => ComponentType::Webapp,
            (false, false) => ComponentType::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::Server => "server",
            ComponentType::Webapp => "webapp",
            ComponentType::Both => "both",
            ComponentType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
