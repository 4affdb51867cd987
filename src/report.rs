//! Audit output model consumed by the renderers.

use crate::plugin::{ComponentType, PluginStatus};
use crate::registry::Provenance;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Tri-state freshness of an installed plugin.
///
/// Only Marketplace plugins are ever `Available` or `Current`; everything
/// else is `Unknown`. Serialises as `true`, `false` or `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStatus {
    Available,
    Current,
    Unknown,
}

impl UpdateStatus {
    pub fn as_option(&self) -> Option<bool> {
        match self {
            UpdateStatus::Available => Some(true),
            UpdateStatus::Current => Some(false),
            UpdateStatus::Unknown => None,
        }
    }

    /// Literal used in CSV output.
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateStatus::Available => "true",
            UpdateStatus::Current => "false",
            UpdateStatus::Unknown => "unknown",
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, UpdateStatus::Available)
    }
}

impl From<Option<bool>> for UpdateStatus {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => UpdateStatus::Available,
            Some(false) => UpdateStatus::Current,
            None => UpdateStatus::Unknown,
        }
    }
}

impl fmt::Display for UpdateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for UpdateStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_option().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for UpdateStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<bool>::deserialize(deserializer).map(UpdateStatus::from)
    }
}

/// Audit result for one installed plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginFinding {
    #[serde(rename = "plugin_id")]
    pub id: String,
    pub name: String,
    pub installed_version: String,
    /// Empty unless the plugin is a Marketplace plugin.
    pub latest_version: String,
    pub update_available: UpdateStatus,
    pub status: PluginStatus,
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    #[serde(rename = "source")]
    pub provenance: Provenance,
    /// Empty unless the plugin is a Marketplace plugin.
    pub marketplace_url: String,
}

/// Aggregate counters over the reported findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuditSummary {
    pub total: usize,
    pub marketplace: usize,
    pub bundled: usize,
    pub mattermost_plugin: usize,
    pub third_party: usize,
    pub outdated: usize,
    pub up_to_date: usize,
    pub unknown: usize,
    pub enabled: usize,
    pub disabled: usize,
}

/// Sorted findings plus their summary.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuditResult {
    pub plugins: Vec<PluginFinding>,
    pub summary: AuditSummary,
}

impl AuditResult {
    /// Findings belonging to one category, in report order.
    pub fn by_provenance(&self, provenance: Provenance) -> impl Iterator<Item = &PluginFinding> {
        self.plugins.iter().filter(move |p| p.provenance == provenance)
    }
}
