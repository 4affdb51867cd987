//! Plugin provenance classification.
//!
//! Every installed plugin belongs to exactly one [`Provenance`]. The rules are
//! checked in priority order and the first match wins:
//!
//! 1. **Bundled** - the id is in [`BUNDLED_PLUGINS`], whatever else is true
//! 2. **Marketplace** - the id is listed in the Marketplace catalogue
//! 3. **Mattermost** - the homepage lives under `github.com/mattermost/`
//!    and not under `github.com/mattermost-community/`
//! 4. **Third-party** - everything else

use serde::{Deserialize, Serialize};
use std::fmt;

/// Plugin ids that ship inside the Mattermost server distribution.
pub const BUNDLED_PLUGINS: &[&str] = &[
    "mattermost-ai",
    "focalboard",
    "com.mattermost.calls",
    "com.mattermost.plugin-channel-export",
    "github",
    "com.github.manland.mattermost-plugin-gitlab",
    "jira",
    "com.mattermost.mattermost-plugin-metrics",
    "com.mattermost.mscalendar",
    "com.mattermost.msteamsmeetings",
    "playbooks",
    "mattermost-plugin-servicenow",
    "com.mattermost.user-survey",
    "zoom",
];

const MATTERMOST_ORG_PATH: &str = "github.com/mattermost/";
const COMMUNITY_ORG_PATH: &str = "github.com/mattermost-community/";

/// Where an installed plugin comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provenance {
    #[serde(rename = "marketplace")]
    Marketplace,
    #[serde(rename = "mattermost-plugin")]
    Mattermost,
    #[serde(rename = "bundled")]
    Bundled,
    #[serde(rename = "third-party")]
    ThirdParty,
}

impl Provenance {
    /// All categories in report order.
    pub const ALL: [Provenance; 4] = [
        Provenance::Marketplace,
        Provenance::Mattermost,
        Provenance::Bundled,
        Provenance::ThirdParty,
    ];

    /// Position of the category in sorted output.
    pub fn rank(&self) -> u8 {
        match self {
            Provenance::Marketplace => 0,
            Provenance::Mattermost => 1,
            Provenance::Bundled => 2,
            Provenance::ThirdParty => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Marketplace => "marketplace",
            Provenance::Mattermost => "mattermost-plugin",
            Provenance::Bundled => "bundled",
            Provenance::ThirdParty => "third-party",
        }
    }

    /// Section heading used by the table renderer.
    pub fn title(&self) -> &'static str {
        match self {
            Provenance::Marketplace => "Marketplace Plugins",
            Provenance::Mattermost => "Mattermost Plugins",
            Provenance::Bundled => "Bundled Mattermost Plugins",
            Provenance::ThirdParty => "Third-Party / Custom Plugins",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true if the plugin id ships with the server itself.
pub fn is_bundled(plugin_id: &str) -> bool {
    BUNDLED_PLUGINS.contains(&plugin_id)
}

/// Returns true if the homepage points at the Mattermost GitHub organisation.
/// Matching is case-sensitive.
fn is_mattermost_homepage(homepage_url: &str) -> bool {
    homepage_url.contains(MATTERMOST_ORG_PATH) && !homepage_url.contains(COMMUNITY_ORG_PATH)
}

/// Determines the provenance of a single plugin.
pub fn classify_plugin_source(
    plugin_id: &str,
    in_marketplace: bool,
    homepage_url: &str,
) -> Provenance {
    if is_bundled(plugin_id) {
        Provenance::Bundled
    } else if in_marketplace {
        Provenance::Marketplace
    } else if is_mattermost_homepage(homepage_url) {
        Provenance::Mattermost
    } else {
        Provenance::ThirdParty
    }
}
