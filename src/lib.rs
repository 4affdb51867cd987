//! mm-plugin-audit core library
//!
//! Audits the plugins installed on a Mattermost server: classifies each one by
//! provenance, checks Marketplace plugins for newer versions and produces a
//! report.
//!
//! # Architecture
//!
//! ## Classification (`registry` module)
//! - `classify_plugin_source()` - Bundled, Marketplace, Mattermost or third-party
//! - `BUNDLED_PLUGINS` - ids shipped with the server itself
//!
//! ## Version checks (`version` module)
//! - `compare_versions()` - semantic version ordering with a lenient fallback
//!
//! ## Audit engine (`audit` module)
//! - `run_audit()` - pure classification, filtering, sorting and aggregation
//! - `audit_server()` - fetch inputs from a `PluginInventory` and audit them
//!
//! ## Data structures (`plugin` and `report` modules)
//! - `InstalledPlugin`, `MarketplaceEntry`, `Catalogue` - audit inputs
//! - `PluginFinding`, `AuditSummary`, `AuditResult` - audit output
//!
//! ## Collaborators
//! - `client` - Mattermost REST client implementing `PluginInventory`
//! - `output` - table, CSV and JSON renderers
//! - `config` - flag and environment resolution for the CLI
//! - `error` - error kinds and exit codes

pub mod audit;
pub mod client;
pub mod config;
pub mod error;
pub mod output;
pub mod plugin;
pub mod registry;
pub mod report;
pub mod version;

pub use audit::{audit_server, run_audit, AuditOptions};
pub use client::{MattermostClient, PluginInventory, ServerConfig};
pub use error::AuditError;
pub use output::{format_output, OutputFormat};
pub use plugin::{Catalogue, ComponentType, InstalledPlugin, MarketplaceEntry, PluginStatus};
pub use registry::{classify_plugin_source, Provenance, BUNDLED_PLUGINS};
pub use report::{AuditResult, AuditSummary, PluginFinding, UpdateStatus};
pub use version::compare_versions;
