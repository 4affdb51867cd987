//! The audit engine.
//!
//! [`run_audit`] is a pure function over already fetched inputs: it
//! classifies each installed plugin, checks Marketplace plugins for updates,
//! applies the optional outdated-only filter, sorts and summarises.
//! [`audit_server`] wraps it with the two fetches from a
//! [`PluginInventory`].

use crate::client::PluginInventory;
use crate::error::Result;
use crate::plugin::{Catalogue, ComponentType, InstalledPlugin, PluginStatus};
use crate::registry::{classify_plugin_source, Provenance};
use crate::report::{AuditResult, AuditSummary, PluginFinding, UpdateStatus};
use crate::version::compare_versions;
use tracing::debug;

/// Knobs for a single audit run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuditOptions {
    /// Drop Marketplace plugins that are already current.
    pub outdated_only: bool,
}

/// Fetches installed plugins, then the catalogue, and audits them.
///
/// Either fetch failing aborts the run with that error unchanged.
pub async fn audit_server<I>(inventory: &I, options: &AuditOptions) -> Result<AuditResult>
where
    I: PluginInventory + ?Sized,
{
    debug!("fetching installed plugins");
    let installed = inventory.installed_plugins().await?;
    debug!("found {} installed plugin(s)", installed.len());

    debug!("fetching marketplace catalogue");
    let catalogue = inventory.marketplace_catalogue().await?;
    debug!("marketplace catalogue contains {} plugin(s)", catalogue.len());

    Ok(run_audit(&installed, &catalogue, options))
}

/// Audits `installed` against `catalogue`.
pub fn run_audit(
    installed: &[InstalledPlugin],
    catalogue: &Catalogue,
    options: &AuditOptions,
) -> AuditResult {
    let mut findings: Vec<PluginFinding> = installed
        .iter()
        .map(|plugin| inspect_plugin(plugin, catalogue))
        .collect();

    if options.outdated_only {
        retain_outdated(&mut findings);
    }
    sort_findings(&mut findings);
    let summary = summarize(&findings);

    AuditResult {
        plugins: findings,
        summary,
    }
}

/// Builds the finding for one installed plugin.
pub fn inspect_plugin(plugin: &InstalledPlugin, catalogue: &Catalogue) -> PluginFinding {
    let listing = catalogue.get(&plugin.id);
    let provenance = classify_plugin_source(&plugin.id, listing.is_some(), &plugin.homepage_url);

    let (latest_version, marketplace_url, update_available) = match (provenance, listing) {
        (Provenance::Marketplace, Some(entry)) => {
            let update = if compare_versions(&plugin.version, &entry.version) < 0 {
                UpdateStatus::Available
            } else {
                UpdateStatus::Current
            };
            (entry.version.clone(), entry.homepage_url.clone(), update)
        }
        _ => (String::new(), String::new(), UpdateStatus::Unknown),
    };

    PluginFinding {
        id: plugin.id.clone(),
        name: plugin.name.clone(),
        installed_version: plugin.version.clone(),
        latest_version,
        update_available,
        status: plugin.status,
        component_type: ComponentType::from_components(plugin.has_server, plugin.has_webapp),
        provenance,
        marketplace_url,
    }
}

/// Keeps outdated Marketplace plugins and every non-Marketplace plugin.
pub fn retain_outdated(findings: &mut Vec<PluginFinding>) {
    findings.retain(|f| {
        f.update_available.is_available() || f.provenance != Provenance::Marketplace
    });
}

/// Orders by category rank, then case-insensitive name.
pub fn sort_findings(findings: &mut [PluginFinding]) {
    findings.sort_by(|a, b| {
        a.provenance
            .rank()
            .cmp(&b.provenance.rank())
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
}

/// Counts findings per category, freshness and status.
pub fn summarize(findings: &[PluginFinding]) -> AuditSummary {
    let mut summary = AuditSummary::default();

    for finding in findings {
        summary.total += 1;
        match finding.provenance {
            Provenance::Marketplace => {
                summary.marketplace += 1;
                if finding.update_available.is_available() {
                    summary.outdated += 1;
                } else {
                    summary.up_to_date += 1;
                }
            }
            Provenance::Bundled => {
                summary.bundled += 1;
                summary.unknown += 1;
            }
            Provenance::Mattermost => {
                summary.mattermost_plugin += 1;
                summary.unknown += 1;
            }
            Provenance::ThirdParty => {
                summary.third_party += 1;
                summary.unknown += 1;
            }
        }
        match finding.status {
            PluginStatus::Enabled => summary.enabled += 1,
            PluginStatus::Disabled => summary.disabled += 1,
        }
    }

    summary
}
