//! Version comparison for installed plugins against the Marketplace.
//!
//! Versions are compared as semantic versions when both sides parse. The
//! accepted dialect is `v` + `MAJOR[.MINOR[.PATCH]]` with optional
//! pre-release and build suffixes; the shorthand forms `v1` and `v1.2` are
//! padded with zeros but may not carry a suffix. Build metadata never affects
//! ordering.
//!
//! When either side is not a valid version the comparison degrades to byte
//! equality and reports "older" for any mismatch, so a garbled version string
//! never hides a possible update.
//!
//! Numeric components are limited to `u64`. A larger component such as
//! `99999999999999999999.0.0` does not parse and takes the fallback path,
//! whereas Go's `x/mod/semver` would order it numerically.

use semver::Version;
use std::cmp::Ordering;

/// Prepends `v` to a non-empty version that lacks it.
pub fn normalize_version(version: &str) -> String {
    if version.is_empty() {
        return String::new();
    }
    if version.starts_with('v') {
        version.to_string()
    } else {
        format!("v{}", version)
    }
}

/// Parses a normalized (`v`-prefixed) version string.
fn parse_normalized(normalized: &str) -> Option<Version> {
    let body = normalized.strip_prefix('v')?;
    let core_end = body.find(|c| c == '-' || c == '+').unwrap_or(body.len());
    let (core, suffix) = body.split_at(core_end);

    let components = core.split('.').count();
    match components {
        3 => Version::parse(body).ok(),
        1 | 2 if suffix.is_empty() => {
            let padded = format!("{}{}", core, ".0".repeat(3 - components));
            Version::parse(&padded).ok()
        }
        _ => None,
    }
}

/// Returns true when `version` is a valid semantic version, with or without
/// the leading `v`.
pub fn is_valid_version(version: &str) -> bool {
    parse_normalized(&normalize_version(version)).is_some()
}

/// Compares an installed version with the latest published one.
///
/// Returns -1 if `installed` is older than `latest`, 0 if they are equal and
/// 1 if `installed` is newer. Never fails: malformed input yields 0 for
/// byte-identical strings and -1 otherwise.
pub fn compare_versions(installed: &str, latest: &str) -> i32 {
    let parsed = (
        parse_normalized(&normalize_version(installed)),
        parse_normalized(&normalize_version(latest)),
    );

    match parsed {
        (Some(installed_version), Some(latest_version)) => {
            match installed_version.cmp_precedence(&latest_version) {
                Ordering::Less => -1,
                Ordering::Equal => 0,
                Ordering::Greater => 1,
            }
        }
        _ if installed == latest => 0,
        _ => -1,
    }
}
