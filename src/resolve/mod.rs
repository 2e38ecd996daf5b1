//! Build-target resolution against the manifest.
//!
//! A request `(distribution, version-or-codename, architecture)` is buildable
//! when some manifest entry matches the distribution and version, and some
//! allowed combination matches that entry's release number and the requested
//! architecture. Entries are scanned in manifest order and the first matching
//! entry/combination pair wins; no further disambiguation is attempted.

use crate::manifest::{AllowedCombination, Manifest, ManifestEntry};

/// Relative tolerance for comparing release numbers.
///
/// Release numbers are stored as floats (`18.04`), so two spellings of the
/// same release are compared numerically rather than for exact equality.
pub const RELEASE_REL_TOLERANCE: f64 = 1e-5;

/// A fully resolved ("armed") build target. All fields are lower-case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBuildTarget {
    pub distribution: String,
    pub codename: String,
    /// Release number in the manifest's own spelling.
    pub version: String,
    pub architecture: String,
    pub base_image: String,
}

impl ResolvedBuildTarget {
    /// Names of the fields that are empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("distribution", &self.distribution),
            ("codename", &self.codename),
            ("version", &self.version),
            ("architecture", &self.architecture),
            ("base_image", &self.base_image),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(ResolvedBuildTarget),
    NotBuildable,
}

impl Resolution {
    pub fn into_target(self) -> Option<ResolvedBuildTarget> {
        match self {
            Resolution::Resolved(target) => Some(target),
            Resolution::NotBuildable => None,
        }
    }
}

/// Resolve a requested combination against the manifest.
pub fn resolve(
    manifest: &Manifest,
    distribution: &str,
    version: &str,
    architecture: &str,
) -> Resolution {
    for entry in manifest
        .os_versions
        .iter()
        .filter(|entry| entry_matches(entry, distribution, version))
    {
        if let Some(combination) = manifest
            .allowed_combinations
            .iter()
            .find(|combination| combination_matches(entry, combination, architecture))
        {
            let target = ResolvedBuildTarget {
                distribution: entry.distribution_id.to_lowercase(),
                codename: entry.codename.to_lowercase(),
                version: entry.release_number.to_string(),
                architecture: combination.architecture.to_lowercase(),
                base_image: entry.base_image.to_lowercase(),
            };
            tracing::debug!(?target, "resolved build target");
            return Resolution::Resolved(target);
        }
        tracing::debug!(
            distribution = %entry.distribution_id,
            release = %entry.release_number,
            architecture,
            "release matched but no allowed combination for architecture"
        );
    }

    Resolution::NotBuildable
}

fn entry_matches(entry: &ManifestEntry, distribution: &str, version: &str) -> bool {
    entry.distribution_id.to_lowercase() == distribution.to_lowercase()
        && (entry.codename.to_lowercase() == version.to_lowercase()
            || entry.release_number.to_string() == version)
}

fn combination_matches(
    entry: &ManifestEntry,
    combination: &AllowedCombination,
    architecture: &str,
) -> bool {
    releases_close(
        entry.release_number.value(),
        combination.os_version_number.value(),
    ) && combination.architecture.to_lowercase() == architecture.to_lowercase()
}

/// Relative closeness with no absolute tolerance.
pub fn releases_close(a: f64, b: f64) -> bool {
    if a == b {
        return true;
    }
    if !a.is_finite() || !b.is_finite() {
        return false;
    }
    (a - b).abs() <= RELEASE_REL_TOLERANCE * a.abs().max(b.abs())
}
