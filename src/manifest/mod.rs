//! Declarative build manifest.
//!
//! The manifest lives at `scripts/debian-distro-settings.json` in the
//! Machinekit-HAL repository and lists the supported OS releases, the
//! release × architecture combinations the project is willing to build and
//! the tag template for the resulting images.
//!
//! ```json
//! {
//!   "imageNameRoot": "machinekit-hal-@DISTRIBUTION@-builder-v.@TAG@",
//!   "osVersions": [
//!     { "distributionID": "Debian", "distributionCodename": "Buster",
//!       "releaseNumber": 10, "baseImage": "debian:buster" }
//!   ],
//!   "allowedCombinations": [
//!     { "osVersionNumber": 10, "architecture": "amd64" }
//!   ]
//! }
//! ```

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Numeric release version as written in the manifest.
///
/// Comparisons against allowed combinations go through [`ReleaseNumber::value`];
/// matching a requested version string goes through `Display`, which keeps the
/// manifest's own spelling (`18.04`, `10`, `10.0`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct ReleaseNumber(serde_json::Number);

impl ReleaseNumber {
    pub fn from_f64(value: f64) -> Option<Self> {
        serde_json::Number::from_f64(value).map(Self)
    }

    pub fn value(&self) -> f64 {
        // Integers above 2^53 lose precision here; release numbers never get close.
        self.0.as_f64().unwrap_or(f64::NAN)
    }
}

impl fmt::Display for ReleaseNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// One supported OS release.
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestEntry {
    #[serde(rename = "distributionID")]
    pub distribution_id: String,
    #[serde(rename = "distributionCodename")]
    pub codename: String,
    #[serde(rename = "releaseNumber")]
    pub release_number: ReleaseNumber,
    #[serde(rename = "baseImage")]
    pub base_image: String,
}

/// A release × architecture pair the project builds images for.
#[derive(Debug, Clone, Deserialize)]
pub struct AllowedCombination {
    #[serde(rename = "osVersionNumber")]
    pub os_version_number: ReleaseNumber,
    pub architecture: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    #[serde(rename = "osVersions")]
    pub os_versions: Vec<ManifestEntry>,
    #[serde(rename = "allowedCombinations")]
    pub allowed_combinations: Vec<AllowedCombination>,
    /// Tag template with `@DISTRIBUTION@` and `@TAG@` placeholders.
    #[serde(rename = "imageNameRoot")]
    pub image_name_root: String,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| Error::Manifest {
            path: path.to_path_buf(),
            reason: format!("reading: {e}"),
        })?;
        let manifest: Manifest = serde_json::from_slice(&bytes).map_err(|e| Error::Manifest {
            path: path.to_path_buf(),
            reason: format!("parsing: {e}"),
        })?;
        tracing::debug!(
            path = %path.display(),
            releases = manifest.os_versions.len(),
            combinations = manifest.allowed_combinations.len(),
            "loaded build manifest"
        );
        Ok(manifest)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
