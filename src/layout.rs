//! Well-known paths inside a Machinekit-HAL checkout.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const MANIFEST_RELATIVE: &str = "scripts/debian-distro-settings.json";
pub const DOCKERFILE_RELATIVE: &str = "scripts/containers/buildsystem/debian/Dockerfile";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLayout {
    root: PathBuf,
}

impl RepoLayout {
    /// Canonicalize `path` and require the build manifest underneath it.
    pub fn discover(path: &Path) -> Result<Self> {
        let root = path.canonicalize().map_err(|e| Error::NotARepository {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let layout = Self { root };
        if !layout.manifest_path().is_file() {
            return Err(Error::NotARepository {
                path: layout.root,
                reason: format!("missing '{MANIFEST_RELATIVE}'"),
            });
        }
        Ok(layout)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_RELATIVE)
    }

    /// Build context handed to the engine; also its working directory.
    pub fn context_dir(&self) -> &Path {
        &self.root
    }
}
