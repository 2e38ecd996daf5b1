//! Version-control provenance for image labels.

use std::path::Path;
use std::process::Command;

use crate::error::{Error, Result};

/// Commit and remote information captured once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryMetadata {
    pub commit: String,
    pub author_name: String,
    pub author_email: String,
    pub remote_url: String,
    pub branch: String,
}

impl RepositoryMetadata {
    /// Query git in `repo_dir`. Every query is required.
    pub fn query(repo_dir: &Path) -> Result<Self> {
        let metadata = Self {
            commit: git_output(repo_dir, &["rev-parse", "HEAD"])?,
            author_name: git_output(repo_dir, &["show", "-s", "--pretty=%an", "HEAD"])?,
            author_email: git_output(repo_dir, &["show", "-s", "--format=%ae", "HEAD"])?,
            remote_url: git_output(repo_dir, &["ls-remote", "--get-url"])?,
            branch: git_output(repo_dir, &["rev-parse", "--abbrev-ref", "HEAD"])?,
        };
        tracing::debug!(
            commit = %metadata.commit,
            branch = %metadata.branch,
            remote = %metadata.remote_url,
            "captured repository metadata"
        );
        Ok(metadata)
    }

    /// `Name <email>` as used for the maintainer label.
    pub fn maintainer(&self) -> String {
        format!("{} <{}>", self.author_name, self.author_email)
    }
}

fn git_output(repo_dir: &Path, args: &[&str]) -> Result<String> {
    let rendered = format!("git {}", args.join(" "));
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_dir)
        .output()
        .map_err(|e| Error::external(&rendered, format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::external(
            &rendered,
            format!("{} ({})", stderr.trim(), output.status),
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
