//! Container engine invocation for a resolved build target.
//!
//! [`InvocationBuilder`] turns a [`ResolvedBuildTarget`] plus repository
//! provenance into an immutable [`BuildInvocation`]: the image tag, the two
//! build arguments the Dockerfile expects, the descriptive labels and the
//! engine flags.

use std::path::{Path, PathBuf};

use time::OffsetDateTime;

use crate::error::{Error, Result};
use crate::git::RepositoryMetadata;
use crate::layout::DOCKERFILE_RELATIVE;
use crate::resolve::ResolvedBuildTarget;

pub const DISTRIBUTION_PLACEHOLDER: &str = "@DISTRIBUTION@";
pub const TAG_PLACEHOLDER: &str = "@TAG@";
pub const VERSION_SUFFIX: &str = "latest";

pub const BASE_IMAGE_ARG: &str = "DEBIAN_DISTRO_BASE";
pub const ARCHITECTURE_ARG: &str = "HOST_ARCHITECTURE";

pub const LABEL_NAMESPACE: &str = "io.machinekit.machinekit-hal";

/// Everything handed to `<engine> build`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInvocation {
    /// Full tag including the `:latest` suffix.
    pub tag: String,
    pub build_args: Vec<(String, String)>,
    pub labels: Vec<(String, String)>,
    pub dockerfile: PathBuf,
    pub context_dir: PathBuf,
    pub stage_target: Option<String>,
    pub plain_progress: bool,
}

impl BuildInvocation {
    /// Arguments after the engine program, in the order the engine receives them.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec!["build".to_string()];

        for (key, value) in &self.build_args {
            args.push("--build-arg".to_string());
            args.push(format!("{key}={value}"));
        }
        for (key, value) in &self.labels {
            args.push("--label".to_string());
            args.push(format!("{key}={value}"));
        }

        args.push("--file".to_string());
        args.push(self.dockerfile.display().to_string());
        args.push("--tag".to_string());
        args.push(self.tag.clone());

        // Experimental engines interleave progress output in dumb terminals.
        if self.plain_progress {
            args.push("--progress=plain".to_string());
        }
        if let Some(stage) = &self.stage_target {
            args.push("--target".to_string());
            args.push(stage.clone());
        }

        args.push(self.context_dir.display().to_string());
        args
    }

    pub fn label(&self, name: &str) -> Option<&str> {
        let key = label_key(name);
        self.labels
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Builder for a [`BuildInvocation`].
pub struct InvocationBuilder {
    target: ResolvedBuildTarget,
    metadata: RepositoryMetadata,
    tag_template: String,
    repo_root: PathBuf,
    stage_target: Option<String>,
    image_name: Option<String>,
    designation: Option<String>,
    plain_progress: bool,
    build_date: Option<OffsetDateTime>,
}

impl InvocationBuilder {
    pub fn new(
        target: ResolvedBuildTarget,
        metadata: RepositoryMetadata,
        tag_template: &str,
        repo_root: &Path,
    ) -> Self {
        Self {
            target,
            metadata,
            tag_template: tag_template.to_string(),
            repo_root: repo_root.to_path_buf(),
            stage_target: None,
            image_name: None,
            designation: None,
            plain_progress: false,
            build_date: None,
        }
    }

    /// Dockerfile stage to stop at (`--target`).
    pub fn stage_target(mut self, stage: Option<String>) -> Self {
        self.stage_target = stage;
        self
    }

    /// Use this name instead of the manifest template.
    pub fn image_name(mut self, name: Option<String>) -> Self {
        self.image_name = name;
        self
    }

    /// Registry/namespace prefix for the tag.
    pub fn designation(mut self, designation: Option<String>) -> Self {
        self.designation = designation;
        self
    }

    pub fn plain_progress(mut self, enabled: bool) -> Self {
        self.plain_progress = enabled;
        self
    }

    pub fn build_date(mut self, date: OffsetDateTime) -> Self {
        self.build_date = Some(date);
        self
    }

    /// Check the target is fully armed.
    pub fn validate(&self) -> Result<()> {
        let missing = self.target.missing_fields();
        if !missing.is_empty() {
            return Err(Error::IncompleteTarget { missing });
        }
        Ok(())
    }

    pub fn build(self) -> Result<BuildInvocation> {
        self.validate()?;

        let name = self.tag_base();
        let tag = format!("{name}:{VERSION_SUFFIX}");
        let build_date =
            format_build_date(self.build_date.unwrap_or_else(OffsetDateTime::now_utc));

        let build_args = vec![
            (BASE_IMAGE_ARG.to_string(), self.target.base_image.clone()),
            (ARCHITECTURE_ARG.to_string(), self.target.architecture.clone()),
        ];

        let labels = vec![
            (label_key("name"), name),
            (label_key("maintainer"), self.metadata.maintainer()),
            (label_key("description"), self.description()),
            (label_key("build-date"), build_date),
            (label_key("vcs-ref"), self.metadata.commit.clone()),
            (label_key("vcs-branch"), self.metadata.branch.clone()),
            (label_key("vcs-url"), self.metadata.remote_url.clone()),
        ];

        let invocation = BuildInvocation {
            tag,
            build_args,
            labels,
            dockerfile: self.repo_root.join(DOCKERFILE_RELATIVE),
            context_dir: self.repo_root,
            stage_target: self.stage_target,
            plain_progress: self.plain_progress,
        };
        tracing::debug!(tag = %invocation.tag, "assembled build invocation");
        Ok(invocation)
    }

    /// Tag without the version suffix.
    fn tag_base(&self) -> String {
        let name = match &self.image_name {
            Some(name) => name.clone(),
            None => self
                .tag_template
                .replace(DISTRIBUTION_PLACEHOLDER, &self.target.distribution)
                .replace(TAG_PLACEHOLDER, &composite_token(&self.target)),
        };
        match &self.designation {
            Some(prefix) => format!("{}/{}", prefix.trim_end_matches('/'), name),
            None => name,
        }
    }

    fn description(&self) -> String {
        format!(
            "Machinekit-HAL {} {} Docker image for {} architecture.",
            capitalize(&self.target.distribution),
            capitalize(&self.target.codename),
            self.target.architecture
        )
    }
}

/// `<architecture>_<version>`, substituted for `@TAG@`.
pub fn composite_token(target: &ResolvedBuildTarget) -> String {
    format!("{}_{}", target.architecture, target.version)
}

fn label_key(name: &str) -> String {
    format!("{LABEL_NAMESPACE}.{name}")
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn format_build_date(date: OffsetDateTime) -> String {
    let utc = date.to_offset(time::UtcOffset::UTC);
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        utc.year(),
        utc.month() as u8,
        utc.day(),
        utc.hour(),
        utc.minute(),
        utc.second()
    )
}
