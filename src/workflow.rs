//! Resolve a request and assemble the engine invocation for it.

use std::path::Path;

use crate::engine::ContainerEngine;
use crate::error::{Error, Result};
use crate::git::RepositoryMetadata;
use crate::invocation::{BuildInvocation, InvocationBuilder};
use crate::manifest::Manifest;
use crate::resolve::{resolve, Resolution};

/// What the operator asked for on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildRequest {
    pub distribution: String,
    pub version: String,
    pub architecture: String,
    /// Dockerfile stage to build.
    pub stage_target: Option<String>,
    /// Output image name replacing the manifest template.
    pub image_name: Option<String>,
    /// Tag prefix.
    pub designation: Option<String>,
}

/// Resolve `request` and build the invocation, without running the build.
pub fn plan_build(
    manifest: &Manifest,
    metadata: &RepositoryMetadata,
    repo_root: &Path,
    request: &BuildRequest,
    engine: &dyn ContainerEngine,
) -> Result<BuildInvocation> {
    let target = match resolve(
        manifest,
        &request.distribution,
        &request.version,
        &request.architecture,
    ) {
        Resolution::Resolved(target) => target,
        Resolution::NotBuildable => {
            return Err(Error::NotBuildable {
                distribution: request.distribution.clone(),
                version: request.version.clone(),
                architecture: request.architecture.clone(),
            })
        }
    };

    let builder = InvocationBuilder::new(
        target,
        metadata.clone(),
        &manifest.image_name_root,
        repo_root,
    )
    .stage_target(request.stage_target.clone())
    .image_name(request.image_name.clone())
    .designation(request.designation.clone());

    assemble(builder, engine)
}

/// Validate the target, then query the engine and finish the invocation.
///
/// An incomplete target never reaches the engine.
pub fn assemble(
    builder: InvocationBuilder,
    engine: &dyn ContainerEngine,
) -> Result<BuildInvocation> {
    builder.validate()?;
    let plain_progress = engine.experimental_enabled()?;
    builder.plain_progress(plain_progress).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::ResolvedBuildTarget;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct RecordingEngine {
        experimental: bool,
        queries: Cell<usize>,
        builds: RefCell<Vec<String>>,
    }

    impl ContainerEngine for RecordingEngine {
        fn experimental_enabled(&self) -> Result<bool> {
            self.queries.set(self.queries.get() + 1);
            Ok(self.experimental)
        }

        fn build(&self, invocation: &BuildInvocation) -> Result<()> {
            self.builds.borrow_mut().push(invocation.tag.clone());
            Ok(())
        }
    }

    fn manifest() -> Manifest {
        Manifest::from_json(
            r#"{
                "imageNameRoot": "machinekit-hal-@DISTRIBUTION@-builder-v.@TAG@",
                "osVersions": [
                    {"distributionID": "Debian", "distributionCodename": "Buster",
                     "releaseNumber": 10, "baseImage": "debian:buster"}
                ],
                "allowedCombinations": [{"osVersionNumber": 10, "architecture": "amd64"}]
            }"#,
        )
        .unwrap()
    }

    fn metadata() -> RepositoryMetadata {
        RepositoryMetadata {
            commit: "deadbeef".into(),
            author_name: "Jane Doe".into(),
            author_email: "jane@example.com".into(),
            remote_url: "https://example.com/mk-hal.git".into(),
            branch: "master".into(),
        }
    }

    fn request(distribution: &str, version: &str, architecture: &str) -> BuildRequest {
        BuildRequest {
            distribution: distribution.into(),
            version: version.into(),
            architecture: architecture.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_plan_buster_amd64() {
        let engine = RecordingEngine::default();
        let invocation = plan_build(
            &manifest(),
            &metadata(),
            Path::new("/src/mk-hal"),
            &request("debian", "buster", "amd64"),
            &engine,
        )
        .unwrap();

        assert_eq!(
            invocation.tag,
            "machinekit-hal-debian-builder-v.amd64_10:latest"
        );
        assert!(!invocation.plain_progress);
        assert_eq!(engine.queries.get(), 1);
        assert!(engine.builds.borrow().is_empty());
    }

    #[test]
    fn test_plan_unknown_release_is_not_buildable() {
        let engine = RecordingEngine::default();
        let err = plan_build(
            &manifest(),
            &metadata(),
            Path::new("/src"),
            &request("debian", "bullseye", "amd64"),
            &engine,
        )
        .unwrap_err();

        assert!(matches!(err, Error::NotBuildable { .. }));
        assert_eq!(engine.queries.get(), 0);
    }

    #[test]
    fn test_plan_disallowed_architecture_is_not_buildable() {
        let engine = RecordingEngine::default();
        let err = plan_build(
            &manifest(),
            &metadata(),
            Path::new("/src"),
            &request("debian", "buster", "arm64"),
            &engine,
        )
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Wanted combination of debian buster arm64 is not possible to be build."
        );
    }

    #[test]
    fn test_experimental_engine_enables_plain_progress() {
        let engine = RecordingEngine {
            experimental: true,
            ..Default::default()
        };
        let invocation = plan_build(
            &manifest(),
            &metadata(),
            Path::new("/src"),
            &request("Debian", "10", "AMD64"),
            &engine,
        )
        .unwrap();
        assert!(invocation.plain_progress);
        assert!(invocation.args().contains(&"--progress=plain".to_string()));
    }

    #[test]
    fn test_stage_target_and_image_name_kept_apart() {
        let engine = RecordingEngine::default();
        let req = BuildRequest {
            stage_target: Some("base-builder".into()),
            image_name: Some("mk-hal-custom".into()),
            designation: Some("registry.example.com/team/".into()),
            ..request("debian", "buster", "amd64")
        };
        let invocation = plan_build(
            &manifest(),
            &metadata(),
            Path::new("/src"),
            &req,
            &engine,
        )
        .unwrap();

        assert_eq!(invocation.stage_target.as_deref(), Some("base-builder"));
        assert_eq!(
            invocation.tag,
            "registry.example.com/team/mk-hal-custom:latest"
        );
    }

    #[test]
    fn test_incomplete_target_never_reaches_engine() {
        let engine = RecordingEngine::default();
        let target = ResolvedBuildTarget {
            distribution: "debian".into(),
            codename: "buster".into(),
            version: String::new(),
            architecture: "amd64".into(),
            base_image: "debian:buster".into(),
        };
        let builder = InvocationBuilder::new(target, metadata(), "p", Path::new("/src"));

        let err = assemble(builder, &engine).unwrap_err();
        assert!(matches!(err, Error::IncompleteTarget { .. }));
        assert_eq!(engine.queries.get(), 0);
        assert!(engine.builds.borrow().is_empty());
    }
}
