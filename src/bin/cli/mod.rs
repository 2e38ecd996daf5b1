use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{ArgAction, Parser};
use hal_image_builder::engine::DEFAULT_ENGINE;
use hal_image_builder::BuildRequest;

#[derive(Parser, Debug)]
#[command(name = "buildcontainerimage")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build container images for Machinekit-HAL", long_about = None)]
pub(crate) struct Cli {
    /// Path to root of Machinekit-HAL repository
    #[arg(short, long, default_value = ".", env = "HAL_REPO_PATH")]
    pub(crate) path: PathBuf,

    /// Distribution name for which the image will be built
    #[arg(value_name = "DISTRIBUTION")]
    pub(crate) distribution: String,

    /// Distribution version or codename for which the image will be built
    #[arg(value_name = "VERSION")]
    pub(crate) release: String,

    /// Architecture for which the image will be built
    #[arg(value_name = "ARCHITECTURE")]
    pub(crate) architecture: String,

    /// Dockerfile target to build and name of the image without prefix
    #[arg(
        short,
        long,
        num_args = 2,
        action = ArgAction::Set,
        value_names = ["TARGET", "NAME"],
        overrides_with = "target"
    )]
    pub(crate) target: Option<Vec<String>>,

    /// Prefix to use when tagging the image
    #[arg(short, long)]
    pub(crate) designation: Option<String>,

    /// Container engine client to invoke
    #[arg(long, default_value = DEFAULT_ENGINE, env = "HAL_CONTAINER_ENGINE")]
    pub(crate) engine: String,

    /// Print the engine command instead of running it (the engine is still
    /// queried for experimental mode)
    #[arg(long)]
    pub(crate) dry_run: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl Cli {
    /// `--target` carries the Dockerfile stage first and the image name second.
    pub(crate) fn build_request(&self) -> Result<BuildRequest> {
        let (stage_target, image_name) = match self.target.as_deref() {
            None => (None, None),
            Some([stage, name]) => (Some(stage.clone()), Some(name.clone())),
            Some(other) => bail!(
                "--target expects TARGET NAME, got {} value(s): {:?}",
                other.len(),
                other
            ),
        };
        Ok(BuildRequest {
            distribution: self.distribution.clone(),
            version: self.release.clone(),
            architecture: self.architecture.clone(),
            stage_target,
            image_name,
            designation: self.designation.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("buildcontainerimage").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_positional_arguments() {
        let cli = parse(&["debian", "buster", "amd64"]);
        let request = cli.build_request().unwrap();
        assert_eq!(request.distribution, "debian");
        assert_eq!(request.version, "buster");
        assert_eq!(request.architecture, "amd64");
        assert_eq!(request.stage_target, None);
        assert_eq!(request.image_name, None);
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_target_is_stage_then_name() {
        let cli = parse(&[
            "--target",
            "runtime-stage",
            "mk-hal-runtime",
            "debian",
            "buster",
            "amd64",
        ]);
        let request = cli.build_request().unwrap();
        assert_eq!(request.stage_target.as_deref(), Some("runtime-stage"));
        assert_eq!(request.image_name.as_deref(), Some("mk-hal-runtime"));
    }

    #[test]
    fn test_target_requires_two_values() {
        let result = Cli::try_parse_from([
            "buildcontainerimage",
            "debian",
            "buster",
            "amd64",
            "--target",
            "only-stage",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_designation_and_path() {
        let cli = parse(&[
            "-p",
            "/srv/machinekit-hal",
            "-d",
            "registry.example.com/team/",
            "ubuntu",
            "18.04",
            "arm64",
        ]);
        assert_eq!(cli.path, PathBuf::from("/srv/machinekit-hal"));
        assert_eq!(
            cli.build_request().unwrap().designation.as_deref(),
            Some("registry.example.com/team/")
        );
    }

    #[test]
    fn test_command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_version_flag_still_available() {
        let err = Cli::try_parse_from(["buildcontainerimage", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_repeated_target_last_pair_wins() {
        let cli = parse(&[
            "--target",
            "first-stage",
            "first-name",
            "--target",
            "second-stage",
            "second-name",
            "debian",
            "buster",
            "amd64",
        ]);
        let request = cli.build_request().unwrap();
        assert_eq!(request.stage_target.as_deref(), Some("second-stage"));
        assert_eq!(request.image_name.as_deref(), Some("second-name"));
    }

    #[test]
    fn test_dry_run_help_mentions_engine_query() {
        let command = Cli::command();
        let dry_run = command
            .get_arguments()
            .find(|arg| arg.get_id() == "dry_run")
            .unwrap();
        let help = dry_run.get_help().unwrap().to_string();
        assert!(help.contains("queried for experimental mode"));
    }

    #[test]
    fn test_missing_positional_rejected() {
        assert!(Cli::try_parse_from(["buildcontainerimage", "debian", "buster"]).is_err());
    }
}
