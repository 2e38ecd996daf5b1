//! Builder container images for Machinekit-HAL.
//!
//! Resolves a requested `(distribution, version, architecture)` triple
//! against the repository's declarative manifest and assembles the container
//! engine invocation that builds the matching builder image.
//!
//! # Architecture
//!
//! ```text
//! manifest ──► resolve ──► ResolvedBuildTarget ─┐
//!                                               ├─► InvocationBuilder ──► BuildInvocation ──► engine
//! git ──────► RepositoryMetadata ───────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use hal_image_builder::{plan_build, BuildRequest, CliEngine, Manifest, RepoLayout, RepositoryMetadata};
//!
//! let layout = RepoLayout::discover(Path::new("."))?;
//! let manifest = Manifest::load(&layout.manifest_path())?;
//! let metadata = RepositoryMetadata::query(layout.root())?;
//! let engine = CliEngine::default();
//! let request = BuildRequest {
//!     distribution: "debian".into(),
//!     version: "buster".into(),
//!     architecture: "amd64".into(),
//!     ..Default::default()
//! };
//! let invocation = plan_build(&manifest, &metadata, layout.context_dir(), &request, &engine)?;
//! engine.build(&invocation)?;
//! ```

pub mod engine;
pub mod error;
pub mod git;
pub mod invocation;
pub mod layout;
pub mod manifest;
pub mod preflight;
pub mod resolve;
pub mod telemetry;
pub mod workflow;

pub use engine::{CliEngine, ContainerEngine};
pub use error::{Error, Result};
pub use git::RepositoryMetadata;
pub use invocation::{BuildInvocation, InvocationBuilder};
pub use layout::RepoLayout;
pub use manifest::{AllowedCombination, Manifest, ManifestEntry, ReleaseNumber};
pub use resolve::{resolve, Resolution, ResolvedBuildTarget};
pub use workflow::{plan_build, BuildRequest};
