//! Preflight checks for the external tools an image build shells out to.
//!
//! Runs before any git query or engine call so a missing tool is reported
//! up front instead of as a spawn error halfway through.
//!
//! # Example
//!
//! ```rust
//! use hal_image_builder::preflight::{command_exists, check_required_tools};
//!
//! if !command_exists("docker") {
//!     println!("docker not installed");
//! }
//!
//! let tools = &[("git", "git"), ("docker", "docker.io")];
//! if let Err(e) = check_required_tools(tools) {
//!     eprintln!("{}", e);
//! }
//! ```

use crate::error::{Error, Result};

/// Check if a command exists on the host system.
pub fn command_exists(cmd: &str) -> bool {
    which::which(cmd).is_ok()
}

/// Tools every build needs regardless of engine. Each tuple is (command, package).
pub const REQUIRED_TOOLS: &[(&str, &str)] = &[("git", "git")];

/// Check that specific tools are available.
///
/// # Returns
///
/// * `Ok(())` if all tools are found
/// * `Err` with list of missing tools and their packages
pub fn check_required_tools(tools: &[(&str, &str)]) -> Result<()> {
    let missing = tools
        .iter()
        .filter(|(tool, _)| !command_exists(tool))
        .map(|(tool, package)| format!("  {} (install: {})", tool, package))
        .collect::<Vec<_>>();

    if !missing.is_empty() {
        return Err(Error::MissingTools(missing.join("\n")));
    }

    Ok(())
}

/// Check for git plus the selected container engine program.
pub fn check_host_tools(engine: &str) -> Result<()> {
    let mut tools = REQUIRED_TOOLS.to_vec();
    tools.push((engine, engine));
    check_required_tools(&tools)
}
