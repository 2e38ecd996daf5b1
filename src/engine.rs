//! Container engine collaborator.
//!
//! The engine is queried once for its experimental mode and then runs the
//! build to completion with output streamed straight to the terminal.

use std::process::Command;

use crate::error::{Error, Result};
use crate::invocation::BuildInvocation;

pub const DEFAULT_ENGINE: &str = "docker";

pub trait ContainerEngine {
    /// Whether the engine server runs with experimental features.
    fn experimental_enabled(&self) -> Result<bool>;

    fn build(&self, invocation: &BuildInvocation) -> Result<()>;
}

/// Engine driven through its command-line client (`docker`, or a compatible one).
#[derive(Debug, Clone)]
pub struct CliEngine {
    program: String,
}

impl Default for CliEngine {
    fn default() -> Self {
        Self::new(DEFAULT_ENGINE)
    }
}

impl CliEngine {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn command(&self, invocation: &BuildInvocation) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(invocation.args()).current_dir(&invocation.context_dir);
        cmd
    }

    /// Shell-ready rendering of the build command, for dry runs and logs.
    pub fn render(&self, invocation: &BuildInvocation) -> String {
        std::iter::once(self.program.clone())
            .chain(invocation.args())
            .map(|arg| shell_quote(&arg))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl ContainerEngine for CliEngine {
    fn experimental_enabled(&self) -> Result<bool> {
        let rendered = format!("{} version", self.program);
        let output = Command::new(&self.program)
            .args(["version", "-f", "{{.Server.Experimental}}"])
            .output()
            .map_err(|e| Error::external(&rendered, format!("failed to run: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::external(
                &rendered,
                format!("{} ({})", stderr.trim(), output.status),
            ));
        }

        let experimental = String::from_utf8_lossy(&output.stdout).trim_end() == "true";
        tracing::debug!(engine = %self.program, experimental, "queried engine mode");
        Ok(experimental)
    }

    fn build(&self, invocation: &BuildInvocation) -> Result<()> {
        tracing::info!(
            engine = %self.program,
            tag = %invocation.tag,
            context = %invocation.context_dir.display(),
            "starting image build"
        );
        let status = self
            .command(invocation)
            .status()
            .map_err(|e| Error::external(format!("{} build", self.program), e.to_string()))?;

        if !status.success() {
            return Err(Error::external(
                format!("{} build", self.program),
                format!("exited with {status}"),
            ));
        }
        Ok(())
    }
}

fn shell_quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@,+%".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}
