//! Runtime command composition.
//!
//! Commands are composed as single shell lines. Values are interpolated as-is,
//! so whatever the caller passes in is subject to shell interpretation. This is
//! what makes multi-statement scripts work, and it is also the injection
//! boundary: callers must only pass strings that are safe to embed in a shell
//! line.

use std::fmt;

/// Default runtime CLI binary.
pub const DEFAULT_RUNTIME: &str = "docker";

/// Token prepended to privileged commands.
pub const ELEVATION_TOKEN: &str = "sudo";

/// Container port the host port is mapped to.
pub const SSH_PORT: u16 = 22;

/// A script to run inside a container: one command or a sequence of statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Script {
    /// A single command line, passed through unchanged.
    Line(String),
    /// Ordered statements, joined with `;`.
    Statements(Vec<String>),
}

impl Script {
    /// Render the script as one shell line.
    #[must_use]
    pub fn to_shell_line(&self) -> String {
        match self {
            Self::Line(line) => line.clone(),
            Self::Statements(statements) => statements.join(";"),
        }
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_shell_line())
    }
}

impl From<&str> for Script {
    fn from(line: &str) -> Self {
        Self::Line(line.to_string())
    }
}

impl From<String> for Script {
    fn from(line: String) -> Self {
        Self::Line(line)
    }
}

impl From<&String> for Script {
    fn from(line: &String) -> Self {
        Self::Line(line.clone())
    }
}

impl From<Vec<String>> for Script {
    fn from(statements: Vec<String>) -> Self {
        Self::Statements(statements)
    }
}

impl From<Vec<&str>> for Script {
    fn from(statements: Vec<&str>) -> Self {
        Self::Statements(statements.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for Script {
    fn from(statements: &[&str]) -> Self {
        Self::Statements(statements.iter().map(|s| (*s).to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Script {
    fn from(statements: [&str; N]) -> Self {
        Self::Statements(statements.iter().map(|s| (*s).to_string()).collect())
    }
}

/// Composes command lines for a Docker-compatible runtime CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockerCli {
    program: String,
}

impl DockerCli {
    /// Compose commands for the given runtime binary.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Runtime binary.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// `run -p <port>:22 --name <name> -d --rm <image>`
    #[must_use]
    pub fn run(&self, port: u16, name: &str, image: &str) -> String {
        format!(
            "{} run -p {port}:{SSH_PORT} --name {name} -d --rm {image}",
            self.program
        )
    }

    /// `[sudo ]stop <id>`
    #[must_use]
    pub fn stop(&self, id: &str, sudo: bool) -> String {
        elevate(format!("{} stop {id}", self.program), sudo)
    }

    /// `[sudo ]rm <id>[ -f]`
    #[must_use]
    pub fn remove(&self, id: &str, force: bool, sudo: bool) -> String {
        let mut command = format!("{} rm {id}", self.program);
        if force {
            command.push_str(" -f");
        }
        elevate(command, sudo)
    }

    /// `logs --tail <tail> <id>`
    #[must_use]
    pub fn logs(&self, id: &str, tail: usize) -> String {
        format!("{} logs --tail {tail} {id}", self.program)
    }

    /// `container inspect -f '{{.State.Status}}' <id>`
    #[must_use]
    pub fn status(&self, id: &str) -> String {
        format!(
            "{} container inspect -f '{{{{.State.Status}}}}' {id}",
            self.program
        )
    }

    /// `echo "<script>" | exec --interactive <id> bash -`
    #[must_use]
    pub fn exec(&self, id: &str, script: &Script) -> String {
        format!(
            "echo \"{}\" | {} exec --interactive {id} bash -",
            script.to_shell_line(),
            self.program
        )
    }

    /// `cp <host path> <id>:<container path>`
    #[must_use]
    pub fn copy(&self, host_path: &str, id: &str, container_path: &str) -> String {
        format!("{} cp {host_path} {id}:{container_path}", self.program)
    }
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new(DEFAULT_RUNTIME)
    }
}

fn elevate(command: String, sudo: bool) -> String {
    if sudo {
        format!("{ELEVATION_TOKEN} {command}")
    } else {
        command
    }
}
