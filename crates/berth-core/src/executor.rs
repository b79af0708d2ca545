//! Shell command execution.
//!
//! Every runtime interaction is a single shell command line. The
//! [`CommandExecutor`] trait is the seam between command composition and
//! process spawning, so handles can be driven by a real shell or by the
//! in-memory [`FakeExecutor`].

use std::fmt;
use std::io;
use std::process::{Command, Stdio};

use parking_lot::Mutex;
use tracing::debug;

use crate::output::ProcessOutput;

/// Default shell used to interpret command lines.
pub const DEFAULT_SHELL: &str = "sh";

/// Runs shell command lines and captures their output.
pub trait CommandExecutor: Send + Sync + fmt::Debug {
    /// Run `command_line` through a shell and wait for it to exit.
    ///
    /// A non-zero exit is reported through [`ProcessOutput::exit_code`], not
    /// as an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the shell could not be spawned or waited on.
    fn run(&self, command_line: &str) -> io::Result<ProcessOutput>;
}

/// Executes command lines with `sh -c`, blocking until they exit.
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    shell: String,
}

impl ShellExecutor {
    /// Create an executor using the default shell.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shell: DEFAULT_SHELL.to_string(),
        }
    }

    /// Create an executor using a specific shell binary.
    #[must_use]
    pub fn with_shell(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }

    /// Get the shell binary.
    #[must_use]
    pub fn shell(&self) -> &str {
        &self.shell
    }
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandExecutor for ShellExecutor {
    fn run(&self, command_line: &str) -> io::Result<ProcessOutput> {
        debug!(shell = %self.shell, command = %command_line, "running command");

        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(command_line)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;

        let result = ProcessOutput {
            command: command_line.to_string(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        debug!(command = %command_line, exit_code = ?result.exit_code, "command finished");
        Ok(result)
    }
}

#[derive(Debug, Clone)]
enum Reply {
    Output(ProcessOutput),
    SpawnError(String),
}

/// In-memory executor for testing.
///
/// Records every command line it is asked to run and answers with the first
/// scripted reply whose pattern is a substring of the command line. Commands
/// with no matching reply succeed with empty output.
#[derive(Debug, Default)]
pub struct FakeExecutor {
    replies: Mutex<Vec<(String, Reply)>>,
    commands: Mutex<Vec<String>>,
}

impl FakeExecutor {
    /// Create a fake executor with no scripted replies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with `output` to commands containing `pattern`.
    #[must_use]
    pub fn with_reply(self, pattern: impl Into<String>, output: ProcessOutput) -> Self {
        self.replies
            .lock()
            .push((pattern.into(), Reply::Output(output)));
        self
    }

    /// Reply with a successful exit and the given stdout.
    #[must_use]
    pub fn with_stdout(self, pattern: impl Into<String>, stdout: impl Into<String>) -> Self {
        self.with_reply(pattern, ProcessOutput::success_with("", stdout))
    }

    /// Reply with a non-zero exit and the given stderr.
    #[must_use]
    pub fn with_failure(
        self,
        pattern: impl Into<String>,
        exit_code: i32,
        stderr: impl Into<String>,
    ) -> Self {
        self.with_reply(pattern, ProcessOutput::failure_with("", exit_code, stderr))
    }

    /// Fail to spawn commands containing `pattern`.
    #[must_use]
    pub fn with_spawn_error(self, pattern: impl Into<String>, message: impl Into<String>) -> Self {
        self.replies
            .lock()
            .push((pattern.into(), Reply::SpawnError(message.into())));
        self
    }

    /// Every command line run so far, in order.
    #[must_use]
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().clone()
    }

    /// Number of commands run that contain `pattern`.
    #[must_use]
    pub fn count_matching(&self, pattern: &str) -> usize {
        self.commands
            .lock()
            .iter()
            .filter(|c| c.contains(pattern))
            .count()
    }

    /// Most recently run command line.
    #[must_use]
    pub fn last_command(&self) -> Option<String> {
        self.commands.lock().last().cloned()
    }
}

impl CommandExecutor for FakeExecutor {
    fn run(&self, command_line: &str) -> io::Result<ProcessOutput> {
        self.commands.lock().push(command_line.to_string());

        let reply = self
            .replies
            .lock()
            .iter()
            .find(|(pattern, _)| command_line.contains(pattern.as_str()))
            .map(|(_, reply)| reply.clone());

        match reply {
            Some(Reply::Output(output)) => Ok(ProcessOutput {
                command: command_line.to_string(),
                ..output
            }),
            Some(Reply::SpawnError(message)) => Err(io::Error::other(message)),
            None => Ok(ProcessOutput::success_with(command_line, "")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_executor_default_shell() {
        assert_eq!(ShellExecutor::new().shell(), "sh");
        assert_eq!(ShellExecutor::with_shell("bash").shell(), "bash");
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_executor_captures_streams() {
        let out = ShellExecutor::new()
            .run("echo hello; echo oops >&2; exit 3")
            .expect("sh should be available");
        assert_eq!(out.stdout, "hello\n");
        assert_eq!(out.stderr, "oops\n");
        assert_eq!(out.exit_code, Some(3));
        assert!(!out.success());
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_executor_interprets_pipes() {
        let out = ShellExecutor::new()
            .run("echo \"a;b\" | tr ';' ','")
            .expect("sh should be available");
        assert!(out.success());
        assert_eq!(out.stdout_trimmed(), "a,b");
    }

    #[test]
    fn test_shell_executor_missing_shell() {
        let result = ShellExecutor::with_shell("/definitely/not/a/shell").run("true");
        assert!(result.is_err());
    }

    #[test]
    fn test_fake_records_commands() {
        let fake = FakeExecutor::new();
        fake.run("docker stop a").expect("fake run");
        fake.run("docker rm a").expect("fake run");
        assert_eq!(fake.commands(), vec!["docker stop a", "docker rm a"]);
        assert_eq!(fake.last_command().as_deref(), Some("docker rm a"));
        assert_eq!(fake.count_matching("docker"), 2);
    }

    #[test]
    fn test_fake_default_reply_succeeds() {
        let out = FakeExecutor::new().run("anything").expect("fake run");
        assert!(out.success());
        assert!(out.stdout.is_empty());
        assert_eq!(out.command, "anything");
    }

    #[test]
    fn test_fake_first_matching_reply_wins() {
        let fake = FakeExecutor::new()
            .with_stdout("run", "first")
            .with_stdout("run -p", "second");
        let out = fake.run("docker run -p 1:22").expect("fake run");
        assert_eq!(out.stdout, "first");
        assert_eq!(out.command, "docker run -p 1:22");
    }

    #[test]
    fn test_fake_failure_and_spawn_error() {
        let fake = FakeExecutor::new()
            .with_failure("cp", 1, "no such file")
            .with_spawn_error("logs", "broken pipe");

        let out = fake.run("docker cp a b:c").expect("fake run");
        assert_eq!(out.exit_code, Some(1));
        assert_eq!(out.stderr, "no such file");

        assert!(fake.run("docker logs a").is_err());
        assert_eq!(fake.commands().len(), 2);
    }
}
