//! Handle to a launched container.
//!
//! Every operation composes one runtime command addressed by the container's
//! short identifier and runs it synchronously. Nothing is cached: the runtime
//! is the only source of truth for whether the container is still running.
//!
//! Most operations hand back the raw [`ProcessOutput`] and leave judging
//! success to the caller. [`ContainerHandle::add_files`] and
//! [`ContainerHandle::add_public_key`] are the exceptions and fail on their
//! own terms.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::command::{DockerCli, Script};
use crate::error::{ContainerError, ContainerResult};
use crate::executor::CommandExecutor;
use crate::output::ProcessOutput;
use crate::spec::ContainerSpec;

/// Length of the short identifier used to address a container.
pub const SHORT_ID_LEN: usize = 12;

/// Default number of log lines returned by [`ContainerHandle::logs`].
pub const DEFAULT_LOG_TAIL: usize = 100;

/// Authorized keys file used by [`ContainerHandle::add_public_key`].
pub const DEFAULT_AUTHORIZED_KEYS: &str = "/root/.ssh/authorized_keys";

/// A running (or previously running) container.
///
/// Dropping the handle stops the container when the originating spec had
/// `stop_after_completion` set. That stop is best effort: it blocks until the
/// runtime returns and its outcome is only logged.
pub struct ContainerHandle {
    config: Arc<ContainerSpec>,
    executor: Arc<dyn CommandExecutor>,
    cli: DockerCli,
    docker_identifier: String,
    name: String,
    sudo: bool,
}

impl ContainerHandle {
    pub(crate) fn new(
        config: Arc<ContainerSpec>,
        executor: Arc<dyn CommandExecutor>,
        docker_identifier: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let cli = config.cli();
        Self {
            config,
            executor,
            cli,
            docker_identifier: docker_identifier.into(),
            name: name.into(),
            sudo: false,
        }
    }

    /// Display name, `{configured name}-{suffix}`.
    ///
    /// This is not the name the runtime knows the container by; that is the
    /// bare configured name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Spec this container was launched from.
    #[must_use]
    pub fn config(&self) -> &ContainerSpec {
        &self.config
    }

    /// Full identifier printed by the runtime at launch.
    #[must_use]
    pub fn docker_identifier(&self) -> &str {
        &self.docker_identifier
    }

    /// First 12 characters of the identifier, or all of it if shorter.
    #[must_use]
    pub fn short_docker_identifier(&self) -> &str {
        short_identifier(&self.docker_identifier)
    }

    /// Whether `stop` and `remove` are run with elevated privileges.
    #[must_use]
    pub fn uses_sudo(&self) -> bool {
        self.sudo
    }

    /// Prefix `stop` and `remove` with `sudo`.
    ///
    /// `logs`, `status`, `execute` and `add_files` are unaffected.
    pub fn use_sudo(&mut self) -> &mut Self {
        self.sudo = true;
        self
    }

    /// Stop the container.
    ///
    /// Stopping a container that is already gone is not an error; inspect the
    /// returned output if it matters.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::Spawn`] if the command could not be run.
    pub fn stop(&self) -> ContainerResult<ProcessOutput> {
        let command = self.cli.stop(self.short_docker_identifier(), self.sudo);
        self.run(&command)
    }

    /// Remove the container, with `-f` when `force` is set.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::Spawn`] if the command could not be run.
    pub fn remove(&self, force: bool) -> ContainerResult<ProcessOutput> {
        let command = self
            .cli
            .remove(self.short_docker_identifier(), force, self.sudo);
        self.run(&command)
    }

    /// Fetch the last `tail` lines of the container's logs.
    ///
    /// Both streams are returned; the runtime writes the container's stderr to
    /// its own stderr.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::Spawn`] if the command could not be run.
    pub fn logs(&self, tail: usize) -> ContainerResult<ProcessOutput> {
        let command = self.cli.logs(self.short_docker_identifier(), tail);
        self.run(&command)
    }

    /// The container's `.State.Status` as printed by the runtime.
    ///
    /// An unknown container usually yields an empty string.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::Spawn`] if the command could not be run.
    pub fn status(&self) -> ContainerResult<String> {
        let command = self.cli.status(self.short_docker_identifier());
        let output = self.run(&command)?;
        Ok(output.stdout_trimmed().to_string())
    }

    /// Pipe a script into `bash` inside the container.
    ///
    /// Statement sequences are joined with `;`. The script is embedded in a
    /// double-quoted shell string without escaping.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::Spawn`] if the command could not be run.
    pub fn execute(&self, script: impl Into<Script>) -> ContainerResult<ProcessOutput> {
        let command = self
            .cli
            .exec(self.short_docker_identifier(), &script.into());
        self.run(&command)
    }

    /// Append a public key to `/root/.ssh/authorized_keys` inside the container.
    ///
    /// # Errors
    ///
    /// See [`add_public_key_to`](Self::add_public_key_to).
    pub fn add_public_key(&self, path_to_public_key: impl AsRef<Path>) -> ContainerResult<&Self> {
        self.add_public_key_to(path_to_public_key, DEFAULT_AUTHORIZED_KEYS)
    }

    /// Append a public key to an authorized keys file inside the container,
    /// then restrict it to `600` and `root:root`.
    ///
    /// The exit status of the in-container commands is not checked.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::FileReadFailed`] before touching the
    /// container if the key file cannot be read, or [`ContainerError::Spawn`]
    /// if a command could not be run.
    pub fn add_public_key_to(
        &self,
        path_to_public_key: impl AsRef<Path>,
        path_to_authorized_keys: &str,
    ) -> ContainerResult<&Self> {
        let path = path_to_public_key.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|source| ContainerError::FileReadFailed {
                path: path.to_path_buf(),
                source,
            })?;
        let public_key = contents.trim();

        self.execute(format!("echo '{public_key}' >> {path_to_authorized_keys}"))?;
        self.execute(format!("chmod 600 {path_to_authorized_keys}"))?;
        self.execute(format!("chown root:root {path_to_authorized_keys}"))?;

        info!(
            id = %self.short_docker_identifier(),
            key = %path.display(),
            authorized_keys = %path_to_authorized_keys,
            "public key installed"
        );
        Ok(self)
    }

    /// Copy a file or directory from the host into the container.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::CopyFailed`] if the runtime exits non-zero,
    /// or [`ContainerError::Spawn`] if the command could not be run.
    pub fn add_files(&self, host_path: &str, container_path: &str) -> ContainerResult<&Self> {
        let id = self.short_docker_identifier();
        let command = self.cli.copy(host_path, id, container_path);
        let output = self.run(&command)?;

        if !output.success() {
            return Err(ContainerError::CopyFailed {
                source_path: host_path.to_string(),
                destination: format!("{id}:{container_path}"),
                exit_code: output.exit_code,
                output: output.combined(),
            });
        }

        Ok(self)
    }

    fn run(&self, command: &str) -> ContainerResult<ProcessOutput> {
        debug!(id = %self.short_docker_identifier(), command = %command, "running container command");
        self.executor
            .run(command)
            .map_err(|e| ContainerError::spawn(command, e))
    }
}

impl fmt::Debug for ContainerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerHandle")
            .field("docker_identifier", &self.docker_identifier)
            .field("name", &self.name)
            .field("sudo", &self.sudo)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Drop for ContainerHandle {
    fn drop(&mut self) {
        if !self.config.stop_after_completion {
            return;
        }

        info!(id = %self.short_docker_identifier(), name = %self.name, "stopping container on drop");
        match self.stop() {
            Ok(output) if output.success() => {}
            Ok(output) => warn!(
                id = %self.short_docker_identifier(),
                exit_code = ?output.exit_code,
                stderr = %output.stderr.trim(),
                "stop on drop exited non-zero"
            ),
            Err(e) => warn!(id = %self.short_docker_identifier(), error = %e, "stop on drop failed"),
        }
    }
}

/// First [`SHORT_ID_LEN`] characters of `identifier`.
#[must_use]
pub fn short_identifier(identifier: &str) -> &str {
    match identifier.char_indices().nth(SHORT_ID_LEN) {
        Some((end, _)) => &identifier[..end],
        None => identifier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::FakeExecutor;
    use proptest::prelude::*;
    use test_case::test_case;

    const ID: &str = "abcdef0123456789";

    fn handle(fake: &Arc<FakeExecutor>, stop_after_completion: bool) -> ContainerHandle {
        let spec = ContainerSpec::new()
            .named("web")
            .image("nginx")
            .stop_after_completion(stop_after_completion);
        spec.attach_with(ID, fake.clone())
    }

    #[test_case("abcdef0123456789", "abcdef012345" ; "long")]
    #[test_case("abcdef012345", "abcdef012345" ; "exact")]
    #[test_case("abc", "abc" ; "short")]
    #[test_case("", "" ; "empty")]
    fn test_short_identifier(full: &str, expected: &str) {
        assert_eq!(short_identifier(full), expected);
    }

    proptest! {
        #[test]
        fn prop_short_identifier_is_prefix(id in "\\PC{0,40}") {
            let short = short_identifier(&id);
            prop_assert!(id.starts_with(short));
            prop_assert_eq!(short.chars().count(), id.chars().count().min(SHORT_ID_LEN));
        }
    }

    #[test]
    fn test_accessors() {
        let fake = Arc::new(FakeExecutor::new());
        let h = handle(&fake, false);
        assert_eq!(h.docker_identifier(), ID);
        assert_eq!(h.short_docker_identifier(), "abcdef012345");
        assert_eq!(h.config().image, "nginx");
        assert!(h.name().starts_with("web-"));
        assert!(!h.uses_sudo());
    }

    #[test]
    fn test_stop_and_remove() {
        let fake = Arc::new(FakeExecutor::new());
        let h = handle(&fake, false);

        h.stop().expect("stop");
        h.remove(true).expect("remove");
        h.remove(false).expect("remove");

        assert_eq!(
            fake.commands(),
            vec![
                "docker stop abcdef012345",
                "docker rm abcdef012345 -f",
                "docker rm abcdef012345",
            ]
        );
    }

    #[test]
    fn test_non_zero_exit_is_returned_not_raised() {
        let fake = Arc::new(
            FakeExecutor::new()
                .with_failure("stop", 1, "Error: No such container: abcdef012345")
                .with_failure("logs", 1, "Error: No such container")
                .with_failure("exec", 127, "bash: nope: command not found"),
        );
        let h = handle(&fake, false);

        let stop = h.stop().expect("stop returns output");
        assert!(!stop.success());
        assert!(stop.stderr.contains("No such container"));

        assert!(!h.logs(DEFAULT_LOG_TAIL).expect("logs returns output").success());
        assert_eq!(h.execute("nope").expect("exec returns output").exit_code, Some(127));
    }

    #[test]
    fn test_sudo_only_affects_stop_and_remove() {
        let fake = Arc::new(FakeExecutor::new());
        let mut h = handle(&fake, false);
        h.use_sudo();
        assert!(h.uses_sudo());

        h.stop().expect("stop");
        h.remove(true).expect("remove");
        h.logs(10).expect("logs");
        h.status().expect("status");
        h.execute("true").expect("exec");
        h.add_files("./a", "/a").expect("cp");

        let commands = fake.commands();
        assert_eq!(commands[0], "sudo docker stop abcdef012345");
        assert_eq!(commands[1], "sudo docker rm abcdef012345 -f");
        for command in &commands[2..] {
            assert!(!command.contains("sudo"), "unexpected elevation: {command}");
        }
    }

    #[test]
    fn test_logs_command() {
        let fake = Arc::new(FakeExecutor::new().with_reply(
            "logs",
            ProcessOutput {
                command: String::new(),
                exit_code: Some(0),
                stdout: "GET /\n".to_string(),
                stderr: "warn\n".to_string(),
            },
        ));
        let h = handle(&fake, false);

        let logs = h.logs(DEFAULT_LOG_TAIL).expect("logs");
        assert_eq!(fake.last_command().as_deref(), Some("docker logs --tail 100 abcdef012345"));
        assert_eq!(logs.stdout, "GET /\n");
        assert_eq!(logs.stderr, "warn\n");
    }

    #[test]
    fn test_status_is_trimmed_stdout() {
        let fake = Arc::new(FakeExecutor::new().with_stdout("inspect", "running\n"));
        let h = handle(&fake, false);

        assert_eq!(h.status().expect("status"), "running");
        assert_eq!(
            fake.last_command().as_deref(),
            Some("docker container inspect -f '{{.State.Status}}' abcdef012345")
        );
    }

    #[test]
    fn test_status_of_unknown_container_is_empty() {
        let fake = Arc::new(FakeExecutor::new().with_failure("inspect", 1, "No such container"));
        assert_eq!(handle(&fake, false).status().expect("status"), "");
    }

    #[test]
    fn test_execute_single_and_sequence() {
        let fake = Arc::new(FakeExecutor::new());
        let h = handle(&fake, false);

        h.execute("a").expect("exec");
        h.execute(["a", "b", "c"]).expect("exec");

        assert_eq!(
            fake.commands(),
            vec![
                "echo \"a\" | docker exec --interactive abcdef012345 bash -",
                "echo \"a;b;c\" | docker exec --interactive abcdef012345 bash -",
            ]
        );
    }

    #[test]
    fn test_add_files_success_chains() {
        let fake = Arc::new(FakeExecutor::new());
        let h = handle(&fake, false);

        h.add_files("./site", "/var/www")
            .and_then(|h| h.add_files("./conf", "/etc/nginx"))
            .expect("copies");

        assert_eq!(
            fake.commands(),
            vec![
                "docker cp ./site abcdef012345:/var/www",
                "docker cp ./conf abcdef012345:/etc/nginx",
            ]
        );
    }

    #[test]
    fn test_add_files_failure_carries_output() {
        let fake = Arc::new(FakeExecutor::new().with_failure(
            "cp",
            1,
            "lstat /missing: no such file or directory",
        ));
        let h = handle(&fake, false);

        let err = h.add_files("/missing", "/tmp").expect_err("copy should fail");
        assert!(err.is_copy_failure());
        assert!(matches!(
            &err,
            ContainerError::CopyFailed { destination, exit_code: Some(1), .. }
                if destination == "abcdef012345:/tmp"
        ));
        assert!(
            err.captured_output()
                .is_some_and(|out| out.contains("no such file"))
        );
    }

    #[test]
    fn test_spawn_failure_surfaces() {
        let fake = Arc::new(FakeExecutor::new().with_spawn_error("stop", "fork failed"));
        let err = handle(&fake, false).stop().expect_err("spawn fails");
        assert!(matches!(err, ContainerError::Spawn { .. }));
    }

    #[test]
    fn test_drop_stops_when_configured() {
        let fake = Arc::new(FakeExecutor::new());
        drop(handle(&fake, true));
        assert_eq!(fake.commands(), vec!["docker stop abcdef012345"]);
    }

    #[test]
    fn test_drop_does_nothing_by_default() {
        let fake = Arc::new(FakeExecutor::new());
        drop(handle(&fake, false));
        assert!(fake.commands().is_empty());
    }

    #[test]
    fn test_drop_uses_sudo_when_enabled() {
        let fake = Arc::new(FakeExecutor::new());
        let mut h = handle(&fake, true);
        h.use_sudo();
        drop(h);
        assert_eq!(fake.commands(), vec!["sudo docker stop abcdef012345"]);
    }

    #[test]
    fn test_drop_swallows_stop_failures() {
        let fake = Arc::new(FakeExecutor::new().with_spawn_error("stop", "daemon gone"));
        drop(handle(&fake, true));
        assert_eq!(fake.count_matching("stop"), 1);
    }

    #[test]
    fn test_debug_omits_executor() {
        let fake = Arc::new(FakeExecutor::new());
        let debug = format!("{:?}", handle(&fake, false));
        assert!(debug.contains("abcdef0123456789"));
        assert!(debug.contains("ContainerHandle"));
    }
}
