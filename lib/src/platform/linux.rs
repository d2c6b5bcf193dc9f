use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use super::{artifact_exists, home_dir, remove_artifact, resolve_executable, write_artifact};
use super::{Artifact, Backend};
use crate::error::{Error, Result};
use crate::systemd::{generate_file, wanted_by, Unit};
use crate::{Options, Scope};

/// Directory the unit file is written to for a scope.
pub fn unit_dir(scope: Scope) -> Result<PathBuf> {
    match scope {
        Scope::User => Ok(home_dir()?.join(".config/systemd/user")),
        Scope::System => Ok(PathBuf::from("/etc/systemd/system")),
    }
}

/// How `systemctl` is invoked for one scope.
///
/// User units live in the per-user manager (`systemctl --user`); system units
/// need root, so mutating commands go through `sudo`.
#[derive(Debug, Clone)]
pub struct Systemctl {
    program: OsString,
    elevate: Option<OsString>,
    user_manager: bool,
}

impl Systemctl {
    pub fn for_scope(scope: Scope) -> Self {
        match scope {
            Scope::User => Systemctl {
                program: "systemctl".into(),
                elevate: None,
                user_manager: true,
            },
            Scope::System => Systemctl {
                program: "systemctl".into(),
                elevate: Some("sudo".into()),
                user_manager: false,
            },
        }
    }

    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    /// Run mutating commands directly, e.g. when already running as root.
    pub fn without_elevation(mut self) -> Self {
        self.elevate = None;
        self
    }

    fn command(&self, args: &[&str], elevated: bool) -> Command {
        let mut cmd = match (&self.elevate, elevated) {
            (Some(wrapper), true) => {
                let mut cmd = Command::new(wrapper);
                cmd.arg(&self.program);
                cmd
            }
            _ => Command::new(&self.program),
        };
        if self.user_manager {
            cmd.arg("--user");
        }
        cmd.args(args);
        cmd
    }

    fn describe(cmd: &Command) -> String {
        let mut line = cmd.get_program().to_string_lossy().into_owned();
        for arg in cmd.get_args() {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }

    fn spawn(mut cmd: Command) -> Result<Output> {
        let command = Self::describe(&cmd);
        tracing::debug!(%command, "running systemctl");
        cmd.output()
            .map_err(|source| Error::Spawn { command, source })
    }

    /// Run a command that has to succeed.
    ///
    /// stdin and stdout are inherited so `sudo` can prompt. stderr is passed
    /// through to ours once the command exits and kept for the error.
    pub fn run(&self, args: &[&str]) -> Result<()> {
        let mut cmd = self.command(args, true);
        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped());
        let output = Self::spawn(cmd)?;
        if !output.stderr.is_empty() {
            let _ = io::stderr().write_all(&output.stderr);
        }
        if !output.status.success() {
            return Err(Error::Subprocess {
                command: Self::describe(&self.command(args, true)),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }

    /// Whether `systemctl status` exits with zero for the unit. Its report is
    /// discarded.
    pub fn is_healthy(&self, unit: &str) -> Result<bool> {
        let mut cmd = self.command(&["status", unit], false);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        let output = Self::spawn(cmd)?;
        Ok(output.status.success())
    }
}

/// Registers the program as a systemd service through `<label>.service`.
#[derive(Debug, Clone)]
pub struct SystemdBackend {
    label: String,
    description: String,
    arguments: Vec<String>,
    scope: Scope,
    dir: PathBuf,
    executable: Option<PathBuf>,
    systemctl: Systemctl,
}

impl SystemdBackend {
    pub fn new(options: &Options) -> Result<Self> {
        Ok(SystemdBackend {
            label: options.label.clone(),
            description: options.display_description().to_string(),
            arguments: options.arguments.clone(),
            scope: options.scope,
            dir: unit_dir(options.scope)?,
            executable: options.program_override().map(Path::to_path_buf),
            systemctl: Systemctl::for_scope(options.scope),
        })
    }

    /// Write units into `dir` instead of the scope's unit directory.
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    /// Register `path` instead of the running executable.
    pub fn with_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }

    pub fn with_systemctl(mut self, systemctl: Systemctl) -> Self {
        self.systemctl = systemctl;
        self
    }

    pub fn unit_name(&self) -> String {
        format!("{}.service", self.label)
    }

    pub fn unit_path(&self) -> PathBuf {
        self.dir.join(self.unit_name())
    }

    pub fn render(&self) -> Result<String> {
        let program = resolve_executable(self.executable.as_deref())?;
        let program = program.to_str().ok_or_else(|| Error::Template {
            artifact: "systemd unit",
            reason: format!("program path {} is not valid UTF-8", program.display()),
        })?;
        Ok(generate_file(&Unit {
            description: self.description.clone(),
            program: program.to_string(),
            arguments: self.arguments.clone(),
            wanted_by: wanted_by(self.scope).to_string(),
        }))
    }

    /// Permission problems under `/etc/systemd/system` mean the caller is not root.
    fn escalate(&self, err: Error) -> Error {
        match err {
            Error::Filesystem {
                action,
                path,
                source,
            } if self.scope == Scope::System
                && source.kind() == io::ErrorKind::PermissionDenied =>
            {
                Error::Privilege {
                    operation: format!("{action} {}", path.display()),
                }
            }
            other => other,
        }
    }
}

impl Backend for SystemdBackend {
    fn is_enabled(&self) -> Result<bool> {
        if !artifact_exists(&self.unit_path())? {
            return Ok(false);
        }
        self.systemctl.is_healthy(&self.unit_name())
    }

    fn enable(&self) -> Result<()> {
        let content = self.render()?;
        write_artifact(&self.unit_path(), &content).map_err(|e| self.escalate(e))?;

        // No rollback: a failure below leaves the unit file in place, which
        // is_enabled reports as disabled and disable cleans up.
        self.systemctl.run(&["daemon-reload"])?;
        self.systemctl.run(&["enable", &self.unit_name()])
    }

    fn disable(&self) -> Result<()> {
        let path = self.unit_path();
        let registered = artifact_exists(&path)?;

        match self.systemctl.run(&["disable", &self.unit_name()]) {
            Ok(()) => {}
            Err(err @ Error::Subprocess { .. }) if !registered => {
                tracing::debug!(error = %err, "unit was not registered");
            }
            Err(err) => return Err(err),
        }

        remove_artifact(&path).map_err(|e| self.escalate(e))?;

        if registered {
            if let Err(err) = self.systemctl.run(&["daemon-reload"]) {
                tracing::warn!(error = %err, "failed to reload systemd after removing unit");
            }
        }
        Ok(())
    }

    fn artifact(&self) -> Artifact {
        Artifact::File(self.unit_path())
    }
}
