use std::path::{Path, PathBuf};

use super::{artifact_exists, home_dir, remove_artifact, resolve_executable, write_artifact};
use super::{Artifact, Backend};
use crate::error::Result;
use crate::plist::{generate_file, LaunchAgent};
use crate::{Options, Scope};

/// Launch agents directory for a scope.
pub fn launch_agents_dir(scope: Scope) -> Result<PathBuf> {
    match scope {
        Scope::User => Ok(home_dir()?.join("Library/LaunchAgents")),
        Scope::System => Ok(PathBuf::from("/Library/LaunchAgents")),
    }
}

/// Registers the program as a launchd agent through `<label>.plist`.
///
/// launchd loads every agent in the directory at the next login, so the
/// presence of the file is the whole registration.
#[derive(Debug, Clone)]
pub struct LaunchAgentBackend {
    label: String,
    arguments: Vec<String>,
    dir: PathBuf,
    executable: Option<PathBuf>,
}

impl LaunchAgentBackend {
    pub fn new(options: &Options) -> Result<Self> {
        Ok(LaunchAgentBackend {
            label: options.label.clone(),
            arguments: options.arguments.clone(),
            dir: launch_agents_dir(options.scope)?,
            executable: options.program_override().map(Path::to_path_buf),
        })
    }

    /// Write agents into `dir` instead of the scope's LaunchAgents directory.
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    /// Register `path` instead of the running executable.
    pub fn with_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }

    pub fn plist_path(&self) -> PathBuf {
        self.dir.join(format!("{}.plist", self.label))
    }

    pub fn render(&self) -> Result<String> {
        let program = resolve_executable(self.executable.as_deref())?;
        generate_file(&LaunchAgent::new(&self.label, &program, &self.arguments)?)
    }
}

impl Backend for LaunchAgentBackend {
    fn is_enabled(&self) -> Result<bool> {
        artifact_exists(&self.plist_path())
    }

    fn enable(&self) -> Result<()> {
        let content = self.render()?;
        write_artifact(&self.plist_path(), &content)
    }

    fn disable(&self) -> Result<()> {
        remove_artifact(&self.plist_path())?;
        Ok(())
    }

    fn artifact(&self) -> Artifact {
        Artifact::File(self.plist_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::plist::parse_plist;
    use std::fs;

    fn backend(dir: &std::path::Path) -> LaunchAgentBackend {
        let options = Options::new("com.acme.sync", "Acme", "Sync")
            .with_arguments(["--quiet", "--config=/etc/acme & co.conf"]);
        LaunchAgentBackend::new(&options)
            .unwrap()
            .with_dir(dir.join("LaunchAgents"))
            .with_executable("/Applications/Sync.app/Contents/MacOS/sync")
    }

    #[test]
    fn system_scope_uses_library_launch_agents() {
        assert_eq!(
            launch_agents_dir(Scope::System).unwrap(),
            PathBuf::from("/Library/LaunchAgents")
        );
    }

    #[test]
    fn enable_creates_directory_and_plist() {
        let tmp = tempfile::tempdir().unwrap();
        let backend = backend(tmp.path());
        assert!(!backend.is_enabled().unwrap());

        backend.enable().unwrap();

        let path = tmp.path().join("LaunchAgents/com.acme.sync.plist");
        assert_eq!(backend.artifact(), Artifact::File(path.clone()));
        assert!(backend.is_enabled().unwrap());
        let agent = parse_plist(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(agent.label, "com.acme.sync");
        assert_eq!(agent.program, "/Applications/Sync.app/Contents/MacOS/sync");
        assert_eq!(agent.arguments, vec!["--quiet", "--config=/etc/acme & co.conf"]);
    }

    #[test]
    fn registers_program_named_in_options() {
        let tmp = tempfile::tempdir().unwrap();
        let options = Options::new("com.acme.sync", "Acme", "Sync").with_program("/opt/acme/sync");
        let backend = LaunchAgentBackend::new(&options).unwrap().with_dir(tmp.path());

        backend.enable().unwrap();

        let agent = parse_plist(&fs::read(backend.plist_path()).unwrap()).unwrap();
        assert_eq!(agent.program, "/opt/acme/sync");
    }

    #[test]
    fn enable_overwrites_instead_of_appending() {
        let tmp = tempfile::tempdir().unwrap();
        let backend = backend(tmp.path());
        backend.enable().unwrap();
        let first = fs::read_to_string(backend.plist_path()).unwrap();
        backend.enable().unwrap();
        let second = fs::read_to_string(backend.plist_path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn disable_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let backend = backend(tmp.path());
        backend.disable().unwrap();

        backend.enable().unwrap();
        backend.disable().unwrap();
        assert!(!backend.is_enabled().unwrap());
        assert!(!backend.plist_path().exists());
        backend.disable().unwrap();
    }

    #[test]
    fn unwritable_directory_is_a_filesystem_error() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("LaunchAgents");
        fs::write(&blocker, "not a directory").unwrap();

        let err = backend(tmp.path()).enable().unwrap_err();
        assert!(matches!(err, Error::Filesystem { .. }), "got: {err}");
    }
}
