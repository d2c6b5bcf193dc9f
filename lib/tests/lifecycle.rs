use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use autostart::platform::macos::LaunchAgentBackend;
use autostart::platform::windows::{ServiceApi, ServiceSpec, WindowsServiceBackend};
use autostart::{Artifact, Autostart, Options, Scope};

fn options(scope: Scope) -> Options {
    Options::new("com.acme.sync", "Acme", "Sync")
        .with_scope(scope)
        .with_arguments(["--quiet", "--config=/etc/acme & co.conf"])
}

/// enable, check, disable, check again, disable again.
fn run_lifecycle(autostart: &Autostart) {
    assert!(!autostart.is_enabled().unwrap());
    autostart.enable().unwrap();
    autostart.enable().unwrap();
    assert!(autostart.is_enabled().unwrap());
    autostart.disable().unwrap();
    assert!(!autostart.is_enabled().unwrap());
    autostart.disable().unwrap();
}

#[test]
fn launch_agent_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    let backend = LaunchAgentBackend::new(&options(Scope::User))
        .unwrap()
        .with_dir(tmp.path())
        .with_executable("/Applications/Sync.app/Contents/MacOS/sync");
    let plist_path = backend.plist_path();
    let autostart = Autostart::with_backend(options(Scope::User), Box::new(backend)).unwrap();

    autostart.enable().unwrap();
    let text = fs::read_to_string(&plist_path).unwrap();
    assert!(text.contains("<string>com.acme.sync</string>"));
    assert!(text.contains("--config=/etc/acme &amp; co.conf"));
    assert!(!text.contains("acme & co"));
    autostart.disable().unwrap();

    run_lifecycle(&autostart);
    assert_eq!(autostart.artifact(), Artifact::File(tmp.path().join("com.acme.sync.plist")));
}

#[cfg(unix)]
#[test]
fn systemd_round_trip() {
    use autostart::platform::linux::{Systemctl, SystemdBackend};

    let tmp = tempfile::tempdir().unwrap();
    let backend = SystemdBackend::new(&options(Scope::User))
        .unwrap()
        .with_dir(tmp.path())
        .with_executable("/usr/local/bin/sync")
        .with_systemctl(Systemctl::for_scope(Scope::User).with_program("true"));
    let unit_path = backend.unit_path();
    let autostart = Autostart::with_backend(options(Scope::User), Box::new(backend)).unwrap();

    autostart.enable().unwrap();
    let text = fs::read_to_string(&unit_path).unwrap();
    assert!(text.contains(r#"ExecStart="/usr/local/bin/sync" "--quiet" "--config=/etc/acme & co.conf""#));
    assert!(text.contains("WantedBy=default.target"));
    autostart.disable().unwrap();

    run_lifecycle(&autostart);
}

#[derive(Default)]
struct InMemoryServices {
    installed: RefCell<HashMap<String, ServiceSpec>>,
}

impl ServiceApi for InMemoryServices {
    fn service_exists(&self, name: &str) -> io::Result<bool> {
        Ok(self.installed.borrow().contains_key(name))
    }

    fn create_service(&self, spec: &ServiceSpec) -> io::Result<()> {
        self.installed.borrow_mut().insert(spec.name.clone(), spec.clone());
        Ok(())
    }

    fn update_service(&self, spec: &ServiceSpec) -> io::Result<()> {
        self.create_service(spec)
    }

    fn set_restart_on_failure(&self, name: &str, _delay: Duration) -> io::Result<()> {
        assert!(self.installed.borrow().contains_key(name));
        Ok(())
    }

    fn delete_service(&self, name: &str) -> io::Result<bool> {
        Ok(self.installed.borrow_mut().remove(name).is_some())
    }
}

#[test]
fn windows_service_round_trip() {
    let backend = WindowsServiceBackend::with_api(&options(Scope::System), InMemoryServices::default())
        .with_executable(Path::new(r"C:\Program Files\Acme\sync.exe"));
    let autostart = Autostart::with_backend(options(Scope::System), Box::new(backend)).unwrap();

    run_lifecycle(&autostart);
    assert_eq!(autostart.artifact(), Artifact::Service("com.acme.sync".to_string()));
}
