// Redirection is process-wide and one-shot, so this binary holds a single test.
#![cfg(unix)]

use std::fs;
use std::io::{self, Write};

use autostart::{Artifact, Autostart, Backend, Error, Options, Result};

struct Unregistered;

impl Backend for Unregistered {
    fn is_enabled(&self) -> Result<bool> {
        Ok(false)
    }

    fn enable(&self) -> Result<()> {
        Ok(())
    }

    fn disable(&self) -> Result<()> {
        Ok(())
    }

    fn artifact(&self) -> Artifact {
        Artifact::Service("unregistered".to_string())
    }
}

#[test]
fn redirects_stdout_and_stderr_into_log_files() {
    let tmp = tempfile::tempdir().unwrap();
    let stdout_path = tmp.path().join("existing/stdout.log");
    let stderr_path = tmp.path().join("nested/logs/stderr.err");
    fs::create_dir_all(stdout_path.parent().unwrap()).unwrap();
    fs::write(&stdout_path, "earlier\n").unwrap();

    let options = Options::new("com.acme.sync", "Acme", "Sync")
        .with_stdout_path(&stdout_path)
        .with_stderr_path(&stderr_path);
    let autostart = Autostart::with_backend(options, Box::new(Unregistered)).unwrap();
    assert_eq!(autostart.stdout_path().unwrap(), stdout_path);
    assert_eq!(autostart.stderr_path().unwrap(), stderr_path);

    let mut tee = autostart.redirect_stdio().unwrap();
    assert!(tee.has_log());

    // Direct writes bypass the test harness's output capture.
    writeln!(io::stdout(), "plain").unwrap();
    io::stdout().flush().unwrap();
    writeln!(tee, "tee").unwrap();
    tee.flush().unwrap();
    writeln!(io::stderr(), "errline").unwrap();

    assert_eq!(fs::read_to_string(&stdout_path).unwrap(), "earlier\nplain\ntee\n");
    assert_eq!(fs::read_to_string(&stderr_path).unwrap(), "errline\n");

    assert!(matches!(autostart.redirect_stdio(), Err(Error::AlreadyRedirected)));
}
