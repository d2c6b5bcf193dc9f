//! Process-wide redirection of stdout and stderr into log files.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{fs_err, Error, Result};

static REDIRECTED: AtomicBool = AtomicBool::new(false);

/// Writes everything to the original console and, when present, to the log file.
///
/// Plain `println!` output only reaches the log file after a redirection;
/// write through this to keep a copy on the terminal as well.
pub struct TeeWriter {
    console: Box<dyn Write + Send>,
    log: Option<File>,
}

impl TeeWriter {
    pub fn new(console: impl Write + Send + 'static, log: Option<File>) -> Self {
        TeeWriter {
            console: Box::new(console),
            log,
        }
    }

    /// Writes to the process's current stdout and nowhere else.
    pub fn console_only() -> Self {
        TeeWriter::new(io::stdout(), None)
    }

    pub fn has_log(&self) -> bool {
        self.log.is_some()
    }
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.console.write_all(buf)?;
        if let Some(log) = &mut self.log {
            log.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.console.flush()?;
        if let Some(log) = &mut self.log {
            log.flush()?;
        }
        Ok(())
    }
}

/// Open `path` for appending, creating it and its parent directories.
pub fn open_log(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| fs_err("create directory", parent, e))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| fs_err("open", path, e))
}

/// Point the process's stdout and stderr at the given files.
///
/// A `None` path leaves that stream alone. Only the first call in a process
/// does anything; later calls fail with [`Error::AlreadyRedirected`].
pub fn redirect(stdout: Option<&Path>, stderr: Option<&Path>) -> Result<TeeWriter> {
    if REDIRECTED.swap(true, Ordering::SeqCst) {
        return Err(Error::AlreadyRedirected);
    }

    let opened = stdout
        .map(|path| open_log(path).map(|file| (path, file)))
        .transpose()
        .and_then(|out| {
            let err = stderr
                .map(|path| open_log(path).map(|file| (path, file)))
                .transpose()?;
            Ok((out, err))
        });
    // Nothing has changed yet, so a later call may try again.
    let (out, err) = match opened {
        Ok(files) => files,
        Err(e) => {
            REDIRECTED.store(false, Ordering::SeqCst);
            return Err(e);
        }
    };

    let mut tee = TeeWriter::console_only();
    if let Some((path, file)) = out {
        io::stdout().flush().map_err(|e| fs_err("flush stdout before redirecting to", path, e))?;
        let console = sys::duplicate_console(sys::STDOUT)
            .map_err(|e| fs_err("duplicate console for", path, e))?;
        sys::point_at(sys::STDOUT, &file).map_err(|e| fs_err("redirect stdout to", path, e))?;
        tracing::debug!(path = %path.display(), "redirected stdout");
        tee = match console {
            Some(console) => TeeWriter::new(console, Some(file)),
            None => TeeWriter::new(io::sink(), Some(file)),
        };
    }
    if let Some((path, file)) = err {
        sys::point_at(sys::STDERR, &file).map_err(|e| fs_err("redirect stderr to", path, e))?;
        tracing::debug!(path = %path.display(), "redirected stderr");
    }
    Ok(tee)
}

#[cfg(unix)]
mod sys {
    use std::fs::File;
    use std::io;
    use std::os::fd::{AsRawFd, FromRawFd, RawFd};

    pub const STDOUT: RawFd = libc::STDOUT_FILENO;
    pub const STDERR: RawFd = libc::STDERR_FILENO;

    /// A new descriptor for whatever `fd` refers to now. `None` when it is closed.
    pub fn duplicate_console(fd: RawFd) -> io::Result<Option<File>> {
        // SAFETY: dup only reads the descriptor table; an invalid `fd` is
        // reported through the return value.
        let copy = unsafe { libc::dup(fd) };
        if copy < 0 {
            let err = io::Error::last_os_error();
            if err.raw_os_error() == Some(libc::EBADF) {
                return Ok(None);
            }
            return Err(err);
        }
        // SAFETY: `copy` is a fresh descriptor owned by nothing else.
        Ok(Some(unsafe { File::from_raw_fd(copy) }))
    }

    pub fn point_at(fd: RawFd, file: &File) -> io::Result<()> {
        // SAFETY: `file` keeps its descriptor open for the call, and dup2
        // atomically replaces `fd` with a copy of it.
        if unsafe { libc::dup2(file.as_raw_fd(), fd) } < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

#[cfg(windows)]
mod sys {
    use std::fs::File;
    use std::io;
    use std::mem::ManuallyDrop;
    use std::os::windows::io::{FromRawHandle, IntoRawHandle, RawHandle};

    use windows_sys::Win32::Foundation::{HANDLE, INVALID_HANDLE_VALUE};
    use windows_sys::Win32::System::Console::{
        GetStdHandle, SetStdHandle, STD_ERROR_HANDLE, STD_HANDLE, STD_OUTPUT_HANDLE,
    };

    pub const STDOUT: STD_HANDLE = STD_OUTPUT_HANDLE;
    pub const STDERR: STD_HANDLE = STD_ERROR_HANDLE;

    /// A new handle for the current standard stream. `None` without a console.
    pub fn duplicate_console(stream: STD_HANDLE) -> io::Result<Option<File>> {
        // SAFETY: GetStdHandle takes no pointers and only reads the process's
        // standard handle table.
        let handle = unsafe { GetStdHandle(stream) };
        if handle.is_null() || handle == INVALID_HANDLE_VALUE {
            return Ok(None);
        }
        // SAFETY: the process keeps ownership of its std handle; ManuallyDrop
        // keeps us from closing it.
        let current = ManuallyDrop::new(unsafe { File::from_raw_handle(handle as RawHandle) });
        current.try_clone().map(Some)
    }

    /// Install a handle to `file` as the standard stream. The handle stays
    /// open for the rest of the process.
    pub fn point_at(stream: STD_HANDLE, file: &File) -> io::Result<()> {
        let handle = file.try_clone()?.into_raw_handle();
        // SAFETY: `handle` is a fresh, owned duplicate of `file` that is never
        // closed, so it stays valid as the standard handle.
        if unsafe { SetStdHandle(stream, handle as HANDLE) } == 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}
