//! PID file handling for the dev server.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::ServerError;

/// Records the current process id; removes the file when dropped.
#[derive(Debug)]
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    pub fn create(path: &Path) -> Result<Self, ServerError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, std::process::id().to_string())?;
        debug!("Wrote PID file {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove PID file {}: {}", self.path.display(), e);
            }
        }
    }
}

/// Parse the PID recorded at `path`.
pub fn read_pid(path: &Path) -> Result<u32, ServerError> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ServerError::NotRunning(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };

    // PID 0 would address our own process group.
    match content.trim().parse::<u32>() {
        Ok(pid) if pid > 0 => Ok(pid),
        _ => Err(ServerError::InvalidPidFile {
            path: path.to_path_buf(),
            content,
        }),
    }
}

/// Send SIGTERM to the recorded server and remove the PID file.
///
/// The file is removed even when signalling fails, since a stale PID is
/// the usual cause. A PID with no live process is `ProcessNotFound`.
pub fn stop_server(pid_file: &Path) -> Result<u32, ServerError> {
    let pid = read_pid(pid_file)?;
    let sent = terminate(pid);

    if let Err(e) = std::fs::remove_file(pid_file) {
        warn!("Failed to remove PID file {}: {}", pid_file.display(), e);
    }

    sent.map(|()| pid)
}

#[cfg(unix)]
fn terminate(pid: u32) -> Result<(), ServerError> {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    let raw = i32::try_from(pid).map_err(|_| ServerError::SignalFailed {
        pid,
        reason: "PID out of range".to_string(),
    })?;

    match kill(Pid::from_raw(raw), Signal::SIGTERM) {
        Ok(()) => {
            debug!("Sent SIGTERM to {}", pid);
            Ok(())
        }
        Err(Errno::ESRCH) => Err(ServerError::ProcessNotFound(pid)),
        Err(errno) => Err(ServerError::SignalFailed {
            pid,
            reason: errno.desc().to_string(),
        }),
    }
}

#[cfg(not(unix))]
fn terminate(pid: u32) -> Result<(), ServerError> {
    Err(ServerError::SignalFailed {
        pid,
        reason: "signalling is only supported on Unix".to_string(),
    })
}
