use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Advisory lock guarding writes to a bound data file.
///
/// Uses platform-native flock (Unix) on a `<file>.lock` sidecar so that two
/// `dk` processes never interleave writes to the same file. The sidecar is
/// never unlinked: every process must lock the same inode.
#[derive(Debug)]
pub struct FileLock {
    _file: File,
}

/// Error type for lock operations
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not create lock file at {path}: {source}")]
    CreateError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not acquire lock on {path}: another process may be writing")]
    Timeout { path: PathBuf },
}

impl FileLock {
    /// Lock the sidecar of `target`, waiting up to `timeout`.
    pub fn acquire(target: &Path, timeout: Duration) -> Result<Self, LockError> {
        let lock_path = lock_path_for(target);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| LockError::CreateError {
                path: lock_path.clone(),
                source: e,
            })?;

        let start = Instant::now();
        loop {
            match try_lock(&file) {
                Ok(()) => {
                    return Ok(FileLock { _file: file });
                }
                Err(_) if start.elapsed() < timeout => {
                    std::thread::sleep(Duration::from_millis(10));
                }
                Err(_) => {
                    return Err(LockError::Timeout { path: lock_path });
                }
            }
        }
    }
}

/// `data.json` → `data.json.lock`
pub fn lock_path_for(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("docket"));
    name.push(".lock");
    target.with_file_name(name)
}

/// Try to acquire an exclusive flock on the file (non-blocking)
#[cfg(unix)]
fn try_lock(file: &File) -> Result<(), std::io::Error> {
    use std::os::unix::io::AsRawFd;
    let fd = file.as_raw_fd();
    let result = unsafe { libc::flock(fd, libc::LOCK_EX | libc::LOCK_NB) };
    if result == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn try_lock(_file: &File) -> Result<(), std::io::Error> {
    // On non-Unix platforms, just succeed (advisory locking)
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn lock_path_appends_suffix() {
        assert_eq!(
            lock_path_for(Path::new("/tmp/todos.json")),
            PathBuf::from("/tmp/todos.json.lock")
        );
    }

    #[test]
    fn acquire_and_release() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("todos.json");

        let lock = FileLock::acquire(&target, Duration::from_secs(1)).unwrap();
        assert!(tmp.path().join("todos.json.lock").exists());
        drop(lock);

        assert!(FileLock::acquire(&target, Duration::from_secs(1)).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn sidecar_outlives_release() {
        use std::os::unix::fs::MetadataExt;

        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("todos.json");
        let sidecar = lock_path_for(&target);

        let first = FileLock::acquire(&target, Duration::from_secs(1)).unwrap();
        let inode = std::fs::metadata(&sidecar).unwrap().ino();
        drop(first);
        assert!(sidecar.exists());

        // a later holder locks the same inode, so a waiter on it is excluded
        let _second = FileLock::acquire(&target, Duration::from_secs(1)).unwrap();
        assert_eq!(std::fs::metadata(&sidecar).unwrap().ino(), inode);
        let third = FileLock::acquire(&target, Duration::from_millis(50));
        assert!(matches!(third, Err(LockError::Timeout { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn contention_times_out() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("todos.json");

        let _held = FileLock::acquire(&target, Duration::from_secs(1)).unwrap();
        let second = FileLock::acquire(&target, Duration::from_millis(50));
        assert!(matches!(second, Err(LockError::Timeout { .. })));
    }
}
