//! Process working directory access.
//!
//! The working directory is global mutable process state. These accessors
//! wrap it behind an explicit get/set pair; callers that use
//! [`change_directory`] from multiple threads race each other, so scoped
//! changes carry a single-threaded-use contract.

use crate::error::FileError;

use super::model::Path;

/// The process's current working directory.
///
/// Falls back to `.` if the OS cannot report one (deleted cwd).
pub fn current_working_directory() -> Path {
    std::env::current_dir()
        .map(Path::from)
        .unwrap_or_else(|_| Path::new("."))
}

/// Change the process's current working directory.
pub fn set_current_working_directory(path: &Path) -> Result<(), FileError> {
    std::env::set_current_dir(path.as_std_path()).map_err(|e| FileError::io(path, e))
}

/// Run `f` with the working directory changed to `path`, restoring the
/// previous directory afterwards.
///
/// Not reentrant-safe: concurrent scoped changes from different threads
/// observe each other's directories. Callers own the exclusion.
pub fn change_directory<T>(path: &Path, f: impl FnOnce() -> T) -> Result<T, FileError> {
    let previous = current_working_directory();
    set_current_working_directory(path)?;
    let result = f();
    set_current_working_directory(&previous)?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_working_directory_is_absolute() {
        assert!(current_working_directory().is_absolute());
    }

    #[test]
    fn test_change_directory_restores() {
        let before = current_working_directory();
        let root = Path::root();
        let seen = change_directory(&root, current_working_directory).unwrap();
        assert_eq!(seen, root);
        assert_eq!(current_working_directory(), before);
    }
}
