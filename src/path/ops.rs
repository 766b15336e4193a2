//! OS-delegating queries and mutators.
//!
//! These are thin wrappers over `std::fs`; the contracts are the point.
//! Every mutator checks its preconditions first (source must exist, the
//! destination must not), and every failure surfaces as a [`FileError`]
//! carrying full path context. Nothing is swallowed or retried.

use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;

use crate::error::FileError;
use crate::flags::PermissionFlags;

use super::model::Path;

impl Path {
    /// Whether something exists at this path (symlinks followed).
    pub fn exists(&self) -> bool {
        self.as_std_path().exists()
    }

    /// Whether this path is a directory (symlinks followed).
    pub fn is_directory(&self) -> bool {
        self.as_std_path().is_dir()
    }

    /// Whether this path is a regular file (symlinks followed).
    pub fn is_regular(&self) -> bool {
        self.as_std_path().is_file()
    }

    /// Whether this path is itself a symbolic link.
    pub fn is_symbolic_link(&self) -> bool {
        fs::symlink_metadata(self.as_std_path())
            .map(|meta| meta.file_type().is_symlink())
            .unwrap_or(false)
    }

    /// Whether anything at all is at this path, including a dangling
    /// symlink.
    pub fn is_any(&self) -> bool {
        self.exists() || self.is_symbolic_link()
    }

    /// The user-class permission bits of the entry, or the empty set when
    /// the path does not exist.
    pub fn permissions(&self) -> PermissionFlags {
        fs::metadata(self.as_std_path())
            .map(|meta| PermissionFlags::from_mode(meta.permissions().mode()))
            .unwrap_or_else(|_| PermissionFlags::empty())
    }

    /// Size of the entry in bytes, if it exists.
    pub fn file_size(&self) -> Option<u64> {
        fs::metadata(self.as_std_path()).ok().map(|meta| meta.len())
    }

    /// Create an empty regular file at this path.
    ///
    /// Fails if anything already exists here.
    pub fn create_file(&self) -> Result<(), FileError> {
        if self.is_any() {
            return Err(FileError::DestinationExists {
                source_path: self.clone(),
                dest: self.clone(),
            });
        }
        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.as_std_path())
            .map(|_| ())
            .map_err(|e| FileError::io(self, e))
    }

    /// Create the file if missing, update its modification time otherwise.
    pub fn touch(&self) -> Result<(), FileError> {
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.as_std_path())
            .map(|_| ())
            .map_err(|e| FileError::io(self, e))
    }

    /// Create a directory at this path.
    pub fn create_directory(&self, with_intermediates: bool) -> Result<(), FileError> {
        let result = if with_intermediates {
            fs::create_dir_all(self.as_std_path())
        } else {
            fs::create_dir(self.as_std_path())
        };
        result.map_err(|e| FileError::io(self, e))
    }

    /// Delete the file, symlink, or empty directory at this path.
    pub fn delete_file(&self) -> Result<(), FileError> {
        if !self.is_any() {
            return Err(FileError::SourceMissing { path: self.clone() });
        }
        let result = if self.is_directory() && !self.is_symbolic_link() {
            fs::remove_dir(self.as_std_path())
        } else {
            fs::remove_file(self.as_std_path())
        };
        result.map_err(|e| FileError::io(self, e))
    }

    /// Delete this path recursively.
    pub fn delete_all(&self) -> Result<(), FileError> {
        if !self.is_any() {
            return Err(FileError::SourceMissing { path: self.clone() });
        }
        let result = if self.is_directory() && !self.is_symbolic_link() {
            fs::remove_dir_all(self.as_std_path())
        } else {
            fs::remove_file(self.as_std_path())
        };
        result.map_err(|e| FileError::io(self, e))
    }

    /// Move the entry at this path to `dest`.
    pub fn move_file(&self, dest: &Path) -> Result<(), FileError> {
        self.check_two_path(dest)?;
        fs::rename(self.as_std_path(), dest.as_std_path())
            .map_err(|e| FileError::two_path_io(self, dest, e))
    }

    /// Copy the regular file at this path to `dest`.
    pub fn copy_file(&self, dest: &Path) -> Result<(), FileError> {
        self.check_two_path(dest)?;
        if self.is_directory() {
            return Err(FileError::two_path_io(
                self,
                dest,
                io::Error::new(io::ErrorKind::InvalidInput, "source is a directory"),
            ));
        }
        fs::copy(self.as_std_path(), dest.as_std_path())
            .map(|_| ())
            .map_err(|e| FileError::two_path_io(self, dest, e))
    }

    /// Create a symbolic link at `dest` pointing to this path.
    pub fn symlink_file(&self, dest: &Path) -> Result<(), FileError> {
        self.check_two_path(dest)?;
        std::os::unix::fs::symlink(self.as_std_path(), dest.as_std_path())
            .map_err(|e| FileError::two_path_io(self, dest, e))
    }

    /// Create a hard link at `dest` to the file at this path.
    pub fn hardlink_file(&self, dest: &Path) -> Result<(), FileError> {
        self.check_two_path(dest)?;
        fs::hard_link(self.as_std_path(), dest.as_std_path())
            .map_err(|e| FileError::two_path_io(self, dest, e))
    }

    /// Shared precondition for two-path mutators: the source must exist
    /// and the destination must not.
    fn check_two_path(&self, dest: &Path) -> Result<(), FileError> {
        if !self.is_any() {
            return Err(FileError::SourceMissing { path: self.clone() });
        }
        if dest.is_any() {
            return Err(FileError::DestinationExists {
                source_path: self.clone(),
                dest: dest.clone(),
            });
        }
        Ok(())
    }
}
