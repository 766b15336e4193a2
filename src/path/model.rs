//! String-backed path value type with POSIX semantics.
//!
//! A [`Path`] wraps a raw string and never validates it: any string is a
//! legal path, including the empty one. Everything interesting (components,
//! standardization, absolute form) is derived on demand, never stored.
//!
//! Equality and hashing go through the standardized, tilde-preserving form,
//! so `"~"`, `"~/"`, `"~//"` and `"~/./"` all compare equal. Symlink-aware
//! identity is explicit via [`Path::resolved`]; `Eq` never touches the
//! filesystem.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// The path separator.
pub const SEPARATOR: char = '/';

/// A filesystem path as a plain string value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path {
    raw: String,
}

impl Path {
    /// Create a path from any string. Never fails.
    pub fn new(raw: impl Into<String>) -> Path {
        Path { raw: raw.into() }
    }

    /// Create a path, expanding a leading `~` to the invoking user's home
    /// directory.
    ///
    /// Expansion happens exactly once, at construction; the result is a
    /// plain path that is never re-evaluated. `~user` forms are left
    /// untouched, as is a `~` anywhere but the first segment.
    pub fn expanded(raw: impl Into<String>) -> Path {
        let raw = raw.into();
        if raw == "~" || raw.starts_with("~/") {
            if let Some(home) = dirs::home_dir() {
                let home = home.to_string_lossy();
                let rest = raw[1..].trim_start_matches(SEPARATOR);
                if rest.is_empty() {
                    return Path::new(home.into_owned());
                }
                return Path::new(format!("{home}/{rest}"));
            }
        }
        Path::new(raw)
    }

    /// The root path, `/`.
    pub fn root() -> Path {
        Path::new("/")
    }

    /// The empty path, which resolves to "here".
    pub fn empty() -> Path {
        Path::new("")
    }

    /// The raw, unprocessed string value.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// View as a standard library path for OS calls.
    pub fn as_std_path(&self) -> &std::path::Path {
        std::path::Path::new(&self.raw)
    }

    /// Whether the path begins with the separator.
    pub fn is_absolute(&self) -> bool {
        self.raw.starts_with(SEPARATOR)
    }

    /// Whether the path is relative (not anchored at the root).
    pub fn is_relative(&self) -> bool {
        !self.is_absolute()
    }

    /// Whether the path is the root. `"/"`, `"//"` and `"/."` are all root.
    pub fn is_root(&self) -> bool {
        self.standardized_raw() == "/"
    }

    /// The standardized form: redundant separators and `.` segments
    /// removed, `..` resolved against a true preceding segment, trailing
    /// separator dropped. A leading `~` is preserved, not expanded.
    ///
    /// Standardization is idempotent: standardizing a standardized path is
    /// a no-op.
    pub fn standardized(&self) -> Path {
        Path::new(self.standardized_raw())
    }

    pub(crate) fn standardized_raw(&self) -> String {
        let absolute = self.is_absolute();
        let mut segments: Vec<&str> = Vec::new();

        for segment in self.raw.split(SEPARATOR) {
            match segment {
                "" | "." => {}
                ".." => {
                    if absolute {
                        // At the root, `/..` collapses to the root itself.
                        segments.pop();
                    } else {
                        segments.push("..");
                    }
                }
                other => segments.push(other),
            }
        }

        if !absolute {
            segments = clean_relative_segments(segments);
        }

        if absolute {
            format!("/{}", segments.join("/"))
        } else {
            segments.join("/")
        }
    }

    /// Ordered component decomposition.
    ///
    /// Splits on the separator, dropping empty and `.` segments; absolute
    /// paths keep a single leading `/` component. The result is empty for
    /// `""` and `"."`. Relative `..` segments survive only as a leading
    /// run; interior pairs are cleaned away during standardization.
    pub fn components(&self) -> Vec<Path> {
        let std = self.standardized_raw();
        let mut components = Vec::new();
        if std.starts_with(SEPARATOR) {
            components.push(Path::root());
        }
        for segment in std.split(SEPARATOR).filter(|s| !s.is_empty()) {
            components.push(Path::new(segment));
        }
        components
    }

    /// The path formed by components `0..=index`.
    ///
    /// # Panics
    ///
    /// Out-of-range `index` is a contract violation and panics; callers
    /// must check `components().len()` first.
    pub fn prefix(&self, index: usize) -> Path {
        let components = self.components();
        assert!(
            index < components.len(),
            "component index {index} out of range for path {self}"
        );
        join_components(&components[..=index])
    }

    /// The absolute form: `self` if already rooted, otherwise anchored to
    /// the process's current working directory. Standardized either way.
    pub fn absolute(&self) -> Path {
        if self.is_absolute() {
            self.standardized()
        } else {
            crate::path::current_working_directory()
                .join(self.raw())
                .standardized()
        }
    }

    /// The fully resolved form: absolute, with symbolic links followed.
    ///
    /// Falls back to the standardized absolute form when the path does not
    /// exist. Nothing is persisted.
    pub fn resolved(&self) -> Path {
        match std::fs::canonicalize(self.absolute().raw()) {
            Ok(resolved) => Path::new(resolved.to_string_lossy().into_owned()),
            Err(_) => self.absolute(),
        }
    }

    /// The last path component, or the empty string for paths with no
    /// components. Root's file name is `/`.
    pub fn file_name(&self) -> String {
        self.components()
            .last()
            .map(|c| c.raw.clone())
            .unwrap_or_default()
    }

    /// The extension of the file name, without the dot.
    pub fn extension(&self) -> Option<String> {
        let name = self.file_name();
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_string())
    }

    /// A copy of the path with its extension replaced (or appended when
    /// there was none).
    pub fn with_extension(&self, extension: &str) -> Path {
        let std = self.standardized_raw();
        let name = self.file_name();
        let stem = match name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem.to_string(),
            _ => name.clone(),
        };
        let parent_len = std.len() - name.len();
        Path::new(format!("{}{stem}.{extension}", &std[..parent_len]))
    }

    /// Replace the extension in place.
    pub fn set_extension(&mut self, extension: &str) {
        *self = self.with_extension(extension);
    }

    /// Concatenate two paths with exactly one separator.
    ///
    /// Joining an absolute path yields that path; joining onto the empty
    /// path yields the argument.
    pub fn join(&self, other: impl AsRef<str>) -> Path {
        let other = other.as_ref();
        if other.starts_with(SEPARATOR) {
            return Path::new(other);
        }
        if other.is_empty() {
            return self.clone();
        }
        if self.raw.is_empty() {
            return Path::new(other);
        }
        let base = self.raw.trim_end_matches(SEPARATOR);
        if base.is_empty() {
            // self was all separators, i.e. root
            return Path::new(format!("/{other}"));
        }
        Path::new(format!("{base}/{other}"))
    }
}

/// Rebuild a path from a component slice produced by [`Path::components`].
pub(crate) fn join_components(components: &[Path]) -> Path {
    let mut iter = components.iter();
    let Some(first) = iter.next() else {
        return Path::empty();
    };
    let mut acc = first.clone();
    for component in iter {
        acc = acc.join(component.raw());
    }
    acc
}

/// Remove `(segment, "..")` pairs where the segment is not itself `..`,
/// repeating until no further pair is removable.
fn clean_relative_segments(mut segments: Vec<&str>) -> Vec<&str> {
    loop {
        let mut removed = false;
        let mut i = 0;
        while i + 1 < segments.len() {
            if segments[i] != ".." && segments[i + 1] == ".." {
                segments.drain(i..=i + 1);
                removed = true;
                i = i.saturating_sub(1);
            } else {
                i += 1;
            }
        }
        if !removed {
            return segments;
        }
    }
}

impl PartialEq for Path {
    fn eq(&self, other: &Path) -> bool {
        self.standardized_raw() == other.standardized_raw()
    }
}

impl Eq for Path {}

impl Hash for Path {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.standardized_raw().hash(state);
    }
}

impl PartialOrd for Path {
    fn partial_cmp(&self, other: &Path) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Path {
    fn cmp(&self, other: &Path) -> std::cmp::Ordering {
        self.standardized_raw().cmp(&other.standardized_raw())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl From<&str> for Path {
    fn from(raw: &str) -> Path {
        Path::new(raw)
    }
}

impl From<String> for Path {
    fn from(raw: String) -> Path {
        Path::new(raw)
    }
}

impl From<&std::path::Path> for Path {
    fn from(path: &std::path::Path) -> Path {
        Path::new(path.to_string_lossy().into_owned())
    }
}

impl From<std::path::PathBuf> for Path {
    fn from(path: std::path::PathBuf) -> Path {
        Path::new(path.to_string_lossy().into_owned())
    }
}
