//! Relationship queries over paths: parents, ancestors, common ancestors.
//!
//! The common-ancestor algorithm is branchy by design. Its mixed
//! relative-path branch degrades to a single `..` instead of proving a
//! deeper common root; that behavior is pinned by tests and kept as-is.

use super::model::{Path, join_components};

/// The shape of a path, computed on demand and never stored.
///
/// Drives branch selection in [`Path::common_ancestor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativePathType {
    /// Begins with the separator.
    Absolute,
    /// Empty, or resolves to "here" (e.g. `.`, `a/..`).
    Current,
    /// Exactly `..`.
    Parent,
    /// Begins with `..` followed by more segments.
    Ancestor,
    /// Anything else.
    Normal,
}

impl RelativePathType {
    /// Whether this shape points forward (at or below "here") rather than
    /// up through a parent.
    pub fn is_forward(&self) -> bool {
        matches!(
            self,
            RelativePathType::Absolute | RelativePathType::Current | RelativePathType::Normal
        )
    }
}

impl Path {
    /// Classify the shape of this path.
    pub fn relative_type(&self) -> RelativePathType {
        if self.is_absolute() {
            return RelativePathType::Absolute;
        }
        let components = self.components();
        match components.as_slice() {
            [] => RelativePathType::Current,
            [only] if only.raw() == ".." => RelativePathType::Parent,
            rest if rest[0].raw() == ".." => RelativePathType::Ancestor,
            _ => RelativePathType::Normal,
        }
    }

    /// The parent path.
    ///
    /// Root is its own parent. For relative paths: a path with no
    /// components parents to `..`; a path ending in `..` gains one more
    /// level up; a single component parents to the empty path.
    pub fn parent(&self) -> Path {
        if self.is_absolute() {
            let std = self.standardized_raw();
            if std == "/" {
                return Path::root();
            }
            return match std.rfind('/') {
                Some(0) => Path::root(),
                Some(idx) => Path::new(&std[..idx]),
                None => Path::root(),
            };
        }

        let components = self.components();
        if components.is_empty() {
            return Path::new("..");
        }
        if components.last().map(|c| c.raw()) == Some("..") {
            return Path::new("..").join(self.standardized_raw());
        }
        if components.len() == 1 {
            return Path::empty();
        }
        self.prefix(components.len() - 2)
    }

    /// The deepest path that is a common ancestor of `self` and `other`,
    /// to the extent the algorithm can prove one.
    ///
    /// Mixed absolute/relative arguments are both converted to absolute
    /// first. When exactly one side reaches up through `..`, the answer
    /// degrades to a single `..`; when both do with unequal run lengths,
    /// the answer is `..` repeated for the longer run.
    pub fn common_ancestor(&self, other: &Path) -> Path {
        if self.is_absolute() != other.is_absolute() {
            return self.absolute().common_ancestor(&other.absolute());
        }

        let ours = self.components();
        let theirs = other.components();
        let total = ours
            .iter()
            .zip(theirs.iter())
            .take_while(|(a, b)| a == b)
            .count();

        let our_type = self.relative_type();
        let their_type = other.relative_type();

        if our_type.is_forward() && their_type.is_forward() {
            return join_components(&ours[..total]);
        }

        if our_type.is_forward() || their_type.is_forward() {
            // One side climbs, the other does not: no deeper root is
            // provable, degrade to a single level up.
            return Path::new("..");
        }

        let our_run = leading_parent_run(&ours);
        let their_run = leading_parent_run(&theirs);
        if our_run == their_run {
            join_components(&ours[..total])
        } else {
            Path::new(vec![".."; our_run.max(their_run)].join("/"))
        }
    }

    /// Whether `self` is an ancestor of `other`.
    ///
    /// The root is vacuously an ancestor of every other absolute path. A
    /// path is never its own ancestor. Mixed absolute/relative arguments
    /// are both converted to absolute first; two relative paths with
    /// differing leading `..` runs can never be proven related and yield
    /// `false`.
    pub fn is_ancestor_of(&self, other: &Path) -> bool {
        if self.is_absolute() != other.is_absolute() {
            return self.absolute().is_ancestor_of(&other.absolute());
        }
        if self == other {
            return false;
        }
        if self.is_root() {
            return true;
        }
        if self.is_relative()
            && leading_parent_run(&self.components()) != leading_parent_run(&other.components())
        {
            return false;
        }
        self.common_ancestor(other) == *self
    }

    /// Whether `self` is a child of `other`.
    ///
    /// Non-recursive means direct child (`self.parent() == other`);
    /// recursive accepts any depth of descent.
    pub fn is_child_of(&self, other: &Path, recursive: bool) -> bool {
        if self.is_absolute() != other.is_absolute() {
            return self.absolute().is_child_of(&other.absolute(), recursive);
        }
        if recursive {
            other.is_ancestor_of(self)
        } else {
            self.parent() == *other
        }
    }
}

/// Length of the leading run of `..` components.
fn leading_parent_run(components: &[Path]) -> usize {
    components.iter().take_while(|c| c.raw() == "..").count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::current_working_directory;

    #[test]
    fn test_relative_type_classification() {
        assert_eq!(Path::new("/a").relative_type(), RelativePathType::Absolute);
        assert_eq!(Path::new("").relative_type(), RelativePathType::Current);
        assert_eq!(Path::new(".").relative_type(), RelativePathType::Current);
        assert_eq!(Path::new("a/..").relative_type(), RelativePathType::Current);
        assert_eq!(Path::new("..").relative_type(), RelativePathType::Parent);
        assert_eq!(
            Path::new("../a").relative_type(),
            RelativePathType::Ancestor
        );
        assert_eq!(Path::new("a/b").relative_type(), RelativePathType::Normal);
    }

    #[test]
    fn test_parent_of_absolute_paths() {
        assert_eq!(Path::new("/a/b/c").parent().raw(), "/a/b");
        assert_eq!(Path::new("/a").parent().raw(), "/");
        assert_eq!(Path::root().parent(), Path::root());
        assert_eq!(Path::new("//").parent(), Path::root());
    }

    #[test]
    fn test_parent_of_relative_paths() {
        assert_eq!(Path::new("a/b").parent().raw(), "a");
        assert_eq!(Path::new("a").parent(), Path::empty());
        assert_eq!(Path::new("").parent().raw(), "..");
        assert_eq!(Path::new(".").parent().raw(), "..");
        assert_eq!(Path::new("..").parent().raw(), "../..");
        assert_eq!(Path::new("../..").parent().raw(), "../../..");
    }

    #[test]
    fn test_parent_plus_file_name_recomposes() {
        for raw in ["/a/b/c", "/x", "/deep/ly/nested/entry.txt"] {
            let path = Path::new(raw);
            let recomposed = path.parent().join(path.file_name());
            assert_eq!(recomposed.standardized(), path.standardized());
        }
    }

    #[test]
    fn test_common_ancestor_absolute() {
        assert_eq!(
            Path::new("/a/b/c").common_ancestor(&Path::new("/a/b/d")).raw(),
            "/a/b"
        );
        assert_eq!(
            Path::new("/a").common_ancestor(&Path::new("/x/y")),
            Path::root()
        );
        assert_eq!(
            Path::new("/a/b").common_ancestor(&Path::new("/a/b")).raw(),
            "/a/b"
        );
    }

    #[test]
    fn test_common_ancestor_tilde() {
        assert_eq!(
            Path::new("~/Downloads")
                .common_ancestor(&Path::new("~/Documents"))
                .raw(),
            "~"
        );
    }

    #[test]
    fn test_common_ancestor_forward_relative() {
        assert_eq!(
            Path::new("a/b/c").common_ancestor(&Path::new("a/b/x")).raw(),
            "a/b"
        );
        assert_eq!(
            Path::new("a/b").common_ancestor(&Path::new("x")),
            Path::empty()
        );
    }

    #[test]
    fn test_common_ancestor_degrades_on_mixed_shapes() {
        // One side climbs, the other is forward: a single `..`, even
        // though a deeper root might exist.
        assert_eq!(
            Path::new("../a").common_ancestor(&Path::new("b")).raw(),
            ".."
        );
        assert_eq!(
            Path::new("..").common_ancestor(&Path::new("a/b")).raw(),
            ".."
        );
    }

    #[test]
    fn test_common_ancestor_parent_runs() {
        // Equal runs: the shared prefix stands.
        assert_eq!(
            Path::new("../a/b").common_ancestor(&Path::new("../a/c")).raw(),
            "../a"
        );
        // Unequal runs: `..` repeated for the longer run.
        assert_eq!(
            Path::new("../../a").common_ancestor(&Path::new("../b")).raw(),
            "../.."
        );
    }

    #[test]
    fn test_common_ancestor_mixed_absolute_relative() {
        let cwd = current_working_directory();
        let relative = Path::new("sub/dir");
        let ancestor = relative.common_ancestor(&cwd);
        assert_eq!(ancestor, cwd.standardized());
    }

    #[test]
    fn test_ancestor_predicate() {
        assert!(Path::new("/a").is_ancestor_of(&Path::new("/a/b/c")));
        assert!(Path::root().is_ancestor_of(&Path::new("/a")));
        assert!(!Path::new("/a/b").is_ancestor_of(&Path::new("/a/b")));
        assert!(!Path::new("/a/b").is_ancestor_of(&Path::new("/a")));
        assert!(!Path::new("/x").is_ancestor_of(&Path::root()));
    }

    #[test]
    fn test_ancestor_antisymmetry() {
        let pairs = [
            (Path::new("/a"), Path::new("/a/b")),
            (Path::new("a/b"), Path::new("a/b/c")),
            (Path::new("/x"), Path::new("/y")),
        ];
        for (a, b) in pairs {
            assert!(
                !(a.is_ancestor_of(&b) && b.is_ancestor_of(&a)),
                "both directions claimed for {a} / {b}"
            );
        }
    }

    #[test]
    fn test_differing_parent_runs_never_related() {
        let a = Path::new("../../a");
        let b = Path::new("../b");
        assert!(!a.is_ancestor_of(&b));
        assert!(!b.is_ancestor_of(&a));
        assert!(!a.is_child_of(&b, true));
    }

    #[test]
    fn test_child_predicate() {
        assert!(Path::new("/a/b").is_child_of(&Path::new("/a"), false));
        assert!(!Path::new("/a/b/c").is_child_of(&Path::new("/a"), false));
        assert!(Path::new("/a/b/c").is_child_of(&Path::new("/a"), true));
        assert!(Path::new("a/b").is_child_of(&Path::new("a"), false));
    }
}
