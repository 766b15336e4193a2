//! Typed bitsets for watch events and file permissions.
//!
//! Both sets pair a plain integer bitset with a static canonical table of
//! `(flag, name)` entries. Name listing and `Display` always iterate the
//! table, never the raw bits, so diagnostic output is deterministic
//! regardless of integer representation.

use bitflags::bitflags;
use notify::EventKind;
use notify::event::{DataChange, MetadataKind};
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeSeq, Serializer};

bitflags! {
    /// Flags describing what happened to a watched path.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WatchFlags: u32 {
        const CREATED      = 1 << 0;
        const REMOVED      = 1 << 1;
        const RENAMED      = 1 << 2;
        const MODIFIED     = 1 << 3;
        const EXTENDED     = 1 << 4;
        const ATTRIBUTES   = 1 << 5;
        const OWNER        = 1 << 6;
        const XATTR        = 1 << 7;
        const IS_FILE      = 1 << 8;
        const IS_DIRECTORY = 1 << 9;
        const IS_SYMLINK   = 1 << 10;
        const OWN_EVENT    = 1 << 11;
        const ROOT_CHANGED = 1 << 12;
        const MOUNTED      = 1 << 13;
        const UNMOUNTED    = 1 << 14;
        const MUST_RESCAN  = 1 << 15;
        const HISTORY_DONE = 1 << 16;
        const ID_WRAPPED   = 1 << 17;
    }
}

bitflags! {
    /// File permission bits for the current user class.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PermissionFlags: u32 {
        const READ    = 1 << 0;
        const WRITE   = 1 << 1;
        const EXECUTE = 1 << 2;
    }
}

/// Generates the canonical-table surface shared by both flag types:
/// ordered name listing, lenient name parsing, `Display`, and serde as a
/// name list.
macro_rules! flag_names {
    ($ty:ident, $table:expr) => {
        impl $ty {
            /// Canonical `(flag, name)` table in definition order.
            pub const NAMES: &'static [($ty, &'static str)] = $table;

            /// Names of all contained flags, in canonical table order.
            pub fn names(&self) -> Vec<&'static str> {
                Self::NAMES
                    .iter()
                    .filter(|(flag, _)| self.contains(*flag))
                    .map(|(_, name)| *name)
                    .collect()
            }

            /// Parse a list of names back into a flag set.
            ///
            /// Unknown names are ignored; the round trip preserves every
            /// `contains` check over the defined flags.
            pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
                let mut flags = Self::empty();
                for name in names {
                    if let Some((flag, _)) =
                        Self::NAMES.iter().find(|(_, n)| *n == name.as_ref())
                    {
                        flags.insert(*flag);
                    }
                }
                flags
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                if self.is_empty() {
                    return write!(f, "(none)");
                }
                write!(f, "{}", self.names().join(", "))
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let names = self.names();
                let mut seq = serializer.serialize_seq(Some(names.len()))?;
                for name in names {
                    seq.serialize_element(name)?;
                }
                seq.end()
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let names = Vec::<String>::deserialize(deserializer)?;
                Ok(Self::from_names(&names))
            }
        }
    };
}

flag_names!(
    WatchFlags,
    &[
        (WatchFlags::CREATED, "created"),
        (WatchFlags::REMOVED, "removed"),
        (WatchFlags::RENAMED, "renamed"),
        (WatchFlags::MODIFIED, "modified"),
        (WatchFlags::EXTENDED, "extended"),
        (WatchFlags::ATTRIBUTES, "attributes"),
        (WatchFlags::OWNER, "owner"),
        (WatchFlags::XATTR, "xattr"),
        (WatchFlags::IS_FILE, "is-file"),
        (WatchFlags::IS_DIRECTORY, "is-directory"),
        (WatchFlags::IS_SYMLINK, "is-symlink"),
        (WatchFlags::OWN_EVENT, "own-event"),
        (WatchFlags::ROOT_CHANGED, "root-changed"),
        (WatchFlags::MOUNTED, "mounted"),
        (WatchFlags::UNMOUNTED, "unmounted"),
        (WatchFlags::MUST_RESCAN, "must-rescan"),
        (WatchFlags::HISTORY_DONE, "history-done"),
        (WatchFlags::ID_WRAPPED, "id-wrapped"),
    ]
);

flag_names!(
    PermissionFlags,
    &[
        (PermissionFlags::READ, "read"),
        (PermissionFlags::WRITE, "write"),
        (PermissionFlags::EXECUTE, "execute"),
    ]
);

impl WatchFlags {
    /// All flags that describe a change to the path itself, as opposed to
    /// markers about the kind of entry or the delivery stream.
    pub const CHANGE_MASK: WatchFlags = WatchFlags::CREATED
        .union(WatchFlags::REMOVED)
        .union(WatchFlags::RENAMED)
        .union(WatchFlags::MODIFIED)
        .union(WatchFlags::EXTENDED)
        .union(WatchFlags::ATTRIBUTES)
        .union(WatchFlags::OWNER)
        .union(WatchFlags::XATTR);

    /// Decode a notify event kind into watch flags.
    ///
    /// The notify taxonomy is richer on some platforms than others; kinds
    /// that carry no usable signal (access, other) decode to an empty set
    /// and are filtered out by the watchers.
    pub fn from_event_kind(kind: &EventKind) -> WatchFlags {
        use notify::event::{CreateKind, ModifyKind, RemoveKind};

        match kind {
            EventKind::Create(create) => {
                WatchFlags::CREATED
                    | match create {
                        CreateKind::File => WatchFlags::IS_FILE,
                        CreateKind::Folder => WatchFlags::IS_DIRECTORY,
                        _ => WatchFlags::empty(),
                    }
            }
            EventKind::Remove(remove) => {
                WatchFlags::REMOVED
                    | match remove {
                        RemoveKind::File => WatchFlags::IS_FILE,
                        RemoveKind::Folder => WatchFlags::IS_DIRECTORY,
                        _ => WatchFlags::empty(),
                    }
            }
            EventKind::Modify(modify) => match modify {
                ModifyKind::Name(_) => WatchFlags::RENAMED,
                ModifyKind::Data(DataChange::Size) => WatchFlags::MODIFIED | WatchFlags::EXTENDED,
                ModifyKind::Data(_) => WatchFlags::MODIFIED,
                ModifyKind::Metadata(MetadataKind::Ownership) => WatchFlags::OWNER,
                ModifyKind::Metadata(MetadataKind::Extended) => WatchFlags::XATTR,
                ModifyKind::Metadata(_) => WatchFlags::ATTRIBUTES,
                _ => WatchFlags::MODIFIED,
            },
            _ => WatchFlags::empty(),
        }
    }
}

impl PermissionFlags {
    /// Decode the user-class bits of a Unix file mode.
    pub fn from_mode(mode: u32) -> PermissionFlags {
        let mut flags = PermissionFlags::empty();
        if mode & 0o400 != 0 {
            flags |= PermissionFlags::READ;
        }
        if mode & 0o200 != 0 {
            flags |= PermissionFlags::WRITE;
        }
        if mode & 0o100 != 0 {
            flags |= PermissionFlags::EXECUTE;
        }
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_follow_table_order() {
        let flags = WatchFlags::MODIFIED | WatchFlags::CREATED | WatchFlags::XATTR;
        assert_eq!(flags.names(), vec!["created", "modified", "xattr"]);
    }

    #[test]
    fn test_name_round_trip_preserves_containment() {
        let flags = WatchFlags::REMOVED | WatchFlags::IS_DIRECTORY | WatchFlags::MUST_RESCAN;
        let parsed = WatchFlags::from_names(&flags.names());
        for (flag, _) in WatchFlags::NAMES {
            assert_eq!(parsed.contains(*flag), flags.contains(*flag));
        }
    }

    #[test]
    fn test_unknown_names_are_ignored() {
        let parsed = WatchFlags::from_names(&["created", "bogus", "removed"]);
        assert_eq!(parsed, WatchFlags::CREATED | WatchFlags::REMOVED);
    }

    #[test]
    fn test_display_is_deterministic() {
        let a = WatchFlags::XATTR | WatchFlags::CREATED;
        let b = WatchFlags::CREATED | WatchFlags::XATTR;
        assert_eq!(a.to_string(), b.to_string());
        assert_eq!(a.to_string(), "created, xattr");
        assert_eq!(WatchFlags::empty().to_string(), "(none)");
    }

    #[test]
    fn test_permission_mode_decode() {
        assert_eq!(
            PermissionFlags::from_mode(0o755),
            PermissionFlags::READ | PermissionFlags::WRITE | PermissionFlags::EXECUTE
        );
        assert_eq!(PermissionFlags::from_mode(0o444), PermissionFlags::READ);
        assert_eq!(PermissionFlags::from_mode(0o000), PermissionFlags::empty());
    }

    #[test]
    fn test_event_kind_decode() {
        use notify::event::{CreateKind, ModifyKind, RenameMode};

        assert_eq!(
            WatchFlags::from_event_kind(&EventKind::Create(CreateKind::File)),
            WatchFlags::CREATED | WatchFlags::IS_FILE
        );
        assert_eq!(
            WatchFlags::from_event_kind(&EventKind::Modify(ModifyKind::Name(RenameMode::Any))),
            WatchFlags::RENAMED
        );
        assert!(WatchFlags::from_event_kind(&EventKind::Any).is_empty());
    }
}
