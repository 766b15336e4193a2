//! Contract tests for the OS-delegating path surface.

use pathwatch::{FileError, Path, PermissionFlags};
use tempfile::TempDir;

fn temp_path(dir: &TempDir, name: &str) -> Path {
    Path::from(dir.path().join(name))
}

#[test]
fn test_create_and_query_file() {
    let dir = TempDir::new().unwrap();
    let file = temp_path(&dir, "created.txt");

    assert!(!file.exists());
    file.create_file().unwrap();
    assert!(file.exists());
    assert!(file.is_regular());
    assert!(!file.is_directory());
    assert_eq!(file.file_size(), Some(0));
}

#[test]
fn test_create_file_refuses_existing() {
    let dir = TempDir::new().unwrap();
    let file = temp_path(&dir, "dup.txt");
    file.create_file().unwrap();

    let err = file.create_file().unwrap_err();
    assert!(matches!(err, FileError::DestinationExists { .. }), "got {err}");
}

#[test]
fn test_touch_is_lenient() {
    let dir = TempDir::new().unwrap();
    let file = temp_path(&dir, "touched");
    file.touch().unwrap();
    file.touch().unwrap();
    assert!(file.is_regular());
}

#[test]
fn test_create_directory_with_intermediates() {
    let dir = TempDir::new().unwrap();
    let nested = temp_path(&dir, "a/b/c");

    assert!(nested.create_directory(false).is_err());
    nested.create_directory(true).unwrap();
    assert!(nested.is_directory());
}

#[test]
fn test_move_contracts() {
    let dir = TempDir::new().unwrap();
    let missing = temp_path(&dir, "missing");
    let dest = temp_path(&dir, "dest");

    let err = missing.move_file(&dest).unwrap_err();
    assert!(matches!(err, FileError::SourceMissing { .. }), "got {err}");

    let source = temp_path(&dir, "source");
    source.create_file().unwrap();
    dest.create_file().unwrap();
    let err = source.move_file(&dest).unwrap_err();
    match err {
        FileError::DestinationExists { source_path, dest: d } => {
            // Both endpoints must be present for a precise message.
            assert_eq!(source_path, source);
            assert_eq!(d, dest);
        }
        other => panic!("expected DestinationExists, got {other}"),
    }

    let fresh = temp_path(&dir, "fresh");
    source.move_file(&fresh).unwrap();
    assert!(!source.exists());
    assert!(fresh.exists());
}

#[test]
fn test_copy_preserves_source() {
    let dir = TempDir::new().unwrap();
    let source = temp_path(&dir, "original");
    std::fs::write(source.raw(), b"payload").unwrap();

    let copy = temp_path(&dir, "copy");
    source.copy_file(&copy).unwrap();
    assert!(source.exists());
    assert_eq!(copy.file_size(), Some(7));
}

#[test]
fn test_symlink_and_hardlink() {
    let dir = TempDir::new().unwrap();
    let target = temp_path(&dir, "target");
    target.create_file().unwrap();

    let link = temp_path(&dir, "link");
    target.symlink_file(&link).unwrap();
    assert!(link.is_symbolic_link());
    assert!(link.is_any());

    let hard = temp_path(&dir, "hard");
    target.hardlink_file(&hard).unwrap();
    assert!(hard.is_regular());
    assert!(!hard.is_symbolic_link());

    // Destination-exists applies to link creation too.
    let err = target.symlink_file(&link).unwrap_err();
    assert!(matches!(err, FileError::DestinationExists { .. }), "got {err}");
}

#[test]
fn test_dangling_symlink_is_any_but_does_not_exist() {
    let dir = TempDir::new().unwrap();
    let target = temp_path(&dir, "will-vanish");
    target.create_file().unwrap();
    let link = temp_path(&dir, "dangling");
    target.symlink_file(&link).unwrap();
    target.delete_file().unwrap();

    assert!(!link.exists());
    assert!(link.is_any());
    link.delete_file().unwrap();
    assert!(!link.is_any());
}

#[test]
fn test_delete_contracts() {
    let dir = TempDir::new().unwrap();
    let missing = temp_path(&dir, "nothing");
    let err = missing.delete_file().unwrap_err();
    assert!(matches!(err, FileError::SourceMissing { .. }), "got {err}");

    let tree = temp_path(&dir, "tree/deep");
    tree.create_directory(true).unwrap();
    tree.join("file").touch().unwrap();

    // Non-recursive delete refuses a non-empty directory.
    assert!(tree.delete_file().is_err());
    temp_path(&dir, "tree").delete_all().unwrap();
    assert!(!temp_path(&dir, "tree").exists());
}

#[test]
fn test_permissions_decode() {
    let dir = TempDir::new().unwrap();
    let file = temp_path(&dir, "perms");
    file.create_file().unwrap();

    let perms = file.permissions();
    assert!(perms.contains(PermissionFlags::READ));
    assert!(perms.contains(PermissionFlags::WRITE));
    assert!(!perms.contains(PermissionFlags::EXECUTE));

    assert_eq!(temp_path(&dir, "absent").permissions(), PermissionFlags::empty());
}

#[test]
fn test_resolved_follows_symlinks() {
    let dir = TempDir::new().unwrap();
    let target = temp_path(&dir, "real");
    target.create_file().unwrap();
    let link = temp_path(&dir, "alias");
    target.symlink_file(&link).unwrap();

    assert_eq!(link.resolved(), target.resolved());
}
