use super::*;

#[test]
fn cleanup_removes_registered_dir_once() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("frames");
    std::fs::create_dir_all(dir.join("nested")).unwrap();
    std::fs::write(dir.join("frame_00000.png"), b"x").unwrap();

    let registry = ScratchRegistry::new();
    registry.set(&dir);
    assert_eq!(registry.current().as_deref(), Some(dir.as_path()));

    assert_eq!(registry.cleanup(), Some(dir.clone()));
    assert!(!dir.exists());
    assert_eq!(registry.cleanup(), None);
}

#[test]
fn cleared_registry_leaves_directory_alone() {
    let root = tempfile::tempdir().unwrap();
    let registry = ScratchRegistry::new();
    registry.set(root.path());
    registry.clear();
    assert!(registry.cleanup().is_none());
    assert!(root.path().exists());
}

#[test]
fn clones_share_the_slot() {
    let a = ScratchRegistry::new();
    let b = a.clone();
    a.set(Path::new("/tmp/retype-frames-x"));
    assert_eq!(b.current(), Some(PathBuf::from("/tmp/retype-frames-x")));
}
