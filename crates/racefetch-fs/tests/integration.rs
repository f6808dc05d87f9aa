use std::fs;
use std::path::Path;

use racefetch_fs::{Error, strip_first_dir};
use tempfile::tempdir;

fn names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_strip_first_dir_moves_children_up() {
    let dir = tempdir().unwrap();
    let bin = dir.path().join("v1.2.3").join("bin");
    fs::create_dir_all(&bin).unwrap();
    fs::write(bin.join("tool"), b"binary").unwrap();
    fs::write(dir.path().join("v1.2.3").join("LICENSE"), b"mit").unwrap();

    strip_first_dir(dir.path()).unwrap();

    assert_eq!(fs::read(dir.path().join("bin").join("tool")).unwrap(), b"binary");
    assert_eq!(fs::read(dir.path().join("LICENSE")).unwrap(), b"mit");
    assert!(!dir.path().join("v1.2.3").exists());
    assert_eq!(names(dir.path()), vec!["LICENSE", "bin"]);
}

#[test]
fn test_strip_first_dir_keeps_sibling_files() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("pkg").join("lib")).unwrap();
    fs::write(dir.path().join("checksums.txt"), b"abc").unwrap();

    strip_first_dir(dir.path()).unwrap();

    assert!(dir.path().join("lib").is_dir());
    assert_eq!(fs::read(dir.path().join("checksums.txt")).unwrap(), b"abc");
    assert!(!dir.path().join("pkg").exists());
}

#[test]
fn test_strip_first_dir_child_named_like_wrapper() {
    let dir = tempdir().unwrap();
    let inner = dir.path().join("tool").join("tool");
    fs::create_dir_all(&inner).unwrap();
    fs::write(inner.join("main"), b"x").unwrap();

    strip_first_dir(dir.path()).unwrap();

    assert_eq!(fs::read(dir.path().join("tool").join("main")).unwrap(), b"x");
    assert_eq!(names(dir.path()), vec!["tool"]);
}

#[test]
fn test_strip_first_dir_without_dirs_fails() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("only-a-file"), b"x").unwrap();

    let result = strip_first_dir(dir.path());

    assert!(matches!(result, Err(Error::NoDirectory(_))));
    assert_eq!(names(dir.path()), vec!["only-a-file"]);
}

#[test]
fn test_strip_first_dir_with_two_dirs_fails_untouched() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("a").join("x")).unwrap();
    fs::create_dir_all(dir.path().join("b")).unwrap();

    let result = strip_first_dir(dir.path());

    assert!(matches!(
        result,
        Err(Error::AmbiguousDirectory { count: 2, .. })
    ));
    assert_eq!(names(dir.path()), vec!["a", "b"]);
    assert!(dir.path().join("a").join("x").is_dir());
}

#[test]
fn test_strip_first_dir_missing_dir_fails() {
    let dir = tempdir().unwrap();
    let result = strip_first_dir(dir.path().join("nope"));
    assert!(matches!(result, Err(Error::Read { .. })));
}

#[test]
fn test_strip_first_dir_conflict_restores_wrapper() {
    let dir = tempdir().unwrap();
    let wrapper = dir.path().join("v1");
    fs::create_dir_all(wrapper.join("bin")).unwrap();
    fs::write(wrapper.join("bin").join("tool"), b"binary").unwrap();
    for i in 0..5 {
        fs::write(wrapper.join(format!("f{i}")), format!("{i}")).unwrap();
    }
    fs::write(dir.path().join("bin"), b"top-level file").unwrap();

    let result = strip_first_dir(dir.path());

    assert!(matches!(result, Err(Error::Rename { .. })), "{result:?}");
    assert_eq!(names(dir.path()), vec!["bin", "v1"]);
    assert_eq!(fs::read(dir.path().join("bin")).unwrap(), b"top-level file");
    assert_eq!(fs::read(wrapper.join("bin").join("tool")).unwrap(), b"binary");
    for i in 0..5 {
        assert_eq!(fs::read(wrapper.join(format!("f{i}"))).unwrap(), format!("{i}").as_bytes());
    }
}
