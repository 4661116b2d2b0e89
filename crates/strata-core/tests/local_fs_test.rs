//! Behavior tests for the local-disk backend

use std::io::{Cursor, Read};

use strata_core::{Error, Filesystem, LocalFilesystem};
use strata_testing::{TestDir, SAMPLE_TREE};

fn ls_sorted(fs: &LocalFilesystem, glob: &str) -> Vec<String> {
    let mut got: Vec<String> = fs.ls(glob).unwrap().map(|r| r.unwrap()).collect();
    got.sort();
    got
}

#[test]
fn test_can_handle_local_paths_only() {
    let fs = LocalFilesystem::new();
    assert!(fs.can_handle("/dem/bitties"));
    assert!(fs.can_handle("garden"));
    assert!(!fs.can_handle("hdfs://namenode/x"));
    assert!(!fs.can_handle("http://example.com/"));
}

#[test]
fn test_ls_empty_dir() {
    let dir = TestDir::new().unwrap();
    let fs = LocalFilesystem::new();
    assert!(ls_sorted(&fs, &dir.path().display().to_string()).is_empty());
}

#[test]
fn test_ls_recurses_and_skips_directories() {
    let dir = TestDir::new().unwrap();
    let fs = LocalFilesystem::new();

    let mut expect = Vec::new();
    for name in SAMPLE_TREE {
        expect.push(dir.create_file(name, name.as_bytes()).unwrap());
    }
    let mut expect: Vec<String> = expect.iter().map(|p| p.display().to_string()).collect();
    expect.sort();

    assert_eq!(ls_sorted(&fs, &dir.path().display().to_string()), expect);
}

#[test]
fn test_ls_glob_matching_nothing_is_empty() {
    let dir = TestDir::new().unwrap();
    let fs = LocalFilesystem::new();
    let glob = format!("{}/no-such-*", dir.path().display());
    assert!(ls_sorted(&fs, &glob).is_empty());
}

#[test]
fn test_du_is_additive() {
    let dir = TestDir::new().unwrap();
    let fs = LocalFilesystem::new();
    let data1 = dir.create_file("data1", b"abcd").unwrap();
    dir.create_file("more/data2", b"defg").unwrap();
    dir.create_file("more/data3", b"hijk").unwrap();

    let root = dir.path().display().to_string();
    assert_eq!(fs.du(&root).unwrap(), 12);
    assert_eq!(fs.du(&data1.display().to_string()).unwrap(), 4);
    assert_eq!(fs.du(&format!("{}/more", root)).unwrap(), 8);
    assert_eq!(fs.du(&format!("{}/more/*", root)).unwrap(), 8);
    assert_eq!(fs.du(&format!("{}/none-*", root)).unwrap(), 0);
}

#[test]
fn test_exists() {
    let dir = TestDir::new().unwrap();
    let fs = LocalFilesystem::new();
    let root = dir.path().display().to_string();

    assert!(!fs.exists(&format!("{}/f", root)).unwrap());
    dir.create_file("f", b"contents").unwrap();
    assert!(fs.exists(&format!("{}/f", root)).unwrap());
    assert!(fs.exists(&format!("{}/*", root)).unwrap());
}

#[test]
fn test_mkdir_is_idempotent() {
    let dir = TestDir::new().unwrap();
    let fs = LocalFilesystem::new();
    let target = format!("{}/a/b/c", dir.path().display());

    fs.mkdir(&target).unwrap();
    fs.mkdir(&target).unwrap();
    assert!(std::path::Path::new(&target).is_dir());
}

#[test]
fn test_rm_tree_variants() {
    let fs = LocalFilesystem::new();

    // bare prefix: directory and contents go away
    let dir = TestDir::new().unwrap();
    let root = dir.create_dir("icio/goodbye-1").unwrap();
    for name in SAMPLE_TREE {
        dir.create_file(&format!("icio/goodbye-1/{}", name), b"x").unwrap();
    }
    fs.rm(&root.display().to_string()).unwrap();
    assert!(!root.exists());

    // trailing separator behaves the same
    let dir = TestDir::new().unwrap();
    let root = dir.create_dir("icio/goodbye-2").unwrap();
    for name in SAMPLE_TREE {
        dir.create_file(&format!("icio/goodbye-2/{}", name), b"x").unwrap();
    }
    fs.rm(&format!("{}/", root.display())).unwrap();
    assert!(!root.exists());

    // trailing wildcard removes contents but keeps the directory
    let dir = TestDir::new().unwrap();
    let root = dir.create_dir("icio/goodbye-3").unwrap();
    for name in SAMPLE_TREE {
        dir.create_file(&format!("icio/goodbye-3/{}", name), b"x").unwrap();
    }
    fs.rm(&format!("{}/*", root.display())).unwrap();
    assert!(root.is_dir());
    assert!(ls_sorted(&fs, &root.display().to_string()).is_empty());
}

#[test]
fn test_rm_missing_target_is_a_no_op() {
    let dir = TestDir::new().unwrap();
    let fs = LocalFilesystem::new();
    fs.rm(&format!("{}/never-was", dir.path().display())).unwrap();
}

#[test]
fn test_write_then_read_round_trips() {
    let dir = TestDir::new().unwrap();
    let fs = LocalFilesystem::new();
    let dest = format!("{}/new-file", dir.path().display());

    let payload = b"some content!".to_vec();
    fs.write(&dest, &mut Cursor::new(payload.clone())).unwrap();

    let mut got = Vec::new();
    fs.cat(&dest).unwrap().read_to_end(&mut got).unwrap();
    assert_eq!(got, payload);
}

#[test]
fn test_write_refuses_overwrite_and_preserves_content() {
    let dir = TestDir::new().unwrap();
    let fs = LocalFilesystem::new();
    let existing = dir.create_file("existing", b"herp").unwrap();
    let dest = existing.display().to_string();

    let result = fs.write(&dest, &mut Cursor::new(b"derp".to_vec()));
    assert!(matches!(result, Err(Error::AlreadyExists(_))));
    assert_eq!(std::fs::read(&existing).unwrap(), b"herp");
}

#[test]
fn test_put_requires_existing_local_source() {
    let dir = TestDir::new().unwrap();
    let fs = LocalFilesystem::new();
    let src = dir.create_file("copy-src", b"never poke a bear").unwrap();
    let dest = format!("{}/copy-dst", dir.path().display());

    fs.put(&dest, &src).unwrap();
    assert_eq!(std::fs::read(&dest).unwrap(), b"never poke a bear");

    // a second put against the same destination is an overwrite
    assert!(matches!(
        fs.put(&dest, &src),
        Err(Error::AlreadyExists(_))
    ));

    let missing = dir.path().join("no-such-source");
    assert!(matches!(
        fs.put(&format!("{}/other", dir.path().display()), &missing),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn test_touchz() {
    let dir = TestDir::new().unwrap();
    let fs = LocalFilesystem::new();
    let target = format!("{}/f", dir.path().display());

    fs.touchz(&target).unwrap();
    fs.touchz(&target).unwrap();

    std::fs::write(&target, b"not empty anymore").unwrap();
    assert!(matches!(fs.touchz(&target), Err(Error::AlreadyExists(_))));
}

#[test]
fn test_open_missing_file_is_not_found() {
    let dir = TestDir::new().unwrap();
    let fs = LocalFilesystem::new();
    assert!(matches!(
        fs.open(&format!("{}/ghost", dir.path().display())),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn test_checksum_is_stable_per_content() {
    let dir = TestDir::new().unwrap();
    let fs = LocalFilesystem::new();
    let a = dir.create_file("a", b"abcd").unwrap();
    let b = dir.create_file("b", b"abcd").unwrap();
    let c = dir.create_file("c", b"efgh").unwrap();

    let ca = fs.checksum(&a.display().to_string()).unwrap();
    let cb = fs.checksum(&b.display().to_string()).unwrap();
    let cc = fs.checksum(&c.display().to_string()).unwrap();
    assert_eq!(ca, cb);
    assert_ne!(ca, cc);
}
