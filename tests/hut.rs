//! Usage-table loading.

use std::fs;

use hidwire::hut::default_dir;
use hidwire::{UsageLookup, UsageTables};

#[test]
fn loads_a_directory_of_hut_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("generic_desktop.hut"),
        "(1)\tGeneric Desktop\n30\tX\n31\tY\n",
    )
    .unwrap();
    fs::write(dir.path().join("button.hut"), "(9)\tButton\n01\tButton 1\n").unwrap();
    // Non-.hut files are ignored.
    fs::write(dir.path().join("README"), "not a table").unwrap();

    let tables = UsageTables::load_dir(dir.path()).unwrap();
    assert_eq!(tables.len(), 2);
    assert_eq!(tables.page_name(1), Some("Generic Desktop"));
    assert_eq!(tables.usage_name(0x0001_0030), Some("X"));
    assert_eq!(tables.page_name(9), Some("Button"));
    assert_eq!(tables.page_name(2), None);
    assert_eq!(tables.usage_name(0x0002_0001), None);
}

#[test]
fn malformed_files_fail_the_load() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("broken.hut"), "(1)\tPage\nnot-hex\tName\n").unwrap();
    assert!(UsageTables::load_dir(dir.path()).is_err());
}

#[test]
fn missing_directory_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let gone = dir.path().join("nope");
    match UsageTables::load_dir(&gone) {
        Err(hidwire::Error::Io(_)) => {}
        other => panic!("expected an I/O error, got {other:?}"),
    }
}

#[test]
fn bundled_tables_load() {
    let tables = UsageTables::load_default().unwrap();
    assert!(default_dir().is_dir());
    assert_eq!(tables.page_name(1), Some("Generic Desktop"));
    assert_eq!(tables.page_name(9), Some("Button"));
    assert_eq!(tables.usage_name(0x0001_0030), Some("X"));
    assert_eq!(tables.usage_name(0x0007_0004), Some("Keyboard A"));
    assert_eq!(tables.usage_name(0x000d_0054), Some("Contact Count"));
}

#[test]
fn global_tables_are_shared() {
    let a = UsageTables::global() as *const UsageTables;
    let b = UsageTables::global() as *const UsageTables;
    assert_eq!(a, b);
}
