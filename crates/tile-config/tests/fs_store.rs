// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]

use serde::{Deserialize, Serialize};
use tile_config::{ConfigError, ConfigService, ConfigStore, FsConfigStore};

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
struct Prefs {
    address: String,
    kelvin_min: u16,
}

#[test]
fn missing_key_reads_as_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsConfigStore::at(dir.path()).unwrap();
    assert_eq!(store.read("device").unwrap(), None);
}

#[test]
fn document_lands_in_named_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsConfigStore::at(dir.path()).unwrap();
    store.write("device", b"{}").unwrap();
    assert_eq!(store.path_for("device"), dir.path().join("device.json"));
    assert_eq!(std::fs::read(dir.path().join("device.json")).unwrap(), b"{}");
    assert_eq!(store.read("device").unwrap().as_deref(), Some(&b"{}"[..]));
}

#[test]
fn at_creates_nested_directory() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("a").join("b");
    let store = FsConfigStore::at(&nested).unwrap();
    assert!(nested.is_dir());
    assert_eq!(store.dir(), nested.as_path());
}

#[test]
fn unreadable_entry_reports_its_path() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsConfigStore::at(dir.path()).unwrap();
    // A directory where the file should be cannot be read as a document.
    std::fs::create_dir(store.path_for("device")).unwrap();
    let expected = store.path_for("device");
    assert!(matches!(
        store.read("device"),
        Err(ConfigError::Io { path, .. }) if path == expected
    ));
}

#[test]
fn service_round_trips_typed_values() {
    let dir = tempfile::tempdir().unwrap();
    let service = ConfigService::new(FsConfigStore::at(dir.path()).unwrap());
    assert_eq!(service.load::<Prefs>("device").unwrap(), None);

    let prefs = Prefs {
        address: "192.168.1.40".into(),
        kelvin_min: 2700,
    };
    service.save("device", &prefs).unwrap();
    assert_eq!(service.load::<Prefs>("device").unwrap(), Some(prefs));
}

#[test]
fn empty_file_loads_as_none() {
    let dir = tempfile::tempdir().unwrap();
    let service = ConfigService::new(FsConfigStore::at(dir.path()).unwrap());
    service.store().write("device", b"").unwrap();
    assert_eq!(service.load::<Prefs>("device").unwrap(), None);
    assert_eq!(
        service.load_or_default::<Prefs>("device").unwrap(),
        Prefs::default()
    );
}

#[test]
fn garbage_file_names_its_key() {
    let dir = tempfile::tempdir().unwrap();
    let service = ConfigService::new(FsConfigStore::at(dir.path()).unwrap());
    service.store().write("device", b"not json").unwrap();
    assert!(matches!(
        service.load::<Prefs>("device"),
        Err(ConfigError::Json { key, .. }) if key == "device"
    ));
}
