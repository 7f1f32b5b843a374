// Copyright 2022-2023 Protocol Labs
// SPDX-License-Identifier: Apache-2.0, MIT
//! Golden files pin the serialized form of data structures, so that changes
//! to the format which would break existing genesis files are noticed.
use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};

use quickcheck::Gen;
use serde::{de::DeserializeOwned, Serialize};

/// Path to a golden file, relative to the crate running the test.
fn path(prefix: &str, name: &str, ext: &str) -> PathBuf {
    Path::new("golden")
        .join(prefix)
        .join(name)
        .with_extension(ext)
}

/// Read the contents of an existing golden file, or create it with the
/// output of a generator if it doesn't exist yet.
fn read_or_create<F>(prefix: &str, name: &str, ext: &str, make: F) -> String
where
    F: FnOnce() -> String,
{
    let p = path(prefix, name, ext);

    if !p.exists() {
        if let Some(dir) = p.parent() {
            fs::create_dir_all(dir).expect("failed to create golden directory");
        }
        let s = make();
        fs::write(&p, &s).unwrap_or_else(|e| panic!("failed to write golden file {p:?}: {e}"));
    }

    fs::read_to_string(&p).unwrap_or_else(|e| panic!("failed to read golden file {p:?}: {e}"))
}

/// Check that a golden JSON file can still be parsed, and that writing the
/// parsed data produces the same JSON document.
pub fn test_json<T, F>(prefix: &str, name: &str, arb_data: F)
where
    T: Serialize + DeserializeOwned + PartialEq + Debug,
    F: FnOnce(&mut Gen) -> T,
{
    let json = read_or_create(prefix, name, "json", || {
        let mut g = Gen::new(10);
        let data = arb_data(&mut g);
        serde_json::to_string_pretty(&data).expect("failed to serialize golden data")
    });

    let data0: T = serde_json::from_str(&json)
        .unwrap_or_else(|e| panic!("failed to parse golden JSON {prefix}/{name}: {e}"));

    let json1 = serde_json::to_string_pretty(&data0).expect("failed to serialize data");

    let data1: T = serde_json::from_str(&json1).expect("failed to parse re-serialized JSON");

    assert_eq!(data0, data1, "data should round-trip");

    let value0: serde_json::Value = serde_json::from_str(&json).expect("golden file is JSON");
    let value1: serde_json::Value = serde_json::from_str(&json1).expect("output is JSON");

    assert_eq!(value0, value1, "JSON should not change");
}

/// Test that the JSON format of a type doesn't change.
///
/// Example:
///
/// ```text
/// golden_json! { "genesis", genesis, GenesisState::arbitrary }
/// ```
#[macro_export]
macro_rules! golden_json {
    ($prefix:literal, $name:ident, $gen:expr) => {
        #[test]
        fn $name() {
            let label = stringify!($name);
            $crate::golden::test_json($prefix, &label, $gen);
        }
    };
}
