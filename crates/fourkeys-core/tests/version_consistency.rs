//! Ensures all workspace crates use `version.workspace = true`.

use std::path::{Path, PathBuf};

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(Path::parent)
        .expect("workspace root")
        .to_path_buf()
}

fn workspace_version() -> String {
    let root_toml = std::fs::read_to_string(workspace_root().join("Cargo.toml")).unwrap();
    let doc: toml::Value = root_toml.parse().unwrap();
    doc["workspace"]["package"]["version"]
        .as_str()
        .unwrap()
        .to_string()
}

fn uses_workspace_version(manifest_dir: &Path) -> bool {
    let toml_str = std::fs::read_to_string(manifest_dir.join("Cargo.toml")).unwrap();
    let doc: toml::Value = toml_str.parse().unwrap();
    doc.get("package")
        .and_then(|p| p.get("version"))
        .and_then(|v| v.as_table())
        .and_then(|t| t.get("workspace"))
        .and_then(|w| w.as_bool())
        == Some(true)
}

#[test]
fn all_crates_use_workspace_version() {
    let root = workspace_root();
    let doc: toml::Value = std::fs::read_to_string(root.join("Cargo.toml"))
        .unwrap()
        .parse()
        .unwrap();
    let members = doc["workspace"]["members"].as_array().unwrap();
    assert!(!members.is_empty());

    for member in members {
        let dir = root.join(member.as_str().unwrap());
        assert!(
            uses_workspace_version(&dir),
            "{} does not use version.workspace = true",
            dir.display()
        );
    }
}

#[test]
fn crate_version_matches_workspace() {
    assert_eq!(fourkeys_core::VERSION, workspace_version());
}
