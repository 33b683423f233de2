use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use nfssgen_core::output::PlanEntry;
use serde_json::Value;
use tempfile::tempdir;

fn write_attributes(dir: &Path, family: &str) -> PathBuf {
    let attributes = serde_json::json!([
        {
            "postscript_name": "MinionPro-Regular",
            "filename": "MinionPro-Regular.otf",
            "family": family,
            "subfamily": "Regular",
            "vendor_url": "http://www.adobe.com/type/",
            "features": ["kern", "liga", "onum", "smcp"]
        },
        {
            "postscript_name": "MinionPro-It",
            "filename": "MinionPro-It.otf",
            "family": family,
            "subfamily": "Italic",
            "vendor_url": "http://www.adobe.com/type/",
            "features": ["kern", "liga", "onum", "smcp"]
        }
    ]);
    let path = dir.join("attributes.json");
    fs::write(&path, serde_json::to_string_pretty(&attributes).expect("json")).expect("write");
    path
}

fn nfssgen(args: &[&str], extra: &[&Path]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_nfssgen"))
        .args(args)
        .args(extra)
        .output()
        .expect("run nfssgen")
}

#[test]
fn config_prints_effective_json() {
    let output = nfssgen(&["config"], &[]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let config: Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(config["encoding"], "LY1");
    assert_eq!(config["berry_names"]["Minion Pro"], "pmn");
}

#[test]
fn config_file_overrides_defaults() {
    let tmp = tempdir().expect("tempdir");
    let path = tmp.path().join("nfssgen.json");
    fs::write(&path, r#"{ "oldstyle_default": false, "berry_names": { "Foo Sans": "zfs" } }"#)
        .expect("write config");

    let output = nfssgen(&["config", "--config"], &[&path]);
    assert!(output.status.success());
    let config: Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(config["oldstyle_default"], false);
    assert_eq!(config["berry_names"]["Foo Sans"], "zfs");
    assert!(config["berry_names"].get("Minion Pro").is_none());
    assert_eq!(config["encoding"], "LY1");
}

#[test]
fn plan_json_lists_every_leaf() {
    let tmp = tempdir().expect("tempdir");
    let attributes = write_attributes(tmp.path(), "Minion Pro");

    let output = nfssgen(&["plan", "--json", "--attributes"], &[&attributes]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let entries: Vec<PlanEntry> = serde_json::from_slice(&output.stdout).expect("plan json");
    let shapes: Vec<&str> = entries.iter().map(|e| e.shape.as_str()).collect();
    assert_eq!(shapes, vec!["it", "n", "sc", "si"]);
    assert!(entries.iter().all(|e| e.family == "Minion Pro-onum" && e.series == "m"));
    assert!(entries
        .iter()
        .any(|e| e.font_name == "LY1-MinionPro-It-onum-kern-liga-smcp"));
}

#[test]
fn plan_plain_prints_conversion_commands() {
    let tmp = tempdir().expect("tempdir");
    let attributes = write_attributes(tmp.path(), "Minion Pro");

    let output = nfssgen(&["plan", "--color", "never", "--attributes"], &[&attributes]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let commands: Vec<&str> = stdout
        .lines()
        .filter(|l| l.starts_with("otftotfm "))
        .collect();
    assert_eq!(commands.len(), 4, "stdout:\n{stdout}");
    assert!(commands[0].contains("--no-updmap -a -e texnansx --typeface minion --vendor adobe"));
}

#[test]
fn install_dry_run_writes_files_and_prints_commands() {
    let tmp = tempdir().expect("tempdir");
    let attributes = write_attributes(tmp.path(), "Minion Pro");
    let out_dir = tmp.path().join("out");

    let output = nfssgen(
        &["install", "--dry-run", "--attributes"],
        &[&attributes, Path::new("--output-dir"), &out_dir],
    );
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 4, "stdout:\n{stdout}");
    assert!(stdout.lines().all(|l| l.starts_with("otftotfm --no-updmap")));
    assert!(!stdout.contains("updmap -user"));

    let fd = fs::read_to_string(out_dir.join("ly1pmnj.fd")).expect("fd written");
    assert!(fd.contains("\\DeclareFontShape{LY1}{pmnj}{m}{si}{"));
    assert!(fd.contains("sub * pmnj/m/it"));
    let sty = fs::read_to_string(out_dir.join("minion.sty")).expect("sty written");
    assert!(sty.contains("\\ProvidesPackage{minion}"));
}

#[test]
fn inspect_prints_records() {
    let tmp = tempdir().expect("tempdir");
    let attributes = write_attributes(tmp.path(), "Minion Pro");

    let output = nfssgen(&["inspect", "--ndjson", "--attributes"], &[&attributes]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let records: Vec<Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).expect("record"))
        .collect();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["id"], "MinionPro-It");
    assert_eq!(records[0]["variant"][0], "italic");
    assert_eq!(records[1]["vendor"], "adobe");
}

#[test]
fn unknown_family_fails_with_berry_hint() {
    let tmp = tempdir().expect("tempdir");
    let attributes = write_attributes(tmp.path(), "Nowhere Sans");
    let out_dir = tmp.path().join("out");

    let output = nfssgen(
        &["install", "--dry-run", "--attributes"],
        &[&attributes, Path::new("--output-dir"), &out_dir],
    );
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("'Nowhere Sans'"), "stderr: {stderr}");
    assert!(stderr.contains("berry_names"));
    assert!(!out_dir.join("minion.sty").exists());
}

#[test]
fn empty_attribute_file_has_nothing_to_install() {
    let tmp = tempdir().expect("tempdir");
    let attributes = tmp.path().join("attributes.json");
    fs::write(&attributes, "[]").expect("write");

    let output = nfssgen(
        &["install", "--dry-run", "--attributes"],
        &[&attributes, Path::new("--output-dir"), &tmp.path().join("out")],
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no conversion commands"), "stderr: {stderr}");
}
