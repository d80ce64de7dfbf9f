use std::fs;
use std::path::{Path, PathBuf};
use std::process::Output;

use rusqlite::Connection;
use tempfile::TempDir;

const BIN: &str = env!("CARGO_BIN_EXE_datatier");

const MUSIC_SCHEMA: &str = r#"
CREATE TABLE artists (ArtistId INTEGER PRIMARY KEY NOT NULL, Name NVARCHAR(120));
CREATE TABLE albums (
    AlbumId INTEGER PRIMARY KEY NOT NULL,
    Title NVARCHAR(160) NOT NULL,
    ArtistId INTEGER NOT NULL REFERENCES artists(ArtistId)
);
"#;

/// Creates a database file in `dir` from the given DDL.
fn write_database(dir: &TempDir, sql: &str) -> PathBuf {
    let path = dir.path().join("music.db");
    let conn = Connection::open(&path).expect("failed to create database");
    conn.execute_batch(sql).expect("failed to apply schema");
    path
}

fn run(args: &[&str]) -> Output {
    std::process::Command::new(BIN)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run datatier")
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// generate
// ---------------------------------------------------------------------------

#[test]
fn generate_writes_units_and_index() {
    let dir = TempDir::new().unwrap();
    let db = write_database(&dir, MUSIC_SCHEMA);
    let out = dir.path().join("generated");

    let output = run(&[
        "generate",
        "--db",
        path_arg(&db),
        "--output",
        path_arg(&out),
        "--no-format",
    ]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(stdout_lines(&output), vec!["albums.rs", "artists.rs", "mod.rs"]);

    let albums = fs::read_to_string(out.join("albums.rs")).unwrap();
    assert!(albums.contains("fk_artists"));
    let artists = fs::read_to_string(out.join("artists.rs")).unwrap();
    assert!(artists.contains("fk_albums"));
}

#[test]
fn generate_without_index() {
    let dir = TempDir::new().unwrap();
    let db = write_database(&dir, MUSIC_SCHEMA);
    let out = dir.path().join("generated");

    let output = run(&[
        "generate",
        "--db",
        path_arg(&db),
        "--output",
        path_arg(&out),
        "--no-format",
        "--no-index",
    ]);

    assert!(output.status.success());
    assert_eq!(stdout_lines(&output), vec!["albums.rs", "artists.rs"]);
    assert!(!out.join("mod.rs").exists());
}

#[test]
fn generate_honors_config_exclusions() {
    let dir = TempDir::new().unwrap();
    let db = write_database(&dir, MUSIC_SCHEMA);
    let out = dir.path().join("generated");
    let config = dir.path().join("datatier.yml");
    fs::write(&config, "exclude:\n  - Albums\nformat: false\nemit_module_index: false\n").unwrap();

    let output = run(&[
        "generate",
        "--db",
        path_arg(&db),
        "--output",
        path_arg(&out),
        "--config",
        path_arg(&config),
    ]);

    assert!(output.status.success());
    assert_eq!(stdout_lines(&output), vec!["artists.rs"]);
    let artists = fs::read_to_string(out.join("artists.rs")).unwrap();
    assert!(!artists.contains("fk_albums"));
}

#[test]
fn generate_clean_removes_stale_units() {
    let dir = TempDir::new().unwrap();
    let db = write_database(&dir, MUSIC_SCHEMA);
    let out = dir.path().join("generated");
    fs::create_dir_all(&out).unwrap();
    let stale = out.join("playlists.rs");
    fs::write(&stale, "// @generated by datatier from table \"Playlists\".\n").unwrap();

    let output = run(&[
        "generate",
        "--db",
        path_arg(&db),
        "--output",
        path_arg(&out),
        "--no-format",
        "--clean",
    ]);

    assert!(output.status.success());
    assert!(!stale.exists());
}

#[test]
fn generate_unsupported_type_fails() {
    let dir = TempDir::new().unwrap();
    let db = write_database(&dir, "CREATE TABLE Files (Id INTEGER PRIMARY KEY, Data BLOB);");
    let out = dir.path().join("generated");

    let output = run(&[
        "generate",
        "--db",
        path_arg(&db),
        "--output",
        path_arg(&out),
        "--no-format",
    ]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: unsupported type 'BLOB' for column 'Files.Data'"), "{stderr}");
    assert!(!out.exists());
}

#[test]
fn generate_missing_database_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.db");

    let output = run(&[
        "generate",
        "--db",
        path_arg(&missing),
        "--output",
        path_arg(&dir.path().join("out")),
    ]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: Failed to open database"), "{stderr}");
    assert!(!missing.exists());
}

// ---------------------------------------------------------------------------
// inspect
// ---------------------------------------------------------------------------

#[test]
fn inspect_prints_json_schema() {
    let dir = TempDir::new().unwrap();
    let db = write_database(&dir, MUSIC_SCHEMA);

    let output = run(&["inspect", "--db", path_arg(&db)]);
    assert!(output.status.success());

    let schema: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let tables: Vec<&str> = schema["tables"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(tables, vec!["Albums", "Artists"]);

    let fk = &schema["foreign_keys"][0];
    assert_eq!(fk["source_table"], "Albums");
    assert_eq!(fk["target_table"], "Artists");
    assert_eq!(fk["is_nullable"], false);
    assert_eq!(fk["predicates"][0]["target_column"], "ArtistId");
}

#[test]
fn inspect_prints_yaml_schema() {
    let dir = TempDir::new().unwrap();
    let db = write_database(&dir, MUSIC_SCHEMA);

    let output = run(&["inspect", "--db", path_arg(&db), "--format", "yaml"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("tables:"), "{stdout}");
    assert!(stdout.contains("declared_type: NVARCHAR(160)"));
}

#[test]
fn inspect_rejects_bad_config() {
    let dir = TempDir::new().unwrap();
    let db = write_database(&dir, MUSIC_SCHEMA);
    let config = dir.path().join("broken.yml");
    fs::write(&config, "exclude: [unterminated\n").unwrap();

    let output = run(&["inspect", "--db", path_arg(&db), "--config", path_arg(&config)]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: Failed to load config"), "{stderr}");
}
