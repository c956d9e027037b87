use std::path::Path;

use sqlmigrate_source::{
    MigrateConfig, SourceError, create_migration, discover_migrations, read_migrations,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn write(dir: &Path, name: &str, text: &str) {
    std::fs::write(dir.join(name), text).unwrap();
}

fn sample_project(root: &Path) {
    let migrations = root.join("migrations");
    std::fs::create_dir_all(&migrations).unwrap();
    write(
        &migrations,
        "001.initial.sql",
        "--------------------------------------------------------------------------------\n\
         -- Up\n\
         --------------------------------------------------------------------------------\n\
         \n\
         CREATE TABLE category (id INTEGER PRIMARY KEY, name TEXT NOT NULL);\n\
         CREATE TABLE post (id INTEGER PRIMARY KEY, category_id INTEGER NOT NULL);\n\
         \n\
         --------------------------------------------------------------------------------\n\
         -- Down\n\
         --------------------------------------------------------------------------------\n\
         \n\
         DROP TABLE post;\n\
         DROP TABLE category;\n",
    );
    write(
        &migrations,
        "002.add-index.sql",
        "-- Up\nCREATE INDEX post_category ON post (category_id);\n-- Down\nDROP INDEX post_category;\n",
    );
    write(&migrations, "notes.txt", "not a migration");
}

// ---------------------------------------------------------------------------
// Directory reading
// ---------------------------------------------------------------------------

#[test]
fn test_reads_project_migrations() {
    let root = tempfile::tempdir().unwrap();
    sample_project(root.path());

    let config = MigrateConfig::load_or_default(root.path()).unwrap();
    let defs = read_migrations(config.resolve_migrations_path(root.path())).unwrap();

    assert_eq!(defs.len(), 2);
    assert_eq!(defs[0].id, 1);
    assert_eq!(defs[0].name, "initial");
    assert!(defs[0].up.starts_with("---"));
    assert!(defs[0].up.contains("CREATE TABLE category"));
    assert!(!defs[0].up.contains("-- Up"));
    assert!(defs[0].down.contains("DROP TABLE post;"));

    assert_eq!(defs[1].id, 2);
    assert_eq!(defs[1].name, "add-index");
    assert_eq!(defs[1].up, "CREATE INDEX post_category ON post (category_id);");
    assert_eq!(defs[1].down, "DROP INDEX post_category;");
}

#[test]
fn test_ids_compare_numerically() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "10.y.sql", "SELECT 10;\n-- down\n");
    write(dir.path(), "2.x.sql", "SELECT 2;\n-- down\n");

    let defs = read_migrations(dir.path()).unwrap();
    let ids: Vec<i64> = defs.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![2, 10]);
}

#[test]
fn test_zero_id_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "0.zero.sql", "-- Down\n");
    assert!(matches!(
        discover_migrations(dir.path()),
        Err(SourceError::InvalidId { .. })
    ));
}

#[test]
fn test_missing_marker_reports_file() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "5.no-down.sql", "CREATE TABLE t (x);\n");
    let err = read_migrations(dir.path()).unwrap_err();
    assert_eq!(err.to_string(), "migration 5 (no-down) has no '-- down' separator");
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn test_config_file_in_root() {
    let root = tempfile::tempdir().unwrap();
    write(
        root.path(),
        "sqlmigrate.yml",
        "migrations_path: db/sql\ntable_name: ledger\n",
    );
    let config = MigrateConfig::load_or_default(root.path()).unwrap();
    assert_eq!(config.table_name, "ledger");
    assert_eq!(
        config.resolve_migrations_path(root.path()),
        root.path().join("db/sql")
    );
}

#[test]
fn test_invalid_config_yaml() {
    let root = tempfile::tempdir().unwrap();
    write(root.path(), "sqlmigrate.yml", "table_name: [unterminated\n");
    assert!(matches!(
        MigrateConfig::load_or_default(root.path()),
        Err(SourceError::YamlError(_))
    ));
}

// ---------------------------------------------------------------------------
// Scaffolding
// ---------------------------------------------------------------------------

#[test]
fn test_created_migrations_are_discovered_in_order() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("migrations");

    create_migration(&dir, "create users").unwrap();
    create_migration(&dir, "add email").unwrap();

    let defs = read_migrations(&dir).unwrap();
    let names: Vec<&str> = defs.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["create-users", "add-email"]);
    assert_eq!(defs[1].id, 2);
}
