use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use sqlmigrate_sqlite::SqliteDriver;

fn sqlmigrate(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sqlmigrate"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run sqlmigrate")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("temp path is not UTF-8")
}

/// Writes `migrations/<file>` under `root`.
fn write_migration(root: &Path, file: &str, text: &str) {
    let dir = root.join("migrations");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(file), text).unwrap();
}

fn sample_project(root: &Path) {
    write_migration(
        root,
        "001.users.sql",
        "-- Up\nCREATE TABLE users (id INTEGER PRIMARY KEY);\n-- Down\nDROP TABLE users;\n",
    );
    write_migration(
        root,
        "002.posts.sql",
        "-- Up\nCREATE TABLE posts (id INTEGER PRIMARY KEY, user_id INTEGER);\n-- Down\nDROP TABLE posts;\n",
    );
}

fn up(root: &Path, db: &Path, extra: &[&str]) -> Output {
    let mut args = vec!["up", "--db", path_str(db), "--root", path_str(root)];
    args.extend_from_slice(extra);
    sqlmigrate(&args)
}

// ---------------------------------------------------------------------------
// up
// ---------------------------------------------------------------------------

#[test]
fn up_applies_pending_migrations() {
    let root = tempfile::tempdir().unwrap();
    let db = root.path().join("app.db");
    sample_project(root.path());

    let out = up(root.path(), &db, &[]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("Applied: 1, 2"), "stdout: {}", stdout(&out));

    let mut driver = SqliteDriver::open(&db).unwrap();
    assert_eq!(driver.column_names("posts").unwrap(), vec!["id", "user_id"]);
    assert_eq!(
        driver.column_names("migrations").unwrap(),
        vec!["id", "name", "up", "down"]
    );
}

#[test]
fn up_twice_reports_up_to_date() {
    let root = tempfile::tempdir().unwrap();
    let db = root.path().join("app.db");
    sample_project(root.path());

    assert!(up(root.path(), &db, &[]).status.success());
    let out = up(root.path(), &db, &[]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("Database is up to date."));
}

#[test]
fn up_force_last_reverts_and_reapplies() {
    let root = tempfile::tempdir().unwrap();
    let db = root.path().join("app.db");
    sample_project(root.path());
    assert!(up(root.path(), &db, &[]).status.success());

    let out = up(root.path(), &db, &["--force-last"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains("Reverted: 2"), "stdout: {text}");
    assert!(text.contains("Applied: 2"), "stdout: {text}");
}

#[test]
fn up_reverts_deleted_migration() {
    let root = tempfile::tempdir().unwrap();
    let db = root.path().join("app.db");
    sample_project(root.path());
    assert!(up(root.path(), &db, &[]).status.success());

    fs::remove_file(root.path().join("migrations/002.posts.sql")).unwrap();
    let out = up(root.path(), &db, &[]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("Reverted: 2"));

    let mut driver = SqliteDriver::open(&db).unwrap();
    assert!(driver.column_names("posts").unwrap().is_empty());
}

#[test]
fn up_failing_script_exits_with_error() {
    let root = tempfile::tempdir().unwrap();
    let db = root.path().join("app.db");
    sample_project(root.path());
    write_migration(
        root.path(),
        "003.broken.sql",
        "-- Up\nCREATE TABLE tags (id);\nINSERT INTO nowhere VALUES (1);\n-- Down\nDROP TABLE tags;\n",
    );

    let out = up(root.path(), &db, &[]);
    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(err.contains("error: Migration failed"), "stderr: {err}");
    assert!(err.contains("nowhere"), "stderr: {err}");

    let mut driver = SqliteDriver::open(&db).unwrap();
    assert!(driver.column_names("tags").unwrap().is_empty());
    assert_eq!(driver.column_names("posts").unwrap(), vec!["id", "user_id"]);
}

#[test]
fn up_missing_down_marker_fails_before_touching_database() {
    let root = tempfile::tempdir().unwrap();
    let db = root.path().join("app.db");
    write_migration(root.path(), "1.only-up.sql", "CREATE TABLE t (x);\n");

    let out = up(root.path(), &db, &[]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("has no '-- down' separator"));

    let mut driver = SqliteDriver::open(&db).unwrap();
    assert!(driver.column_names("migrations").unwrap().is_empty());
}

#[test]
fn up_missing_migrations_directory_fails() {
    let root = tempfile::tempdir().unwrap();
    let db = root.path().join("app.db");
    let out = up(root.path(), &db, &[]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("error: Migration failed"));
}

#[test]
fn up_rejects_invalid_table_name() {
    let root = tempfile::tempdir().unwrap();
    let db = root.path().join("app.db");
    sample_project(root.path());

    let out = up(root.path(), &db, &["--table", "users; DROP TABLE x"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("invalid"), "stderr: {}", stderr(&out));
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn config_file_sets_directory_and_table() {
    let root = tempfile::tempdir().unwrap();
    let db = root.path().join("app.db");
    let sql = root.path().join("db/sql");
    fs::create_dir_all(&sql).unwrap();
    fs::write(
        sql.join("1.init.sql"),
        "CREATE TABLE t (x);\n-- Down\nDROP TABLE t;\n",
    )
    .unwrap();
    fs::write(
        root.path().join("sqlmigrate.yml"),
        "migrations_path: db/sql\ntable_name: schema_ledger\n",
    )
    .unwrap();

    let out = up(root.path(), &db, &[]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let mut driver = SqliteDriver::open(&db).unwrap();
    assert!(!driver.column_names("schema_ledger").unwrap().is_empty());
    assert!(driver.column_names("migrations").unwrap().is_empty());
}

#[test]
fn explicit_config_and_flags() {
    let root = tempfile::tempdir().unwrap();
    let db = root.path().join("app.db");
    sample_project(root.path());
    let config = root.path().join("custom.yml");
    fs::write(&config, "table_name: from_file\n").unwrap();

    let out = up(
        root.path(),
        &db,
        &["--config", path_str(&config), "--table", "from_flag"],
    );
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let mut driver = SqliteDriver::open(&db).unwrap();
    assert!(!driver.column_names("from_flag").unwrap().is_empty());
    assert!(driver.column_names("from_file").unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// status
// ---------------------------------------------------------------------------

#[test]
fn status_table_lists_applied_and_pending() {
    let root = tempfile::tempdir().unwrap();
    let db = root.path().join("app.db");
    sample_project(root.path());
    assert!(up(root.path(), &db, &[]).status.success());
    write_migration(
        root.path(),
        "003.tags.sql",
        "CREATE TABLE tags (id);\n-- Down\nDROP TABLE tags;\n",
    );

    let out = sqlmigrate(&["status", "--db", path_str(&db), "--root", path_str(root.path())]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("Ledger table: migrations"), "stdout: {text}");
    assert!(text.contains("users"));
    assert!(text.contains("posts"));
    assert!(text.contains("Pending: 3"));
    assert!(text.contains("Up to date: no"));
}

#[test]
fn status_json_reports_orphaned_and_modified() {
    let root = tempfile::tempdir().unwrap();
    let db = root.path().join("app.db");
    sample_project(root.path());
    assert!(up(root.path(), &db, &[]).status.success());

    fs::remove_file(root.path().join("migrations/002.posts.sql")).unwrap();
    write_migration(
        root.path(),
        "001.users.sql",
        "-- Up\nCREATE TABLE users (id INTEGER PRIMARY KEY, email TEXT);\n-- Down\nDROP TABLE users;\n",
    );

    let out = sqlmigrate(&[
        "status",
        "--db",
        path_str(&db),
        "--root",
        path_str(root.path()),
        "--format",
        "json",
    ]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let json: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(json["applied"].as_array().unwrap().len(), 2);
    assert_eq!(json["applied"][0]["name"], "users");
    assert_eq!(json["orphaned"], serde_json::json!([2]));
    assert_eq!(json["modified"], serde_json::json!([1]));
    assert_eq!(json["revertable"], serde_json::json!([2]));
    assert_eq!(json["pending"], serde_json::json!([]));
}

#[test]
fn status_and_up_agree_on_buried_orphan() {
    let root = tempfile::tempdir().unwrap();
    let db = root.path().join("app.db");
    sample_project(root.path());
    write_migration(
        root.path(),
        "003.tags.sql",
        "CREATE TABLE tags (id);\n-- Down\nDROP TABLE tags;\n",
    );
    assert!(up(root.path(), &db, &[]).status.success());
    fs::remove_file(root.path().join("migrations/002.posts.sql")).unwrap();

    let out = sqlmigrate(&["status", "--db", path_str(&db), "--root", path_str(root.path())]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("(orphaned)"), "stdout: {text}");
    assert!(text.contains("Up to date: yes"), "stdout: {text}");

    let out = up(root.path(), &db, &[]);
    assert!(stdout(&out).contains("Database is up to date."));
}

#[test]
fn status_force_last_previews_reapply() {
    let root = tempfile::tempdir().unwrap();
    let db = root.path().join("app.db");
    sample_project(root.path());
    assert!(up(root.path(), &db, &[]).status.success());

    let out = sqlmigrate(&[
        "status",
        "--db",
        path_str(&db),
        "--root",
        path_str(root.path()),
        "--force-last",
    ]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("(will revert)"), "stdout: {text}");
    assert!(text.contains("Revert: 2"), "stdout: {text}");
    assert!(text.contains("Pending: 2"), "stdout: {text}");
}

// ---------------------------------------------------------------------------
// new
// ---------------------------------------------------------------------------

#[test]
fn new_creates_numbered_files_that_apply() {
    let root = tempfile::tempdir().unwrap();
    let db = root.path().join("app.db");

    let out = sqlmigrate(&["new", "create users", "--root", path_str(root.path())]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("001.create-users.sql"));

    let out = sqlmigrate(&["new", "add posts", "--root", path_str(root.path())]);
    assert!(out.status.success());
    assert!(root.path().join("migrations/002.add-posts.sql").is_file());

    // Empty templates are valid migrations.
    let out = up(root.path(), &db, &[]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("Applied: 1, 2"));
}

#[test]
fn new_rejects_empty_name() {
    let root = tempfile::tempdir().unwrap();
    let out = sqlmigrate(&["new", "!!!", "--root", path_str(root.path())]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("error: Failed to create migration"));
}
