use assert_cmd::Command;
use std::fs;

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("bookshelf-cli").unwrap();
    cmd.env_remove("BOOKSHELF_ENV")
        .env_remove("BOOKSHELF_CONFIG_DIR")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_subcommands() {
    let output = cli().arg("--help").assert().success().get_output().stdout.clone();
    let help = String::from_utf8(output).unwrap();
    assert!(help.contains("serve"));
    assert!(help.contains("init-db"));
    assert!(help.contains("config"));
}

#[test]
fn config_prints_layered_settings() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("base.toml"), "[server]\nport = 9001\n").unwrap();

    let output = cli()
        .arg("--config-dir")
        .arg(dir.path())
        .arg("config")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let settings: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(settings["server"]["port"], 9001);
    assert_eq!(settings["environment"], "local");
}

#[test]
fn unknown_environment_fails() {
    let dir = tempfile::tempdir().unwrap();

    cli()
        .arg("--config-dir")
        .arg(dir.path())
        .args(["--env", "qa", "config"])
        .assert()
        .failure();
}

#[test]
fn init_db_creates_sqlite_file() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("books.db");
    fs::write(
        dir.path().join("base.toml"),
        format!(
            "[database]\nurl = \"sqlite://{}?mode=rwc\"\n",
            db_path.display()
        ),
    )
    .unwrap();

    let output = cli()
        .arg("--config-dir")
        .arg(dir.path())
        .arg("init-db")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    assert!(db_path.exists());
    let logs = String::from_utf8(output).unwrap();
    assert!(logs.contains("initializing database schema"));
    assert!(logs.contains("database schema ready"));
}

#[test]
fn dotenv_file_is_applied_when_no_config_dir_is_given() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("config")).unwrap();
    fs::write(
        dir.path().join("config").join("base.toml"),
        "[server]\nhost = \"127.0.0.1\"\nport = 9001\n",
    )
    .unwrap();
    fs::write(dir.path().join(".env"), "BOOKSHELF_SERVER__PORT=9400\n").unwrap();

    let output = cli()
        .current_dir(dir.path())
        .arg("config")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let settings: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(settings["server"]["host"], "127.0.0.1");
    assert_eq!(settings["server"]["port"], 9400);
}
