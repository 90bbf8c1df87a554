use std::path::Path;

use multiservice::config_file::ConfigError;
use multiservice::executor::{ExecError, Executor};
use multiservice::shell::{Shell, ShellError};
use multiservice::{CommandError, Config, Error};

#[derive(Default)]
struct RecordingShell {
    calls: Vec<String>,
}

impl Shell for RecordingShell {
    fn run(&mut self, command_line: &str) -> Result<Option<i32>, ShellError> {
        self.calls.push(command_line.to_string());
        Ok(Some(0))
    }
}

fn write_config(dir: &Path, content: &str) -> String {
    let path = dir.join(".multiservice.yml");
    std::fs::write(&path, content).unwrap();
    path.to_string_lossy().to_string()
}

fn invoke(
    config: &Config,
    command: &str,
    execute: &str,
    services: &[&str],
) -> (Result<(), Error>, Vec<String>, String) {
    let services: Vec<String> = services.iter().map(|s| (*s).to_string()).collect();
    let mut shell = RecordingShell::default();
    let mut executor = Executor::new(config, &mut shell, Vec::new());
    let result = multiservice::run(&mut executor, command, execute, &services);
    let output = String::from_utf8(executor.into_output()).unwrap();
    (result, shell.calls, output)
}

const SRV: &str = r#"
root: /srv
services:
  web: www
  api: backend
commands:
  build: "make build"
"#;

#[test]
fn test_build_single_service() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load(&write_config(dir.path(), SRV)).unwrap();

    let (result, calls, output) = invoke(&config, "build", "", &["web"]);
    result.unwrap();
    assert_eq!(calls.len(), 1);
    insta::assert_snapshot!(&calls[0], @"pushd /srv/www > /dev/null && make build && popd > /dev/null");
    assert_eq!(output.matches("Running build for: www").count(), 1);
}

#[test]
fn test_no_services_means_all() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load(&write_config(dir.path(), SRV)).unwrap();

    let (result, calls, _) = invoke(&config, "build", "", &[]);
    result.unwrap();
    assert_eq!(
        calls,
        vec![
            "pushd /srv/www > /dev/null && make build && popd > /dev/null",
            "pushd /srv/backend > /dev/null && make build && popd > /dev/null",
        ]
    );
}

#[test]
fn test_execute_follows_listed_order() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load(&write_config(dir.path(), SRV)).unwrap();

    let (result, calls, output) = invoke(&config, "execute", "git status", &["api", "web"]);
    result.unwrap();
    assert_eq!(
        calls,
        vec![
            "pushd /srv/backend > /dev/null && git status && popd > /dev/null",
            "pushd /srv/www > /dev/null && git status && popd > /dev/null",
        ]
    );
    let backend = output.find("Running execute for: backend").unwrap();
    let www = output.find("Running execute for: www").unwrap();
    assert!(backend < www);
}

#[test]
fn test_custom_template() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load(&write_config(
        dir.path(),
        r#"
root: /srv
template: "  echo {SERVICE}: ; {COMMAND}  "
services:
  web: www
commands:
  build: "make build"
"#,
    ))
    .unwrap();

    let (result, calls, _) = invoke(&config, "build", "", &["web"]);
    result.unwrap();
    assert_eq!(
        calls,
        vec!["pushd /srv/www > /dev/null && echo www: ; make build && popd > /dev/null"]
    );
}

#[test]
fn test_edit_without_editor() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load(&write_config(dir.path(), SRV)).unwrap();

    let (result, calls, output) = invoke(&config, "edit", "", &["nonexistent"]);
    assert!(matches!(
        result,
        Err(Error::Command(CommandError::MissingEditor))
    ));
    assert!(calls.is_empty());
    assert!(output.is_empty());
}

#[test]
fn test_edit_runs_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        "root: /srv\neditor: nano\nservices:\n  web: www\ncommands: {}\n",
    );
    let config = Config::load(&path).unwrap();

    let (result, calls, output) = invoke(&config, "edit", "", &[]);
    result.unwrap();
    assert_eq!(calls, vec![format!("nano {path}")]);
    assert!(output.is_empty());
}

#[test]
fn test_unknown_command_runs_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load(&write_config(dir.path(), SRV)).unwrap();

    let (result, calls, _) = invoke(&config, "deploy", "", &[]);
    match result {
        Err(Error::Command(CommandError::UnknownCommand(name))) => assert_eq!(name, "deploy"),
        other => panic!("Expected UnknownCommand, got: {other:?}"),
    }
    assert!(calls.is_empty());
}

#[test]
fn test_unknown_service_stops_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load(&write_config(dir.path(), SRV)).unwrap();

    let (result, calls, output) = invoke(&config, "build", "", &["web", "mail", "api"]);
    match result {
        Err(Error::Exec(ExecError::ServiceNotFound(name))) => assert_eq!(name, "mail"),
        other => panic!("Expected ServiceNotFound, got: {other:?}"),
    }
    assert_eq!(calls.len(), 1);
    assert!(!output.contains("backend"));
}

#[test]
fn test_exact_service_match_beats_upper_case() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load(&write_config(
        dir.path(),
        "root: /srv\nservices:\n  api: backend\n  API: legacy\n  DB: database\ncommands:\n  ls: ls\n",
    ))
    .unwrap();

    let (result, calls, _) = invoke(&config, "ls", "", &["api", "db"]);
    result.unwrap();
    assert_eq!(
        calls,
        vec![
            "pushd /srv/backend > /dev/null && ls && popd > /dev/null",
            "pushd /srv/database > /dev/null && ls && popd > /dev/null",
        ]
    );
}

#[test]
fn test_edit_ignores_malformed_services() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        "root: /srv\neditor: vim\nservices: [www]\ncommands: {}\n",
    );
    let config = Config::load(&path).unwrap();

    let (result, calls, _) = invoke(&config, "edit", "", &[]);
    result.unwrap();
    assert_eq!(calls, vec![format!("vim {path}")]);
}

#[test]
fn test_malformed_command_does_not_block_others() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load(&write_config(
        dir.path(),
        "root: /srv\nservices:\n  web: www\ncommands:\n  build: make build\n  lint: [a, b]\n",
    ))
    .unwrap();

    let (result, calls, _) = invoke(&config, "build", "", &["web"]);
    result.unwrap();
    assert_eq!(
        calls,
        vec!["pushd /srv/www > /dev/null && make build && popd > /dev/null"]
    );

    let (result, calls, _) = invoke(&config, "lint", "", &["web"]);
    let err = result.unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert_eq!(
        err.to_string(),
        "Invalid value for `commands.lint` in config: expected a string, found a list"
    );
    assert!(calls.is_empty());
}

#[test]
fn test_malformed_service_fails_only_when_reached() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load(&write_config(
        dir.path(),
        "root: /srv\nservices:\n  web: www\n  todo: ~\ncommands:\n  build: make build\n",
    ))
    .unwrap();

    let (result, calls, _) = invoke(&config, "build", "", &["web"]);
    result.unwrap();
    assert_eq!(calls.len(), 1);

    let (result, calls, output) = invoke(&config, "build", "", &[]);
    match result {
        Err(Error::Exec(ExecError::Config(ConfigError::InvalidValue { key, .. }))) => {
            assert_eq!(key, "services.todo");
        }
        other => panic!("Expected InvalidValue, got: {other:?}"),
    }
    assert_eq!(calls.len(), 1);
    assert!(output.contains("Running build for: www"));
}

#[test]
fn test_load_lists_all_missing_keys() {
    let dir = tempfile::tempdir().unwrap();
    let result = Config::load(&write_config(dir.path(), "editor: vim\n"));
    match result {
        Err(ConfigError::MissingKeys(keys)) => {
            assert_eq!(keys, vec!["root", "services", "commands"]);
        }
        other => panic!("Expected MissingKeys, got: {other:?}"),
    }
}

#[test]
fn test_load_invalid_yaml() {
    let dir = tempfile::tempdir().unwrap();
    let result = Config::load(&write_config(dir.path(), "root: [unclosed\n"));
    assert!(matches!(result, Err(ConfigError::Parse { .. })));
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.yml");
    let result = Config::load(&path.to_string_lossy());
    assert!(matches!(result, Err(ConfigError::ConfigNotFound { .. })));
}

#[cfg(unix)]
#[test]
fn test_real_shell_runs_in_service_directory() {
    use multiservice::shell::SystemShell;

    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("one")).unwrap();
    std::fs::create_dir(dir.path().join("two")).unwrap();
    let config = Config::load(&write_config(
        dir.path(),
        &format!(
            "root: {}\nservices:\n  one: one\n  missing: nope\n  two: two\ncommands:\n  touch: touch marker\n",
            dir.path().display()
        ),
    ))
    .unwrap();

    // pushd is a bash builtin
    let mut shell = SystemShell::new("bash");
    let mut executor = Executor::new(&config, &mut shell, std::io::sink());
    multiservice::run(&mut executor, "touch", "", &[]).unwrap();

    assert!(dir.path().join("one/marker").exists());
    assert!(dir.path().join("two/marker").exists());
    assert!(!dir.path().join("marker").exists());
}
