//! End-to-end runs with a stand-in `java` executable

use junit_platform_starter::launch::process::{LAUNCH_FAILURE_EXIT_CODE, TIMEOUT_EXIT_CODE};
use junit_platform_starter::{
    starter, ArtifactCoordinate, Configuration, LocalRepository, MemoryLog, ModuleDescriptor,
    Project, RunOutcome,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tracing::Level;

/// A project below `root/target` with both output directories compiled
fn project(root: &Path) -> Project {
    let project = Project::new(root.join("target"));
    fs::create_dir_all(&project.main_output).unwrap();
    fs::create_dir_all(&project.test_output).unwrap();
    project
}

/// Put an empty jar and POM for `coordinate` into a Maven-layout repository
fn install(repo: &LocalRepository, coordinate: &str) -> PathBuf {
    let coordinate: ArtifactCoordinate = coordinate.parse().unwrap();
    let jar = repo.jar_path(&coordinate);
    fs::create_dir_all(jar.parent().unwrap()).unwrap();
    fs::write(&jar, b"PK").unwrap();
    fs::write(repo.pom_path(&coordinate), "<project></project>").unwrap();
    jar
}

/// A local repository that already holds the console launcher
fn repository(root: &Path) -> LocalRepository {
    let repo = LocalRepository::new(root.join("m2"));
    install(&repo, "org.junit.platform:junit-platform-console:1.3.0-RC1");
    repo
}

#[cfg(unix)]
fn fake_java(root: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = root.join("fake-java");
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn command_log(project_root: &Path) -> Vec<String> {
    let path = project_root.join("target/junit-platform/console-launcher.cmd.log");
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[cfg(unix)]
#[test]
fn class_path_run_completes() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let project = project(root);
    let repo = repository(root);
    let java = fake_java(root, "echo OK");
    let log = MemoryLog::new();

    let outcome = starter::run(project)
        .configuration(
            Configuration::new()
                .dry_run(false)
                .java_executable(&java)
                .timeout(Duration::from_secs(60))
                .tag("fast")
                .parameter("key", "value"),
        )
        .resolver(&repo)
        .log(&log)
        .execute()
        .unwrap();

    assert_eq!(outcome, RunOutcome::Completed(0));
    assert!(!outcome.timed_out());

    let stdout =
        fs::read_to_string(root.join("target/junit-platform/console-launcher.out.log")).unwrap();
    assert_eq!(stdout.trim(), "OK");
    assert_eq!(log.messages(Level::INFO), ["OK"]);

    let cmd = command_log(root);
    assert_eq!(cmd[0], java.display().to_string());
    assert_eq!(cmd[1], "--class-path");
    assert!(cmd[2].ends_with("junit-platform-console-1.3.0-RC1.jar"));
    assert!(cmd.contains(&"--include-tag=\"fast\"".to_string()));
    assert!(cmd.contains(&"--config=\"key\"=\"value\"".to_string()));
    assert_eq!(cmd.last().unwrap(), "--scan-class-path");
    assert!(!cmd.contains(&"--select-module".to_string()));
}

#[cfg(unix)]
#[test]
fn failing_tests_keep_their_exit_code() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let repo = repository(root);
    let java = fake_java(root, "echo '1 tests failed'\necho boom >&2\nexit 1");
    let log = MemoryLog::new();

    let outcome = starter::run(project(root))
        .configuration(Configuration::new().dry_run(false).java_executable(&java))
        .resolver(&repo)
        .log(&log)
        .execute()
        .unwrap();

    assert_eq!(outcome, RunOutcome::Completed(1));
    assert_eq!(outcome.exit_code(), 1);
    assert!(!outcome.is_operational_failure());
    assert_eq!(log.messages(Level::ERROR), ["1 tests failed", "boom"]);
}

#[cfg(unix)]
#[test]
fn timeout_kills_the_launcher() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let repo = repository(root);
    let pid_file = root.join("pid");
    let java = fake_java(
        root,
        &format!("echo $$ > {}\nexec sleep 30", pid_file.display()),
    );
    let log = MemoryLog::new();

    let start = Instant::now();
    let outcome = starter::run(project(root))
        .configuration(
            Configuration::new()
                .dry_run(false)
                .java_executable(&java)
                .timeout(Duration::from_secs(1)),
        )
        .resolver(&repo)
        .log(&log)
        .execute()
        .unwrap();

    assert_eq!(outcome, RunOutcome::TimedOut);
    assert_eq!(outcome.exit_code(), TIMEOUT_EXIT_CODE);
    assert!(start.elapsed() < Duration::from_secs(15));
    assert_eq!(
        log.messages(Level::ERROR)[0],
        "Global timeout of 1 second reached."
    );

    let pid = fs::read_to_string(&pid_file).unwrap();
    let alive = std::process::Command::new("kill")
        .args(["-0", pid.trim()])
        .status()
        .unwrap()
        .success();
    assert!(!alive, "process {} still running", pid.trim());
}

#[test]
fn missing_java_is_a_launch_failure() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let repo = repository(root);
    let log = MemoryLog::new();

    let outcome = starter::run(project(root))
        .configuration(
            Configuration::new()
                .dry_run(false)
                .java_executable(root.join("no-such-java")),
        )
        .resolver(&repo)
        .log(&log)
        .execute()
        .unwrap();

    assert_eq!(outcome, RunOutcome::LaunchFailed);
    assert_eq!(outcome.exit_code(), LAUNCH_FAILURE_EXIT_CODE);
    assert!(outcome.is_operational_failure());
}

#[test]
fn dry_run_writes_command_without_starting() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let repo = repository(root);
    let log = MemoryLog::new();

    let outcome = starter::run(project(root))
        .configuration(
            Configuration::new()
                .dry_run(true)
                .java_executable(root.join("no-such-java"))
                .strict(true),
        )
        .resolver(&repo)
        .log(&log)
        .execute()
        .unwrap();

    assert_eq!(outcome, RunOutcome::DryRun);
    assert_eq!(outcome.exit_code(), 0);

    let cmd = command_log(root);
    assert_eq!(log.messages(Level::INFO)[1..], cmd[..]);
    assert!(cmd.contains(&"--fail-if-no-tests".to_string()));

    let out = root.join("target/junit-platform/console-launcher.out.log");
    let err = root.join("target/junit-platform/console-launcher.err.log");
    assert_eq!(fs::read(out).unwrap(), b"");
    assert_eq!(fs::read(err).unwrap(), b"");
}

#[cfg(unix)]
#[test]
fn main_module_gets_default_engine() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let repo = repository(root);
    let api = install(&repo, "org.junit.jupiter:junit-jupiter-api:5.3.0-RC1");
    let engine = install(&repo, "org.junit.jupiter:junit-jupiter-engine:5.3.0-RC1");
    let commons = install(&repo, "org.junit.platform:junit-platform-commons:1.3.0-RC1");

    let project = project(root)
        .artifact(
            "org.junit.jupiter:junit-jupiter-api:5.3.0-RC1".parse().unwrap(),
            &api,
        )
        .artifact(
            "org.junit.platform:junit-platform-commons:1.3.0-RC1"
                .parse()
                .unwrap(),
            &commons,
        );
    fs::create_dir_all(project.main_output.join("foo/internal")).unwrap();
    fs::write(project.main_output.join("foo/Foo.class"), b"").unwrap();
    fs::write(project.main_output.join("foo/internal/Bar.class"), b"").unwrap();
    let main = ModuleDescriptor::new("foo")
        .requires(["java.base"])
        .packages_from(&project.main_output)
        .unwrap();
    let test_output = project.test_output.display().to_string();
    let log = MemoryLog::new();

    let plan = starter::run(project)
        .configuration(Configuration::new().java_executable("java"))
        .main_module(main)
        .resolver(&repo)
        .log(&log)
        .plan()
        .unwrap();

    let cmd = plan.command();
    assert_eq!(cmd[1], "--module-path");
    let elements: Vec<_> = cmd[2].split(':').collect();
    assert!(elements.contains(&engine.display().to_string().as_str()));
    assert!(elements.last().unwrap().ends_with("junit-platform-console-1.3.0-RC1.jar"));
    assert_eq!(cmd[3..5], ["--add-modules", "ALL-MODULE-PATH,ALL-DEFAULT"]);
    assert_eq!(cmd[5..7], ["--patch-module".to_string(), format!("foo={}", test_output)]);
    assert_eq!(cmd[7..9], ["--add-reads", "foo=org.junit.jupiter.api"]);
    assert_eq!(
        cmd[9..13],
        [
            "--add-opens",
            "foo/foo=org.junit.platform.commons",
            "--add-opens",
            "foo/foo.internal=org.junit.platform.commons",
        ]
    );
    assert_eq!(cmd[13..15], ["--module", "org.junit.platform.console"]);
    assert_eq!(cmd[cmd.len() - 2..], ["--select-module", "foo"]);
}

#[test]
fn test_module_is_selected_over_main_module() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let repo = repository(root);
    let log = MemoryLog::new();

    let plan = starter::run(project(root))
        .configuration(Configuration::new().java_executable("java"))
        .main_module(ModuleDescriptor::new("foo").packages(["foo"]))
        .test_module(ModuleDescriptor::new("foo.test").requires(["foo"]))
        .resolver(&repo)
        .log(&log)
        .plan()
        .unwrap();

    let cmd = plan.command();
    assert!(!cmd.iter().any(|t| t == "--patch-module"));
    assert_eq!(cmd[cmd.len() - 2..], ["--select-module", "foo.test"]);
}
