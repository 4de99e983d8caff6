//! Dependency completion against a local Maven-layout repository

use junit_platform_starter::resolve::{PLATFORM_CONSOLE, VINTAGE_ENGINE};
use junit_platform_starter::{
    starter, Artifact, ArtifactCoordinate, ArtifactMap, Configuration, DependencyCompleter,
    DetectedVersions, LocalRepository, MemoryLog, Project, Versions,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn install(repo: &LocalRepository, coordinate: &str) -> PathBuf {
    let coordinate: ArtifactCoordinate = coordinate.parse().unwrap();
    let jar = repo.jar_path(&coordinate);
    fs::create_dir_all(jar.parent().unwrap()).unwrap();
    fs::write(&jar, b"PK").unwrap();
    fs::write(repo.pom_path(&coordinate), "<project></project>").unwrap();
    jar
}

fn artifact(coordinate: &str, file: &Path) -> Artifact {
    Artifact::new(coordinate.parse().unwrap(), file)
}

#[test]
fn configured_versions_drive_resolution() {
    let temp_dir = TempDir::new().unwrap();
    let repo = LocalRepository::new(temp_dir.path());
    let api = install(&repo, "org.junit.jupiter:junit-jupiter-api:5.2.0");
    let engine = install(&repo, "org.junit.jupiter:junit-jupiter-engine:5.3.1");
    let console = install(&repo, "org.junit.platform:junit-platform-console:1.3.1");

    let artifacts: ArtifactMap = [artifact("org.junit.jupiter:junit-jupiter-api:5.2.0", &api)]
        .into_iter()
        .collect();
    let configured = Versions {
        jupiter: Some("5.3.1".to_string()),
        vintage: None,
        platform: Some("1.3.1".to_string()),
    };
    let versions = DetectedVersions::detect(&artifacts, &configured);
    let log = MemoryLog::new();
    let completer = DependencyCompleter::new(&artifacts, &[], &repo, &log);

    assert_eq!(completer.complete(&versions).unwrap(), [engine, console]);
}

#[test]
fn completion_is_idempotent_for_declared_artifacts() {
    let temp_dir = TempDir::new().unwrap();
    let repo = LocalRepository::new(temp_dir.path());
    let junit = install(&repo, "junit:junit:4.12");
    let vintage = install(&repo, "org.junit.vintage:junit-vintage-engine:5.2.0");
    let console = install(&repo, "org.junit.platform:junit-platform-console:1.2.0");

    let artifacts: ArtifactMap = [
        artifact("junit:junit:4.12", &junit),
        artifact("org.junit.vintage:junit-vintage-engine:5.2.0", &vintage),
        artifact("org.junit.platform:junit-platform-console:1.2.0", &console),
    ]
    .into_iter()
    .collect();
    let versions = DetectedVersions::detect(&artifacts, &Versions::default());
    assert_eq!(versions.vintage, "5.2.0");

    // An empty repository proves that nothing is looked up.
    let empty = LocalRepository::new(temp_dir.path().join("empty"));
    let log = MemoryLog::new();
    let completer = DependencyCompleter::new(&artifacts, &[], &empty, &log);
    assert!(completer.complete(&versions).unwrap().is_empty());

    let mut elements = Vec::new();
    completer
        .resolve_into(&mut elements, VINTAGE_ENGINE, "5.2.0")
        .unwrap();
    completer
        .resolve_into(&mut elements, PLATFORM_CONSOLE, "1.2.0")
        .unwrap();
    assert!(elements.is_empty());
}

#[test]
fn missing_engine_fails_the_run() {
    let temp_dir = TempDir::new().unwrap();
    let repo = LocalRepository::new(temp_dir.path().join("m2"));
    install(&repo, "org.junit.platform:junit-platform-console:1.3.0-RC1");
    let api = install(&repo, "org.junit.jupiter:junit-jupiter-api:5.1.0");

    let project = Project::new(temp_dir.path().join("target")).artifact(
        "org.junit.jupiter:junit-jupiter-api:5.1.0".parse().unwrap(),
        &api,
    );
    let launcher_dir = project.launcher_dir();
    let log = MemoryLog::new();

    let err = starter::run(project)
        .configuration(Configuration::new().dry_run(true))
        .resolver(&repo)
        .log(&log)
        .execute()
        .unwrap_err();

    assert!(err.is_resolution_failure());
    assert!(err
        .to_string()
        .contains("org.junit.jupiter:junit-jupiter-engine:5.1.0"));
    assert!(!launcher_dir.exists());
}
