//! Project state: build layout, declared artifacts and repositories

use crate::error::{Error, Result};
use indexmap::IndexMap;
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;
use url::Url;

/// A `group:artifact:version` triple
///
/// Presence checks compare on [`key`](Self::key) only; resolution requests use
/// the full triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactCoordinate {
    pub group: String,
    pub artifact: String,
    pub version: String,
}

impl ArtifactCoordinate {
    /// Create a coordinate from its three parts
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        ArtifactCoordinate {
            group: group.into(),
            artifact: artifact.into(),
            version: version.into(),
        }
    }

    /// Build a coordinate from a `group:artifact` key and a version
    pub fn from_key(key: &str, version: impl Into<String>) -> Result<Self> {
        let (group, artifact) = key
            .split_once(':')
            .filter(|(g, a)| !g.is_empty() && !a.is_empty() && !a.contains(':'))
            .ok_or_else(|| Error::invalid_coordinate(key))?;
        Ok(ArtifactCoordinate::new(group, artifact, version))
    }

    /// The `group:artifact` key used by [`ArtifactMap`]
    pub fn key(&self) -> String {
        format!("{}:{}", self.group, self.artifact)
    }
}

impl fmt::Display for ArtifactCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
    }
}

fn coordinate_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?P<group>[\w.\-]+):(?P<artifact>[\w.\-]+):(?P<version>[\w.\-+]+)$")
            .expect("coordinate pattern is valid")
    })
}

impl FromStr for ArtifactCoordinate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let caps = coordinate_regex()
            .captures(s.trim())
            .ok_or_else(|| Error::invalid_coordinate(s))?;
        Ok(ArtifactCoordinate::new(
            &caps["group"],
            &caps["artifact"],
            &caps["version"],
        ))
    }
}

/// A dependency already resolved by the build, with its file on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub coordinate: ArtifactCoordinate,
    pub file: PathBuf,
}

impl Artifact {
    /// Pair a coordinate with its file
    pub fn new(coordinate: ArtifactCoordinate, file: impl Into<PathBuf>) -> Self {
        Artifact {
            coordinate,
            file: file.into(),
        }
    }

    /// Version of the coordinate
    pub fn version(&self) -> &str {
        &self.coordinate.version
    }
}

/// Insertion-ordered map from `group:artifact` keys to project artifacts
#[derive(Debug, Clone, Default)]
pub struct ArtifactMap {
    entries: IndexMap<String, Artifact>,
}

impl ArtifactMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an artifact, replacing any earlier one with the same key
    pub fn insert(&mut self, artifact: Artifact) {
        self.entries.insert(artifact.coordinate.key(), artifact);
    }

    /// Artifact mapped under a `group:artifact` key
    pub fn get(&self, key: &str) -> Option<&Artifact> {
        self.entries.get(key)
    }

    /// Whether anything is mapped under `key`, whatever its version
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Version of the artifact mapped under `key`, if any
    pub fn version_of(&self, key: &str) -> Option<&str> {
        self.get(key).map(Artifact::version)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Artifacts in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        self.entries.values()
    }
}

impl FromIterator<Artifact> for ArtifactMap {
    fn from_iter<I: IntoIterator<Item = Artifact>>(iter: I) -> Self {
        let mut map = ArtifactMap::new();
        for artifact in iter {
            map.insert(artifact);
        }
        map
    }
}

/// A remote repository handed through to the resolver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub id: String,
    pub url: Url,
}

impl Repository {
    /// Create a repository from an id and a URL
    ///
    /// # Errors
    /// Fails when `url` does not parse.
    pub fn new(id: impl Into<String>, url: &str) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| Error::Generic(format!("Invalid repository URL '{}': {}", url, e)))?;
        Ok(Repository { id: id.into(), url })
    }

    /// Maven Central
    pub fn central() -> Self {
        Repository {
            id: "central".to_string(),
            url: Url::parse("https://repo.maven.apache.org/maven2/")
                .expect("central URL is valid"),
        }
    }
}

/// Compiled state of the project under test
#[derive(Debug, Clone)]
pub struct Project {
    /// Build directory, e.g. `target`
    pub build_dir: PathBuf,
    /// Compiled main classes
    pub main_output: PathBuf,
    /// Compiled test classes
    pub test_output: PathBuf,
    /// Test class-path elements in build order, outputs included
    pub test_classpath: Vec<PathBuf>,
    /// Dependencies already resolved by the build
    pub artifacts: ArtifactMap,
    /// Remote repositories, only consulted when resolution is needed
    pub repositories: Vec<Repository>,
}

impl Project {
    /// Create a project using the conventional `classes` and `test-classes`
    /// output directories below `build_dir`
    ///
    /// The test class-path starts out as `[test-classes, classes]`.
    pub fn new(build_dir: impl Into<PathBuf>) -> Self {
        let build_dir = build_dir.into();
        let main_output = build_dir.join("classes");
        let test_output = build_dir.join("test-classes");
        Project {
            test_classpath: vec![test_output.clone(), main_output.clone()],
            build_dir,
            main_output,
            test_output,
            artifacts: ArtifactMap::new(),
            repositories: vec![Repository::central()],
        }
    }

    /// Add a dependency that the build already resolved
    ///
    /// Its file is appended to the test class-path.
    pub fn artifact(mut self, coordinate: ArtifactCoordinate, file: impl AsRef<Path>) -> Self {
        let file = file.as_ref().to_path_buf();
        self.test_classpath.push(file.clone());
        self.artifacts.insert(Artifact::new(coordinate, file));
        self
    }

    /// Replace the remote repositories
    pub fn repositories(mut self, repositories: Vec<Repository>) -> Self {
        self.repositories = repositories;
        self
    }

    /// Directory receiving the command, stdout and stderr logs
    pub fn launcher_dir(&self) -> PathBuf {
        self.build_dir.join("junit-platform")
    }
}
