//! Resolver backed by a Maven-layout directory on disk

use super::Resolver;
use crate::project::{Artifact, ArtifactCoordinate, Repository};
use anyhow::{bail, Context};
use regex::Regex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Looks artifacts up in a local Maven repository
///
/// Dependencies are read from the POM next to each jar and followed
/// breadth-first, so the nearest declaration of a `group:artifact` wins.
/// Dependencies in `test`, `provided`, `system` or `import` scope and
/// optional ones are not followed. Every jar and POM on the way must already
/// be in the repository; nothing is downloaded.
#[derive(Debug, Clone)]
pub struct LocalRepository {
    root: PathBuf,
}

impl LocalRepository {
    /// Use the repository rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalRepository { root: root.into() }
    }

    /// `~/.m2/repository`, if a home directory is known
    pub fn user_default() -> Option<Self> {
        dirs_next::home_dir().map(|home| Self::new(home.join(".m2").join("repository")))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the jar for `coordinate` lives in this repository
    pub fn jar_path(&self, coordinate: &ArtifactCoordinate) -> PathBuf {
        self.file_path(coordinate, "jar")
    }

    /// Where the POM for `coordinate` lives in this repository
    pub fn pom_path(&self, coordinate: &ArtifactCoordinate) -> PathBuf {
        self.file_path(coordinate, "pom")
    }

    fn file_path(&self, coordinate: &ArtifactCoordinate, extension: &str) -> PathBuf {
        let mut path = self.root.clone();
        path.extend(coordinate.group.split('.'));
        path.push(&coordinate.artifact);
        path.push(&coordinate.version);
        path.push(format!(
            "{}-{}.{}",
            coordinate.artifact, coordinate.version, extension
        ));
        path
    }

    /// Runtime dependencies declared by the POM of `coordinate`
    fn dependencies(
        &self,
        coordinate: &ArtifactCoordinate,
    ) -> anyhow::Result<Vec<ArtifactCoordinate>> {
        let pom = self.pom_path(coordinate);
        let text = fs::read_to_string(&pom)
            .with_context(|| format!("Reading {} failed", pom.display()))?;
        pom_dependencies(&text, coordinate)
            .with_context(|| format!("Reading dependencies of {} failed", coordinate))
    }
}

impl Resolver for LocalRepository {
    fn resolve(
        &self,
        coordinate: &ArtifactCoordinate,
        _repositories: &[Repository],
    ) -> anyhow::Result<Vec<Artifact>> {
        let mut resolved = Vec::new();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([coordinate.clone()]);

        while let Some(next) = queue.pop_front() {
            if !seen.insert(next.key()) {
                continue;
            }
            let jar = self.jar_path(&next);
            if !jar.is_file() {
                bail!(
                    "{} not found in local repository {}",
                    jar.display(),
                    self.root.display()
                );
            }
            queue.extend(self.dependencies(&next)?);
            resolved.push(Artifact::new(next, jar));
        }
        Ok(resolved)
    }
}

fn pattern(cell: &'static OnceLock<Regex>, source: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(source).expect("POM pattern is valid"))
}

/// Blocks whose content never declares a dependency of the artifact itself
fn ignored_blocks() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    pattern(
        &PATTERN,
        r"(?s)<!--.*?-->|<dependencyManagement>.*?</dependencyManagement>|<exclusions>.*?</exclusions>|<build>.*?</build>|<profiles>.*?</profiles>",
    )
}

fn dependency_blocks() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    pattern(&PATTERN, r"(?s)<dependency>(.*?)</dependency>")
}

fn properties_block() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    pattern(&PATTERN, r"(?s)<properties>(.*?)</properties>")
}

fn property() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    pattern(&PATTERN, r"(?s)<([\w.\-]+)>\s*([^<]*?)\s*</([\w.\-]+)>")
}

fn placeholder() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    pattern(&PATTERN, r"\$\{([^}]+)\}")
}

/// Text of the first `<tag>` element in `block`
fn element<'t>(block: &'t str, tag: &str) -> Option<&'t str> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);
    let start = block.find(&open)? + open.len();
    let end = block[start..].find(&close)? + start;
    Some(block[start..end].trim())
}

/// Parse the dependencies a POM declares for runtime use
fn pom_dependencies(
    text: &str,
    owner: &ArtifactCoordinate,
) -> anyhow::Result<Vec<ArtifactCoordinate>> {
    let text = ignored_blocks().replace_all(text, "");

    let mut properties = HashMap::new();
    properties.insert("project.version".to_string(), owner.version.clone());
    properties.insert("project.groupId".to_string(), owner.group.clone());
    if let Some(block) = properties_block().captures(&text) {
        for caps in property().captures_iter(&block[1]) {
            if caps[1] == caps[3] {
                properties.insert(caps[1].to_string(), caps[2].to_string());
            }
        }
    }
    let expand = |value: &str| -> anyhow::Result<String> {
        let mut missing = None;
        let expanded = placeholder().replace_all(value, |caps: &regex::Captures| {
            match properties.get(&caps[1]) {
                Some(v) => v.clone(),
                None => {
                    missing.get_or_insert_with(|| caps[1].to_string());
                    String::new()
                }
            }
        });
        match missing {
            Some(name) => bail!("Unknown property '{}' in '{}'", name, value),
            None => Ok(expanded.into_owned()),
        }
    };

    let mut dependencies = Vec::new();
    for caps in dependency_blocks().captures_iter(&text) {
        let block = &caps[1];
        let scope = element(block, "scope").unwrap_or("compile");
        if matches!(scope, "test" | "provided" | "system" | "import") {
            continue;
        }
        if element(block, "optional") == Some("true") {
            continue;
        }
        let (Some(group), Some(artifact)) =
            (element(block, "groupId"), element(block, "artifactId"))
        else {
            bail!("Dependency without groupId or artifactId");
        };
        let Some(version) = element(block, "version") else {
            bail!("No version for dependency {}:{}", group, artifact);
        };
        dependencies.push(ArtifactCoordinate::new(
            expand(group)?,
            expand(artifact)?,
            expand(version)?,
        ));
    }
    Ok(dependencies)
}
