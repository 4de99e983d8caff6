//! Completing the test class/module path with missing JUnit artifacts

pub mod local;

pub use local::LocalRepository;

use crate::config::Versions;
use crate::error::{Error, Result};
use crate::launch::path::normalize;
use crate::log::Log;
use crate::project::{Artifact, ArtifactCoordinate, ArtifactMap, Repository};
use std::path::PathBuf;

pub const JUPITER_API: &str = "org.junit.jupiter:junit-jupiter-api";
pub const JUPITER_ENGINE: &str = "org.junit.jupiter:junit-jupiter-engine";
pub const JUPITER_PARAMS: &str = "org.junit.jupiter:junit-jupiter-params";
pub const JUPITER_MIGRATION_SUPPORT: &str = "org.junit.jupiter:junit-jupiter-migrationsupport";
pub const JUNIT4: &str = "junit:junit";
pub const VINTAGE_ENGINE: &str = "org.junit.vintage:junit-vintage-engine";
pub const PLATFORM_COMMONS: &str = "org.junit.platform:junit-platform-commons";
pub const PLATFORM_CONSOLE: &str = "org.junit.platform:junit-platform-console";

/// Jupiter and Vintage version used when nothing else is known
pub const FALLBACK_JUPITER_VERSION: &str = "5.3.0-RC1";
/// Platform version used when nothing else is known
pub const FALLBACK_PLATFORM_VERSION: &str = "1.3.0-RC1";
/// The only JUnit 4 version the vintage engine is added for
pub const BRIDGED_JUNIT4_VERSION: &str = "4.12";

/// Resolves a coordinate and its transitive dependencies to files
pub trait Resolver {
    /// Return the requested artifact and everything it depends on
    ///
    /// Any failure (network, missing coordinate, conflicts) aborts the run.
    fn resolve(
        &self,
        coordinate: &ArtifactCoordinate,
        repositories: &[Repository],
    ) -> anyhow::Result<Vec<Artifact>>;
}

/// Engine versions derived from configuration and project artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedVersions {
    pub jupiter: String,
    pub vintage: String,
    pub platform: String,
}

impl DetectedVersions {
    /// Explicit versions win; otherwise look at what the project maps
    pub fn detect(artifacts: &ArtifactMap, configured: &Versions) -> Self {
        let jupiter = configured
            .jupiter
            .as_deref()
            .or_else(|| artifacts.version_of(JUPITER_ENGINE))
            .or_else(|| artifacts.version_of(JUPITER_API))
            .unwrap_or(FALLBACK_JUPITER_VERSION);
        let vintage = configured
            .vintage
            .as_deref()
            .or_else(|| artifacts.version_of(VINTAGE_ENGINE))
            .unwrap_or(FALLBACK_JUPITER_VERSION);
        let platform = configured
            .platform
            .as_deref()
            .or_else(|| artifacts.version_of(PLATFORM_COMMONS))
            .unwrap_or(FALLBACK_PLATFORM_VERSION);
        DetectedVersions {
            jupiter: jupiter.to_string(),
            vintage: vintage.to_string(),
            platform: platform.to_string(),
        }
    }
}

/// Adds engine and console artifacts the project does not declare itself
pub struct DependencyCompleter<'a> {
    artifacts: &'a ArtifactMap,
    repositories: &'a [Repository],
    resolver: &'a dyn Resolver,
    log: &'a dyn Log,
}

impl<'a> DependencyCompleter<'a> {
    pub fn new(
        artifacts: &'a ArtifactMap,
        repositories: &'a [Repository],
        resolver: &'a dyn Resolver,
        log: &'a dyn Log,
    ) -> Self {
        DependencyCompleter {
            artifacts,
            repositories,
            resolver,
            log,
        }
    }

    /// Resolve every missing artifact and return the new path elements
    ///
    /// Each check runs independently:
    /// 1. Jupiter API without engine: add the engine.
    /// 2. JUnit 4.12 without vintage engine: add the vintage engine.
    /// 3. No console launcher: add it.
    pub fn complete(&self, versions: &DetectedVersions) -> Result<Vec<PathBuf>> {
        let mut elements = Vec::new();

        if self.artifacts.contains_key(JUPITER_API) && !self.artifacts.contains_key(JUPITER_ENGINE)
        {
            self.resolve_into(&mut elements, JUPITER_ENGINE, &versions.jupiter)?;
        }

        if let Some(junit4) = self.artifacts.get(JUNIT4) {
            if !self.artifacts.contains_key(VINTAGE_ENGINE)
                && junit4.version() == BRIDGED_JUNIT4_VERSION
            {
                self.resolve_into(&mut elements, VINTAGE_ENGINE, &versions.vintage)?;
            }
        }

        if !self.artifacts.contains_key(PLATFORM_CONSOLE) {
            self.resolve_into(&mut elements, PLATFORM_CONSOLE, &versions.platform)?;
        }

        Ok(elements)
    }

    /// Resolve `key` at `version` and append files not yet known
    ///
    /// Nothing is requested when the project already maps `key`. Resolved
    /// artifacts mapped by the project, and paths already in `elements`, are
    /// skipped.
    pub fn resolve_into(
        &self,
        elements: &mut Vec<PathBuf>,
        key: &str,
        version: &str,
    ) -> Result<()> {
        if self.artifacts.contains_key(key) {
            self.log
                .debug(&format!("Skip resolving '{}', because it is already mapped.", key));
            return Ok(());
        }
        let coordinate = ArtifactCoordinate::from_key(key, version)?;
        self.log.debug(&format!(
            "Resolving '{}' and its transitive dependencies...",
            coordinate
        ));
        let resolved = self
            .resolver
            .resolve(&coordinate, self.repositories)
            .map_err(|e| Error::resolution(coordinate.to_string(), e))?;

        for artifact in resolved {
            if self.artifacts.contains_key(&artifact.coordinate.key()) {
                continue;
            }
            let path = normalize(&artifact.file)?;
            if elements.contains(&path) {
                continue;
            }
            self.log.debug(&format!(" -> {}", path.display()));
            elements.push(path);
        }
        Ok(())
    }
}
