//! Configuration parameters for a launcher run

use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Global timeout applied when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Environment variable switching dry-run mode on
pub const DRY_RUN_ENV: &str = "JUNIT_PLATFORM_DRY_RUN";

/// Options for the `java` part of the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JavaOptions {
    /// Emitted before the module/class path section
    pub additional_options: Vec<String>,
    /// Replaces the `--add-modules` value
    pub add_modules: Option<String>,
    /// Replaces the derived `--add-reads` targets
    pub add_reads: Option<Vec<String>>,
    /// Replaces the derived `--add-opens` targets
    pub add_opens: Option<Vec<String>>,
}

impl JavaOptions {
    /// Create options that change nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an option emitted before the path section
    pub fn additional_option(mut self, option: impl Into<String>) -> Self {
        self.additional_options.push(option.into());
        self
    }

    /// Set the `--add-modules` value
    pub fn add_modules(mut self, value: impl Into<String>) -> Self {
        self.add_modules = Some(value.into());
        self
    }

    /// Set the modules the main module reads instead of deriving them
    pub fn add_reads(mut self, modules: Vec<String>) -> Self {
        self.add_reads = Some(modules);
        self
    }

    /// Set the modules the main module's packages open to
    pub fn add_opens(mut self, modules: Vec<String>) -> Self {
        self.add_opens = Some(modules);
        self
    }
}

/// Explicit engine versions; unset ones are detected from the project
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Versions {
    pub jupiter: Option<String>,
    pub vintage: Option<String>,
    pub platform: Option<String>,
}

/// Configuration for one launcher run
#[derive(Debug, Clone)]
pub struct Configuration {
    /// Global timeout for the launcher process
    pub timeout: Duration,
    /// Tags passed as `--include-tag`
    pub tags: Vec<String>,
    /// Configuration parameters passed as `--config`, in insertion order
    pub parameters: IndexMap<String, String>,
    /// Directory for the launcher's XML reports
    pub reports_dir: Option<PathBuf>,
    /// Fail when no tests were found
    pub strict: bool,
    /// Only write the command line, never start the process
    pub dry_run: bool,
    /// Explicit `java` executable
    pub java_executable: Option<PathBuf>,
    /// Options for the `java` part of the command line
    pub java_options: JavaOptions,
    /// Replaces every computed Java option when set
    pub override_java_options: Option<Vec<String>>,
    /// Replaces every computed launcher option when set
    pub override_launcher_options: Option<Vec<String>>,
    /// Engine versions to resolve missing artifacts at
    pub versions: Versions,
}

impl Configuration {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        // Check JUNIT_PLATFORM_DRY_RUN environment variable
        let dry_run = std::env::var(DRY_RUN_ENV)
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false);

        Configuration {
            timeout: DEFAULT_TIMEOUT,
            tags: Vec::new(),
            parameters: IndexMap::new(),
            reports_dir: None,
            strict: false,
            dry_run,
            java_executable: None,
            java_options: JavaOptions::default(),
            override_java_options: None,
            override_launcher_options: None,
            versions: Versions::default(),
        }
    }

    /// Set the global timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Add a tag to include
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Add a configuration parameter; a repeated key replaces the value
    pub fn parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Set the report directory
    pub fn reports_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.reports_dir = Some(dir.into());
        self
    }

    /// Fail the run when no tests are found
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Enable or disable dry-run mode
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set the `java` executable to start
    pub fn java_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.java_executable = Some(path.into());
        self
    }

    /// Set the Java options
    pub fn java_options(mut self, options: JavaOptions) -> Self {
        self.java_options = options;
        self
    }

    /// Replace the computed Java options with these
    pub fn override_java_options(mut self, options: Vec<String>) -> Self {
        self.override_java_options = Some(options);
        self
    }

    /// Replace the computed launcher options with these
    pub fn override_launcher_options(mut self, options: Vec<String>) -> Self {
        self.override_launcher_options = Some(options);
        self
    }

    /// Set explicit engine versions
    pub fn versions(mut self, versions: Versions) -> Self {
        self.versions = versions;
        self
    }

    /// The `java` executable to start
    ///
    /// Uses the configured path, then `$JAVA_HOME/bin/java`, then `java`
    /// from `PATH`.
    pub fn resolve_java_executable(&self) -> PathBuf {
        match &self.java_executable {
            Some(path) => path.clone(),
            None => java_in(std::env::var_os("JAVA_HOME").map(PathBuf::from).as_deref()),
        }
    }
}

/// `bin/java` below `java_home` if it exists, else plain `java`
fn java_in(java_home: Option<&Path>) -> PathBuf {
    let name = if cfg!(windows) { "java.exe" } else { "java" };
    if let Some(home) = java_home {
        let candidate = home.join("bin").join(name);
        if candidate.is_file() {
            return candidate;
        }
    }
    PathBuf::from(name)
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}
