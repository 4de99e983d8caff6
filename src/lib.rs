//! # junit-platform-starter
//!
//! Runs the JUnit Platform Console Launcher against a compiled Java project.
//!
//! The crate works out whether the main and test sides of the project are
//! modules, adds the test engines and the console launcher the project does
//! not declare itself, assembles the matching `java` command line and runs it
//! under a global timeout. The command line and the launcher's output streams
//! are written to `<build dir>/junit-platform/`.

pub mod config;
pub mod error;
pub mod launch;
pub mod log;
pub mod modules;
pub mod project;
pub mod resolve;

pub use config::{Configuration, JavaOptions, Versions};
pub use error::{Error, Result};
pub use launch::{CommandLineBuilder, LaunchPlan, PathArgument, ProcessRunner, RunOutcome};
pub use log::{Log, MemoryLog, TracingLog};
pub use modules::{classify, Mode, ModuleDescriptor, ModuleTopology};
pub use project::{Artifact, ArtifactCoordinate, ArtifactMap, Project, Repository};
pub use resolve::{DependencyCompleter, DetectedVersions, LocalRepository, Resolver};

/// Builder for configuring and running the console launcher
///
/// # Examples
///
/// ```no_run
/// use junit_platform_starter::{starter, Configuration, ModuleDescriptor, Project};
/// use std::time::Duration;
///
/// let project = Project::new("target");
/// let main = ModuleDescriptor::new("com.example")
///     .requires(["java.base"])
///     .packages_from(&project.main_output)
///     .unwrap();
///
/// let outcome = starter::run(project)
///     .configuration(Configuration::new().timeout(Duration::from_secs(60)).tag("fast"))
///     .main_module(main)
///     .execute()
///     .unwrap();
///
/// std::process::exit(outcome.exit_code());
/// ```
pub struct Starter<'a> {
    project: Project,
    configuration: Configuration,
    main_module: Option<ModuleDescriptor>,
    test_module: Option<ModuleDescriptor>,
    resolver: Option<&'a dyn Resolver>,
    log: &'a dyn Log,
}

impl<'a> Starter<'a> {
    /// Create a new starter for the given project
    fn new(project: Project) -> Self {
        Self {
            project,
            configuration: Configuration::new(),
            main_module: None,
            test_module: None,
            resolver: None,
            log: &TracingLog,
        }
    }

    /// Replace the run configuration
    pub fn configuration(mut self, configuration: Configuration) -> Self {
        self.configuration = configuration;
        self
    }

    /// Descriptor of the compiled main module, if main is a module
    pub fn main_module(mut self, descriptor: ModuleDescriptor) -> Self {
        self.main_module = Some(descriptor);
        self
    }

    /// Descriptor of the compiled test module, if tests are a module
    pub fn test_module(mut self, descriptor: ModuleDescriptor) -> Self {
        self.test_module = Some(descriptor);
        self
    }

    /// Resolver for missing engine artifacts
    ///
    /// Defaults to the user's local Maven repository, `~/.m2/repository`.
    /// Without a home directory every resolution fails.
    pub fn resolver(mut self, resolver: &'a dyn Resolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Where log lines go; defaults to [`TracingLog`]
    pub fn log(mut self, log: &'a dyn Log) -> Self {
        self.log = log;
        self
    }

    /// Assemble the command line without writing or starting anything
    ///
    /// # Errors
    /// Fails when a missing artifact cannot be resolved.
    pub fn plan(&self) -> Result<LaunchPlan> {
        let topology = ModuleTopology::new(self.main_module.clone(), self.test_module.clone());
        self.log
            .debug(&format!("Module mode: {:?}", topology.mode()));

        let java = self.configuration.resolve_java_executable();
        let builder = CommandLineBuilder::new(
            &java,
            &topology,
            &self.project.artifacts,
            &self.configuration,
            &self.project.test_output,
        );
        let command = builder.build(|| self.path_argument())?;

        Ok(LaunchPlan::new(
            command,
            &self.project.launcher_dir(),
            self.configuration.timeout,
            self.configuration.dry_run,
        ))
    }

    /// Plan and run the launcher
    ///
    /// # Returns
    /// The run's outcome; test failures, timeouts and launch failures are
    /// outcomes, not errors.
    ///
    /// # Errors
    /// Fails before anything is written when a missing artifact cannot be
    /// resolved.
    pub fn execute(self) -> Result<RunOutcome> {
        let plan = self.plan()?;
        Ok(ProcessRunner::new(self.log).run(plan))
    }

    /// Test class-path elements followed by completed dependencies
    fn path_argument(&self) -> Result<String> {
        let local = LocalRepository::user_default();
        let resolver: &dyn Resolver = match (self.resolver, &local) {
            (Some(resolver), _) => resolver,
            (None, Some(local)) => local,
            (None, None) => &NoLocalRepository,
        };

        let versions =
            DetectedVersions::detect(&self.project.artifacts, &self.configuration.versions);
        let completer = DependencyCompleter::new(
            &self.project.artifacts,
            &self.project.repositories,
            resolver,
            self.log,
        );
        let completed = completer.complete(&versions)?;

        let mut argument = PathArgument::new(self.log);
        argument.extend(&self.project.test_classpath)?;
        argument.extend(&completed)?;
        Ok(argument.to_argument())
    }
}

/// Fails every request; used when no local repository can be located
struct NoLocalRepository;

impl Resolver for NoLocalRepository {
    fn resolve(
        &self,
        coordinate: &ArtifactCoordinate,
        _repositories: &[Repository],
    ) -> anyhow::Result<Vec<Artifact>> {
        anyhow::bail!(
            "No resolver configured and no home directory to find a local repository for {}",
            coordinate
        )
    }
}

/// Create a new starter for the given project
///
/// This is the main entry point for running the console launcher.
pub mod starter {
    use super::*;

    /// Create a new starter for the given project
    pub fn run(project: Project) -> Starter<'static> {
        Starter::new(project)
    }
}
