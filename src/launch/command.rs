//! Assembling the console launcher command line

use crate::config::Configuration;
use crate::error::Result;
use crate::modules::{Mode, ModuleDescriptor, ModuleTopology};
use crate::project::ArtifactMap;
use crate::resolve::{
    JUNIT4, JUPITER_API, JUPITER_MIGRATION_SUPPORT, JUPITER_PARAMS, PLATFORM_COMMONS,
};
use std::path::Path;

/// Module of the console launcher
pub const CONSOLE_MODULE: &str = "org.junit.platform.console";
/// Main class of the console launcher
pub const CONSOLE_MAIN_CLASS: &str = "org.junit.platform.console.ConsoleLauncher";
/// `--add-modules` value unless configured otherwise
pub const ALL_MODULES: &str = "ALL-MODULE-PATH,ALL-DEFAULT";

/// Modules that test code may need to read, keyed by the artifact providing them
const READ_TARGETS: [(&str, &str); 4] = [
    (JUPITER_API, "org.junit.jupiter.api"),
    (JUPITER_PARAMS, "org.junit.jupiter.params"),
    (JUPITER_MIGRATION_SUPPORT, "org.junit.jupiter.migrationsupport"),
    (JUNIT4, "junit"),
];

/// Produces the argument vector for one launcher run
pub struct CommandLineBuilder<'a> {
    java: &'a Path,
    topology: &'a ModuleTopology,
    artifacts: &'a ArtifactMap,
    config: &'a Configuration,
    test_output: &'a Path,
}

impl<'a> CommandLineBuilder<'a> {
    /// `java` is used as given; it is never looked up here
    pub fn new(
        java: &'a Path,
        topology: &'a ModuleTopology,
        artifacts: &'a ArtifactMap,
        config: &'a Configuration,
        test_output: &'a Path,
    ) -> Self {
        CommandLineBuilder {
            java,
            topology,
            artifacts,
            config,
            test_output,
        }
    }

    /// Build the full command line, executable first
    ///
    /// `path_argument` is only called when the Java options are computed,
    /// i.e. not overridden by configuration.
    pub fn build<F>(&self, path_argument: F) -> Result<Vec<String>>
    where
        F: FnOnce() -> Result<String>,
    {
        let mut cmd = vec![self.java.display().to_string()];

        match &self.config.override_java_options {
            Some(options) => cmd.extend(options.iter().cloned()),
            None => self.add_java_options(&mut cmd, &path_argument()?),
        }
        match &self.config.override_launcher_options {
            Some(options) => cmd.extend(options.iter().cloned()),
            None => self.add_launcher_options(&mut cmd),
        }
        Ok(cmd)
    }

    /// Options for the JVM: path, module directives and the entry point
    pub fn add_java_options(&self, cmd: &mut Vec<String>, path_argument: &str) {
        cmd.extend(self.config.java_options.additional_options.iter().cloned());

        if !self.topology.mode().is_modular() {
            cmd.push("--class-path".to_string());
            cmd.push(path_argument.to_string());
            cmd.push(CONSOLE_MAIN_CLASS.to_string());
            return;
        }

        cmd.push("--module-path".to_string());
        cmd.push(path_argument.to_string());
        cmd.push("--add-modules".to_string());
        cmd.push(
            self.config
                .java_options
                .add_modules
                .clone()
                .unwrap_or_else(|| ALL_MODULES.to_string()),
        );

        if let (Mode::MainOnly, Some(main)) = (self.topology.mode(), self.topology.main_module()) {
            self.add_patch_directives(cmd, main);
        }

        cmd.push("--module".to_string());
        cmd.push(CONSOLE_MODULE.to_string());
    }

    /// Test classes join the main module, which then reads and opens up to
    /// the test frameworks
    fn add_patch_directives(&self, cmd: &mut Vec<String>, main: &ModuleDescriptor) {
        let name = main.name();
        cmd.push("--patch-module".to_string());
        cmd.push(format!("{}={}", name, self.test_output.display()));

        for module in self.add_reads_modules(main) {
            cmd.push("--add-reads".to_string());
            cmd.push(format!("{}={}", name, module));
        }

        // Opening "name/*" is not supported, so open every package one by one.
        for module in self.add_opens_modules() {
            for package in main.contained_packages() {
                cmd.push("--add-opens".to_string());
                cmd.push(format!("{}/{}={}", name, package, module));
            }
        }
    }

    /// Launcher options: output style, filters, parameters and selection
    pub fn add_launcher_options(&self, cmd: &mut Vec<String>) {
        cmd.push("--disable-ansi-colors".to_string());
        cmd.push("--details".to_string());
        cmd.push("tree".to_string());
        for tag in &self.config.tags {
            cmd.push(tag_argument(tag));
        }
        for (key, value) in &self.config.parameters {
            cmd.push(config_argument(key, value));
        }
        if let Some(reports) = &self.config.reports_dir {
            cmd.push("--reports-dir".to_string());
            cmd.push(reports.display().to_string());
        }
        if self.config.strict {
            cmd.push("--fail-if-no-tests".to_string());
        }

        match self.topology.selected_module() {
            Some(module) => {
                cmd.push("--select-module".to_string());
                cmd.push(module.to_string());
            }
            None => cmd.push("--scan-class-path".to_string()),
        }
    }

    /// Modules the patched main module must read, minus those it already requires
    pub fn add_reads_modules(&self, main: &ModuleDescriptor) -> Vec<String> {
        if let Some(modules) = &self.config.java_options.add_reads {
            return modules.clone();
        }
        READ_TARGETS
            .iter()
            .filter(|(key, _)| self.artifacts.contains_key(key))
            .map(|(_, module)| *module)
            .filter(|module| !main.reads(module))
            .map(str::to_string)
            .collect()
    }

    /// Modules needing reflective access into the main module
    pub fn add_opens_modules(&self) -> Vec<String> {
        if let Some(modules) = &self.config.java_options.add_opens {
            return modules.clone();
        }
        let mut modules = Vec::new();
        if self.artifacts.contains_key(PLATFORM_COMMONS) {
            modules.push("org.junit.platform.commons".to_string());
        }
        modules
    }
}

fn tag_argument(tag: &str) -> String {
    format!("--include-tag=\"{}\"", tag)
}

fn config_argument(key: &str, value: &str) -> String {
    format!("--config=\"{}\"=\"{}\"", key, value)
}
