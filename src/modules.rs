//! Module descriptors and the main/test module topology

use crate::error::Result;
use std::collections::BTreeSet;
use std::path::Path;
use walkdir::WalkDir;

/// Name, requirements and packages of a compiled module
///
/// Reading `module-info.class` is left to the caller; this is the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
    name: String,
    requires: BTreeSet<String>,
    packages: BTreeSet<String>,
}

impl ModuleDescriptor {
    /// Create a descriptor with no requirements and no packages
    pub fn new(name: impl Into<String>) -> Self {
        ModuleDescriptor {
            name: name.into(),
            requires: BTreeSet::new(),
            packages: BTreeSet::new(),
        }
    }

    /// Add required modules
    pub fn requires<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requires.extend(modules.into_iter().map(Into::into));
        self
    }

    /// Add contained packages
    pub fn packages<I, S>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.packages.extend(packages.into_iter().map(Into::into));
        self
    }

    /// Add every package found below a compiled output directory
    pub fn packages_from(mut self, output_dir: &Path) -> Result<Self> {
        self.packages.extend(scan_packages(output_dir)?);
        Ok(self)
    }

    /// Module name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Modules named in `requires`
    pub fn required_modules(&self) -> &BTreeSet<String> {
        &self.requires
    }

    /// Packages the module contains
    pub fn contained_packages(&self) -> &BTreeSet<String> {
        &self.packages
    }

    /// Whether the module already requires `module`
    pub fn reads(&self, module: &str) -> bool {
        self.requires.contains(module)
    }
}

/// Collect the packages of a compiled output directory
///
/// A package is any directory below `output_dir` holding at least one
/// `.class` file. Classes in the root directory (like `module-info.class`)
/// belong to no package. Directories whose relative path is not valid UTF-8
/// cannot name a package and are skipped.
pub fn scan_packages(output_dir: &Path) -> Result<BTreeSet<String>> {
    let mut packages = BTreeSet::new();
    if !output_dir.is_dir() {
        return Ok(packages);
    }
    for entry in WalkDir::new(output_dir).min_depth(2) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|e| e.to_str()) != Some("class") {
            continue;
        }
        let Some(parent) = entry.path().parent() else {
            continue;
        };
        let Ok(relative) = parent.strip_prefix(output_dir) else {
            continue;
        };
        let Some(segments) = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<Vec<_>>>()
        else {
            continue;
        };
        if !segments.is_empty() {
            packages.insert(segments.join("."));
        }
    }
    Ok(packages)
}

/// Which sides of the project are modules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Plain class-path run
    None,
    /// Main is a module, tests are patched into it
    MainOnly,
    /// Tests form their own module, main is plain
    TestOnly,
    /// Both sides are modules
    Both,
}

impl Mode {
    /// Pure mapping from descriptor presence to mode
    pub fn classify(main: Option<&ModuleDescriptor>, test: Option<&ModuleDescriptor>) -> Mode {
        match (main.is_some(), test.is_some()) {
            (false, false) => Mode::None,
            (true, false) => Mode::MainOnly,
            (false, true) => Mode::TestOnly,
            (true, true) => Mode::Both,
        }
    }

    /// Whether the launcher runs on the module path
    pub fn is_modular(self) -> bool {
        self != Mode::None
    }
}

/// Shorthand for [`Mode::classify`]
pub fn classify(main: Option<&ModuleDescriptor>, test: Option<&ModuleDescriptor>) -> Mode {
    Mode::classify(main, test)
}

/// Main and test module descriptors together with their derived [`Mode`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleTopology {
    main: Option<ModuleDescriptor>,
    test: Option<ModuleDescriptor>,
    mode: Mode,
}

impl ModuleTopology {
    /// Classify the given descriptors once
    pub fn new(main: Option<ModuleDescriptor>, test: Option<ModuleDescriptor>) -> Self {
        let mode = Mode::classify(main.as_ref(), test.as_ref());
        ModuleTopology { main, test, mode }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn main_module(&self) -> Option<&ModuleDescriptor> {
        self.main.as_ref()
    }

    pub fn test_module(&self) -> Option<&ModuleDescriptor> {
        self.test.as_ref()
    }

    /// Module to hand to `--select-module`: the test module, else the main
    /// module, else none (class-path scanning)
    pub fn selected_module(&self) -> Option<&str> {
        self.test
            .as_ref()
            .or(self.main.as_ref())
            .map(ModuleDescriptor::name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn classify_covers_all_combinations() {
        let main = ModuleDescriptor::new("foo");
        let test = ModuleDescriptor::new("foo.test");
        let cases = [
            (None, None, Mode::None),
            (Some(&main), None, Mode::MainOnly),
            (None, Some(&test), Mode::TestOnly),
            (Some(&main), Some(&test), Mode::Both),
        ];
        for (m, t, expected) in cases {
            assert_eq!(Mode::classify(m, t), expected);
            assert_eq!(Mode::classify(m, t), expected, "classify is not deterministic");
        }
        assert!(!Mode::None.is_modular());
        assert!(Mode::Both.is_modular());
    }

    #[test]
    fn selected_module_prefers_test_side() {
        let main = ModuleDescriptor::new("foo");
        let test = ModuleDescriptor::new("foo.test");

        let both = ModuleTopology::new(Some(main.clone()), Some(test.clone()));
        assert_eq!(both.selected_module(), Some("foo.test"));

        let main_only = ModuleTopology::new(Some(main), None);
        assert_eq!(main_only.mode(), Mode::MainOnly);
        assert_eq!(main_only.selected_module(), Some("foo"));

        let plain = ModuleTopology::new(None, None);
        assert_eq!(plain.selected_module(), None);
    }

    #[test]
    fn descriptor_builder_collects_sets() {
        let d = ModuleDescriptor::new("foo")
            .requires(["java.base", "java.sql", "java.base"])
            .packages(["foo.b", "foo.a"]);
        assert_eq!(d.name(), "foo");
        assert_eq!(d.required_modules().len(), 2);
        assert!(d.reads("java.sql"));
        let packages: Vec<_> = d.contained_packages().iter().cloned().collect();
        assert_eq!(packages, ["foo.a", "foo.b"]);
    }

    #[test]
    fn scan_packages_from_output_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("module-info.class"), b"").unwrap();
        fs::create_dir_all(root.join("foo/internal")).unwrap();
        fs::create_dir_all(root.join("foo/empty")).unwrap();
        fs::create_dir_all(root.join("META-INF")).unwrap();
        fs::write(root.join("foo/Api.class"), b"").unwrap();
        fs::write(root.join("foo/internal/Impl.class"), b"").unwrap();
        fs::write(root.join("META-INF/MANIFEST.MF"), b"").unwrap();

        let packages = scan_packages(root).unwrap();
        let packages: Vec<_> = packages.into_iter().collect();
        assert_eq!(packages, ["foo", "foo.internal"]);

        let missing = scan_packages(&root.join("nope")).unwrap();
        assert!(missing.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn scan_packages_skips_non_utf8_directories() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let bad = root.join("foo").join(OsStr::from_bytes(b"b\xffd"));
        fs::create_dir_all(bad.join("deep")).unwrap();
        fs::write(root.join("foo/Api.class"), b"").unwrap();
        fs::write(bad.join("Hidden.class"), b"").unwrap();
        fs::write(bad.join("deep/Deeper.class"), b"").unwrap();

        let packages: Vec<_> = scan_packages(root).unwrap().into_iter().collect();
        assert_eq!(packages, ["foo"]);
    }
}
