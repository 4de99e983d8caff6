//! Building the `--class-path` / `--module-path` value

use crate::error::{Error, Result};
use crate::log::Log;
use std::path::{Component, Path, PathBuf};

/// Separator between path elements on this platform
pub const PATH_SEPARATOR: &str = if cfg!(windows) { ";" } else { ":" };

/// Make `path` absolute and remove `.` and `..` components lexically
pub fn normalize(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path).map_err(|e| Error::PathArgument {
        element: path.display().to_string(),
        message: e.to_string(),
    })?;
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    Ok(normalized)
}

/// Ordered, de-duplicated set of existing path elements
pub struct PathArgument<'a> {
    log: &'a dyn Log,
    elements: Vec<PathBuf>,
}

impl<'a> PathArgument<'a> {
    /// Start an empty argument
    pub fn new(log: &'a dyn Log) -> Self {
        log.debug("Creating path argument");
        PathArgument {
            log,
            elements: Vec::new(),
        }
    }

    /// Add one element if it exists and is not present yet
    ///
    /// Returns whether the element was added.
    ///
    /// # Errors
    /// Fails for an existing element whose path is not valid UTF-8, since it
    /// cannot be passed on the command line unchanged.
    pub fn push(&mut self, element: &Path) -> Result<bool> {
        let path = normalize(element)?;
        if !path.exists() {
            self.log
                .debug(&format!("  X {} // doesn't exist", path.display()));
            return Ok(false);
        }
        if self.elements.contains(&path) {
            return Ok(false);
        }
        if path.to_str().is_none() {
            return Err(Error::PathArgument {
                element: path.display().to_string(),
                message: "path is not valid UTF-8".to_string(),
            });
        }
        self.log.debug(&format!(" -> {}", path.display()));
        self.elements.push(path);
        Ok(true)
    }

    /// [`push`](Self::push) every element in order
    pub fn extend<I, P>(&mut self, elements: I) -> Result<()>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        for element in elements {
            self.push(element.as_ref())?;
        }
        Ok(())
    }

    pub fn elements(&self) -> &[PathBuf] {
        &self.elements
    }

    /// Join all elements with the platform separator
    pub fn to_argument(&self) -> String {
        self.elements
            .iter()
            .filter_map(|p| p.to_str())
            .collect::<Vec<_>>()
            .join(PATH_SEPARATOR)
    }
}
