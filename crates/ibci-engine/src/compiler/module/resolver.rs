//! Module name resolution.
//!
//! Maps dotted module names (absolute or dot-prefixed relative) to source
//! files under the project root. Every candidate is checked against the
//! root sandbox before the filesystem is probed, and the final hit is
//! canonicalized and re-checked so symlinks cannot smuggle a path out of
//! the project.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extensions probed for a module candidate, in order. The empty entry
/// allows extensionless script files.
pub const SOURCE_EXTENSIONS: &[&str] = &[".ibci", ""];

/// Why a module name failed to resolve.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    #[error("Cannot resolve module '{name}' from '{importer}'")]
    ModuleNotFound { name: String, importer: PathBuf },

    #[error("Security Error: Path '{path}' is outside the project root '{root}'")]
    SecurityViolation { path: PathBuf, root: PathBuf },

    #[error("Failed to access '{path}': {message}")]
    Io { path: PathBuf, message: String },
}

/// Resolves module names to files inside one project root.
#[derive(Debug, Clone)]
pub struct ModuleResolver {
    project_root: PathBuf,
}

impl ModuleResolver {
    /// Create a resolver for the given project root.
    ///
    /// The root must exist; it is canonicalized once here so sandbox
    /// checks compare like with like.
    pub fn new(project_root: impl AsRef<Path>) -> Result<Self, ResolveError> {
        let raw = project_root.as_ref();
        let project_root = raw.canonicalize().map_err(|e| ResolveError::Io {
            path: raw.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Self { project_root })
    }

    /// The canonical project root.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Resolve a module name to an absolute canonical file path.
    ///
    /// Leading dots select a relative base: one dot is the importing
    /// file's directory, each further dot walks one directory up. The
    /// dotted remainder maps to path separators. Probe order: the exact
    /// candidate with each extension in [`SOURCE_EXTENSIONS`], then an
    /// `__init__` file inside a same-named directory.
    pub fn resolve(&self, module_name: &str, importing_file: &Path) -> Result<PathBuf, ResolveError> {
        let candidate = self.candidate_path(module_name, importing_file);
        self.check_sandbox(&candidate)?;

        for ext in SOURCE_EXTENSIONS {
            let direct = append_suffix(&candidate, ext);
            if direct.is_file() {
                return self.admit(direct);
            }
        }
        for ext in SOURCE_EXTENSIONS {
            let init = candidate.join(format!("__init__{}", ext));
            if init.is_file() {
                return self.admit(init);
            }
        }

        Err(ResolveError::ModuleNotFound {
            name: module_name.to_string(),
            importer: importing_file.to_path_buf(),
        })
    }

    /// Whether the name points at a directory with no init file (a
    /// namespace package). Callers use this to tell "legitimately empty
    /// package" apart from "not found".
    pub fn is_package_directory(&self, module_name: &str, importing_file: &Path) -> bool {
        let candidate = self.candidate_path(module_name, importing_file);
        if self.check_sandbox(&candidate).is_err() {
            return false;
        }
        if !candidate.is_dir() {
            return false;
        }
        !SOURCE_EXTENSIONS
            .iter()
            .any(|ext| candidate.join(format!("__init__{}", ext)).is_file())
    }

    /// Admit an explicitly named file, such as a compile entry point: it
    /// must exist and canonicalize to a path under the project root.
    pub fn admit_file(&self, path: &Path) -> Result<PathBuf, ResolveError> {
        self.admit(path.to_path_buf())
    }

    /// Canonicalize a probe hit and re-check the sandbox. A symlink
    /// inside the root may point outside it; the pre-probe check cannot
    /// see that, this one does.
    fn admit(&self, path: PathBuf) -> Result<PathBuf, ResolveError> {
        let canonical = path.canonicalize().map_err(|e| ResolveError::Io {
            path: path.clone(),
            message: e.to_string(),
        })?;
        if !canonical.starts_with(&self.project_root) {
            return Err(ResolveError::SecurityViolation {
                path: canonical,
                root: self.project_root.clone(),
            });
        }
        Ok(canonical)
    }

    /// Build the unprobed candidate path for a module name.
    fn candidate_path(&self, module_name: &str, importing_file: &Path) -> PathBuf {
        let level = module_name.chars().take_while(|c| *c == '.').count();
        let rest = &module_name[level..];
        let tail: PathBuf = rest.split('.').filter(|s| !s.is_empty()).collect();

        if level == 0 {
            return self.project_root.join(tail);
        }

        // One dot anchors at the importer's directory; each further dot
        // walks one level up
        let mut base = importing_file
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .to_path_buf();
        for _ in 1..level {
            base = match base.parent() {
                Some(parent) => parent.to_path_buf(),
                None => PathBuf::new(),
            };
        }
        base.join(tail)
    }

    /// Pre-probe sandbox check on a candidate that may not exist yet:
    /// canonicalize the deepest existing ancestor, re-join the rest, and
    /// require the result to stay under the project root.
    fn check_sandbox(&self, candidate: &Path) -> Result<(), ResolveError> {
        let normalized = normalize(candidate);
        if normalized.starts_with(&self.project_root) {
            Ok(())
        } else {
            Err(ResolveError::SecurityViolation {
                path: candidate.to_path_buf(),
                root: self.project_root.clone(),
            })
        }
    }
}

/// Append an extension suffix without touching the existing file stem.
fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    if suffix.is_empty() {
        return path.to_path_buf();
    }
    let mut os: OsString = path.as_os_str().to_os_string();
    os.push(suffix);
    PathBuf::from(os)
}

/// Canonicalize the deepest existing ancestor of `path` and re-join the
/// non-existing remainder.
fn normalize(path: &Path) -> PathBuf {
    let mut prefix = path.to_path_buf();
    let mut suffix: Vec<OsString> = Vec::new();
    while !prefix.exists() {
        match (prefix.parent(), prefix.file_name()) {
            (Some(parent), Some(name)) => {
                suffix.push(name.to_os_string());
                prefix = parent.to_path_buf();
            }
            _ => break,
        }
    }
    let mut result = prefix.canonicalize().unwrap_or(prefix);
    for part in suffix.iter().rev() {
        result.push(part);
    }
    result
}
