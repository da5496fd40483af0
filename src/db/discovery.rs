//! Local driver discovery.
//!
//! Package-index drivers install as a package directory holding the driver library. The
//! DuckDB driver lives inside the `duckdb` package's compiled extension module. Both are
//! looked up under a list of search roots.

use std::env;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable holding extra search roots (OS path-list syntax).
pub const DRIVER_PATH_ENV: &str = "ADBC_POOLHOUSE_DRIVER_PATH";

const EXTENSION_SUFFIXES: &[&str] = &["so", "pyd", "dylib", "dll"];

/// An installed driver package.
pub trait DriverPackage: Send + Sync {
    /// The package's own answer to where its driver library lives.
    fn driver_path(&self) -> PathBuf;
}

/// Probe for locally installed drivers.
pub trait DriverDiscovery: Send + Sync {
    /// Find an installed driver package by name.
    fn find_package(&self, package: &str) -> Option<Box<dyn DriverPackage>>;

    /// Find the file of a compiled extension module by module name.
    fn find_extension(&self, module: &str) -> Option<PathBuf>;
}

/// Driver package installed as `<root>/<package>/`.
#[derive(Debug, Clone)]
pub struct InstalledPackage {
    name: String,
    dir: PathBuf,
}

impl InstalledPackage {
    pub fn new(name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DriverPackage for InstalledPackage {
    fn driver_path(&self) -> PathBuf {
        self.dir.join(format!(
            "{}{}{}",
            env::consts::DLL_PREFIX,
            self.name,
            env::consts::DLL_SUFFIX
        ))
    }
}

/// Discovery over an ordered list of search roots; the first hit wins.
#[derive(Debug, Clone, Default)]
pub struct SearchPathDiscovery {
    roots: Vec<PathBuf>,
}

impl SearchPathDiscovery {
    pub fn new(roots: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            roots: roots.into_iter().collect(),
        }
    }

    /// Roots from [`DRIVER_PATH_ENV`], then the active virtualenv's site-packages.
    pub fn from_env() -> Self {
        let mut roots: Vec<PathBuf> = env::var_os(DRIVER_PATH_ENV)
            .map(|paths| env::split_paths(&paths).collect())
            .unwrap_or_default();
        if let Some(venv) = env::var_os("VIRTUAL_ENV") {
            roots.extend(site_packages(Path::new(&venv)));
        }
        debug!(roots = ?roots, "Driver search roots");
        Self { roots }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

impl DriverDiscovery for SearchPathDiscovery {
    fn find_package(&self, package: &str) -> Option<Box<dyn DriverPackage>> {
        self.roots
            .iter()
            .map(|root| root.join(package))
            .find(|dir| dir.is_dir())
            .map(|dir| Box::new(InstalledPackage::new(package, dir)) as Box<dyn DriverPackage>)
    }

    fn find_extension(&self, module: &str) -> Option<PathBuf> {
        self.roots
            .iter()
            .find_map(|root| find_extension_in(root, module))
    }
}

/// Match `<module>.so` or `<module>.<platform tag>.so` (and the other suffixes).
fn find_extension_in(root: &Path, module: &str) -> Option<PathBuf> {
    let entries = fs::read_dir(root).ok()?;
    let mut hits: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_extension_of(path, module))
        .collect();
    hits.sort();
    hits.into_iter().next()
}

fn is_extension_of(path: &Path, module: &str) -> bool {
    let Some(name) = path.file_name().and_then(OsStr::to_str) else {
        return false;
    };
    let Some(rest) = name.strip_prefix(module).and_then(|r| r.strip_prefix('.')) else {
        return false;
    };
    let suffix = rest.rsplit('.').next().unwrap_or(rest);
    EXTENSION_SUFFIXES.contains(&suffix)
}

/// `lib/python3.*/site-packages` on Unix, `Lib/site-packages` on Windows.
fn site_packages(venv: &Path) -> Vec<PathBuf> {
    let windows = venv.join("Lib").join("site-packages");
    if windows.is_dir() {
        return vec![windows];
    }
    let Ok(entries) = fs::read_dir(venv.join("lib")) else {
        return Vec::new();
    };
    let mut found: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().starts_with("python"))
        .map(|e| e.path().join("site-packages"))
        .filter(|p| p.is_dir())
        .collect();
    found.sort();
    found
}
