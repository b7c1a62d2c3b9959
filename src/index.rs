//! Package and type-declaration indexes, built once per run.
//!
//! Package discovery is sorted lexicographically so registration order
//! (which first-match-wins symbol resolution depends on) is the same on
//! every platform.

use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::gosrc::{self, GoFileInfo};
use crate::parser::{Parser, ParserError};

/// One discovered source package: import-style name and filesystem path.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageRecord {
    pub name: String,
    pub path: String,
}

/// One parsed source file, cached per package so nothing is read twice.
#[derive(Debug, Clone)]
pub struct GoSourceFile {
    pub path: PathBuf,
    pub info: GoFileInfo,
}

fn dir_has_go_files(dir: &Path) -> bool {
    fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .any(|e| e.path().extension().map_or(false, |ext| ext == "go"))
        })
        .unwrap_or(false)
}

impl Parser {
    fn register_package(&mut self, name: String, path: String) {
        let index = self.known_pkgs.len();
        self.known_name_pkg.insert(name.clone(), index);
        self.known_path_pkg.insert(path.clone(), index);
        self.known_pkgs.push(PackageRecord { name, path });
    }

    fn walk_packages(&mut self, root: &Path, root_name: &str) {
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0
                    || e.file_name()
                        .to_str()
                        .map(|name| !name.starts_with('.'))
                        .unwrap_or(true)
            });
        for entry in walker.filter_map(|e| e.ok()) {
            if !entry.file_type().is_dir() {
                continue;
            }
            let path = entry.path();
            if !dir_has_go_files(path) {
                continue;
            }
            let relative = path.strip_prefix(root).unwrap_or(path);
            let name = if relative.as_os_str().is_empty() {
                root_name.to_string()
            } else {
                format!("{}/{}", root_name, relative.to_string_lossy()).replace('\\', "/")
            };
            self.register_package(name, path.to_string_lossy().to_string());
        }
    }

    /// Registers every directory of the module tree that holds Go sources.
    pub(crate) fn parse_module(&mut self) -> Result<(), ParserError> {
        let root = self.module_path.clone();
        let root_name = self.module_name.clone();
        self.walk_packages(&root, &root_name);
        Ok(())
    }

    /// Registers every required dependency module (and its subdirectories)
    /// from the Go module cache.
    pub(crate) fn parse_go_mod(&mut self) -> Result<(), ParserError> {
        let go_mod = fs::read_to_string(&self.go_mod_file_path)?;
        for (pkg_name, version) in gosrc::module_requires(&go_mod) {
            let escaped = gosrc::escape_module_path(&pkg_name);
            let pkg_path = self
                .go_mod_cache_path
                .join(format!("{}@{}", escaped, version));
            if !pkg_path.is_dir() {
                debug!(
                    "dependency {} not present in module cache, skipped",
                    pkg_name
                );
                continue;
            }
            self.walk_packages(&pkg_path, &pkg_name);
        }
        if log::log_enabled!(log::Level::Debug) {
            for pkg in &self.known_pkgs {
                debug!("{} -> {}", pkg.name, pkg.path);
            }
        }
        Ok(())
    }

    /// Reads and scans every non-test source file of a package, once.
    pub(crate) fn package_files(
        &mut self,
        pkg_path: &str,
    ) -> Result<Vec<GoSourceFile>, ParserError> {
        if let Some(cached) = self.pkg_file_cache.get(pkg_path) {
            return Ok(cached.clone());
        }
        let dir = Path::new(pkg_path);
        if !dir.is_dir() {
            debug!("package directory {} does not exist", pkg_path);
            self.pkg_file_cache.insert(pkg_path.to_string(), Vec::new());
            return Ok(Vec::new());
        }
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                let name = p.file_name().and_then(|n| n.to_str()).unwrap_or("");
                p.is_file()
                    && !name.starts_with('.')
                    && name.ends_with(".go")
                    && !name.ends_with("_test.go")
            })
            .collect();
        paths.sort();

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let src = fs::read_to_string(&path)?;
            files.push(GoSourceFile {
                path,
                info: gosrc::scan_file(&src),
            });
        }
        self.pkg_file_cache.insert(pkg_path.to_string(), files.clone());
        Ok(files)
    }

    /// Builds the per-package import-alias tables. One alias can map to
    /// several canonical paths across a package's files; all are kept.
    pub(crate) fn parse_import_statements(&mut self) -> Result<(), ParserError> {
        let pkgs: Vec<(String, String)> = self
            .known_pkgs
            .iter()
            .map(|p| (p.name.clone(), p.path.clone()))
            .collect();
        for (pkg_name, pkg_path) in pkgs {
            let files = self.package_files(&pkg_path)?;
            let aliases = self.pkg_imported_aliases.entry(pkg_name).or_default();
            for file in &files {
                for import in &file.info.imports {
                    let paths = aliases.entry(import.alias.clone()).or_default();
                    if !paths.contains(&import.path) {
                        paths.push(import.path.clone());
                    }
                }
            }
        }
        Ok(())
    }

    /// Builds the per-package type-declaration tables, including the
    /// composite-keyed function- and method-local declarations.
    pub(crate) fn parse_type_specs(&mut self) -> Result<(), ParserError> {
        let pkgs: Vec<(String, String)> = self
            .known_pkgs
            .iter()
            .map(|p| (p.name.clone(), p.path.clone()))
            .collect();
        for (pkg_name, pkg_path) in pkgs {
            let files = self.package_files(&pkg_path)?;
            let specs = self.type_specs.entry(pkg_name).or_default();
            for file in &files {
                for decl in &file.info.types {
                    specs.insert(decl.key.clone(), decl.clone());
                }
            }
        }
        Ok(())
    }
}
