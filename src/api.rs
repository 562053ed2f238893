//! Clean library API for modbound.
//!
//! This module provides a programmatic interface for using modbound as a Rust library.
//! Unlike the CLI commands which print output and return exit codes, these functions
//! return proper Result types that can be handled by calling code.
//!
//! # Example
//!
//! ```no_run
//! use modbound::{verify, VerifyOptions};
//! use std::path::Path;
//!
//! let result = verify(Path::new("build/classes.json"), VerifyOptions::default())?;
//! println!("Found {} modules", result.modules.len());
//! for violation in &result.violations {
//!     println!("Violation: {}", violation);
//! }
//! # Ok::<(), modbound::ModboundError>(())
//! ```

use crate::analysis;
use crate::config::{Config, ConfigError};
use crate::fs::{FileSystem, default_fs};
use crate::model::{AnalysisResult, ClassGraph, ClassGraphError, ModuleError};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during modbound operations.
#[derive(Debug, Error)]
pub enum ModboundError {
    /// The specified path could not be found.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Neither the options nor the configuration name a base package.
    #[error("No base package given; pass one or set base_package in .modbound.toml")]
    MissingBasePackage,

    /// Configuration file error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Class metadata could not be loaded.
    #[error("Class metadata error: {0}")]
    Classes(#[from] ClassGraphError),

    /// Modules could not be built from the class metadata.
    #[error("Module error: {0}")]
    Module(#[from] ModuleError),

    /// IO error while reading input.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Options for the `verify` function.
#[derive(Debug, Clone, Default)]
pub struct VerifyOptions {
    /// Base package of the modules. Falls back to the configured one.
    pub base_package: Option<String>,

    /// Directory holding `.modbound.toml`. Defaults to the metadata file's directory.
    pub config_dir: Option<PathBuf>,
}

/// Verify the module structure described by a class metadata file.
///
/// Loads `.modbound.toml`, reads the JSON class metadata, discovers one module
/// per direct sub-package of the base package, and applies the enabled rules.
///
/// # Arguments
///
/// * `classes_path` - JSON file holding an array of class descriptors.
/// * `options` - Base package and config location overrides.
///
/// # Returns
///
/// An `AnalysisResult` with module summaries, the dependency graph and the
/// violations. Violations are data: a non-compliant codebase still returns `Ok`.
///
/// # Example
///
/// ```no_run
/// use modbound::{verify, VerifyOptions};
/// use std::path::Path;
///
/// let result = verify(
///     Path::new("build/classes.json"),
///     VerifyOptions {
///         base_package: Some("com.acme".to_string()),
///         ..Default::default()
///     },
/// )?;
/// assert!(result.violations.is_empty());
/// # Ok::<(), modbound::ModboundError>(())
/// ```
pub fn verify(classes_path: &Path, options: VerifyOptions) -> Result<AnalysisResult, ModboundError> {
    verify_with_fs(classes_path, options, default_fs())
}

pub fn verify_with_fs(
    classes_path: &Path,
    options: VerifyOptions,
    fs: &dyn FileSystem,
) -> Result<AnalysisResult, ModboundError> {
    if !fs.exists(classes_path) {
        return Err(ModboundError::PathNotFound(classes_path.to_path_buf()));
    }

    let config_dir = options
        .config_dir
        .clone()
        .or_else(|| classes_path.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));
    let config = Config::load_with_fs(&config_dir, fs)?;

    let classes = load_classes_with_fs(classes_path, fs)?;

    let base_package = options
        .base_package
        .or_else(|| config.base_package.clone())
        .ok_or(ModboundError::MissingBasePackage)?;

    let project_name = classes_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("project");

    Ok(analysis::analyze(
        project_name,
        &classes,
        &base_package,
        &config,
    )?)
}

/// Read a JSON class metadata file into a class graph.
pub fn load_classes(path: &Path) -> Result<ClassGraph, ModboundError> {
    load_classes_with_fs(path, default_fs())
}

pub fn load_classes_with_fs(path: &Path, fs: &dyn FileSystem) -> Result<ClassGraph, ModboundError> {
    let content = fs.read_to_string(path)?;
    let classes = ClassGraph::from_json(&content)?;
    tracing::debug!(path = %path.display(), classes = classes.len(), "loaded class metadata");
    Ok(classes)
}
