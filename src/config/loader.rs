//! Configuration loading from disk.
//!
//! # Responsibilities
//! - Locate the init document and per-sector documents under an explicit
//!   root directory (the root is constructor state, never process-global)
//! - Parse YAML into the schema types
//! - Surface structured [`ConfigError`]s for every failure mode
//!
//! # Design Decisions
//! - Fixed file layout mirroring the configuration tree:
//!   `<root>/conf/init.yaml`, `<sector root>/sector.yaml`,
//!   `<sector root>/module.<name>.yaml`
//! - A missing per-module document is not an error; it yields an empty
//!   init document

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::schema::{InitConfig, ProtocolClass, SectorConfig};
use crate::config::validation::{self, ValidationError};
use crate::modules::ModuleInit;

/// Error type for configuration loading and validation.
///
/// Every variant is fatal to startup; the binary catches it once at the
/// top level, logs it, and exits.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("sector \"{0}\" does not exist")]
    SectorMissing(String),

    #[error("sector \"{0}\" has no sector.yaml")]
    SectorDocumentMissing(String),

    #[error("sector \"{key}\" declares name \"{declared}\"")]
    SectorNameMismatch { key: String, declared: String },

    #[error("vhost \"{host}\" is {protocol} but carries no ssl material")]
    MissingSsl { host: String, protocol: ProtocolClass },

    #[error("validation failed: {0}")]
    Validation(ValidationErrors),
}

/// Collected semantic validation failures, reported together.
#[derive(Debug)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

/// Loads configuration documents from a fixed directory layout.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    root: PathBuf,
}

impl ConfigLoader {
    /// Create a loader rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory this loader reads from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the root init document.
    pub fn init_path(&self) -> PathBuf {
        self.root.join("conf").join("init.yaml")
    }

    /// Load and validate the root init document.
    pub fn load_init(&self) -> Result<InitConfig, ConfigError> {
        let init: InitConfig = read_yaml(&self.init_path())?;
        validation::validate_init(&init).map_err(|errs| ConfigError::Validation(ValidationErrors(errs)))?;
        Ok(init)
    }

    /// Load a sector document and check its declared name against the
    /// `sectorPaths` key it was registered under.
    pub fn load_sector(&self, path: &Path, expected_name: &str) -> Result<SectorConfig, ConfigError> {
        if !path.is_dir() {
            return Err(ConfigError::SectorMissing(expected_name.to_string()));
        }

        let document = path.join("sector.yaml");
        if !document.is_file() {
            return Err(ConfigError::SectorDocumentMissing(expected_name.to_string()));
        }

        let config: SectorConfig = read_yaml(&document)?;
        if config.name != expected_name {
            return Err(ConfigError::SectorNameMismatch {
                key: expected_name.to_string(),
                declared: config.name,
            });
        }
        Ok(config)
    }

    /// Load the optional `module.<name>.yaml` document for a module.
    /// Absence is not an error: the module simply gets an empty document.
    pub fn load_module_init(
        &self,
        sector_root: &Path,
        module_name: &str,
    ) -> Result<ModuleInit, ConfigError> {
        let path = sector_root.join(format!("module.{module_name}.yaml"));
        if !path.is_file() {
            return Ok(ModuleInit::empty(module_name));
        }
        let doc: serde_yaml::Value = read_yaml(&path)?;
        Ok(ModuleInit::new(module_name, doc))
    }
}

fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
