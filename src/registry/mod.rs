//! Sector registry.
//!
//! # Data Flow
//! ```text
//! InitConfig.sectorPaths (declaration order)
//!     → loader.load_sector (name check)
//!     → VhostConfig::resolve (default ports, URLs, TLS checks)
//!     → loader.load_module_init + resolver.resolve per declared module
//!     → Sector (vhosts + ordered module slots)
//!     → Registry (ordered, host:port overlap rejected)
//! ```
//!
//! # Design Decisions
//! - Built once at startup, immutable at runtime; shared via `Arc`
//!   without locks
//! - Iteration order is `sectorPaths` declaration order, which fixes
//!   host-match precedence
//! - Module resolution failure never aborts a sector build: the slot
//!   stays empty and dispatch skips it

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::loader::{ConfigError, ConfigLoader, ValidationErrors};
use crate::config::schema::{InitConfig, Vhost};
use crate::config::validation;
use crate::modules::{ModuleInstance, ModuleResolver};

/// A configured tenant: its virtual-host bindings and its ordered module
/// dispatch chain.
#[derive(Debug)]
pub struct Sector {
    pub name: String,
    pub root: PathBuf,
    pub enabled: bool,
    pub vhosts: Vec<Vhost>,

    /// Module slots in declaration order. An unresolved module keeps its
    /// `None` slot so positional indices survive; dispatch skips it.
    pub modules: Vec<Option<Arc<ModuleInstance>>>,
}

impl Sector {
    /// Look up a resolved module by declared name.
    pub fn module(&self, name: &str) -> Option<&Arc<ModuleInstance>> {
        self.modules.iter().flatten().find(|m| m.name() == name)
    }

    /// Number of resolved modules (excludes empty slots).
    pub fn resolved_modules(&self) -> usize {
        self.modules.iter().flatten().count()
    }
}

/// The runtime sector tree: every sector, in registry iteration order.
pub struct Registry {
    sectors: Vec<Arc<Sector>>,
    by_name: HashMap<String, usize>,
}

impl Registry {
    /// Build the registry from a validated init document.
    ///
    /// Fails only for configuration errors (missing sector directory or
    /// document, name mismatch, invalid vhost, overlapping host:port
    /// bindings) — never for module-resolution failure.
    pub fn build(
        init: &InitConfig,
        loader: &ConfigLoader,
        resolver: &ModuleResolver,
    ) -> Result<Self, ConfigError> {
        let mut sectors: Vec<Arc<Sector>> = Vec::new();
        let mut by_name = HashMap::new();

        for (name, path) in init.sector_paths.iter() {
            let config = loader.load_sector(path, name)?;

            if config.vhosts.is_empty() {
                debug!(sector = name, "sector has no vhosts; skipping");
                continue;
            }

            let vhosts = config
                .vhosts
                .iter()
                .map(|v| v.resolve())
                .collect::<Result<Vec<_>, _>>()?;

            let mut module_inits = Vec::with_capacity(config.modules.len());
            for module_name in &config.modules {
                module_inits.push(loader.load_module_init(path, module_name)?);
            }

            let sector = Arc::new_cyclic(|weak| {
                let modules = module_inits
                    .into_iter()
                    .map(|module_init| resolver.resolve(module_init, weak.clone()))
                    .collect();
                Sector {
                    name: name.to_string(),
                    root: path.to_path_buf(),
                    enabled: config.enable,
                    vhosts,
                    modules,
                }
            });

            if !sector.enabled {
                warn!(sector = name, "sector registered but disabled");
            }

            by_name.insert(name.to_string(), sectors.len());
            sectors.push(sector);
        }

        let registry = Self { sectors, by_name };
        registry.check_overlap()?;
        Ok(registry)
    }

    fn check_overlap(&self) -> Result<(), ConfigError> {
        let bindings = self.iter().flat_map(|sector| {
            sector
                .vhosts
                .iter()
                .map(|vhost| (sector.name.as_str(), vhost.host_key()))
        });
        let conflicts = validation::check_vhost_overlap(bindings);
        if conflicts.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(ValidationErrors(conflicts)))
        }
    }

    /// Sectors in registry iteration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Sector>> {
        self.sectors.iter()
    }

    /// Look up a sector by name.
    pub fn get(&self, name: &str) -> Option<&Arc<Sector>> {
        self.by_name.get(name).map(|&i| &self.sectors[i])
    }

    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }

    /// Assemble a registry directly from sectors. Test and embedding
    /// escape hatch; production builds go through [`Registry::build`].
    pub fn from_sectors(sectors: Vec<Arc<Sector>>) -> Self {
        let by_name = sectors
            .iter()
            .enumerate()
            .map(|(i, s)| (s.name.clone(), i))
            .collect();
        Self { sectors, by_name }
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("sectors", &self.sectors.len())
            .finish()
    }
}
