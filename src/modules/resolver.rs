//! Module name resolution.
//!
//! # Responsibilities
//! - Hold the factory registry mapping module names to constructors
//! - Resolve a declared module name through the fixed candidate order
//! - Run the `on_begin` lifecycle hook exactly once per instance
//!
//! # Design Decisions
//! - Resolution is an explicit registry lookup, populated at startup;
//!   unknown names yield a "module not registered" warning, never a
//!   speculative load
//! - Candidate order: namespaced name, bare name, then the
//!   `formalModuleName` override when the init document supplies one
//! - Resolution failure is non-fatal: the sector keeps an empty slot

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use tracing::warn;

use crate::modules::{ModuleContext, ModuleInit, ModuleInstance, SectorModule};
use crate::registry::Sector;

/// Prefix for the namespaced form of a module name, tried first.
pub const MODULE_NAMESPACE: &str = "sector-gateway-";

/// Constructor for a module, given its context.
pub type ModuleFactory = Arc<dyn Fn(ModuleContext) -> Box<dyn SectorModule> + Send + Sync>;

/// Registry of module factories, keyed by the names resolution tries.
///
/// A factory may be registered under its namespaced name
/// (`sector-gateway-<name>`), its bare name, or a vendor-specific name
/// that sectors reach through `formalModuleName`.
#[derive(Default)]
pub struct ModuleRegistry {
    factories: HashMap<String, ModuleFactory>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under the given name. Re-registering a name
    /// replaces the previous factory.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(ModuleContext) -> Box<dyn SectorModule> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    fn get(&self, name: &str) -> Option<&ModuleFactory> {
        self.factories.get(name)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

/// Resolves declared module names into installed instances.
pub struct ModuleResolver {
    registry: ModuleRegistry,
}

impl ModuleResolver {
    pub fn new(registry: ModuleRegistry) -> Self {
        Self { registry }
    }

    /// Resolve one declared module for a sector.
    ///
    /// Tries each candidate name in the fixed order and instantiates the
    /// first with a registered factory; `on_begin` runs once before the
    /// instance is returned, and its errors are logged, not propagated.
    /// Returns `None` when no candidate is registered; the caller keeps
    /// the slot empty and the sector continues without the module.
    pub fn resolve(&self, init: ModuleInit, sector: Weak<Sector>) -> Option<Arc<ModuleInstance>> {
        let mut candidates = vec![
            format!("{MODULE_NAMESPACE}{}", init.name),
            init.name.clone(),
        ];
        if let Some(formal) = init.formal_module_name() {
            candidates.push(formal.to_string());
        }

        for candidate in &candidates {
            let Some(factory) = self.registry.get(candidate) else {
                continue;
            };

            let name = init.name.clone();
            let context = ModuleContext::new(init, sector);
            let mut handler = factory(context);

            if let Err(error) = handler.on_begin() {
                warn!(module = %name, candidate = %candidate, %error, "module on_begin failed");
            }

            return Some(Arc::new(ModuleInstance::new(name, handler)));
        }

        warn!(
            module = %init.name,
            tried = ?candidates,
            "module not registered; sector continues without it"
        );
        None
    }
}
