//! Plugin module subsystem.
//!
//! # Responsibilities
//! - Define the boundary contract a sector module implements
//! - Carry per-module context (owning sector, name, init document)
//! - Resolve declared module names into instances (see [`resolver`])
//!
//! # Design Decisions
//! - Modules are trait objects behind `Arc`, constructed once during
//!   registry build and immutable afterwards
//! - Request hooks are async and awaited strictly in sequence; a module
//!   that claims a request returns [`HookOutcome::Handled`] and ends the
//!   chain
//! - The WebSocket hook sees a transport trait, not a socket, so this
//!   crate stays free of network I/O

use std::sync::Weak;

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::ws::Message;
use axum::http::{Request, Response};

use crate::registry::Sector;

pub mod resolver;

pub use resolver::{ModuleRegistry, ModuleResolver, MODULE_NAMESPACE};

/// Errors surfaced by module lifecycle hooks.
pub type ModuleError = Box<dyn std::error::Error + Send + Sync>;

/// Result of a per-request module hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookOutcome {
    /// The module wrote the response; stop the chain.
    Handled,
    /// Pass the request to the next module in declaration order.
    NotHandled,
}

/// Transport a module's WebSocket hook talks to.
///
/// The serving layer adapts its accepted socket to this trait; tests use
/// an in-memory mock.
#[async_trait]
pub trait WsTransport: Send {
    /// Receive the next message, or `None` once the peer is gone.
    async fn recv(&mut self) -> Option<Message>;

    /// Send a message to the peer.
    async fn send(&mut self, message: Message) -> Result<(), ModuleError>;
}

/// Boundary contract for a sector module.
///
/// A module is constructed by a registered factory (see
/// [`resolver::ModuleRegistry`]) which hands it its [`ModuleContext`].
/// `on_begin` runs exactly once, synchronously, before the module is
/// installed in its sector; the request hooks run per request.
#[async_trait]
pub trait SectorModule: Send + Sync {
    /// Lifecycle hook invoked once after construction. Errors are logged
    /// by the resolver and do not abort sector construction.
    fn on_begin(&mut self) -> Result<(), ModuleError> {
        Ok(())
    }

    /// Per-request HTTP hook. The module writes the response itself and
    /// reports whether it claimed the request.
    async fn on_listen(
        &self,
        _request: &Request<Body>,
        _response: &mut Response<Body>,
    ) -> HookOutcome {
        HookOutcome::NotHandled
    }

    /// Per-connection WebSocket hook.
    async fn on_ws_listen(&self, _socket: &mut dyn WsTransport) -> HookOutcome {
        HookOutcome::NotHandled
    }
}

/// Module name plus its opaque per-module init document.
#[derive(Debug, Clone)]
pub struct ModuleInit {
    /// Declared module name.
    pub name: String,

    /// Contents of `module.<name>.yaml`, or null when the file is absent.
    pub doc: serde_yaml::Value,
}

impl ModuleInit {
    pub fn new(name: impl Into<String>, doc: serde_yaml::Value) -> Self {
        Self {
            name: name.into(),
            doc,
        }
    }

    /// Init for a module with no document on disk.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, serde_yaml::Value::Null)
    }

    /// Explicit resolver override declared inside the init document.
    pub fn formal_module_name(&self) -> Option<&str> {
        self.doc.get("formalModuleName").and_then(|v| v.as_str())
    }

    /// Look up a key in the init document.
    pub fn get(&self, key: &str) -> Option<&serde_yaml::Value> {
        self.doc.get(key)
    }
}

/// Context handed to a module factory: the module's identity and a
/// non-owning reference to the sector that declared it.
#[derive(Debug, Clone)]
pub struct ModuleContext {
    init: ModuleInit,
    sector: Weak<Sector>,
}

impl ModuleContext {
    pub(crate) fn new(init: ModuleInit, sector: Weak<Sector>) -> Self {
        Self { init, sector }
    }

    /// Declared module name.
    pub fn name(&self) -> &str {
        &self.init.name
    }

    /// Per-module init document.
    pub fn init(&self) -> &ModuleInit {
        &self.init
    }

    /// The owning sector. `None` only if the sector has been dropped.
    pub fn sector(&self) -> Option<std::sync::Arc<Sector>> {
        self.sector.upgrade()
    }

    /// Look up a sibling module in the owning sector by name.
    ///
    /// Returns `None` for unknown or unresolved names, and always during
    /// `on_begin` — the sector's module list is still being filled at
    /// that point.
    pub fn module(&self, name: &str) -> Option<std::sync::Arc<ModuleInstance>> {
        let sector = self.sector.upgrade()?;
        sector
            .modules
            .iter()
            .flatten()
            .find(|m| m.name() == name)
            .cloned()
    }
}

/// An instantiated module installed in a sector's dispatch chain.
pub struct ModuleInstance {
    name: String,
    handler: Box<dyn SectorModule>,
}

impl ModuleInstance {
    pub fn new(name: impl Into<String>, handler: Box<dyn SectorModule>) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the module's HTTP request hook.
    pub async fn on_listen(
        &self,
        request: &Request<Body>,
        response: &mut Response<Body>,
    ) -> HookOutcome {
        self.handler.on_listen(request, response).await
    }

    /// Invoke the module's WebSocket hook.
    pub async fn on_ws_listen(&self, socket: &mut dyn WsTransport) -> HookOutcome {
        self.handler.on_ws_listen(socket).await
    }
}

impl std::fmt::Debug for ModuleInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleInstance")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_init_override_lookup() {
        let init = ModuleInit::new(
            "auth",
            serde_yaml::from_str("formalModuleName: vendor-auth\nrealm: internal").unwrap(),
        );
        assert_eq!(init.formal_module_name(), Some("vendor-auth"));
        assert_eq!(init.get("realm").and_then(|v| v.as_str()), Some("internal"));
    }

    #[test]
    fn test_empty_module_init() {
        let init = ModuleInit::empty("auth");
        assert_eq!(init.name, "auth");
        assert!(init.formal_module_name().is_none());
        assert!(init.get("anything").is_none());
    }
}
