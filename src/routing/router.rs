//! Request routing and module dispatch.
//!
//! # Responsibilities
//! - Match the inbound `Host` header to a vhost (Matching phase)
//! - Run the matched sector's module chain in declaration order until a
//!   module claims the request (Dispatching phase)
//!
//! # Design Decisions
//! - One `Idle → Matching → Dispatching → (Handled | Unhandled)` cycle
//!   per request; no per-request state survives the call
//! - Hooks are awaited one at a time — no two modules ever run
//!   concurrently for the same request, which is what makes
//!   first-handler-wins semantics need no synchronization
//! - No timeout or cancellation here; a hook that never completes leaves
//!   the request pending, and that guard belongs to the serving layer
//! - Hook panics propagate to the serving layer uncaught

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use tracing::{debug, trace};

use crate::modules::{HookOutcome, WsTransport};
use crate::registry::{Registry, Sector};
use crate::routing::matcher::{self, VhostMatcher};

/// Terminal state of one routing cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// A module claimed the request and wrote the response.
    Handled,
    /// No vhost matched, or the chain ran out. The router writes nothing;
    /// the serving layer decides what an unhandled request becomes.
    Unhandled,
}

/// Per-request router over an immutable registry.
///
/// The match table is compiled once from the registry and shared
/// read-only across requests; routing itself is pure table scan plus
/// sequential dispatch.
pub struct RequestRouter {
    registry: Arc<Registry>,
    table: Vec<(VhostMatcher, Arc<Sector>)>,
}

impl RequestRouter {
    pub fn new(registry: Arc<Registry>) -> Self {
        let table = registry
            .iter()
            .flat_map(|sector| {
                sector
                    .vhosts
                    .iter()
                    .map(|vhost| (VhostMatcher::new(vhost), sector.clone()))
            })
            .collect();
        Self { registry, table }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Matching phase: first vhost in registry iteration order whose
    /// binding equals the header wins.
    fn match_host(&self, host_header: &str) -> Option<&Arc<Sector>> {
        self.table
            .iter()
            .find(|(matcher, _)| matcher.matches(host_header))
            .map(|(_, sector)| sector)
    }

    /// Route one HTTP request through its sector's module chain.
    ///
    /// A claiming module has already written `response` when this
    /// returns [`RouteOutcome::Handled`]; on [`RouteOutcome::Unhandled`]
    /// the response is untouched.
    pub async fn route(
        &self,
        request: &Request<Body>,
        response: &mut Response<Body>,
    ) -> RouteOutcome {
        let Some(header) = matcher::host_header(request) else {
            debug!("request without Host header; unhandled");
            return RouteOutcome::Unhandled;
        };
        let Some(sector) = self.match_host(header) else {
            debug!(host = header, "no vhost matched");
            return RouteOutcome::Unhandled;
        };

        for slot in &sector.modules {
            let Some(module) = slot else {
                continue;
            };
            trace!(sector = %sector.name, module = %module.name(), "dispatching");
            if module.on_listen(request, response).await == HookOutcome::Handled {
                return RouteOutcome::Handled;
            }
        }
        RouteOutcome::Unhandled
    }

    /// Route one accepted WebSocket through its sector's module chain.
    ///
    /// The serving layer passes the `Host` header it captured during the
    /// upgrade handshake.
    pub async fn route_ws(
        &self,
        host_header: &str,
        socket: &mut dyn WsTransport,
    ) -> RouteOutcome {
        let Some(sector) = self.match_host(host_header) else {
            debug!(host = host_header, "no vhost matched for websocket");
            return RouteOutcome::Unhandled;
        };

        for slot in &sector.modules {
            let Some(module) = slot else {
                continue;
            };
            if module.on_ws_listen(socket).await == HookOutcome::Handled {
                return RouteOutcome::Handled;
            }
        }
        RouteOutcome::Unhandled
    }
}
