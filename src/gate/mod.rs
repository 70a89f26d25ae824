//! Route gate: the per-request decision made before any page renders.
//!
//! The decision itself ([`RouteGate::decide`]) is a pure function of the
//! request path and the session credential. [`route_gate`] wires it into the
//! router as middleware.

pub use decision::{GateDecision, RouteGate};
pub use middleware::route_gate;
pub use paths::PublicPathSet;

mod decision;
mod middleware;
mod paths;
