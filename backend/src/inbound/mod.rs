//! Inbound adapters translating external requests into driving-port calls.
//!
//! HTTP handlers live under [`http`]; framework types stay at this edge.

pub mod http;
