//! HomeLink client library.
//!
//! Device-side registration and state-synchronization protocol: keeps the
//! local model of named actuators/sensors consistent with a broker-backed
//! supervisor over an unreliable publish/subscribe transport. Exposes the
//! pure-logic modules for integration testing and host embedding.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod entity;
pub mod link;
pub mod registry;
pub mod topics;
pub mod wire;

pub mod adapters;
pub mod error;
