//! Application core — the registration/sync protocol, zero I/O.
//!
//! This module contains the protocol rules for the HomeLink client:
//! registration gating, retry pacing, and inbound message routing.
//! All interaction with the broker happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without a live transport.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
