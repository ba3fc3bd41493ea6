//! Board-agnostic runtime control plane for the OpenShoe navigation unit
//!
//! This crate contains everything between the sensor interrupt and the host
//! link that does not depend on a specific board:
//!
//! - Table registry for commands, processing steps and reportable states
//! - Output multiplexer (per-state rate dividers)
//! - Process sequence scheduler with one level of save/restore
//! - Protocol engine (command receive state machine, reply and report framing)
//! - Command handlers and the soft-fault register
//! - Cycle orchestrator driven by the sensor-ready trigger
//!
//! Navigation filter math, the IMU bus driver and the serial transport are
//! supplied by the application through [`traits::NavigationFilter`] and the
//! traits in `openshoe-hal`.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod log;

pub mod config;
pub mod control;
pub mod engine;
pub mod output;
pub mod registry;
pub mod runtime;
pub mod sequence;
pub mod state;
pub mod traits;
pub mod trigger;

#[cfg(test)]
mod testing;

pub use config::RuntimeConfig;
pub use control::Controller;
pub use engine::ProtocolEngine;
pub use registry::{Registry, RegistryError};
pub use runtime::Runtime;
pub use trigger::TriggerLine;
