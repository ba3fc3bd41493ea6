//! Collaborator traits implemented by the application
//!
//! The serial link and the inertial sensor live in `openshoe-hal`. The
//! navigation filter is defined here because it works on core state types.

pub mod navigation;

pub use navigation::{CalibrationEvent, NavigationFilter};
