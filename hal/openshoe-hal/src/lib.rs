//! OpenShoe Hardware Abstraction Layer
//!
//! The runtime core never touches registers. Everything it needs from the
//! board is expressed here as a small set of traits that a board crate
//! implements on top of its USB CDC or UART driver and its IMU bus driver.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  openshoe-core (cycle, tables, engine)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  openshoe-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  serial link  │       │   IMU burst   │
//! │ (USB / UART)  │       │   read (SPI)  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`link::SerialLink`] - polled, non-blocking byte transport
//! - [`imu::InertialSensor`] - one burst read per cycle, filter tap setting

#![no_std]
#![deny(unsafe_code)]

pub mod imu;
pub mod link;

pub use imu::{ImuReadings, InertialSensor, MAX_LOG2_FILTER_TAPS};
pub use link::SerialLink;
