//! Device models and MNA stamps for fetsim.
//!
//! This crate provides:
//! - The JFET model: DC Newton companion stamp, operating-point extraction
//!   and small-signal S-parameters
//! - PN-junction utilities: diode law, voltage limiting, depletion
//!   capacitance and series-resistance splicing
//! - A linear resistor used for device series resistances
//! - Named operating-point storage

pub mod diode;
pub mod error;
pub mod jfet;
pub mod operating_point;
pub mod passive;
pub mod stamp;

pub use error::{Error, Result};
pub use jfet::{ChannelEval, ChannelMode, Jfet, JfetParams, JfetRegion, Terminal};
pub use operating_point::OperatingPoint;
pub use passive::Resistor;
pub use stamp::Stamp;
