//! mousecfg-core: profile-driven configuration of USB HID gaming mice.
//!
//! A [`Profile`](profile::Profile) names the commands a mouse understands.
//! The [`Mouse`](mouse::Mouse) facade encodes command values into SET_REPORT
//! payloads and writes them through a [`Transport`](transport::Transport),
//! either a real USB interface or an in-memory simulation.

pub mod device;
pub mod dispatch;
pub mod encoders;
pub mod error;
#[cfg(test)]
mod integration_tests;
pub mod mouse;
pub mod profile;
pub mod transport;
pub mod usb;
pub mod value;

pub use error::{Error, Result};
pub use mouse::Mouse;
pub use profile::{CommandSpec, DeviceIdentity, Profile, ValueType};
pub use transport::{FakeDevice, Transport, TransportConfig, TransportMode};
pub use value::Value;
