//! Discovery, authentication, and control of Broadlink-family smart-home
//! devices over their UDP wire protocol.
//!
//! A session starts with [`session::discover`], which broadcasts a probe
//! and yields [`session::DiscoveredDevice`]s as they answer. Turning one
//! into a [`session::DeviceHandle`] and calling [`session::DeviceHandle::auth`]
//! rekeys the connection; from there, a behaviour leaf under [`devices`]
//! matching the handle's [`registry::Profile`] exposes the device's
//! command set.

pub mod checksum;
pub mod codec;
pub mod crypto;
pub mod devices;
pub mod error;
pub mod frame;
pub mod registry;
pub mod session;
pub mod time;
pub mod transport;

pub use error::{BroadlinkError, Result};
pub use registry::{Profile, RegistryEntry};
pub use session::{DeviceHandle, DiscoveredDevice, discover};
