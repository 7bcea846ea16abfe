//! Mouse facade: one profile bound to one open transport.

use crate::dispatch::CommandTable;
use crate::error::Result;
use crate::profile::Profile;
use crate::transport::{Transport, TransportConfig};
use crate::value::Value;
use std::fmt;
use tracing::{debug, info, warn};

/// A configured mouse.
///
/// The transport is opened on construction and closed exactly once, either
/// by [`Mouse::close`] or when the mouse is dropped.
pub struct Mouse<T: Transport = Box<dyn Transport>> {
    profile: Profile,
    table: CommandTable,
    transport: T,
}

impl Mouse {
    /// Open the device described by `profile` with the back end chosen by `config`.
    pub fn open(profile: Profile, config: &TransportConfig) -> Result<Self> {
        let transport = config.transport(profile.identity);
        Self::with_transport(profile, transport)
    }
}

impl<T: Transport> Mouse<T> {
    /// Bind `profile` to `transport` and open it.
    ///
    /// Fails without opening anything if a command has no encoder.
    pub fn with_transport(profile: Profile, mut transport: T) -> Result<Self> {
        let table = CommandTable::build(&profile)?;
        transport.open()?;
        info!(
            profile = %profile.name,
            device = %profile.identity,
            commands = table.len(),
            "Mouse ready"
        );
        Ok(Self {
            profile,
            table,
            transport,
        })
    }

    /// Encode `value` for `command` and write it to the device.
    pub fn run(&mut self, command: &str, value: &Value) -> Result<()> {
        let report = self.table.encode(&self.profile, command, value)?;
        debug!(command, %value, "Running command");
        self.transport.write(&report)
    }

    /// Run every command that declares a default, in declaration order.
    pub fn set_default(&mut self) -> Result<()> {
        let defaults: Vec<(String, Value)> = self
            .profile
            .commands
            .iter()
            .filter_map(|(name, spec)| spec.default.clone().map(|v| (name.clone(), v)))
            .collect();
        for (name, value) in &defaults {
            self.run(name, value)?;
        }
        Ok(())
    }

    /// Command names in declaration order.
    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.table.names()
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Release the device. Later calls do nothing.
    pub fn close(&mut self) -> Result<()> {
        if self.transport.is_open() {
            self.transport.close()?;
            debug!(device = %self.profile.identity, "Mouse closed");
        }
        Ok(())
    }
}

impl<T: Transport> Drop for Mouse<T> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(device = %self.profile.identity, error = %e, "Failed to close mouse");
        }
    }
}

impl<T: Transport> fmt::Display for Mouse<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let profile = &self.profile;
        write!(f, "<Mouse {} ({})>", profile.name, profile.identity)
    }
}

impl<T: Transport> fmt::Debug for Mouse<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mouse")
            .field("profile", &self.profile.name)
            .field("identity", &self.profile.identity)
            .field("open", &self.transport.is_open())
            .finish()
    }
}
