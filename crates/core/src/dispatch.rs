//! Command dispatch: map a command name to its encoder and report selector.
//!
//! Dispatch never touches the device. It produces an [`EncodedReport`] that
//! the caller hands to a [`Transport`](crate::transport::Transport).

use crate::encoders::{self, Encoder};
use crate::error::{Error, Result};
use crate::profile::Profile;
use crate::value::Value;
use indexmap::IndexMap;
use std::fmt;

/// Bytes of one SET_REPORT request and the `wValue` it targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedReport {
    pub bytes: Vec<u8>,
    pub w_value: u16,
}

impl fmt::Display for EncodedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wValue=0x{:04X} data={:02X?}", self.w_value, self.bytes)
    }
}

/// Resolve a command name to its encoder and `wValue`.
pub fn resolve(profile: &Profile, command: &str) -> Result<(Encoder, u16)> {
    let spec = profile
        .commands
        .get(command)
        .ok_or_else(|| Error::UnknownCommand(command.to_string()))?;
    let Some(encoder) = encoders::lookup(&spec.value_type) else {
        return Err(Error::UnsupportedValueType {
            command: command.to_string(),
            value_type: spec.value_type.to_string(),
        });
    };
    Ok((encoder, spec.w_value))
}

/// Resolve and encode `command` with `value`.
pub fn execute(profile: &Profile, command: &str, value: &Value) -> Result<EncodedReport> {
    let (encoder, w_value) = resolve(profile, command)?;
    let spec = &profile.commands[command];
    let bytes = encoder.encode(command, spec, value)?;
    Ok(EncodedReport { bytes, w_value })
}

/// A resolved command: encoder plus report selector.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedCommand {
    pub encoder: Encoder,
    pub w_value: u16,
}

/// Every command of a profile, resolved once up front.
///
/// Building the table fails on the first command whose value type has no
/// encoder, so a profile with a defect is caught before the device is opened.
#[derive(Debug, Clone)]
pub struct CommandTable {
    entries: IndexMap<String, ResolvedCommand>,
}

impl CommandTable {
    pub fn build(profile: &Profile) -> Result<Self> {
        let mut entries = IndexMap::with_capacity(profile.commands.len());
        for name in profile.commands.keys() {
            let (encoder, w_value) = resolve(profile, name)?;
            entries.insert(name.clone(), ResolvedCommand { encoder, w_value });
        }
        Ok(Self { entries })
    }

    pub fn get(&self, command: &str) -> Result<ResolvedCommand> {
        self.entries
            .get(command)
            .copied()
            .ok_or_else(|| Error::UnknownCommand(command.to_string()))
    }

    /// Encode `command` using the spec stored in `profile`.
    ///
    /// `profile` must be the profile this table was built from.
    pub fn encode(&self, profile: &Profile, command: &str, value: &Value) -> Result<EncodedReport> {
        let resolved = self.get(command)?;
        let spec = profile
            .commands
            .get(command)
            .ok_or_else(|| Error::UnknownCommand(command.to_string()))?;
        let bytes = resolved.encoder.encode(command, spec, value)?;
        Ok(EncodedReport {
            bytes,
            w_value: resolved.w_value,
        })
    }

    /// Command names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
