//! Value encoders: turn a command value into the bytes of a SET_REPORT payload.
//!
//! Every [`ValueType`] known to this build has exactly one encoder, listed in
//! [`lookup`]. An encoder only produces the value bytes; [`Encoder::encode`]
//! places them in the report:
//!
//! ```text
//! [ command bytes | zero fill | value bytes | zero padding up to report_length ]
//!                             ^ offset (default: command.len())
//! ```
//!
//! Encoders never clamp or round. A value that does not satisfy the command's
//! constraints is rejected with [`Error::InvalidArgument`]; a command whose
//! constraints are themselves unusable is rejected with [`Error::Profile`].

mod buttons;
mod gradient;

use crate::error::{Error, Result};
use crate::profile::{CommandSpec, ValueType};
use crate::value::Value;
use std::fmt;

type EncodeFn = fn(&str, &CommandSpec, &Value) -> Result<Vec<u8>>;

/// A registered encoder for one value type.
#[derive(Clone, Copy)]
pub struct Encoder {
    value_type: &'static str,
    encode_value: EncodeFn,
}

impl Encoder {
    /// Name of the value type this encoder handles.
    pub fn value_type(&self) -> &'static str {
        self.value_type
    }

    /// Encode `value` for the command `command` described by `spec`.
    pub fn encode(&self, command: &str, spec: &CommandSpec, value: &Value) -> Result<Vec<u8>> {
        let value_bytes = (self.encode_value)(command, spec, value)?;
        layout(command, spec, &value_bytes)
    }
}

impl fmt::Debug for Encoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encoder")
            .field("value_type", &self.value_type)
            .finish()
    }
}

/// Find the encoder registered for `value_type`.
pub fn lookup(value_type: &ValueType) -> Option<Encoder> {
    let (name, encode_value): (&'static str, EncodeFn) = match value_type {
        ValueType::None => ("none", encode_none),
        ValueType::Range => ("range", encode_range),
        ValueType::Choice => ("choice", encode_choice),
        ValueType::RgbColor => ("rgbcolor", encode_rgbcolor),
        ValueType::RgbGradient => ("rgbgradient", gradient::encode),
        ValueType::Buttons => ("buttons", buttons::encode),
        ValueType::Other(_) => return None,
    };
    Some(Encoder {
        value_type: name,
        encode_value,
    })
}

/// Upper bound on the length of one report.
pub const MAX_REPORT_LEN: usize = 4096;

/// Place value bytes into a report according to the command's layout fields.
fn layout(command: &str, spec: &CommandSpec, value_bytes: &[u8]) -> Result<Vec<u8>> {
    let prefix_len = spec.command.len();
    let report_len = spec.report_length.unwrap_or(0);
    if prefix_len > MAX_REPORT_LEN || report_len > MAX_REPORT_LEN {
        return Err(Error::Profile(format!(
            "command '{command}': reports are limited to {MAX_REPORT_LEN} bytes"
        )));
    }

    let offset = spec.offset.unwrap_or(prefix_len);
    if offset < prefix_len && !value_bytes.is_empty() {
        return Err(Error::Profile(format!(
            "command '{command}': offset {offset} overlaps the {prefix_len}-byte prefix"
        )));
    }
    let end = offset.saturating_add(value_bytes.len());
    if end > MAX_REPORT_LEN {
        return Err(Error::Profile(format!(
            "command '{command}': value at offset {offset} ends past {MAX_REPORT_LEN} bytes"
        )));
    }

    let mut report = spec.command.clone();
    if report.len() < end {
        report.resize(end, 0);
    }
    report[offset..end].copy_from_slice(value_bytes);

    if let Some(len) = spec.report_length {
        if report.len() > len {
            return Err(Error::Profile(format!(
                "command '{command}': encoded report is {} bytes, longer than report_length {len}",
                report.len()
            )));
        }
        report.resize(len, 0);
    }

    Ok(report)
}

fn encode_none(command: &str, _spec: &CommandSpec, value: &Value) -> Result<Vec<u8>> {
    match value {
        Value::None => Ok(Vec::new()),
        _ => Err(Error::invalid(command, "no value")),
    }
}

fn encode_range(command: &str, spec: &CommandSpec, value: &Value) -> Result<Vec<u8>> {
    let (min, max) = match (spec.min, spec.max) {
        (Some(min), Some(max)) if min <= max => (min, max),
        _ => {
            return Err(Error::Profile(format!("range command '{command}' needs min <= max")));
        }
    };
    let width = spec.width.unwrap_or(1);
    if !matches!(width, 1 | 2 | 4) {
        return Err(Error::Profile(format!(
            "range command '{command}': width must be 1, 2 or 4 bytes, got {width}"
        )));
    }
    let limit = 1i64 << (8 * u32::from(width));
    if min < 0 || max >= limit {
        return Err(Error::Profile(format!(
            "range command '{command}': {min}..={max} does not fit in {width} byte(s)"
        )));
    }

    let n = value.to_integer(command)?;
    if !(min..=max).contains(&n) {
        return Err(Error::invalid(command, format!("an integer in {min}..={max}")));
    }
    if let Some(step) = spec.step {
        if step <= 0 {
            return Err(Error::Profile(format!("range command '{command}': step must be > 0")));
        }
        if (n - min) % step != 0 {
            return Err(Error::invalid(
                command,
                format!("an integer in {min}..={max} in steps of {step}"),
            ));
        }
    }

    Ok(n.to_le_bytes()[..usize::from(width)].to_vec())
}

fn encode_choice(command: &str, spec: &CommandSpec, value: &Value) -> Result<Vec<u8>> {
    if spec.choices.is_empty() {
        return Err(Error::Profile(format!("choice command '{command}' declares no choices")));
    }
    let label = value.to_label(command)?;
    match spec.choices.get(&label) {
        Some(byte) => Ok(vec![*byte]),
        None => {
            let allowed: Vec<&str> = spec.choices.keys().map(String::as_str).collect();
            Err(Error::invalid(command, format!("one of: {}", allowed.join(", "))))
        }
    }
}

fn encode_rgbcolor(command: &str, _spec: &CommandSpec, value: &Value) -> Result<Vec<u8>> {
    Ok(value.to_color(command)?.to_bytes().to_vec())
}
