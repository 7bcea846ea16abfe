//! Device profiles: identity of a mouse and the commands it understands.

use crate::error::{Error, Result};
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::Path;

/// Default `wValue` of a SET_REPORT request: output report, report ID 0.
pub const DEFAULT_W_VALUE: u16 = 0x0200;

/// USB identity of one device interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub vendor_id: u16,
    pub product_id: u16,
    pub interface_number: u8,
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04X}:{:04X}:{:02X}",
            self.vendor_id, self.product_id, self.interface_number
        )
    }
}

/// Kind of value a command takes, which selects its encoder.
///
/// Names that are not known to this build deserialize into [`ValueType::Other`]
/// and are rejected when the command is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ValueType {
    None,
    Range,
    Choice,
    RgbColor,
    RgbGradient,
    Buttons,
    Other(String),
}

impl ValueType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::None => "none",
            Self::Range => "range",
            Self::Choice => "choice",
            Self::RgbColor => "rgbcolor",
            Self::RgbGradient => "rgbgradient",
            Self::Buttons => "buttons",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for ValueType {
    fn from(name: String) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "none" => Self::None,
            "range" => Self::Range,
            "choice" => Self::Choice,
            "rgbcolor" => Self::RgbColor,
            "rgbgradient" => Self::RgbGradient,
            "buttons" => Self::Buttons,
            _ => Self::Other(name),
        }
    }
}

impl From<ValueType> for String {
    fn from(value_type: ValueType) -> Self {
        value_type.as_str().to_string()
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_w_value() -> u16 {
    DEFAULT_W_VALUE
}

/// A present `"default": null` is a default of no value, not a missing default.
fn deserialize_default<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Declarative description of one command.
///
/// Besides the common layout fields, each value type reads its own
/// constraint fields; the others stay unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub value_type: ValueType,
    #[serde(rename = "wValue", default = "default_w_value")]
    pub w_value: u16,
    /// Bytes at the start of the report, usually the command opcode.
    #[serde(default)]
    pub command: Vec<u8>,
    /// Where the value bytes start. Defaults to right after `command`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    /// Reports are zero-padded to this length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_length: Option<usize>,
    /// Value used by `set_default`. `Some(Value::None)` runs the command without a value.
    #[serde(
        default,
        deserialize_with = "deserialize_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    // range
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u8>,

    // choice
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub choices: IndexMap<String, u8>,

    // rgbgradient
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_stops: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_min: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_max: Option<u16>,

    // buttons
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub actions: IndexMap<String, u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled_action: Option<String>,
}

impl CommandSpec {
    /// A command of the given type with every optional field unset.
    pub fn new(value_type: ValueType) -> Self {
        Self {
            value_type,
            w_value: DEFAULT_W_VALUE,
            command: Vec::new(),
            offset: None,
            report_length: None,
            default: None,
            description: None,
            min: None,
            max: None,
            step: None,
            width: None,
            choices: IndexMap::new(),
            max_stops: None,
            duration_min: None,
            duration_max: None,
            buttons: Vec::new(),
            actions: IndexMap::new(),
            disabled_action: None,
        }
    }

    pub fn with_command(mut self, command: &[u8]) -> Self {
        self.command = command.to_vec();
        self
    }

    pub fn with_w_value(mut self, w_value: u16) -> Self {
        self.w_value = w_value;
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_report_length(mut self, len: usize) -> Self {
        self.report_length = Some(len);
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn with_description(mut self, text: &str) -> Self {
        self.description = Some(text.to_string());
        self
    }

    pub fn with_range(mut self, min: i64, max: i64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn with_step(mut self, step: i64) -> Self {
        self.step = Some(step);
        self
    }

    pub fn with_width(mut self, width: u8) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_choices(mut self, choices: &[(&str, u8)]) -> Self {
        self.choices = choices.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        self
    }

    pub fn with_gradient_limits(
        mut self,
        max_stops: u8,
        duration_min: u16,
        duration_max: u16,
    ) -> Self {
        self.max_stops = Some(max_stops);
        self.duration_min = Some(duration_min);
        self.duration_max = Some(duration_max);
        self
    }

    pub fn with_buttons(mut self, buttons: &[&str], actions: &[(&str, u8)]) -> Self {
        self.buttons = buttons.iter().map(|b| b.to_string()).collect();
        self.actions = actions.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        self
    }

    pub fn with_disabled_action(mut self, action: &str) -> Self {
        self.disabled_action = Some(action.to_string());
        self
    }
}

/// A mouse model and its command set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Display name.
    pub name: String,
    #[serde(flatten)]
    pub identity: DeviceIdentity,
    /// Commands in declaration order.
    pub commands: IndexMap<String, CommandSpec>,
}

impl Profile {
    pub fn new(name: &str, identity: DeviceIdentity) -> Self {
        Self {
            name: name.to_string(),
            identity,
            commands: IndexMap::new(),
        }
    }

    pub fn with_command(mut self, name: &str, spec: CommandSpec) -> Self {
        self.commands.insert(name.to_string(), spec);
        self
    }

    /// Parse a profile from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Profile(e.to_string()))
    }

    /// Load a profile from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Profile(format!("read {}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Profile(e.to_string()))
    }
}
