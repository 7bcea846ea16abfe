//! Supported mouse models and their built-in profiles.

use crate::profile::{CommandSpec, DeviceIdentity, Profile, ValueType};
use crate::transport::{is_device_plugged, TransportConfig};
use crate::value::{ColorStop, Gradient, Rgb, Value};
use tracing::{debug, info};

/// SteelSeries USB Vendor ID.
pub const STEELSERIES_VID: u16 = 0x1038;

/// Known product IDs.
pub mod pids {
    /// Rival 100.
    pub const RIVAL_100: u16 = 0x1702;
    /// Rival 310.
    pub const RIVAL_310: u16 = 0x1720;
}

/// Mouse models with a built-in profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseModel {
    Rival100,
    Rival310,
}

impl MouseModel {
    pub const ALL: &'static [MouseModel] = &[MouseModel::Rival100, MouseModel::Rival310];

    /// Look up a model from its USB ids.
    pub fn from_ids(vendor_id: u16, product_id: u16) -> Option<Self> {
        if vendor_id != STEELSERIES_VID {
            return None;
        }
        match product_id {
            pids::RIVAL_100 => Some(Self::Rival100),
            pids::RIVAL_310 => Some(Self::Rival310),
            _ => None,
        }
    }

    /// Parse a model from a CLI-friendly name (case-insensitive):
    /// "rival100", "rival-100", "Rival 100" all match.
    pub fn from_name(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.key() == key || m.compact_name() == key)
    }

    /// Short identifier used on the command line.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Rival100 => "rival100",
            Self::Rival310 => "rival310",
        }
    }

    fn compact_name(&self) -> String {
        self.name().to_ascii_lowercase().replace(' ', "")
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rival100 => "SteelSeries Rival 100",
            Self::Rival310 => "SteelSeries Rival 310",
        }
    }

    pub fn identity(&self) -> DeviceIdentity {
        let product_id = match self {
            Self::Rival100 => pids::RIVAL_100,
            Self::Rival310 => pids::RIVAL_310,
        };
        DeviceIdentity {
            vendor_id: STEELSERIES_VID,
            product_id,
            interface_number: 0,
        }
    }

    /// Build the model's profile.
    pub fn profile(&self) -> Profile {
        match self {
            Self::Rival100 => rival100(),
            Self::Rival310 => rival310(),
        }
    }
}

impl std::fmt::Display for MouseModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Every supported model that is currently plugged in (or simulated).
pub fn discover(config: &TransportConfig) -> Vec<MouseModel> {
    debug!(simulated = config.is_simulated(), "Looking for supported mice");
    let found: Vec<MouseModel> = MouseModel::ALL
        .iter()
        .copied()
        .filter(|m| {
            let id = m.identity();
            is_device_plugged(config, id.vendor_id, id.product_id)
        })
        .collect();
    for model in &found {
        info!(model = model.name(), device = %model.identity(), "Found supported mouse");
    }
    found
}

const SENSITIVITY_CHOICES: &[(&str, u8)] = &[
    ("250", 0x08),
    ("500", 0x07),
    ("1000", 0x06),
    ("1250", 0x05),
    ("1500", 0x04),
    ("1750", 0x03),
    ("2000", 0x02),
    ("4000", 0x01),
];

const POLLING_RATE_CHOICES: &[(&str, u8)] = &[
    ("125", 0x04),
    ("250", 0x03),
    ("500", 0x02),
    ("1000", 0x01),
];

fn rival100() -> Profile {
    Profile::new(MouseModel::Rival100.name(), MouseModel::Rival100.identity())
        .with_command(
            "set_sensitivity1",
            CommandSpec::new(ValueType::Choice)
                .with_description("Set sensitivity preset 1 (DPI)")
                .with_command(&[0x03, 0x01])
                .with_choices(SENSITIVITY_CHOICES)
                .with_default(Value::Integer(1000)),
        )
        .with_command(
            "set_sensitivity2",
            CommandSpec::new(ValueType::Choice)
                .with_description("Set sensitivity preset 2 (DPI)")
                .with_command(&[0x03, 0x02])
                .with_choices(SENSITIVITY_CHOICES)
                .with_default(Value::Integer(2000)),
        )
        .with_command(
            "set_polling_rate",
            CommandSpec::new(ValueType::Choice)
                .with_description("Set polling rate (Hz)")
                .with_command(&[0x04, 0x00])
                .with_choices(POLLING_RATE_CHOICES)
                .with_default(Value::Integer(1000)),
        )
        .with_command(
            "set_color",
            CommandSpec::new(ValueType::RgbColor)
                .with_description("Set the mouse color")
                .with_command(&[0x05, 0x00])
                .with_default(Value::Color(Rgb::new(0x00, 0xFF, 0xFF))),
        )
        .with_command(
            "set_light_effect",
            CommandSpec::new(ValueType::Choice)
                .with_description("Set the light effect")
                .with_command(&[0x07, 0x00])
                .with_choices(&[
                    ("steady", 0x01),
                    ("breathslow", 0x02),
                    ("breathmed", 0x03),
                    ("breathfast", 0x04),
                ])
                .with_default(Value::Text("steady".into())),
        )
        .with_command(
            "set_btn6_action",
            CommandSpec::new(ValueType::Choice)
                .with_description("Set the action of the button under the wheel")
                .with_command(&[0x0B])
                .with_choices(&[("default", 0x00), ("os", 0x01)])
                .with_default(Value::Text("default".into())),
        )
        .with_command(
            "save",
            CommandSpec::new(ValueType::None)
                .with_description("Save the configuration to the mouse memory")
                .with_command(&[0x09, 0x00]),
        )
}

fn rival310() -> Profile {
    const REPORT_LEN: usize = 32;
    let buttons = [
        "button1", "button2", "button3", "button4", "button5", "button6",
    ];
    let actions = [
        ("default", 0x00),
        ("button1", 0x01),
        ("button2", 0x02),
        ("button3", 0x03),
        ("button4", 0x04),
        ("button5", 0x05),
        ("button6", 0x06),
        ("disabled", 0xFF),
    ];

    let logo = Gradient {
        duration: 1000,
        colors: vec![
            ColorStop::new(0, Rgb::new(0xFF, 0x00, 0x00)),
            ColorStop::new(33, Rgb::new(0x00, 0xFF, 0x00)),
            ColorStop::new(66, Rgb::new(0x00, 0x00, 0xFF)),
        ],
    };

    Profile::new(MouseModel::Rival310.name(), MouseModel::Rival310.identity())
        .with_command(
            "set_sensitivity1",
            CommandSpec::new(ValueType::Range)
                .with_description("Set sensitivity preset 1 (DPI)")
                .with_command(&[0x53, 0x00, 0x01])
                .with_range(100, 12000)
                .with_step(100)
                .with_width(2)
                .with_report_length(REPORT_LEN)
                .with_default(Value::Integer(800)),
        )
        .with_command(
            "set_sensitivity2",
            CommandSpec::new(ValueType::Range)
                .with_description("Set sensitivity preset 2 (DPI)")
                .with_command(&[0x53, 0x00, 0x02])
                .with_range(100, 12000)
                .with_step(100)
                .with_width(2)
                .with_report_length(REPORT_LEN)
                .with_default(Value::Integer(1600)),
        )
        .with_command(
            "set_polling_rate",
            CommandSpec::new(ValueType::Choice)
                .with_description("Set polling rate (Hz)")
                .with_command(&[0x54, 0x00])
                .with_choices(POLLING_RATE_CHOICES)
                .with_report_length(REPORT_LEN)
                .with_default(Value::Integer(1000)),
        )
        .with_command(
            "set_logo_color",
            CommandSpec::new(ValueType::RgbGradient)
                .with_description("Set the logo color gradient")
                .with_command(&[0x5B, 0x00, 0x00])
                .with_offset(4)
                .with_gradient_limits(14, 330, 30000)
                .with_default(Value::Gradient(logo)),
        )
        .with_command(
            "set_buttons_mapping",
            CommandSpec::new(ValueType::Buttons)
                .with_description("Remap or disable buttons")
                .with_command(&[0x31, 0x00])
                .with_buttons(&buttons, &actions)
                .with_disabled_action("disabled")
                .with_report_length(REPORT_LEN)
                .with_default(Value::Buttons(Default::default())),
        )
        .with_command(
            "save",
            CommandSpec::new(ValueType::None)
                .with_description("Save the configuration to the mouse memory")
                .with_command(&[0x59, 0x00])
                .with_report_length(REPORT_LEN),
        )
}
