//! `rgbgradient` encoder.
//!
//! Layout (little-endian):
//!   - bytes 0..2: cycle duration in ms
//!   - byte 2: number of color stops
//!   - then `max_stops` slots of 4 bytes each: R, G, B, position (percent).
//!     Unused slots are zero so the table length never depends on the value.

use crate::error::{Error, Result};
use crate::profile::CommandSpec;
use crate::value::Value;

/// Largest stop position, in percent.
const MAX_POS: u8 = 100;
const SLOT_LEN: usize = 4;

pub(super) fn encode(command: &str, spec: &CommandSpec, value: &Value) -> Result<Vec<u8>> {
    let max_stops = match spec.max_stops {
        Some(n) if n > 0 => n,
        _ => {
            return Err(Error::Profile(format!(
                "rgbgradient command '{command}' needs max_stops > 0"
            )));
        }
    };
    let duration_min = spec.duration_min.unwrap_or(0);
    let duration_max = spec.duration_max.unwrap_or(u16::MAX);

    let gradient = value.to_gradient(command)?;

    if !(duration_min..=duration_max).contains(&gradient.duration) {
        return Err(Error::invalid(
            format!("{command}.duration"),
            format!("a duration in {duration_min}..={duration_max} ms"),
        ));
    }
    let count = gradient.colors.len();
    if count == 0 || count > usize::from(max_stops) {
        return Err(Error::invalid(
            format!("{command}.colors"),
            format!("1 to {max_stops} color stops"),
        ));
    }

    let mut previous = 0u8;
    for (i, stop) in gradient.colors.iter().enumerate() {
        if stop.pos > MAX_POS || stop.pos < previous {
            return Err(Error::invalid(
                format!("{command}.colors[{i}].pos"),
                format!("a position in {previous}..={MAX_POS} (stops must not go backwards)"),
            ));
        }
        previous = stop.pos;
    }

    let mut bytes = Vec::with_capacity(3 + usize::from(max_stops) * SLOT_LEN);
    bytes.extend_from_slice(&gradient.duration.to_le_bytes());
    bytes.push(count as u8);
    for stop in &gradient.colors {
        bytes.extend_from_slice(&stop.color.to_bytes());
        bytes.push(stop.pos);
    }
    bytes.resize(3 + usize::from(max_stops) * SLOT_LEN, 0);

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use crate::encoders::lookup;
    use crate::error::Error;
    use crate::profile::{CommandSpec, ValueType};
    use crate::value::{ColorStop, Gradient, Rgb, Value};

    fn logo_spec() -> CommandSpec {
        CommandSpec::new(ValueType::RgbGradient)
            .with_command(&[0x5B, 0x00])
            .with_gradient_limits(3, 330, 30000)
    }

    fn encode(value: Value) -> crate::error::Result<Vec<u8>> {
        let spec = logo_spec();
        let encoder = lookup(&spec.value_type).unwrap();
        encoder.encode("set_logo_color", &spec, &value)
    }

    #[test]
    fn encodes_fixed_length_table() {
        let gradient = Gradient {
            duration: 1000,
            colors: vec![
                ColorStop::new(0, Rgb::new(0xFF, 0x00, 0x00)),
                ColorStop::new(50, Rgb::new(0x00, 0xFF, 0x00)),
            ],
        };
        let bytes = encode(Value::Gradient(gradient)).unwrap();

        // command, 1000 ms, two stops, then three RGB+pos slots
        let mut expected: Vec<u8> = vec![0x5B, 0x00, 0xE8, 0x03, 0x02];
        expected.extend([0xFF, 0x00, 0x00, 0]);
        expected.extend([0x00, 0xFF, 0x00, 50]);
        expected.extend([0x00; 4]);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn text_and_struct_forms_agree() {
        let text = "duration=1000; colors=0%: red, 50%: lime";
        let parsed = Gradient::parse("g", text).unwrap();
        assert_eq!(
            encode(Value::Text(text.into())).unwrap(),
            encode(Value::Gradient(parsed)).unwrap()
        );
    }

    #[test]
    fn rejects_duration_outside_limits() {
        match encode(Value::Text("duration=100; colors=0%: red".into())) {
            Err(Error::InvalidArgument { field, expected }) => {
                assert_eq!(field, "set_logo_color.duration");
                assert!(expected.contains("330..=30000"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejects_too_many_or_no_stops() {
        let many = "duration=1000; colors=0%: red, 10%: red, 20%: red, 30%: red";
        assert!(matches!(
            encode(Value::Text(many.into())),
            Err(Error::InvalidArgument { .. })
        ));
        let none = Gradient {
            duration: 1000,
            colors: vec![],
        };
        assert!(matches!(
            encode(Value::Gradient(none)),
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn rejects_backwards_or_out_of_range_positions() {
        let backwards = "duration=1000; colors=50%: red, 10%: blue";
        assert!(matches!(
            encode(Value::Text(backwards.into())),
            Err(Error::InvalidArgument { ref field, .. }) if field == "set_logo_color.colors[1].pos"
        ));
        let past_end = "duration=1000; colors=0%: red, 120%: blue";
        assert!(matches!(
            encode(Value::Text(past_end.into())),
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn missing_max_stops_is_profile_error() {
        let spec = CommandSpec::new(ValueType::RgbGradient);
        let value = Value::Text("duration=1000; colors=0%: red".into());
        let encoder = lookup(&spec.value_type).unwrap();
        assert!(matches!(encoder.encode("g", &spec, &value), Err(Error::Profile(_))));
    }
}
