//! `buttons` encoder.
//!
//! Layout: an enable mask of `ceil(buttons / 8)` bytes (bit `i` of byte
//! `i / 8` is set when button `i` is not mapped to the disabled action),
//! followed by one action code per button in declaration order.

use crate::error::{Error, Result};
use crate::profile::CommandSpec;
use crate::value::Value;

pub(super) fn encode(command: &str, spec: &CommandSpec, value: &Value) -> Result<Vec<u8>> {
    if spec.buttons.is_empty() || spec.actions.is_empty() {
        return Err(Error::Profile(format!(
            "buttons command '{command}' needs both buttons and actions"
        )));
    }
    let disabled = spec.disabled_action.as_deref();
    if let Some(action) = disabled {
        if !spec.actions.contains_key(action) {
            return Err(Error::Profile(format!(
                "buttons command '{command}': disabled action '{action}' is not a declared action"
            )));
        }
    }
    let fallback = if spec.actions.contains_key("default") {
        "default"
    } else {
        spec.actions
            .keys()
            .next()
            .map(String::as_str)
            .unwrap_or_default()
    };

    let mapping = value.to_buttons(command)?;
    if let Some(unknown) = mapping.keys().find(|b| !spec.buttons.contains(*b)) {
        return Err(Error::invalid(
            format!("{command}.{unknown}"),
            format!("a button among: {}", spec.buttons.join(", ")),
        ));
    }

    let mut mask = vec![0u8; spec.buttons.len().div_ceil(8)];
    let mut codes = Vec::with_capacity(spec.buttons.len());
    for (i, button) in spec.buttons.iter().enumerate() {
        let action = mapping.get(button).map(String::as_str).unwrap_or(fallback);
        let code = spec.actions.get(action).ok_or_else(|| {
            let known: Vec<&str> = spec.actions.keys().map(String::as_str).collect();
            Error::invalid(
                format!("{command}.{button}"),
                format!("an action among: {}", known.join(", ")),
            )
        })?;
        if Some(action) != disabled {
            mask[i / 8] |= 1 << (i % 8);
        }
        codes.push(*code);
    }

    mask.extend(codes);
    Ok(mask)
}

#[cfg(test)]
mod tests {
    use crate::encoders::lookup;
    use crate::error::{Error, Result};
    use crate::profile::{CommandSpec, ValueType};
    use crate::value::Value;
    use std::collections::BTreeMap;

    const ACTIONS: &[(&str, u8)] = &[
        ("default", 0x00),
        ("left", 0x01),
        ("right", 0x02),
        ("middle", 0x03),
        ("disabled", 0xFF),
    ];

    fn spec(buttons: &[&str]) -> CommandSpec {
        CommandSpec::new(ValueType::Buttons)
            .with_command(&[0x31, 0x00])
            .with_buttons(buttons, ACTIONS)
            .with_disabled_action("disabled")
    }

    fn encode(spec: &CommandSpec, value: Value) -> Result<Vec<u8>> {
        let encoder = lookup(&spec.value_type).unwrap();
        encoder.encode("set_buttons", spec, &value)
    }

    #[test]
    fn unmapped_buttons_keep_default_and_are_enabled() {
        let spec = spec(&["button1", "button2", "button3"]);
        let bytes = encode(&spec, Value::Buttons(BTreeMap::new())).unwrap();
        assert_eq!(bytes, vec![0x31, 0x00, 0b0000_0111, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn disabled_button_clears_its_mask_bit() {
        let spec = spec(&["button1", "button2", "button3"]);
        let value = Value::Text("button1=right, button2=disabled".into());
        let bytes = encode(&spec, value).unwrap();
        assert_eq!(bytes, vec![0x31, 0x00, 0b0000_0101, 0x02, 0xFF, 0x00]);
    }

    #[test]
    fn mask_spans_multiple_bytes() {
        let names: Vec<String> = (1..=9).map(|i| format!("button{i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let spec = spec(&refs);
        let bytes = encode(&spec, Value::Text("button9=disabled".into())).unwrap();
        assert_eq!(&bytes[2..4], &[0xFF, 0x00]);
        assert_eq!(bytes.len(), 2 + 2 + 9);
        assert_eq!(bytes[12], 0xFF);
    }

    #[test]
    fn rejects_unknown_button_and_action() {
        let spec = spec(&["button1"]);
        assert!(matches!(
            encode(&spec, Value::Text("button7=left".into())),
            Err(Error::InvalidArgument { ref field, .. }) if field == "set_buttons.button7"
        ));
        match encode(&spec, Value::Text("button1=jump".into())) {
            Err(Error::InvalidArgument { field, expected }) => {
                assert_eq!(field, "set_buttons.button1");
                assert!(expected.contains("middle"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn undeclared_disabled_action_is_profile_error() {
        let spec = CommandSpec::new(ValueType::Buttons)
            .with_buttons(&["button1"], &[("left", 1)])
            .with_disabled_action("off");
        assert!(matches!(
            encode(&spec, Value::Buttons(BTreeMap::new())),
            Err(Error::Profile(_))
        ));
    }
}
