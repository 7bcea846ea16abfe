//! Integration tests: exercise the full flow against a simulated device.
//!
//! Profiles are built or parsed, bound to a simulated transport through the
//! facade, and the bytes that reach the sink are checked against the
//! expected report layout.

#[cfg(test)]
mod tests {
    use crate::device::{self, MouseModel};
    use crate::dispatch::{execute, resolve, EncodedReport};
    use crate::error::Error;
    use crate::mouse::Mouse;
    use crate::profile::{CommandSpec, DeviceIdentity, Profile, ValueType};
    use crate::transport::{
        is_device_plugged, FakeDevice, SimulatedTransport, Transport, TransportConfig,
    };
    use crate::value::{Rgb, Value};

    const ID: DeviceIdentity = DeviceIdentity {
        vendor_id: 0x1038,
        product_id: 0x1702,
        interface_number: 0,
    };

    // Vendor 0xFFFF is reserved and never assigned to real hardware.
    const ABSENT: DeviceIdentity = DeviceIdentity {
        vendor_id: 0xFFFF,
        product_id: 0xFFFE,
        interface_number: 0,
    };

    fn fake(vendor_id: u16, product_id: u16) -> Option<FakeDevice> {
        Some(FakeDevice {
            vendor_id,
            product_id,
        })
    }

    fn color_profile() -> Profile {
        let set_color = CommandSpec::new(ValueType::RgbColor)
            .with_w_value(0x0200)
            .with_offset(4)
            .with_default(Value::Color(Rgb::new(255, 0, 0)));
        Profile::new("Color Only", ID).with_command("set_color", set_color)
    }

    /// Test: default color lands at the declared offset of a single write.
    #[test]
    fn set_default_color_roundtrip() {
        let transport = SimulatedTransport::new(ID, fake(0x1038, 0x1702));
        let mut mouse = Mouse::with_transport(color_profile(), transport).unwrap();

        mouse.set_default().unwrap();

        let writes = mouse.transport().writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(&writes[0].bytes[4..7], &[0xFF, 0x00, 0x00]);
        assert_eq!(writes[0].w_value, 0x0200);
    }

    /// Test: matching fake device opens, mismatching one never does.
    #[test]
    fn lifecycle_depends_on_fake_descriptor() {
        let config = TransportConfig::simulated(fake(0x1038, 0x1702));
        assert!(Mouse::open(color_profile(), &config).is_ok());

        let config = TransportConfig::simulated(fake(0x1038, 0x0001));
        let err = Mouse::open(color_profile(), &config);
        assert!(matches!(
            err,
            Err(Error::DeviceNotFound {
                vendor_id: 0x1038,
                product_id: 0x1702,
            })
        ));
    }

    /// Test: real mode without the device attached fails at construction.
    #[test]
    fn real_mode_without_device_is_not_found() {
        let profile = Profile::new("Absent", ABSENT);
        let result = Mouse::open(profile, &TransportConfig::real());
        assert!(matches!(result, Err(Error::DeviceNotFound { .. })));
    }

    /// Test: simulated mode without a fake descriptor still looks for the real device.
    #[test]
    fn simulated_without_fake_checks_the_bus() {
        let config = TransportConfig::simulated(None);
        assert!(!is_device_plugged(&config, ABSENT.vendor_id, ABSENT.product_id));

        let mut transport = SimulatedTransport::new(ABSENT, None);
        assert!(matches!(
            transport.open(),
            Err(Error::DeviceNotFound {
                vendor_id: 0xFFFF,
                product_id: 0xFFFE,
            })
        ));
        assert!(!transport.is_open());

        let result = Mouse::open(Profile::new("Absent", ABSENT), &config);
        assert!(matches!(result, Err(Error::DeviceNotFound { .. })));
    }

    /// Test: a closed transport rejects writes and tolerates a second close.
    #[test]
    fn teardown_leaves_transport_closed() {
        let mut transport = SimulatedTransport::new(ID, fake(0x1038, 0x1702));
        {
            let mut mouse = Mouse::with_transport(color_profile(), &mut transport).unwrap();
            mouse.run("set_color", &Value::Text("blue".into())).unwrap();
        }

        let report = EncodedReport {
            bytes: vec![0x05, 0x00],
            w_value: 0x0200,
        };
        assert!(matches!(transport.write(&report), Err(Error::DeviceClosed)));
        transport.close().unwrap();
        transport.close().unwrap();
    }

    /// Test: plug check only consults the fake descriptor in simulated mode.
    #[test]
    fn simulated_plug_check() {
        let config = TransportConfig::simulated(fake(0x1038, 0x0002));
        assert!(!is_device_plugged(&config, 0x1038, 0x0001));
        assert!(is_device_plugged(&config, 0x1038, 0x0002));
    }

    /// Test: resolve fails exactly for names absent from the profile.
    #[test]
    fn resolve_fails_iff_name_absent() {
        let profile = MouseModel::Rival100.profile();
        for name in profile.commands.keys() {
            assert!(resolve(&profile, name).is_ok(), "{name}");
        }
        for name in ["set_dpi", "", "SET_COLOR", "save "] {
            assert!(matches!(resolve(&profile, name), Err(Error::UnknownCommand(_))));
        }
    }

    /// Test: every built-in default encodes identically twice.
    #[test]
    fn defaults_encode_deterministically() {
        for model in MouseModel::ALL {
            let profile = model.profile();
            for (name, spec) in &profile.commands {
                let value = spec.default.clone().unwrap_or(Value::None);
                let first = execute(&profile, name, &value).unwrap();
                let second = execute(&profile, name, &value).unwrap();
                assert_eq!(first, second, "{}: {name}", model.key());
            }
        }
    }

    /// Test: full Rival 100 reset through the catalog and a fake device.
    #[test]
    fn rival100_reset_and_save() {
        let rival = fake(device::STEELSERIES_VID, device::pids::RIVAL_100);
        let models = device::discover(&TransportConfig::simulated(rival));
        assert_eq!(models, vec![MouseModel::Rival100]);

        let profile = models[0].profile();
        let transport = SimulatedTransport::new(profile.identity, rival);
        let mut mouse = Mouse::with_transport(profile, transport).unwrap();
        mouse.set_default().unwrap();
        mouse.run("save", &Value::None).unwrap();

        let writes: Vec<Vec<u8>> = mouse
            .transport()
            .writes()
            .iter()
            .map(|r| r.bytes.clone())
            .collect();
        assert_eq!(
            writes,
            vec![
                vec![0x03, 0x01, 0x06],
                vec![0x03, 0x02, 0x02],
                vec![0x04, 0x00, 0x01],
                vec![0x05, 0x00, 0x00, 0xFF, 0xFF],
                vec![0x07, 0x00, 0x01],
                vec![0x0B, 0x00],
                vec![0x09, 0x00],
            ]
        );
    }

    /// Test: a JSON profile drives the facade like a built-in one.
    #[test]
    fn json_profile_with_cli_values() {
        let json = r##"{
            "name": "JSON Mouse",
            "vendor_id": 4152,
            "product_id": 5920,
            "interface_number": 0,
            "commands": {
                "set_dpi": {
                    "value_type": "range",
                    "command": [83, 0, 1],
                    "min": 100, "max": 12000, "step": 100, "width": 2,
                    "report_length": 8
                },
                "set_logo": {
                    "value_type": "rgbgradient",
                    "wValue": 768,
                    "command": [91, 0],
                    "max_stops": 2
                }
            }
        }"##;
        let profile = Profile::from_json(json).unwrap();
        let transport = SimulatedTransport::new(profile.identity, fake(0x1038, 0x1720));
        let mut mouse = Mouse::with_transport(profile, transport).unwrap();

        let logo = Value::from_cli("duration=500; colors=0%: red, 100%: blue");
        mouse.run("set_dpi", &Value::from_cli("1600")).unwrap();
        mouse.run("set_logo", &logo).unwrap();
        assert!(matches!(
            mouse.run("set_dpi", &Value::from_cli("12100")),
            Err(Error::InvalidArgument { .. })
        ));

        let writes = mouse.transport().writes();
        assert_eq!(writes.len(), 2);
        assert_eq!(
            writes[0].bytes,
            vec![0x53, 0x00, 0x01, 0x40, 0x06, 0x00, 0x00, 0x00]
        );

        let mut expected_logo: Vec<u8> = vec![0x5B, 0x00, 0xF4, 0x01, 0x02];
        expected_logo.extend([0xFF, 0x00, 0x00, 0]);
        expected_logo.extend([0x00, 0x00, 0xFF, 100]);
        assert_eq!(writes[1].w_value, 0x0300);
        assert_eq!(writes[1].bytes, expected_logo);
    }
}
