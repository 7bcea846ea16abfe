//! Transport abstraction for device communication.
//!
//! A transport owns the lifecycle of one device interface:
//!
//! ```text
//! Closed --open()--> Open --write()--> Open --close()--> Closed
//! ```
//!
//! [`UsbTransport`](crate::usb::UsbTransport) talks to real hardware;
//! [`SimulatedTransport`] records writes in memory. Both are selected through
//! [`TransportConfig`] and used only through the [`Transport`] trait.

use crate::dispatch::EncodedReport;
use crate::error::{Error, Result};
use crate::profile::DeviceIdentity;
use crate::usb::{self, UsbTransport};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, trace, warn};

/// Environment key enabling simulated mode (`1`, `true`, `yes`, `on`).
pub const ENV_DRY_RUN: &str = "MOUSECFG_DRY_RUN";
/// Environment key holding a fake device descriptor, `VVVV:PPPP` in hex.
pub const ENV_FAKE_DEVICE: &str = "MOUSECFG_FAKE_DEVICE";

/// Abstraction over the SET_REPORT channel of one device interface.
pub trait Transport: Send {
    /// Device this transport is bound to.
    fn identity(&self) -> DeviceIdentity;

    /// Acquire the device. Opening an open transport does nothing.
    fn open(&mut self) -> Result<()>;

    /// Send one report. Fails with [`Error::DeviceClosed`] when not open.
    fn write(&mut self, report: &EncodedReport) -> Result<()>;

    /// Release the device. Closing a closed transport does nothing.
    fn close(&mut self) -> Result<()>;

    fn is_open(&self) -> bool;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn identity(&self) -> DeviceIdentity {
        (**self).identity()
    }

    fn open(&mut self) -> Result<()> {
        (**self).open()
    }

    fn write(&mut self, report: &EncodedReport) -> Result<()> {
        (**self).write(report)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn identity(&self) -> DeviceIdentity {
        (**self).identity()
    }

    fn open(&mut self) -> Result<()> {
        (**self).open()
    }

    fn write(&mut self, report: &EncodedReport) -> Result<()> {
        (**self).write(report)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }
}

/// Vendor/product pair standing in for a real device in simulated mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FakeDevice {
    pub vendor_id: u16,
    pub product_id: u16,
}

impl FakeDevice {
    pub fn matches(&self, vendor_id: u16, product_id: u16) -> bool {
        self.vendor_id == vendor_id && self.product_id == product_id
    }
}

impl FromStr for FakeDevice {
    type Err = Error;

    /// Parse `VVVV:PPPP` (hex, optional `0x` prefixes).
    fn from_str(s: &str) -> Result<Self> {
        let expected = "a device id such as 1038:1702";
        let parse = |part: &str| {
            let part = part.trim();
            let digits = part
                .strip_prefix("0x")
                .or_else(|| part.strip_prefix("0X"))
                .unwrap_or(part);
            u16::from_str_radix(digits, 16).map_err(|_| Error::invalid("fake_device", expected))
        };
        let (vid, pid) = s
            .split_once(':')
            .ok_or_else(|| Error::invalid("fake_device", expected))?;
        Ok(Self {
            vendor_id: parse(vid)?,
            product_id: parse(pid)?,
        })
    }
}

impl fmt::Display for FakeDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}:{:04X}", self.vendor_id, self.product_id)
    }
}

/// Which back end a transport uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportMode {
    /// USB control transfers.
    #[default]
    Real,
    /// In-memory sink. With a fake device, presence checks compare against it
    /// instead of the bus.
    Simulated { fake_device: Option<FakeDevice> },
}

/// Transport selection, threaded in by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransportConfig {
    pub mode: TransportMode,
}

impl TransportConfig {
    pub fn real() -> Self {
        Self {
            mode: TransportMode::Real,
        }
    }

    pub fn simulated(fake_device: Option<FakeDevice>) -> Self {
        Self {
            mode: TransportMode::Simulated { fake_device },
        }
    }

    /// Build from the `MOUSECFG_DRY_RUN` / `MOUSECFG_FAKE_DEVICE` keys of the
    /// process environment. Setting a fake device implies simulated mode.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key-value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let dry_run = lookup(ENV_DRY_RUN).is_some_and(|v| is_truthy(&v));
        let fake_device = lookup(ENV_FAKE_DEVICE)
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.parse::<FakeDevice>())
            .transpose()?;

        if dry_run || fake_device.is_some() {
            Ok(Self::simulated(fake_device))
        } else {
            Ok(Self::real())
        }
    }

    pub fn is_simulated(&self) -> bool {
        matches!(self.mode, TransportMode::Simulated { .. })
    }

    /// Create a closed transport for `identity` in this mode.
    pub fn transport(&self, identity: DeviceIdentity) -> Box<dyn Transport> {
        match self.mode {
            TransportMode::Real => Box::new(UsbTransport::new(identity)),
            TransportMode::Simulated { fake_device } => {
                Box::new(SimulatedTransport::new(identity, fake_device))
            }
        }
    }
}

fn is_truthy(value: &str) -> bool {
    let value = value.trim().to_ascii_lowercase();
    matches!(value.as_str(), "1" | "true" | "yes" | "on")
}

/// Whether a device with these ids is attached.
///
/// In simulated mode with a fake device the bus is not queried at all.
pub fn is_device_plugged(config: &TransportConfig, vendor_id: u16, product_id: u16) -> bool {
    match config.mode {
        TransportMode::Simulated {
            fake_device: Some(fake),
        } => fake.matches(vendor_id, product_id),
        _ => usb::find_device(vendor_id, product_id).is_some(),
    }
}

/// Logging hook: every report about to be written.
pub(crate) fn log_report(identity: &DeviceIdentity, report: &EncodedReport) {
    debug!(
        device = %identity,
        w_value = %format!("0x{:04X}", report.w_value),
        report_hex = %format!("{:02X?}", report.bytes),
        "SET_REPORT TX"
    );
}

/// Transport writing into an in-memory sink instead of a device.
#[derive(Debug)]
pub struct SimulatedTransport {
    identity: DeviceIdentity,
    fake_device: Option<FakeDevice>,
    sink: Option<Vec<EncodedReport>>,
}

impl SimulatedTransport {
    pub fn new(identity: DeviceIdentity, fake_device: Option<FakeDevice>) -> Self {
        Self {
            identity,
            fake_device,
            sink: None,
        }
    }

    /// Reports written since the last `open()`. Empty once closed.
    pub fn writes(&self) -> &[EncodedReport] {
        self.sink.as_deref().unwrap_or(&[])
    }
}

impl Transport for SimulatedTransport {
    fn identity(&self) -> DeviceIdentity {
        self.identity
    }

    fn open(&mut self) -> Result<()> {
        if self.sink.is_some() {
            return Ok(());
        }
        let config = TransportConfig::simulated(self.fake_device);
        let DeviceIdentity {
            vendor_id,
            product_id,
            ..
        } = self.identity;
        if !is_device_plugged(&config, vendor_id, product_id) {
            return Err(Error::DeviceNotFound {
                vendor_id,
                product_id,
            });
        }
        info!(device = %self.identity, "Opened simulated device (dry run)");
        self.sink = Some(Vec::new());
        Ok(())
    }

    fn write(&mut self, report: &EncodedReport) -> Result<()> {
        let sink = self.sink.as_mut().ok_or(Error::DeviceClosed)?;
        log_report(&self.identity, report);
        sink.push(report.clone());
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(sink) = self.sink.take() {
            for (i, report) in sink.iter().enumerate() {
                trace!(index = i, %report, "Simulated write");
            }
            debug!(device = %self.identity, writes = sink.len(), "Closed simulated device");
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.sink.is_some()
    }
}

impl Drop for SimulatedTransport {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(error = %e, "Failed to close simulated device");
        }
    }
}
