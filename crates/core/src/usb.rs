//! Real USB transport: SET_REPORT control transfers through `nusb`.
//!
//! Wire contract of every write:
//!   - bmRequestType = 0x21 (host-to-device, class, interface)
//!   - bRequest      = 0x09 (SET_REPORT)
//!   - wValue        = per-command report selector
//!   - wIndex        = interface number
//!   - data          = encoded report

use crate::dispatch::EncodedReport;
use crate::error::{Error, Result};
use crate::profile::DeviceIdentity;
use crate::transport::{log_report, Transport};
use nusb::transfer::{Control, ControlType, Recipient};
use std::io;
use std::time::Duration;
use tracing::{debug, info, warn};

/// HID class request SET_REPORT.
pub const SET_REPORT: u8 = 0x09;

/// Upper bound for one control transfer. nusb requires a timeout; the protocol
/// itself defines none.
const CONTROL_TIMEOUT: Duration = Duration::from_secs(5);

/// Find an attached device by ids.
///
/// An enumeration failure is logged and reported as "not attached".
pub fn find_device(vendor_id: u16, product_id: u16) -> Option<nusb::DeviceInfo> {
    match nusb::list_devices() {
        Ok(mut devices) => {
            devices.find(|d| d.vendor_id() == vendor_id && d.product_id() == product_id)
        }
        Err(e) => {
            warn!(error = %e, "USB enumeration failed");
            None
        }
    }
}

/// An opened, claimed interface.
struct UsbHandle {
    device: nusb::Device,
    interface: nusb::Interface,
    /// Set only when this session detached a kernel driver from the interface.
    detached_driver: bool,
}

/// Transport issuing control transfers to a physical device.
pub struct UsbTransport {
    identity: DeviceIdentity,
    handle: Option<UsbHandle>,
}

impl UsbTransport {
    pub fn new(identity: DeviceIdentity) -> Self {
        Self {
            identity,
            handle: None,
        }
    }

    /// Whether `open()` detached a kernel driver that `close()` will reattach.
    pub fn detached_driver(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| h.detached_driver)
    }
}

impl Transport for UsbTransport {
    fn identity(&self) -> DeviceIdentity {
        self.identity
    }

    fn open(&mut self) -> Result<()> {
        if self.handle.is_some() {
            return Ok(());
        }
        let DeviceIdentity {
            vendor_id,
            product_id,
            interface_number,
        } = self.identity;

        let info = find_device(vendor_id, product_id).ok_or(Error::DeviceNotFound {
            vendor_id,
            product_id,
        })?;
        debug!(
            device = %self.identity,
            bus = info.bus_number(),
            address = info.device_address(),
            "Found USB device"
        );

        let device = info
            .open()
            .map_err(|e| Error::Transport(format!("open {}: {e}", self.identity)))?;

        let detached_driver = detach_kernel_driver(&device, interface_number);

        let interface = match device.claim_interface(interface_number) {
            Ok(interface) => interface,
            Err(e) => {
                if detached_driver {
                    reattach_kernel_driver(&device, interface_number);
                }
                return Err(claim_error(&self.identity, e));
            }
        };

        info!(device = %self.identity, detached_driver, "Claimed USB interface");
        self.handle = Some(UsbHandle {
            device,
            interface,
            detached_driver,
        });
        Ok(())
    }

    fn write(&mut self, report: &EncodedReport) -> Result<()> {
        let handle = self.handle.as_ref().ok_or(Error::DeviceClosed)?;
        log_report(&self.identity, report);

        let control = Control {
            control_type: ControlType::Class,
            recipient: Recipient::Interface,
            request: SET_REPORT,
            value: report.w_value,
            index: u16::from(self.identity.interface_number),
        };
        let written = handle
            .interface
            .control_out_blocking(control, &report.bytes, CONTROL_TIMEOUT)
            .map_err(|e| Error::Transport(format!("SET_REPORT to {}: {e}", self.identity)))?;

        if written != report.bytes.len() {
            return Err(Error::Transport(format!(
                "SET_REPORT to {}: short write ({written} of {} bytes)",
                self.identity,
                report.bytes.len()
            )));
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let Some(UsbHandle {
            device,
            interface,
            detached_driver,
        }) = self.handle.take()
        else {
            return Ok(());
        };

        // Dropping the interface releases the claim; the driver can only be
        // reattached afterwards.
        drop(interface);
        if detached_driver {
            reattach_kernel_driver(&device, self.identity.interface_number);
        }
        debug!(device = %self.identity, "Released USB interface");
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for UsbTransport {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(device = %self.identity, error = %e, "Failed to release USB interface");
        }
    }
}

fn claim_error(identity: &DeviceIdentity, e: io::Error) -> Error {
    if e.kind() == io::ErrorKind::ResourceBusy {
        Error::DeviceBusy(format!(
            "interface {} of {identity} is claimed by another process",
            identity.interface_number
        ))
    } else {
        Error::Transport(format!(
            "claim interface {} of {identity}: {e}",
            identity.interface_number
        ))
    }
}

#[cfg(target_os = "linux")]
fn detach_kernel_driver(device: &nusb::Device, interface: u8) -> bool {
    match device.detach_kernel_driver(interface) {
        Ok(()) => {
            debug!(interface, "Detached kernel driver");
            true
        }
        Err(e) => {
            debug!(interface, error = %e, "No kernel driver detached");
            false
        }
    }
}

#[cfg(not(target_os = "linux"))]
fn detach_kernel_driver(_device: &nusb::Device, _interface: u8) -> bool {
    false
}

#[cfg(target_os = "linux")]
fn reattach_kernel_driver(device: &nusb::Device, interface: u8) {
    match device.attach_kernel_driver(interface) {
        Ok(()) => debug!(interface, "Reattached kernel driver"),
        Err(e) => warn!(interface, error = %e, "Failed to reattach kernel driver"),
    }
}

#[cfg(not(target_os = "linux"))]
fn reattach_kernel_driver(_device: &nusb::Device, _interface: u8) {}

#[cfg(test)]
mod tests {
    use super::*;

    // Vendor 0xFFFF is reserved and never assigned to real hardware.
    const ABSENT: DeviceIdentity = DeviceIdentity {
        vendor_id: 0xFFFF,
        product_id: 0xFFFE,
        interface_number: 0,
    };

    #[test]
    fn open_absent_device_is_not_found() {
        let mut t = UsbTransport::new(ABSENT);
        assert!(matches!(
            t.open(),
            Err(Error::DeviceNotFound {
                vendor_id: 0xFFFF,
                product_id: 0xFFFE,
            })
        ));
        assert!(!t.is_open());
        assert!(!t.detached_driver());
    }

    #[test]
    fn closed_usb_transport_rejects_writes_and_closes_twice() {
        let mut t = UsbTransport::new(ABSENT);
        let report = EncodedReport {
            bytes: vec![0x01],
            w_value: 0x0200,
        };
        assert!(matches!(t.write(&report), Err(Error::DeviceClosed)));
        t.close().unwrap();
        t.close().unwrap();
    }

    #[test]
    fn busy_claim_maps_to_device_busy() {
        let busy = io::Error::from(io::ErrorKind::ResourceBusy);
        assert!(matches!(claim_error(&ABSENT, busy), Error::DeviceBusy(_)));
        let denied = io::Error::from(io::ErrorKind::PermissionDenied);
        assert!(matches!(claim_error(&ABSENT, denied), Error::Transport(_)));
    }
}
