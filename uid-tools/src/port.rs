//! Serial bus access
//!
//! Lets the scanner talk to a real bus adapter instead of stdin/stdout.

use std::time::Duration;

use serialport::{available_ports, SerialPortType};
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tracing::{debug, info};

/// A serial port that could carry the bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusPort {
    /// Port name (e.g., /dev/ttyUSB0, COM3)
    pub name: String,
    /// USB vendor and product IDs, if USB
    pub usb_id: Option<(u16, u16)>,
    /// USB product string
    pub product: Option<String>,
}

impl BusPort {
    fn from_serialport(name: String, port_type: &SerialPortType) -> Self {
        match port_type {
            SerialPortType::UsbPort(usb) => Self {
                name,
                usb_id: Some((usb.vid, usb.pid)),
                product: usb.product.clone(),
            },
            _ => Self {
                name,
                usb_id: None,
                product: None,
            },
        }
    }

    /// One-line description for listings
    pub fn describe(&self) -> String {
        match (&self.usb_id, &self.product) {
            (Some((vid, pid)), Some(product)) => {
                format!("{} ({:04x}:{:04x} {})", self.name, vid, pid, product)
            }
            (Some((vid, pid)), None) => format!("{} ({:04x}:{:04x})", self.name, vid, pid),
            _ => self.name.clone(),
        }
    }
}

/// Enumerate serial ports on this machine
pub fn list_ports() -> Result<Vec<BusPort>, serialport::Error> {
    let ports: Vec<_> = available_ports()?
        .into_iter()
        .map(|p| BusPort::from_serialport(p.port_name, &p.port_type))
        .collect();
    info!("Found {} serial port(s)", ports.len());
    Ok(ports)
}

/// Open a serial port for the bus
pub async fn open_port(name: &str, baud_rate: u32) -> Result<SerialStream, tokio_serial::Error> {
    debug!("Opening {} at {} baud", name, baud_rate);
    let stream = tokio_serial::new(name, baud_rate)
        .timeout(Duration::from_millis(100))
        .open_native_async()?;

    // Give the adapter a moment to settle
    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serialport::UsbPortInfo;

    #[test]
    fn test_bus_port_from_usb() {
        let usb = SerialPortType::UsbPort(UsbPortInfo {
            vid: 0x0403,
            pid: 0x6001,
            serial_number: None,
            manufacturer: Some("FTDI".to_string()),
            product: Some("FT232R".to_string()),
        });

        let port = BusPort::from_serialport("/dev/ttyUSB0".to_string(), &usb);
        assert_eq!(port.usb_id, Some((0x0403, 0x6001)));
        assert_eq!(port.describe(), "/dev/ttyUSB0 (0403:6001 FT232R)");
    }

    #[test]
    fn test_bus_port_plain() {
        let port = BusPort::from_serialport("/dev/ttyS0".to_string(), &SerialPortType::Unknown);
        assert_eq!(port.usb_id, None);
        assert_eq!(port.describe(), "/dev/ttyS0");
    }
}
