//! # apparition
//!
//! Synthesizes raw IEEE 802.11 management frames and transmits them on a
//! fixed cadence from a monitor-mode interface, without joining any
//! network. Two generators are provided:
//!
//! - A beacon rotator that advertises a fleet of virtual access points,
//!   cycling the SSID suffix, the last BSSID octet, and a per-AP 12-bit
//!   sequence counter on every emission.
//! - A deauthentication emitter that repeats one frame with a spoofed
//!   sender/BSSID address.
//!
//! Both write into a [`FrameSink`]; the bundled [`InjectionSocket`] backs
//! the sink with an `AF_PACKET` raw socket and a radiotap header. The
//! interface must be in monitor mode and the driver must accept
//! unvalidated raw frames — the sink performs no protocol checks.
//!
//! ## Example
//!
//! ```no_run
//! use apparition::{BeaconConfig, BeaconRotator, InjectionSocket};
//! use std::sync::atomic::AtomicBool;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut sink = InjectionSocket::new("wlan1")?;
//!
//! let config = BeaconConfig::default()
//!     .with_base_ssid("FreeWiFi")
//!     .with_ap_count(10);
//! let mut rotator = BeaconRotator::new(config)?;
//!
//! let stop = AtomicBool::new(false);
//! rotator.run(&mut sink, &stop);
//! # Ok(())
//! # }
//! ```

#![cfg(target_os = "linux")]
#![warn(missing_docs)]
#![warn(clippy::all)]

// Module declarations
pub mod beacon;
pub mod deauth;
pub mod error;
pub mod frames;
pub mod inject;
pub mod radiotap;

// Re-exports for convenience
pub use beacon::{BeaconConfig, BeaconRotator};
pub use deauth::{DeauthConfig, DeauthEmitter};
pub use error::{ApparitionError, Result};
pub use frames::MacAddress;
pub use inject::{FrameSink, InjectionSocket, InjectionStats};
pub use radiotap::RadiotapHeader;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Check if running with sufficient privileges for raw socket operations
pub fn check_privileges() -> bool {
    // Root or CAP_NET_RAW; the effective uid check covers the common case
    unsafe { libc::geteuid() == 0 }
}

/// Check if an interface exists and is wireless
pub fn is_wireless_interface(name: &str) -> bool {
    let path = format!("/sys/class/net/{}/wireless", name);
    std::path::Path::new(&path).exists()
}

/// List all wireless interfaces on the system
pub fn list_wireless_interfaces() -> Result<Vec<String>> {
    let mut interfaces = Vec::new();

    let net_dir = std::fs::read_dir("/sys/class/net")?;

    for entry in net_dir.flatten() {
        let name = entry.file_name().to_string_lossy().to_string();
        if is_wireless_interface(&name) {
            interfaces.push(name);
        }
    }

    Ok(interfaces)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_interfaces() {
        // This will work on any Linux system
        let result = list_wireless_interfaces();
        assert!(result.is_ok());
    }

    #[test]
    fn test_privilege_check() {
        // Just ensure it doesn't panic
        let _ = check_privileges();
    }
}
