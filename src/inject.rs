//! Raw frame transmission via AF_PACKET sockets
//!
//! This module defines the transmit-sink contract the frame generators
//! write into, and the Linux raw-socket implementation of it.

use std::io;
use std::mem;
use std::os::unix::io::{AsRawFd, RawFd};
use std::sync::{Arc, Mutex};

use nix::libc::{self, c_int, c_void, sockaddr_ll, AF_PACKET, SOCK_RAW};

use crate::error::{ApparitionError, Result};
use crate::radiotap::RadiotapHeader;

/// Sink that accepts one raw 802.11 frame per call.
///
/// Implementations must accept arbitrary raw link-layer byte buffers
/// without protocol validation, and must not retain the buffer beyond the
/// call. Callers treat failures as non-fatal: a dropped advertisement
/// frame self-heals on the next cycle.
pub trait FrameSink {
    /// Transmit one frame, returning the number of bytes handed to the
    /// driver.
    fn transmit(&mut self, frame: &[u8]) -> Result<usize>;
}

/// Serialize concurrent producers onto one sink.
///
/// The underlying radio accepts one in-flight raw transmission at a time,
/// so two generators sharing a radio go through the same mutex.
impl<S: FrameSink> FrameSink for Arc<Mutex<S>> {
    fn transmit(&mut self, frame: &[u8]) -> Result<usize> {
        let mut sink = self
            .lock()
            .map_err(|_| ApparitionError::System("transmit sink mutex poisoned".into()))?;
        sink.transmit(frame)
    }
}

/// Raw socket for frame injection on a monitor-mode interface
#[derive(Debug)]
pub struct InjectionSocket {
    fd: RawFd,
    #[allow(dead_code)]
    ifindex: i32,
    radiotap: RadiotapHeader,
}

impl InjectionSocket {
    /// Create a new injection socket bound to an interface
    pub fn new(interface: &str) -> Result<Self> {
        if !crate::check_privileges() {
            return Err(ApparitionError::Permission(
                "Root privileges required for raw socket".into(),
            ));
        }

        let ifindex = nix::net::if_::if_nametoindex(interface)? as i32;

        // Create raw packet socket
        let fd = unsafe {
            libc::socket(
                AF_PACKET,
                SOCK_RAW,
                (libc::ETH_P_ALL as u16).to_be() as c_int,
            )
        };

        if fd < 0 {
            return Err(ApparitionError::Socket(format!(
                "Failed to create raw socket: {}",
                io::Error::last_os_error()
            )));
        }

        // Bind to interface
        let mut addr: sockaddr_ll = unsafe { mem::zeroed() };
        addr.sll_family = AF_PACKET as u16;
        addr.sll_ifindex = ifindex;
        addr.sll_protocol = (libc::ETH_P_ALL as u16).to_be();

        let bind_result = unsafe {
            libc::bind(
                fd,
                &addr as *const sockaddr_ll as *const libc::sockaddr,
                mem::size_of::<sockaddr_ll>() as libc::socklen_t,
            )
        };

        if bind_result < 0 {
            unsafe { libc::close(fd) };
            return Err(ApparitionError::Socket(format!(
                "Failed to bind socket to interface: {}",
                io::Error::last_os_error()
            )));
        }

        tracing::debug!("Created injection socket on interface index {}", ifindex);

        Ok(Self {
            fd,
            ifindex,
            radiotap: RadiotapHeader::for_injection(),
        })
    }

    /// Replace the radiotap header prepended to outgoing frames
    pub fn set_radiotap(&mut self, radiotap: RadiotapHeader) {
        self.radiotap = radiotap;
    }

    /// Send raw bytes as-is (caller includes any radiotap header)
    pub fn send_raw(&self, data: &[u8]) -> Result<usize> {
        let sent = unsafe { libc::send(self.fd, data.as_ptr() as *const c_void, data.len(), 0) };

        if sent < 0 {
            return Err(ApparitionError::Injection(format!(
                "Send failed: {}",
                io::Error::last_os_error()
            )));
        }

        Ok(sent as usize)
    }
}

impl FrameSink for InjectionSocket {
    fn transmit(&mut self, frame: &[u8]) -> Result<usize> {
        let mut packet = Vec::with_capacity(self.radiotap.len() + frame.len());
        packet.extend_from_slice(self.radiotap.as_bytes());
        packet.extend_from_slice(frame);

        self.send_raw(&packet)
    }
}

impl Drop for InjectionSocket {
    fn drop(&mut self) {
        unsafe { libc::close(self.fd) };
    }
}

impl AsRawFd for InjectionSocket {
    fn as_raw_fd(&self) -> RawFd {
        self.fd
    }
}

/// Statistics for injection operations
#[derive(Debug, Clone, Default)]
pub struct InjectionStats {
    /// Number of frames attempted
    pub attempted: u64,
    /// Number of frames successfully sent
    pub sent: u64,
    /// Number of frames that failed
    pub failed: u64,
    /// Total bytes sent
    pub bytes: u64,
}

impl InjectionStats {
    /// Success rate as a percentage
    pub fn success_rate(&self) -> f32 {
        if self.attempted == 0 {
            0.0
        } else {
            (self.sent as f32 / self.attempted as f32) * 100.0
        }
    }

    /// Merge stats from another instance
    pub fn merge(&mut self, other: &InjectionStats) {
        self.attempted += other.attempted;
        self.sent += other.sent;
        self.failed += other.failed;
        self.bytes += other.bytes;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::thread;
    use std::time::Duration;

    use crate::beacon::{BeaconConfig, BeaconRotator};
    use crate::deauth::{DeauthConfig, DeauthEmitter};

    struct CaptureSink {
        frames: Vec<Vec<u8>>,
    }

    impl FrameSink for CaptureSink {
        fn transmit(&mut self, frame: &[u8]) -> Result<usize> {
            self.frames.push(frame.to_vec());
            Ok(frame.len())
        }
    }

    #[test]
    fn test_injection_stats() {
        let mut stats = InjectionStats {
            attempted: 100,
            sent: 95,
            failed: 5,
            bytes: 2600,
        };

        assert!((stats.success_rate() - 95.0).abs() < 0.01);

        let other = InjectionStats {
            attempted: 50,
            sent: 50,
            failed: 0,
            bytes: 1300,
        };

        stats.merge(&other);
        assert_eq!(stats.attempted, 150);
        assert_eq!(stats.sent, 145);
    }

    #[test]
    fn test_shared_sink_serializes_producers() {
        // Both generators against one radio: every frame from either loop
        // must land in the shared sink.
        let sink = Arc::new(Mutex::new(CaptureSink { frames: Vec::new() }));
        let stop = Arc::new(AtomicBool::new(false));

        let beacon_handle = {
            let mut sink = Arc::clone(&sink);
            let stop = Arc::clone(&stop);
            let config = BeaconConfig::default().with_interval(Duration::from_millis(1));
            let mut rotator = BeaconRotator::new(config).unwrap();
            thread::spawn(move || rotator.run(&mut sink, &stop))
        };

        let deauth_handle = {
            let mut sink = Arc::clone(&sink);
            let stop = Arc::clone(&stop);
            let config = DeauthConfig::default().with_interval(Duration::from_millis(1));
            let mut emitter = DeauthEmitter::new(config);
            thread::spawn(move || emitter.run(&mut sink, &stop))
        };

        thread::sleep(Duration::from_millis(50));
        stop.store(true, std::sync::atomic::Ordering::Relaxed);

        let beacon_stats = beacon_handle.join().unwrap();
        let deauth_stats = deauth_handle.join().unwrap();

        let captured = sink.lock().unwrap().frames.len() as u64;
        assert_eq!(captured, beacon_stats.sent + deauth_stats.sent);
        assert!(captured > 0);
    }
}
