//! Rotating virtual-AP beacon advertisement
//!
//! One radio advertises a fleet of fake access points by cycling through
//! the slots on every emission: each slot gets its own SSID suffix, its
//! own last BSSID octet, and its own 12-bit sequence counter, so from the
//! outside every virtual AP appears to beacon at a regular interval.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::{ApparitionError, Result};
use crate::frames::{self, SEQ_MAX, SSID_MAX_LEN};
use crate::inject::{FrameSink, InjectionStats};

/// Beacon rotation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeaconConfig {
    /// SSID prefix; the slot index is appended in decimal
    pub base_ssid: String,
    /// Number of virtual APs to rotate through
    pub ap_count: usize,
    /// Delay before each emission (one full rotation takes
    /// `interval * ap_count`)
    pub interval: Duration,
}

impl Default for BeaconConfig {
    fn default() -> Self {
        Self {
            base_ssid: "Thingy".to_string(),
            ap_count: 10,
            interval: Duration::from_millis(10),
        }
    }
}

impl BeaconConfig {
    /// Set the SSID prefix
    pub fn with_base_ssid(mut self, base_ssid: impl Into<String>) -> Self {
        self.base_ssid = base_ssid.into();
        self
    }

    /// Set the number of virtual APs
    pub fn with_ap_count(mut self, ap_count: usize) -> Self {
        self.ap_count = ap_count;
        self
    }

    /// Set the per-emission delay
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// SSID advertised for one rotation slot
    pub fn ssid_for(&self, slot: usize) -> String {
        format!("{}{}", self.base_ssid, slot)
    }

    /// Validate the configuration before any loop starts.
    ///
    /// The longest SSID this rotation can produce must fit the one-byte
    /// SSID length field; violating that is a configuration mistake, not
    /// a runtime condition, so it fails here rather than mid-loop.
    pub fn validate(&self) -> Result<()> {
        if self.ap_count == 0 {
            return Err(ApparitionError::config(
                "virtual AP count must be at least 1",
            ));
        }

        let widest = self.base_ssid.len() + decimal_width(self.ap_count - 1);
        if widest > SSID_MAX_LEN {
            return Err(ApparitionError::Config(format!(
                "SSID '{}{}' would be {} bytes; 802.11 allows at most {}",
                self.base_ssid,
                self.ap_count - 1,
                widest,
                SSID_MAX_LEN
            )));
        }

        Ok(())
    }
}

/// Number of decimal digits in `n`
fn decimal_width(n: usize) -> usize {
    let mut width = 1;
    let mut rest = n / 10;
    while rest > 0 {
        width += 1;
        rest /= 10;
    }
    width
}

/// Rotating beacon generator.
///
/// Owns all rotation state: the active slot index and one sequence
/// counter per virtual AP. Nothing else reads or writes it.
pub struct BeaconRotator {
    config: BeaconConfig,
    active_index: usize,
    sequences: Vec<u16>,
}

impl BeaconRotator {
    /// Create a rotator, validating the configuration
    pub fn new(config: BeaconConfig) -> Result<Self> {
        config.validate()?;
        let sequences = vec![0u16; config.ap_count];
        Ok(Self {
            config,
            active_index: 0,
            sequences,
        })
    }

    /// The configuration this rotator was built with
    pub fn config(&self) -> &BeaconConfig {
        &self.config
    }

    /// Slot that the next emission will advertise
    pub fn active_index(&self) -> usize {
        self.active_index
    }

    /// Build the beacon for the active slot without advancing any state
    pub fn next_frame(&self) -> Vec<u8> {
        let ssid = self.config.ssid_for(self.active_index);
        frames::build_beacon(
            &ssid,
            self.active_index as u8,
            self.sequences[self.active_index],
        )
    }

    /// Emit one beacon and advance the rotation.
    ///
    /// The active slot's sequence counter increments (wrapping past 0xFFF
    /// to 0) and the rotation moves to the next slot whether or not the
    /// sink accepted the frame; a dropped beacon self-heals on the slot's
    /// next turn. Returns the bytes handed to the sink, or `None` if the
    /// sink reported failure.
    pub fn emit_next<S: FrameSink>(&mut self, sink: &mut S) -> Option<usize> {
        let slot = self.active_index;
        let frame = self.next_frame();
        self.sequences[slot] = self.sequences[slot].wrapping_add(1) & SEQ_MAX;

        let outcome = match sink.transmit(&frame) {
            Ok(n) => Some(n),
            Err(err) => {
                tracing::debug!("Beacon transmit failed for slot {}: {}", slot, err);
                None
            }
        };

        self.active_index = (self.active_index + 1) % self.config.ap_count;
        outcome
    }

    /// Run the advertisement loop until `stop` is set.
    ///
    /// Sleeps `config.interval` at the top of each iteration, then emits.
    /// Sink failures are counted and skipped; the next cycle is the retry.
    pub fn run<S: FrameSink>(&mut self, sink: &mut S, stop: &AtomicBool) -> InjectionStats {
        tracing::info!(
            "Advertising {} virtual APs (base SSID '{}', one beacon every {:?})",
            self.config.ap_count,
            self.config.base_ssid,
            self.config.interval
        );

        let mut stats = InjectionStats::default();
        let start = Instant::now();

        while !stop.load(Ordering::Relaxed) {
            thread::sleep(self.config.interval);

            stats.attempted += 1;
            match self.emit_next(sink) {
                Some(n) => {
                    stats.sent += 1;
                    stats.bytes += n as u64;
                }
                None => stats.failed += 1,
            }
        }

        tracing::info!(
            "Beacon rotation stopped: {} sent, {} failed over {:.1}s",
            stats.sent,
            stats.failed,
            start.elapsed().as_secs_f32()
        );

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::frames::{BEACON_SSID_OFFSET, BEACON_TEMPLATE, BSSID_OFFSET, SENDER_OFFSET, SEQ_CTRL_OFFSET};

    struct CaptureSink {
        frames: Vec<Vec<u8>>,
    }

    impl FrameSink for CaptureSink {
        fn transmit(&mut self, frame: &[u8]) -> Result<usize> {
            self.frames.push(frame.to_vec());
            Ok(frame.len())
        }
    }

    struct FailSink;

    impl FrameSink for FailSink {
        fn transmit(&mut self, _frame: &[u8]) -> Result<usize> {
            Err(ApparitionError::Injection("radio gone".into()))
        }
    }

    fn ssid_of(frame: &[u8]) -> &[u8] {
        let len = frame[BEACON_SSID_OFFSET - 1] as usize;
        &frame[BEACON_SSID_OFFSET..BEACON_SSID_OFFSET + len]
    }

    #[test]
    fn test_config_defaults() {
        let config = BeaconConfig::default();
        assert_eq!(config.base_ssid, "Thingy");
        assert_eq!(config.ap_count, 10);
        assert_eq!(config.interval, Duration::from_millis(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_ssid_for() {
        let config = BeaconConfig::default().with_base_ssid("Cafe");
        assert_eq!(config.ssid_for(0), "Cafe0");
        assert_eq!(config.ssid_for(9), "Cafe9");
    }

    #[test]
    fn test_validate_rejects_zero_aps() {
        let config = BeaconConfig::default().with_ap_count(0);
        assert!(matches!(
            config.validate(),
            Err(ApparitionError::Config(_))
        ));
    }

    #[test]
    fn test_validate_ssid_length_boundary() {
        // 31-byte base + one digit = 32 bytes, exactly at the field limit
        let base: String = "a".repeat(31);
        let config = BeaconConfig::default()
            .with_base_ssid(base.clone())
            .with_ap_count(10);
        assert!(config.validate().is_ok());

        // Slot 10 would need a 2-digit suffix, pushing the widest SSID to 33
        let config = BeaconConfig::default()
            .with_base_ssid(base)
            .with_ap_count(11);
        assert!(matches!(
            config.validate(),
            Err(ApparitionError::Config(_))
        ));

        let config = BeaconConfig::default().with_base_ssid("b".repeat(32));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rotation_law() {
        let mut rotator = BeaconRotator::new(BeaconConfig::default()).unwrap();
        let mut sink = CaptureSink { frames: Vec::new() };

        for i in 0..10 {
            assert_eq!(rotator.active_index(), i);
            rotator.emit_next(&mut sink);
        }
        assert_eq!(rotator.active_index(), 0);

        for (i, frame) in sink.frames.iter().enumerate() {
            assert_eq!(ssid_of(frame), format!("Thingy{}", i).as_bytes());
            assert_eq!(frame[SENDER_OFFSET + 5], i as u8);
            assert_eq!(frame[BSSID_OFFSET + 5], i as u8);
            assert_eq!(frame.len(), BEACON_TEMPLATE.len() + ssid_of(frame).len());
        }
    }

    #[test]
    fn test_eleventh_emission_revisits_first_slot() {
        let mut rotator = BeaconRotator::new(BeaconConfig::default()).unwrap();
        let mut sink = CaptureSink { frames: Vec::new() };

        for _ in 0..11 {
            rotator.emit_next(&mut sink);
        }

        // Emission 11 is slot 0 again, now carrying sequence number 1
        let frame = &sink.frames[10];
        assert_eq!(ssid_of(frame), b"Thingy0");
        assert_eq!(frame[SEQ_CTRL_OFFSET], 0x10);
        assert_eq!(frame[SEQ_CTRL_OFFSET + 1], 0x00);
        assert_eq!(rotator.sequences[0], 2);
    }

    #[test]
    fn test_sequence_is_per_slot() {
        let config = BeaconConfig::default().with_ap_count(3);
        let mut rotator = BeaconRotator::new(config).unwrap();
        let mut sink = CaptureSink { frames: Vec::new() };

        for _ in 0..7 {
            rotator.emit_next(&mut sink);
        }

        // Slots 0 used 3 times, slots 1 and 2 twice each
        assert_eq!(rotator.sequences, vec![3, 2, 2]);
    }

    #[test]
    fn test_sequence_wraparound() {
        let config = BeaconConfig::default().with_ap_count(4);
        let mut rotator = BeaconRotator::new(config).unwrap();
        rotator.sequences[3] = SEQ_MAX;
        rotator.active_index = 3;

        let mut sink = CaptureSink { frames: Vec::new() };
        rotator.emit_next(&mut sink);

        // Frame carries 0xFFF, counter wraps to 0
        let frame = &sink.frames[0];
        assert_eq!(frame[SEQ_CTRL_OFFSET], 0xF0);
        assert_eq!(frame[SEQ_CTRL_OFFSET + 1], 0xFF);
        assert_eq!(rotator.sequences[3], 0);
    }

    #[test]
    fn test_sink_failure_does_not_stall_rotation() {
        let mut rotator = BeaconRotator::new(BeaconConfig::default()).unwrap();
        let mut sink = FailSink;

        for _ in 0..3 {
            assert!(rotator.emit_next(&mut sink).is_none());
        }

        // State advanced despite every transmit failing
        assert_eq!(rotator.active_index(), 3);
        assert_eq!(rotator.sequences[..3], [1, 1, 1]);
    }

    #[test]
    fn test_run_honors_stop_flag() {
        let mut rotator = BeaconRotator::new(BeaconConfig::default()).unwrap();
        let mut sink = CaptureSink { frames: Vec::new() };

        let stop = AtomicBool::new(true);
        let stats = rotator.run(&mut sink, &stop);
        assert_eq!(stats.attempted, 0);
        assert!(sink.frames.is_empty());
    }
}
