use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use log::{debug, info};

use crate::libs::error::error::AnchorError;
use crate::libs::rig_io::rig_io::RigIO;

// AD9361 attribute names, fixed by the kernel driver.
const ATTR_ENSM_MODE: &str = "ensm_mode";
const ATTR_HARDWARE_GAIN: &str = "hardwaregain";
const ATTR_PORT_SELECT: &str = "rf_port_select";
const ATTR_RF_BANDWIDTH: &str = "rf_bandwidth";
const ATTR_SAMPLING_FREQUENCY: &str = "sampling_frequency";
const ATTR_LO_FREQUENCY: &str = "frequency";

const RUN_POLL_MS: u64 = 250;

/// Front-end settings for one run. Immutable once constructed.
#[derive(Clone, Debug, PartialEq)]
pub struct RadioConfig {
    pub bandwidth: u64,
    pub sample_rate: u64,
    pub center_frequency: u64,
    pub tx_gain_db: i64,
    pub period: f64,
}

/// The devices and channels this anchor drives, and the fixed attribute
/// values it writes. Defaults match the AD9361 on the PicoZed SDR; tests
/// substitute their own names against a fake rig.
#[derive(Clone, Debug)]
pub struct FrontEndProfile {
    pub phy_device: String,
    pub tx_device: String,
    pub ensm_mode: String,
    pub port_select: String,
    pub tx_channel: String,
    pub lo_channel: String,
    pub streaming_channels: Vec<String>,
}

impl Default for FrontEndProfile {
    fn default() -> Self {
        FrontEndProfile {
            phy_device: "ad9361-phy".to_string(),
            tx_device: "cf-ad9361-dds-core-lpc".to_string(),
            ensm_mode: "tx".to_string(),
            port_select: "A".to_string(),
            tx_channel: "voltage0".to_string(),
            lo_channel: "altvoltage1".to_string(),
            streaming_channels: vec!["voltage0".to_string(), "voltage1".to_string()],
        }
    }
}

/// Computes the cyclic buffer capacity in I/Q sample pairs: long enough to
/// realize the requested blink period at the sample rate, and long enough to
/// hold one full tag sequence.
pub fn buffer_size_sample_pairs(period_seconds: f64, sample_rate: u64, sequence_length: usize)
    -> Result<usize, AnchorError> {
    let period_samples = (period_seconds * sample_rate as f64).round();
    if !period_samples.is_finite() || period_samples < 1.0 {
        return Err(AnchorError::InvalidInput(format!(
            "A blink period of {}s at {}Hz does not fill a buffer",
            period_seconds, sample_rate)));
    }
    Ok((period_samples as usize).max(sequence_length))
}

pub struct Transmitter {
    rig: Box<dyn RigIO>,
    profile: FrontEndProfile,
    buffer_size: usize,
}

impl Transmitter {
    /// Configures the front end, enables the streaming channels and allocates
    /// the cyclic transmit buffer, leaving the rig one `transmit` away from
    /// free-running playback. Any failure aborts construction; there is no
    /// partial-configuration state worth keeping.
    pub fn new(mut rig: Box<dyn RigIO>, profile: FrontEndProfile, config: &RadioConfig,
        buffer_size: usize) -> Result<Transmitter, AnchorError> {
        if buffer_size == 0 {
            return Err(AnchorError::InvalidInput(
                "The transmit buffer must hold at least one sample pair".to_string()));
        }
        configure_phy(&mut *rig, &profile, config)?;
        enable_streaming_channels(&mut *rig, &profile)?;
        info!("Allocating a cyclic buffer of {} sample pairs on '{}'",
            buffer_size, profile.tx_device);
        rig.create_cyclic_buffer(&profile.tx_device, buffer_size)?;
        Ok(Transmitter { rig, profile, buffer_size })
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Writes one encoded I/Q byte buffer and arms cyclic playback. Performed
    /// once per run; the hardware replays the buffer from then on.
    pub fn transmit(&mut self, encoded: &[u8]) -> Result<(), AnchorError> {
        let expected = self.buffer_size * 2 * std::mem::size_of::<i16>();
        if encoded.len() != expected {
            return Err(AnchorError::InvalidInput(format!(
                "The encoded buffer is {} bytes but the hardware buffer needs {}",
                encoded.len(), expected)));
        }
        let written = self.rig.write_buffer(encoded)?;
        if written != encoded.len() {
            return Err(AnchorError::Transmit(format!(
                "Short buffer write: {} of {} bytes", written, encoded.len())));
        }
        debug!("Pushing {} bytes for cyclic playback", written);
        self.rig.push_buffer()
    }

    /// Blocks until the terminate flag is set, then returns exit code 0. The
    /// cyclic buffer is clocked by the hardware, so nothing needs servicing
    /// here; the transmission outlives every iteration of this loop.
    pub fn run(&self, terminate: Arc<AtomicBool>) -> i32 {
        info!("Transmitting on '{}'; interrupt to stop", self.profile.tx_device);
        while !terminate.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(RUN_POLL_MS));
        }
        info!("Terminate requested; releasing the front end");
        0
    }
}

fn configure_phy(rig: &mut dyn RigIO, profile: &FrontEndProfile, config: &RadioConfig)
    -> Result<(), AnchorError> {
    rig.probe_device(&profile.phy_device)?;
    rig.probe_device(&profile.tx_device)?;

    info!("Configuring '{}' for transmit", profile.phy_device);
    let phy = profile.phy_device.as_str();
    let tx_chan = profile.tx_channel.as_str();
    let gain = config.tx_gain_db.to_string();

    rig.write_device_attr(phy, ATTR_ENSM_MODE, &profile.ensm_mode)?;
    rig.write_channel_attr(phy, tx_chan, true, ATTR_HARDWARE_GAIN, &gain)?;
    rig.write_channel_attr(phy, tx_chan, true, ATTR_PORT_SELECT, &profile.port_select)?;
    rig.write_channel_attr(phy, tx_chan, true, ATTR_RF_BANDWIDTH,
        &config.bandwidth.to_string())?;
    rig.write_channel_attr(phy, tx_chan, true, ATTR_SAMPLING_FREQUENCY,
        &config.sample_rate.to_string())?;
    rig.write_channel_attr(phy, profile.lo_channel.as_str(), true, ATTR_LO_FREQUENCY,
        &config.center_frequency.to_string())?;
    // Some AD9361 revisions reset hardwaregain as a side effect of retuning
    // the LO; the gain must be written again after the frequency.
    rig.write_channel_attr(phy, tx_chan, true, ATTR_HARDWARE_GAIN, &gain)?;
    Ok(())
}

fn enable_streaming_channels(rig: &mut dyn RigIO, profile: &FrontEndProfile)
    -> Result<(), AnchorError> {
    for name in &profile.streaming_channels {
        debug!("Enabling output channel '{}' on '{}'", name, profile.tx_device);
        rig.enable_channel(&profile.tx_device, name, true)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "./transmitter_spec.rs"]
mod transmitter_spec;
