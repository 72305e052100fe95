use industrial_io as iio;
use log::{debug, info, warn};

use crate::libs::error::error::AnchorError;
use crate::libs::rig_io::rig_io::RigIO;

// A RigIO over the local libiio context. The two output channels enabled on
// the streaming device are remembered in enable order; write_buffer demuxes
// the interleaved payload back into per-channel samples for iio_channel_write.
pub struct IioRig {
    context: iio::Context,
    tx_channels: Vec<iio::Channel>,
    buffer: Option<iio::Buffer>,
}

impl IioRig {
    pub fn new() -> Result<IioRig, AnchorError> {
        match iio::Context::new() {
            Ok(context) => {
                info!("Created local IIO context");
                Ok(IioRig {
                    context,
                    tx_channels: Vec::new(),
                    buffer: None,
                })
            }
            Err(e) => {
                let msg = format!("Cannot create an IIO context: {}", e);
                warn!("{}", msg);
                Err(AnchorError::DeviceNotFound(msg))
            }
        }
    }

    fn device(&self, name: &str) -> Result<iio::Device, AnchorError> {
        self.context.find_device(name).ok_or_else(|| {
            AnchorError::DeviceNotFound(format!("No IIO device named '{}'", name))
        })
    }

    fn channel(&self, device: &str, channel: &str, output: bool)
        -> Result<iio::Channel, AnchorError> {
        let dev = self.device(device)?;
        dev.find_channel(channel, output).ok_or_else(|| {
            AnchorError::DeviceNotFound(format!("Device '{}' has no {} channel '{}'",
                device, if output { "output" } else { "input" }, channel))
        })
    }
}

impl RigIO for IioRig {
    fn probe_device(&mut self, device: &str) -> Result<(), AnchorError> {
        self.device(device).map(|_| ())
    }

    fn write_device_attr(&mut self, device: &str, attr: &str, value: &str)
        -> Result<(), AnchorError> {
        let dev = self.device(device)?;
        debug!("{} {} = {}", device, attr, value);
        dev.attr_write_str(attr, value).map_err(|e| {
            AnchorError::Transmit(format!("Cannot write {}.{}: {}", device, attr, e))
        })
    }

    fn write_channel_attr(&mut self, device: &str, channel: &str, output: bool, attr: &str,
        value: &str) -> Result<(), AnchorError> {
        let chan = self.channel(device, channel, output)?;
        debug!("{}/{} {} = {}", device, channel, attr, value);
        chan.attr_write_str(attr, value).map_err(|e| {
            AnchorError::Transmit(format!("Cannot write {}/{}.{}: {}", device, channel, attr, e))
        })
    }

    fn enable_channel(&mut self, device: &str, channel: &str, output: bool)
        -> Result<(), AnchorError> {
        let chan = self.channel(device, channel, output)?;
        chan.enable();
        if output {
            self.tx_channels.push(chan);
        }
        Ok(())
    }

    fn create_cyclic_buffer(&mut self, device: &str, sample_pairs: usize)
        -> Result<(), AnchorError> {
        let dev = self.device(device)?;
        match dev.create_buffer(sample_pairs, true) {
            Ok(buffer) => {
                self.buffer = Some(buffer);
                Ok(())
            }
            Err(e) => Err(AnchorError::Transmit(format!(
                "Cannot create a cyclic buffer of {} sample pairs on '{}': {}",
                sample_pairs, device, e))),
        }
    }

    fn write_buffer(&mut self, data: &[u8]) -> Result<usize, AnchorError> {
        let buffer = self.buffer.as_ref().ok_or_else(|| {
            AnchorError::Transmit("No transmit buffer allocated".to_string())
        })?;
        if self.tx_channels.len() != 2 {
            return Err(AnchorError::Transmit(format!(
                "Expected 2 enabled transmit channels, have {}", self.tx_channels.len())));
        }
        if data.len() % 4 != 0 {
            return Err(AnchorError::InvalidInput(format!(
                "A payload of {} bytes is not whole I/Q sample pairs", data.len())));
        }
        let pairs = data.len() / 4;
        let mut i_samples: Vec<i16> = Vec::with_capacity(pairs);
        let mut q_samples: Vec<i16> = Vec::with_capacity(pairs);
        for pair in data.chunks_exact(4) {
            i_samples.push(i16::from_le_bytes([pair[0], pair[1]]));
            q_samples.push(i16::from_le_bytes([pair[2], pair[3]]));
        }
        let wrote_i = self.tx_channels[0].write(buffer, &i_samples).map_err(|e| {
            AnchorError::Transmit(format!("I channel write failed: {}", e))
        })?;
        let wrote_q = self.tx_channels[1].write(buffer, &q_samples).map_err(|e| {
            AnchorError::Transmit(format!("Q channel write failed: {}", e))
        })?;
        Ok((wrote_i + wrote_q) * std::mem::size_of::<i16>())
    }

    fn push_buffer(&mut self) -> Result<(), AnchorError> {
        let buffer = self.buffer.as_mut().ok_or_else(|| {
            AnchorError::Transmit("No transmit buffer allocated".to_string())
        })?;
        buffer.push().map(|_| ()).map_err(|e| {
            AnchorError::Transmit(format!("Cannot push the transmit buffer: {}", e))
        })
    }
}
