use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::libs::error::error::AnchorError;
use crate::libs::rig_io::rig_io::RigIO;

// An in-memory rig. Records every attribute write in order, so tests can
// assert on the exact configuration sequence; clones share their state, so a
// test can keep a handle after boxing the rig into a Transmitter.
#[derive(Clone)]
pub struct FakeRig {
    pub fail_buffer_write: bool,
    pub fail_push: bool,
    state: Arc<Mutex<FakeRigState>>,
}

#[derive(Default)]
pub struct FakeRigState {
    pub devices: Vec<String>,
    // "device/attr" -> value
    pub device_attrs: HashMap<String, String>,
    // "device/channel/direction/attr" -> value
    pub channel_attrs: HashMap<String, String>,
    // "device/channel/direction", in enable order
    pub enabled_channels: Vec<String>,
    // every attribute write as "key=value", in write order
    pub write_log: Vec<String>,
    pub buffer_device: Option<String>,
    pub buffer_sample_pairs: Option<usize>,
    pub buffer_bytes: Vec<u8>,
    pub pushes: usize,
}

fn direction_name(output: bool) -> &'static str {
    if output { "out" } else { "in" }
}

impl FakeRig {
    pub fn new(devices: &[&str]) -> Self {
        let state = FakeRigState {
            devices: devices.iter().map(|d| d.to_string()).collect(),
            ..FakeRigState::default()
        };
        FakeRig {
            fail_buffer_write: false,
            fail_push: false,
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn state(&self) -> Arc<Mutex<FakeRigState>> {
        self.state.clone()
    }

    fn check_device(&self, device: &str) -> Result<(), AnchorError> {
        let state = self.state.lock().unwrap();
        if state.devices.iter().any(|d| d == device) {
            Ok(())
        } else {
            Err(AnchorError::DeviceNotFound(format!("No such device '{}'", device)))
        }
    }
}

impl RigIO for FakeRig {
    fn probe_device(&mut self, device: &str) -> Result<(), AnchorError> {
        self.check_device(device)
    }

    fn write_device_attr(&mut self, device: &str, attr: &str, value: &str)
        -> Result<(), AnchorError> {
        self.check_device(device)?;
        let mut state = self.state.lock().unwrap();
        let key = format!("{}/{}", device, attr);
        state.write_log.push(format!("{}={}", key, value));
        state.device_attrs.insert(key, value.to_string());
        Ok(())
    }

    fn write_channel_attr(&mut self, device: &str, channel: &str, output: bool, attr: &str,
        value: &str) -> Result<(), AnchorError> {
        self.check_device(device)?;
        let mut state = self.state.lock().unwrap();
        let key = format!("{}/{}/{}/{}", device, channel, direction_name(output), attr);
        state.write_log.push(format!("{}={}", key, value));
        state.channel_attrs.insert(key, value.to_string());
        Ok(())
    }

    fn enable_channel(&mut self, device: &str, channel: &str, output: bool)
        -> Result<(), AnchorError> {
        self.check_device(device)?;
        let mut state = self.state.lock().unwrap();
        let key = format!("{}/{}/{}", device, channel, direction_name(output));
        state.enabled_channels.push(key);
        Ok(())
    }

    fn create_cyclic_buffer(&mut self, device: &str, sample_pairs: usize)
        -> Result<(), AnchorError> {
        self.check_device(device)?;
        let mut state = self.state.lock().unwrap();
        state.buffer_device = Some(device.to_string());
        state.buffer_sample_pairs = Some(sample_pairs);
        Ok(())
    }

    fn write_buffer(&mut self, data: &[u8]) -> Result<usize, AnchorError> {
        if self.fail_buffer_write {
            return Err(AnchorError::Transmit("Injected buffer write failure".to_string()));
        }
        let mut state = self.state.lock().unwrap();
        if state.buffer_sample_pairs.is_none() {
            return Err(AnchorError::Transmit("No transmit buffer allocated".to_string()));
        }
        state.buffer_bytes = data.to_vec();
        Ok(data.len())
    }

    fn push_buffer(&mut self) -> Result<(), AnchorError> {
        if self.fail_push {
            return Err(AnchorError::Transmit("Injected push failure".to_string()));
        }
        let mut state = self.state.lock().unwrap();
        if state.buffer_sample_pairs.is_none() {
            return Err(AnchorError::Transmit("No transmit buffer allocated".to_string()));
        }
        state.pushes += 1;
        Ok(())
    }
}
