use crate::libs::error::error::AnchorError;

// This trait is an abstraction over the industrial I/O device model, so that
// it can be mocked. Attribute values travel as strings, which is how the
// kernel exposes them; the controller formats numbers itself.
pub trait RigIO {
    /// Checks that a device of this name is present in the hardware context.
    fn probe_device(&mut self, device: &str) -> Result<(), AnchorError>;

    fn write_device_attr(&mut self, device: &str, attr: &str, value: &str)
        -> Result<(), AnchorError>;

    fn write_channel_attr(&mut self, device: &str, channel: &str, output: bool, attr: &str,
        value: &str) -> Result<(), AnchorError>;

    fn enable_channel(&mut self, device: &str, channel: &str, output: bool)
        -> Result<(), AnchorError>;

    /// Allocates the single cyclic transmit buffer, sized in I/Q sample pairs.
    /// Once pushed, the hardware replays its contents at the sample clock
    /// without further software action.
    fn create_cyclic_buffer(&mut self, device: &str, sample_pairs: usize)
        -> Result<(), AnchorError>;

    /// Writes one interleaved little-endian 16-bit byte payload into the
    /// buffer. Returns the number of bytes accepted.
    fn write_buffer(&mut self, data: &[u8]) -> Result<usize, AnchorError>;

    /// Arms the buffer. With a cyclic buffer a single push starts
    /// free-running playback.
    fn push_buffer(&mut self) -> Result<(), AnchorError>;
}
