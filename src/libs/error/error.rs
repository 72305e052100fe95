use std::error::Error;
use std::fmt;
use std::fmt::{Display, Formatter};

// Every variant is fatal: the anchor either configures correctly once, or it
// must not transmit at all. There is no retry logic anywhere.
#[derive(Clone, Debug, PartialEq)]
pub enum AnchorError {
    /// A named device or channel is absent from the hardware context.
    DeviceNotFound(String),
    /// Malformed caller input: mismatched channel lengths, a degenerate
    /// all-zero channel, an out-of-range tag number, a buffer size mismatch.
    InvalidInput(String),
    /// The hardware rejected an attribute write, a buffer write or a push.
    Transmit(String),
}

impl Display for AnchorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AnchorError::DeviceNotFound(msg) => write!(f, "Device not found: {}", msg),
            AnchorError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AnchorError::Transmit(msg) => write!(f, "Transmit failure: {}", msg),
        }
    }
}

impl Error for AnchorError {}
