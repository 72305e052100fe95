pub mod fake_rig_io;
pub mod rig_io;

#[cfg(feature = "hardware")]
pub mod iio_rig_io;
