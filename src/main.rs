#[macro_use]
extern crate clap;

use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::{App, Arg, ArgMatches};
use log::{debug, error, info};
use simple_error::bail;

use taganchor::libs::catalog::tag_catalog::TagCatalog;
use taganchor::libs::encoder::sample_encoder::encode;
use taganchor::libs::error::error::AnchorError;
use taganchor::libs::rig_io::rig_io::RigIO;
use taganchor::libs::transmitter::transmitter::{buffer_size_sample_pairs, FrontEndProfile,
    RadioConfig, Transmitter};
use taganchor::libs::util::logging::initialise_logging;

const TAG_NUM: &'static str = "tag-num";
const BANDWIDTH: &'static str = "bandwidth";
const SAMP_RATE: &'static str = "samp-rate";
const CNTR_FREQ: &'static str = "cntr-freq";
const PERIOD: &'static str = "period";
const SEQS_FILE: &'static str = "seqs-file";

const DEFAULT_SEQS_FILE: &'static str = "seqs_4095.csv";

// The TX gain is fixed; the anchor always transmits at full drive.
const TX_GAIN_DB: i64 = 0;

fn parse_command_line<'a>() -> ArgMatches<'a> {
    App::new("taganchor")
        .version(crate_version!())
        .about("Configure and execute the anchor daemon")

        .arg(Arg::with_name(TAG_NUM)
            .short("t").long("tag-num").help("Sets the tag bit sequence to transmit")
            .value_name("tag number").takes_value(true).required(true))

        .arg(Arg::with_name(BANDWIDTH)
            .short("b").long("bandwidth").help("Sets the RF bandwidth in Hz")
            .value_name("Hz").takes_value(true).default_value("50000000"))

        .arg(Arg::with_name(SAMP_RATE)
            .short("s").long("samp-rate").help("Sets the baseband sample rate in Hz")
            .value_name("Hz").takes_value(true).default_value("40000000"))

        .arg(Arg::with_name(CNTR_FREQ)
            .short("c").long("cntr-freq").help("Sets the LO centre frequency in Hz")
            .value_name("Hz").takes_value(true).default_value("2462000000"))

        .arg(Arg::with_name(PERIOD)
            .short("p").long("period").help("Sets the blink period (inverse of blink rate) in seconds")
            .value_name("seconds").takes_value(true).default_value("0.0012"))

        .arg(Arg::with_name(SEQS_FILE)
            .short("f").long("seqs-file").help("Sets the tag sequence catalog file")
            .value_name("CSV file").takes_value(true).default_value(DEFAULT_SEQS_FILE))

        .get_matches()
}

#[cfg(feature = "hardware")]
fn open_rig() -> Result<Box<dyn RigIO>, AnchorError> {
    use taganchor::libs::rig_io::iio_rig_io::IioRig;
    Ok(Box::new(IioRig::new()?))
}

#[cfg(not(feature = "hardware"))]
fn open_rig() -> Result<Box<dyn RigIO>, AnchorError> {
    Err(AnchorError::DeviceNotFound(
        "This build has no IIO backend; rebuild with --features hardware".to_string()))
}

fn run(arguments: ArgMatches) -> Result<i32, Box<dyn Error>> {
    let tag_num = value_t!(arguments, TAG_NUM, usize)?;
    let bandwidth = value_t!(arguments, BANDWIDTH, u64)?;
    let sample_rate = value_t!(arguments, SAMP_RATE, u64)?;
    let center_frequency = value_t!(arguments, CNTR_FREQ, u64)?;
    let period = value_t!(arguments, PERIOD, f64)?;
    if period <= 0.0 {
        bail!("The blink period must be positive, not {}", period);
    }
    let seqs_file = arguments.value_of(SEQS_FILE).unwrap_or(DEFAULT_SEQS_FILE).to_string();

    info!("Loading tag sequences from {}", seqs_file);
    let catalog = TagCatalog::load(Path::new(&seqs_file))?;
    let sequence = catalog.sequence(tag_num)?;

    let buffer_size = buffer_size_sample_pairs(period, sample_rate, sequence.len())?;
    info!("Tag {}: {} samples; transmit buffer of {} sample pairs",
        tag_num, sequence.len(), buffer_size);

    let config = RadioConfig {
        bandwidth,
        sample_rate,
        center_frequency,
        tx_gain_db: TX_GAIN_DB,
        period,
    };
    let mut transmitter = Transmitter::new(open_rig()?, FrontEndProfile::default(), &config,
        buffer_size)?;

    // The tag waveform drives I and Q with the same bit sequence.
    let encoded = encode(sequence, sequence, buffer_size)?;
    transmitter.transmit(&encoded)?;

    let terminate = Arc::new(AtomicBool::new(false));
    let ctrlc_terminate = terminate.clone();
    ctrlc::set_handler(move || {
        info!("Setting terminate flag...");
        ctrlc_terminate.store(true, Ordering::SeqCst);
    })?;

    Ok(transmitter.run(terminate))
}

fn main() {
    initialise_logging();

    let arguments = parse_command_line();
    debug!("Command line parsed");

    match run(arguments) {
        Err(err) => {
            error!("{}", err);
            std::process::exit(1);
        }
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
    }
}
