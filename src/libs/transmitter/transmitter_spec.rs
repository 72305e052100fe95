extern crate hamcrest2;

#[cfg(test)]
mod transmitter_spec {
    use std::env;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    use hamcrest2::prelude::*;
    use rstest::*;

    use crate::libs::encoder::sample_encoder::encode;
    use crate::libs::error::error::AnchorError;
    use crate::libs::rig_io::fake_rig_io::FakeRig;
    use crate::libs::transmitter::transmitter::{buffer_size_sample_pairs, FrontEndProfile,
        RadioConfig, Transmitter};
    use crate::libs::util::test_util;

    const PHY: &str = "ad9361-phy";
    const TX: &str = "cf-ad9361-dds-core-lpc";

    #[ctor::ctor]
    fn before_each() {
        env::set_var("RUST_LOG", "debug");
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[ctor::dtor]
    fn after_each() {}

    pub struct TransmitterFixture {
        rig: FakeRig,
        profile: FrontEndProfile,
        config: RadioConfig,
    }

    #[fixture]
    fn fixture() -> TransmitterFixture {
        TransmitterFixture {
            rig: FakeRig::new(&[PHY, TX]),
            profile: FrontEndProfile::default(),
            config: RadioConfig {
                bandwidth: 50_000_000,
                sample_rate: 40_000_000,
                center_frequency: 2_462_000_000,
                tx_gain_db: 0,
                period: 0.0012,
            },
        }
    }

    #[rstest]
    fn the_phy_is_configured_in_the_required_order(fixture: TransmitterFixture) {
        let state = fixture.rig.state();
        Transmitter::new(Box::new(fixture.rig.clone()), fixture.profile, &fixture.config, 8)
            .unwrap();
        let locked = state.lock().unwrap();
        let log: Vec<&str> = locked.write_log.iter().map(String::as_str).collect();
        assert_eq!(log, vec![
            "ad9361-phy/ensm_mode=tx",
            "ad9361-phy/voltage0/out/hardwaregain=0",
            "ad9361-phy/voltage0/out/rf_port_select=A",
            "ad9361-phy/voltage0/out/rf_bandwidth=50000000",
            "ad9361-phy/voltage0/out/sampling_frequency=40000000",
            "ad9361-phy/altvoltage1/out/frequency=2462000000",
            "ad9361-phy/voltage0/out/hardwaregain=0",
        ]);
    }

    #[rstest]
    fn the_gain_is_written_again_after_tuning_the_lo(fixture: TransmitterFixture) {
        let state = fixture.rig.state();
        Transmitter::new(Box::new(fixture.rig.clone()), fixture.profile, &fixture.config, 8)
            .unwrap();
        let log = state.lock().unwrap().write_log.clone();
        let gain_writes: Vec<usize> = log.iter().enumerate()
            .filter(|(_, entry)| entry.contains("hardwaregain"))
            .map(|(n, _)| n)
            .collect();
        let lo_write = log.iter().position(|entry| entry.contains("altvoltage1")).unwrap();
        assert_that!(gain_writes.len(), equal_to(2));
        assert!(gain_writes[0] < lo_write && lo_write < gain_writes[1]);
    }

    #[rstest]
    fn both_streaming_channels_are_enabled(fixture: TransmitterFixture) {
        let state = fixture.rig.state();
        Transmitter::new(Box::new(fixture.rig.clone()), fixture.profile, &fixture.config, 8)
            .unwrap();
        assert_eq!(state.lock().unwrap().enabled_channels, vec![
            "cf-ad9361-dds-core-lpc/voltage0/out".to_string(),
            "cf-ad9361-dds-core-lpc/voltage1/out".to_string(),
        ]);
    }

    #[rstest]
    fn the_cyclic_buffer_matches_the_requested_capacity(fixture: TransmitterFixture) {
        let state = fixture.rig.state();
        let transmitter = Transmitter::new(Box::new(fixture.rig.clone()), fixture.profile,
            &fixture.config, 48_000).unwrap();
        assert_that!(transmitter.buffer_size(), equal_to(48_000));
        let locked = state.lock().unwrap();
        assert_eq!(locked.buffer_device, Some(TX.to_string()));
        assert_eq!(locked.buffer_sample_pairs, Some(48_000));
    }

    #[rstest]
    fn an_empty_buffer_request_is_rejected(fixture: TransmitterFixture) {
        match Transmitter::new(Box::new(fixture.rig.clone()), fixture.profile, &fixture.config, 0) {
            Err(AnchorError::InvalidInput(_)) => {}
            Err(other) => panic!("Expected InvalidInput, got {:?}", other),
            Ok(_) => panic!("Expected InvalidInput, got a transmitter"),
        }
    }

    #[rstest]
    fn a_missing_phy_reports_device_not_found_and_allocates_nothing(fixture: TransmitterFixture) {
        let rig = FakeRig::new(&[TX]);
        let state = rig.state();
        match Transmitter::new(Box::new(rig), fixture.profile, &fixture.config, 8) {
            Err(AnchorError::DeviceNotFound(_)) => {}
            Err(other) => panic!("Expected DeviceNotFound, got {:?}", other),
            Ok(_) => panic!("Expected DeviceNotFound, got a transmitter"),
        }
        let locked = state.lock().unwrap();
        assert_that!(locked.buffer_sample_pairs, none());
        assert_that!(locked.enabled_channels.len(), equal_to(0));
    }

    #[rstest]
    fn a_missing_transmit_core_reports_device_not_found(fixture: TransmitterFixture) {
        let rig = FakeRig::new(&[PHY]);
        let state = rig.state();
        match Transmitter::new(Box::new(rig), fixture.profile, &fixture.config, 8) {
            Err(AnchorError::DeviceNotFound(_)) => {}
            Err(other) => panic!("Expected DeviceNotFound, got {:?}", other),
            Ok(_) => panic!("Expected DeviceNotFound, got a transmitter"),
        }
        assert_that!(state.lock().unwrap().buffer_sample_pairs, none());
    }

    #[rstest]
    fn reconfiguring_with_the_same_settings_is_idempotent(fixture: TransmitterFixture) {
        let state = fixture.rig.state();
        Transmitter::new(Box::new(fixture.rig.clone()), fixture.profile.clone(),
            &fixture.config, 8).unwrap();
        let first_device_attrs = state.lock().unwrap().device_attrs.clone();
        let first_channel_attrs = state.lock().unwrap().channel_attrs.clone();
        Transmitter::new(Box::new(fixture.rig.clone()), fixture.profile, &fixture.config, 8)
            .unwrap();
        assert_eq!(state.lock().unwrap().device_attrs, first_device_attrs);
        assert_eq!(state.lock().unwrap().channel_attrs, first_channel_attrs);
    }

    #[rstest]
    fn transmit_rejects_a_buffer_of_the_wrong_length(fixture: TransmitterFixture) {
        let mut transmitter = Transmitter::new(Box::new(fixture.rig.clone()), fixture.profile,
            &fixture.config, 8).unwrap();
        match transmitter.transmit(&vec![0u8; 8]) {
            Err(AnchorError::InvalidInput(_)) => {}
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
        assert_that!(fixture.rig.state().lock().unwrap().pushes, equal_to(0));
    }

    #[rstest]
    fn transmit_writes_the_encoded_bytes_and_pushes_once(fixture: TransmitterFixture) {
        let state = fixture.rig.state();
        let sequence = vec![0.0, 1.0, 1.0, 0.0, 1.0];
        let buffer_size = buffer_size_sample_pairs(2.0e-7, fixture.config.sample_rate,
            sequence.len()).unwrap();
        assert_that!(buffer_size, equal_to(8));
        let mut transmitter = Transmitter::new(Box::new(fixture.rig.clone()), fixture.profile,
            &fixture.config, buffer_size).unwrap();
        let encoded = encode(&sequence, &sequence, buffer_size).unwrap();
        transmitter.transmit(&encoded).unwrap();
        let locked = state.lock().unwrap();
        assert_eq!(locked.buffer_bytes, encoded);
        assert_that!(locked.pushes, equal_to(1));
    }

    #[rstest]
    fn a_failed_buffer_write_is_a_transmit_error(mut fixture: TransmitterFixture) {
        fixture.rig.fail_buffer_write = true;
        let mut transmitter = Transmitter::new(Box::new(fixture.rig.clone()), fixture.profile,
            &fixture.config, 8).unwrap();
        match transmitter.transmit(&vec![0u8; 8 * 4]) {
            Err(AnchorError::Transmit(_)) => {}
            other => panic!("Expected Transmit, got {:?}", other),
        }
        assert_that!(fixture.rig.state().lock().unwrap().pushes, equal_to(0));
    }

    #[rstest]
    fn a_failed_push_is_a_transmit_error(mut fixture: TransmitterFixture) {
        fixture.rig.fail_push = true;
        let mut transmitter = Transmitter::new(Box::new(fixture.rig.clone()), fixture.profile,
            &fixture.config, 8).unwrap();
        match transmitter.transmit(&vec![0u8; 8 * 4]) {
            Err(AnchorError::Transmit(_)) => {}
            other => panic!("Expected Transmit, got {:?}", other),
        }
    }

    #[rstest]
    fn run_returns_success_once_terminated(fixture: TransmitterFixture) {
        let transmitter = Transmitter::new(Box::new(fixture.rig.clone()), fixture.profile,
            &fixture.config, 8).unwrap();
        let terminate = Arc::new(AtomicBool::new(false));
        let setter = terminate.clone();
        let handle = thread::spawn(move || {
            test_util::wait_n_ms(50);
            setter.store(true, Ordering::SeqCst);
        });
        assert_that!(transmitter.run(terminate), equal_to(0));
        handle.join().unwrap();
    }

    #[test]
    fn the_buffer_covers_the_blink_period() {
        assert_that!(buffer_size_sample_pairs(0.0012, 40_000_000, 4095).unwrap(),
            equal_to(48_000));
    }

    #[test]
    fn a_long_tag_sequence_wins_over_the_blink_period() {
        assert_that!(buffer_size_sample_pairs(0.0012, 40_000_000, 50_000).unwrap(),
            equal_to(50_000));
    }

    #[test]
    fn a_zero_period_is_rejected_even_with_a_long_sequence() {
        match buffer_size_sample_pairs(0.0, 40_000_000, 4095) {
            Err(AnchorError::InvalidInput(_)) => {}
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn a_negative_period_is_rejected() {
        match buffer_size_sample_pairs(-0.0012, 40_000_000, 4095) {
            Err(AnchorError::InvalidInput(_)) => {}
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }
}
