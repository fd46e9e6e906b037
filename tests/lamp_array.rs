mod common;

mod tests {
    use myrtio_lamp_array::{
        ControlState, Duration, Instant, LampArray, Rgb, SharedLampArray, SmartLedsOutput,
        TickAction,
    };
    use smart_leds::SmartLedsWrite;

    use crate::common::{multi_payload, range_payload, strip};

    const RED: Rgb = Rgb { r: 255, g: 0, b: 0 };

    fn ms(value: u64) -> Instant {
        Instant::from_millis(value)
    }

    #[test]
    fn test_first_tick_blanks_autonomous_array() {
        let mut array = strip();
        assert_eq!(array.control_state(), ControlState::AutonomousIdle);

        assert_eq!(array.tick(ms(0)).action, TickAction::Cleared);
        assert_eq!(array.control_state(), ControlState::AutonomousJustCleared);
        assert_eq!(array.output().writes(), 1);

        assert_eq!(array.tick(ms(2)).action, TickAction::Idle);
        assert_eq!(array.output().writes(), 1);
    }

    #[test]
    fn test_host_batch_flushes_once() {
        let mut array = strip();
        array.tick(ms(0));

        array.on_set_report(6, &[0]);
        assert_eq!(array.control_state(), ControlState::HostBatchSettled);

        array.on_set_report(4, &multi_payload(0x01, &[(3, [255, 0, 0, 0])]));
        assert_eq!(array.control_state(), ControlState::HostBatchPending);
        assert_eq!(array.output().writes(), 1);

        assert_eq!(array.tick(ms(2)).action, TickAction::Flushed);
        assert!(!array.store().needs_flush());
        assert_eq!(array.output().writes(), 2);
        assert_eq!(array.output().last_frame().map(|frame| frame[3]), Some(RED));
        assert_eq!(array.control_state(), ControlState::HostBatchSettled);

        assert_eq!(array.tick(ms(4)).action, TickAction::Idle);
        assert_eq!(array.output().writes(), 2);
    }

    #[test]
    fn test_partial_batch_waits_for_complete_flag() {
        let mut array = strip();
        array.on_set_report(6, &[0]);

        array.on_set_report(4, &multi_payload(0, &[(0, [255, 0, 0, 0])]));
        assert_eq!(array.tick(ms(0)).action, TickAction::Idle);
        assert_eq!(array.output().writes(), 0);

        array.on_set_report(5, &range_payload(0x01, 1, 7, [255, 0, 0, 0]));
        assert_eq!(array.tick(ms(2)).action, TickAction::Flushed);
        assert_eq!(array.output().writes(), 1);
        assert_eq!(array.output().last_frame(), Some(&[RED; 8][..]));
    }

    #[test]
    fn test_unchanged_batch_settles_without_write() {
        let mut array = strip();
        array.on_set_report(6, &[0]);
        array.on_set_report(4, &multi_payload(0x01, &[(0, [0, 0, 0, 0])]));

        assert_eq!(array.tick(ms(0)).action, TickAction::BatchSettled);
        assert_eq!(array.output().writes(), 0);
        assert_eq!(array.control_state(), ControlState::HostBatchSettled);
    }

    #[test]
    fn test_returning_to_autonomous_blanks_again() {
        let mut array = strip();
        array.tick(ms(0));
        array.on_set_report(6, &[0]);
        array.on_set_report(5, &range_payload(0x01, 0, 7, [255, 0, 0, 0]));
        array.tick(ms(2));

        array.on_set_report(6, &[1]);
        assert_eq!(array.control_state(), ControlState::AutonomousIdle);
        assert_eq!(array.tick(ms(4)).action, TickAction::Cleared);
        assert_eq!(array.store().get(0), Some(Rgb::default()));
        assert_eq!(array.output().last_frame(), Some(&[Rgb::default(); 8][..]));
    }

    #[test]
    fn test_batch_completed_while_autonomous_commits_after_handoff() {
        let mut array = strip();
        array.tick(ms(0));

        array.on_set_report(4, &multi_payload(0x01, &[(2, [255, 0, 0, 0])]));
        assert_eq!(array.tick(ms(2)).action, TickAction::Idle);
        assert_eq!(array.output().writes(), 1);

        array.on_set_report(6, &[0]);
        assert_eq!(array.tick(ms(4)).action, TickAction::Flushed);
        assert_eq!(array.output().last_frame().map(|frame| frame[2]), Some(RED));
    }

    #[test]
    fn test_suspend_blanks_immediately() {
        let mut array = strip();
        array.on_set_report(6, &[0]);
        array.on_set_report(4, &multi_payload(0x01, &[(0, [255, 0, 0, 0])]));
        array.tick(ms(0));
        assert_eq!(array.store().get(0), Some(RED));

        assert_eq!(array.suspend(), Ok(()));
        assert_eq!(array.store().get(0), Some(Rgb::default()));
        assert_eq!(array.output().last_frame(), Some(&[Rgb::default(); 8][..]));
        assert!(!array.store().needs_flush());

        assert_eq!(array.tick(ms(2)).action, TickAction::Idle);
    }

    #[test]
    fn test_tick_pacing() {
        let mut array = strip();
        let result = array.tick(ms(0));
        assert_eq!(result.next_deadline, ms(2));
        assert_eq!(result.sleep_duration, Duration::from_millis(2));

        let result = array.tick(ms(3));
        assert_eq!(result.next_deadline, ms(4));
        assert_eq!(result.sleep_duration, Duration::from_millis(1));

        // Long stall resets the schedule instead of catching up
        let result = array.tick(ms(100));
        assert_eq!(result.next_deadline, ms(102));
    }

    #[test]
    fn test_get_report_enumeration() {
        let mut array = strip();
        let mut buf = [0u8; 64];

        assert_eq!(array.on_get_report(1, &mut buf), 22);
        assert_eq!(&buf[0..2], &8u16.to_le_bytes());

        array.on_set_report(2, &7u16.to_le_bytes());
        assert_eq!(array.on_get_report(3, &mut buf), 28);
        assert_eq!(&buf[0..2], &7u16.to_le_bytes());
        assert_eq!(array.on_get_report(3, &mut buf), 28);
        assert_eq!(&buf[0..2], &0u16.to_le_bytes());
    }

    #[test]
    fn test_get_report_rejects_unreadable_ids() {
        let mut array = strip();
        let mut buf = [0u8; 64];
        assert_eq!(array.on_get_report(0, &mut buf), 0);
        assert_eq!(array.on_get_report(4, &mut buf), 0);
        assert!(array.get_report(6).is_none());
    }

    #[test]
    fn test_short_buffer_keeps_cursor() {
        let mut array = strip();
        let mut buf = [0u8; 10];
        assert_eq!(array.on_get_report(3, &mut buf), 0);
        assert_eq!(array.attributes().cursor(), 0);
    }

    #[test]
    fn test_shared_array_round_trip() {
        let shared = SharedLampArray::new(strip());
        shared.on_set_report(6, &[0]);
        shared.on_set_report(4, &multi_payload(0x01, &[(5, [255, 0, 0, 0])]));
        assert_eq!(shared.tick(ms(0)).action, TickAction::Flushed);

        let mut buf = [0u8; 64];
        assert_eq!(shared.on_get_report(1, &mut buf), 22);

        assert_eq!(shared.suspend(), Ok(()));
        shared.with(|array| {
            assert_eq!(array.store().get(5), Some(Rgb::default()));
            assert_eq!(array.output().writes(), 2);
        });
    }

    #[derive(Default)]
    struct VecWriter {
        pixels: Vec<Rgb>,
    }

    /// Writer that rejects frames until `healthy` is set
    #[derive(Default)]
    struct FailingWriter {
        healthy: bool,
        attempts: usize,
        pixels: Vec<Rgb>,
    }

    impl SmartLedsWrite for FailingWriter {
        type Error = ();
        type Color = Rgb;

        fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
        where
            T: IntoIterator<Item = I>,
            I: Into<Self::Color>,
        {
            self.attempts += 1;
            if !self.healthy {
                return Err(());
            }
            self.pixels = iterator.into_iter().map(Into::into).collect();
            Ok(())
        }
    }

    impl SmartLedsWrite for VecWriter {
        type Error = ();
        type Color = Rgb;

        fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
        where
            T: IntoIterator<Item = I>,
            I: Into<Self::Color>,
        {
            self.pixels = iterator.into_iter().map(Into::into).collect();
            Ok(())
        }
    }

    #[test]
    fn test_smart_leds_output() {
        let config = crate::common::strip_config();
        let mut array = LampArray::new(
            SmartLedsOutput::new(VecWriter::default()),
            &config,
        );
        array.on_set_report(6, &[0]);
        array.on_set_report(5, &range_payload(0x01, 0, 0, [255, 0, 0, 0]));
        array.tick(ms(0));

        let pixels = &array.output().writer().pixels;
        assert_eq!(pixels.len(), 8);
        assert_eq!(pixels[0], RED);
    }

    #[test]
    fn test_failed_batch_write_is_retried() {
        let config = crate::common::strip_config();
        let mut array = LampArray::new(SmartLedsOutput::new(FailingWriter::default()), &config);
        array.on_set_report(6, &[0]);
        array.on_set_report(4, &multi_payload(0x01, &[(0, [255, 0, 0, 0])]));

        assert_eq!(array.tick(ms(0)).action, TickAction::WriteFailed);
        assert!(array.store().needs_flush());
        assert_eq!(array.control_state(), ControlState::HostBatchPending);

        // Resending the same colors is "unchanged" but the frame is still pending
        let effects = array.on_set_report(4, &multi_payload(0x01, &[(0, [255, 0, 0, 0])]));
        assert_eq!(effects.changed_lamps, 0);
        assert_eq!(array.tick(ms(2)).action, TickAction::WriteFailed);
        assert_eq!(array.output().writer().attempts, 2);

        array.output_mut().writer_mut().healthy = true;
        assert_eq!(array.tick(ms(4)).action, TickAction::Flushed);
        assert!(!array.store().needs_flush());
        assert_eq!(array.output().writer().pixels[0], RED);
        assert_eq!(array.tick(ms(6)).action, TickAction::Idle);
    }

    #[test]
    fn test_failed_clear_is_retried() {
        let config = crate::common::strip_config();
        let mut array = LampArray::new(SmartLedsOutput::new(FailingWriter::default()), &config);

        assert_eq!(array.tick(ms(0)).action, TickAction::WriteFailed);
        assert_eq!(array.control_state(), ControlState::AutonomousIdle);
        assert_eq!(array.suspend(), Err(()));

        array.output_mut().writer_mut().healthy = true;
        assert_eq!(array.tick(ms(2)).action, TickAction::Cleared);
        assert_eq!(array.control_state(), ControlState::AutonomousJustCleared);
    }

    #[test]
    fn test_batch_waiting_for_handoff_is_observable() {
        let mut array = strip();
        array.tick(ms(0));
        array.on_set_report(4, &multi_payload(0x01, &[(1, [255, 0, 0, 0])]));

        assert_eq!(array.control_state(), ControlState::AutonomousJustCleared);
        assert!(array.control().is_batch_complete());

        array.on_set_report(6, &[0]);
        assert_eq!(array.control_state(), ControlState::HostBatchPending);
    }
}
