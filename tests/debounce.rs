mod tests {
    use core::cell::RefCell;
    use core::convert::Infallible;

    use embedded_hal::digital::{ErrorType, InputPin};
    use sonar_light_composer::debounce::{
        ChangeHandler, ChannelId, DebounceConfig, DebounceEvent, Debouncer, EventQueue,
        RegisterError,
    };
    use sonar_light_composer::hal::{PinPort, PortRead};
    use sonar_light_composer::sim::SimPort;

    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<(ChannelId, bool)>>,
    }

    impl ChangeHandler for Recorder {
        fn on_change(&self, channel: ChannelId, state: bool) {
            self.calls.borrow_mut().push((channel, state));
        }
    }

    fn ticks<const N: usize>(debouncer: &mut Debouncer<'_, N>, count: usize) {
        for _ in 0..count {
            debouncer.tick();
        }
    }

    #[test]
    fn test_short_glitch_is_ignored() {
        let port = SimPort::new(0);
        let recorder = Recorder::default();
        let mut debouncer = Debouncer::<4>::new(DebounceConfig { threshold: 20 });
        let id = debouncer.register(&port, 2, false, Some(&recorder)).unwrap();
        assert_eq!(debouncer.get(id), Some(false));

        port.set_bit(2, true);
        ticks(&mut debouncer, 19);
        port.set_bit(2, false);
        debouncer.tick();

        assert_eq!(debouncer.get(id), Some(false));
        assert!(recorder.calls.borrow().is_empty());

        // the counter restarted, another 19 ticks are still not enough
        port.set_bit(2, true);
        ticks(&mut debouncer, 19);
        assert_eq!(debouncer.get(id), Some(false));
    }

    #[test]
    fn test_stable_level_latches_after_threshold() {
        let port = SimPort::new(0);
        let recorder = Recorder::default();
        let mut debouncer = Debouncer::<4>::new(DebounceConfig { threshold: 20 });
        let id = debouncer.register(&port, 0, false, Some(&recorder)).unwrap();

        port.set_bit(0, true);
        ticks(&mut debouncer, 19);
        assert_eq!(debouncer.get(id), Some(false));
        debouncer.tick();
        assert_eq!(debouncer.get(id), Some(true));

        ticks(&mut debouncer, 50);
        assert_eq!(*recorder.calls.borrow(), vec![(id, true)]);
    }

    #[test]
    fn test_inverted_channel() {
        let port = SimPort::new(0);
        let recorder = Recorder::default();
        let mut debouncer = Debouncer::<4>::new(DebounceConfig::default());
        let id = debouncer.register(&port, 5, true, Some(&recorder)).unwrap();
        assert_eq!(debouncer.get(id), Some(true));

        port.set_bit(5, true);
        ticks(&mut debouncer, 20);
        assert_eq!(debouncer.get(id), Some(false));
        assert_eq!(*recorder.calls.borrow(), vec![(id, false)]);
    }

    #[test]
    fn test_initial_state_is_read_at_registration() {
        let port = SimPort::new(0b0000_1000);
        let mut debouncer = Debouncer::<2>::new(DebounceConfig::default());
        let high = debouncer.register(&port, 3, false, None).unwrap();
        let low = debouncer.register(&port, 4, false, None).unwrap();
        assert_eq!(debouncer.get(high), Some(true));
        assert_eq!(debouncer.get(low), Some(false));
    }

    #[test]
    fn test_channels_are_independent() {
        let port = SimPort::new(0);
        let recorder = Recorder::default();
        let mut debouncer = Debouncer::<4>::new(DebounceConfig { threshold: 3 });
        let first = debouncer.register(&port, 0, false, Some(&recorder)).unwrap();
        let second = debouncer.register(&port, 1, false, Some(&recorder)).unwrap();
        assert_eq!(first.index(), 0);
        assert_eq!(second.index(), 1);

        port.set_bit(1, true);
        ticks(&mut debouncer, 3);
        assert_eq!(debouncer.get(first), Some(false));
        assert_eq!(debouncer.get(second), Some(true));
        assert_eq!(*recorder.calls.borrow(), vec![(second, true)]);
    }

    #[test]
    fn test_capacity_exceeded() {
        let port = SimPort::new(0);
        let mut debouncer = Debouncer::<2>::new(DebounceConfig::default());
        assert!(debouncer.register(&port, 0, false, None).is_ok());
        assert!(debouncer.register(&port, 1, false, None).is_ok());
        assert_eq!(
            debouncer.register(&port, 2, false, None),
            Err(RegisterError::CapacityExceeded)
        );
        assert_eq!(debouncer.len(), 2);
        assert_eq!(debouncer.capacity(), 2);
    }

    #[test]
    fn test_invalid_bit() {
        let port = SimPort::new(0);
        let mut debouncer = Debouncer::<2>::new(DebounceConfig::default());
        assert_eq!(
            debouncer.register(&port, 8, false, None),
            Err(RegisterError::InvalidBit(8))
        );
        assert!(debouncer.is_empty());
    }

    #[test]
    fn test_unknown_channel() {
        let port = SimPort::new(0);
        let mut big = Debouncer::<4>::new(DebounceConfig::default());
        big.register(&port, 0, false, None).unwrap();
        let foreign = big.register(&port, 1, false, None).unwrap();

        let small = Debouncer::<4>::new(DebounceConfig::default());
        assert_eq!(small.get(foreign), None);
    }

    #[test]
    fn test_zero_threshold_latches_on_first_change() {
        let port = SimPort::new(0);
        let recorder = Recorder::default();
        let mut debouncer = Debouncer::<1>::new(DebounceConfig { threshold: 0 });
        let id = debouncer.register(&port, 0, false, Some(&recorder)).unwrap();

        debouncer.tick();
        assert!(recorder.calls.borrow().is_empty());

        port.set(1);
        debouncer.tick();
        assert_eq!(debouncer.get(id), Some(true));
        assert_eq!(*recorder.calls.borrow(), vec![(id, true)]);
    }

    #[test]
    fn test_event_queue_handler() {
        let port = SimPort::new(0);
        let events = EventQueue::<4>::new();
        let mut debouncer = Debouncer::<2>::new(DebounceConfig { threshold: 2 });
        let id = debouncer.register(&port, 0, false, Some(&events)).unwrap();

        port.set(1);
        ticks(&mut debouncer, 2);
        port.set(0);
        ticks(&mut debouncer, 2);

        assert_eq!(events.len(), 2);
        assert_eq!(
            events.pop(),
            Some(DebounceEvent {
                channel: id,
                state: true
            })
        );
        assert_eq!(
            events.pop(),
            Some(DebounceEvent {
                channel: id,
                state: false
            })
        );
        assert_eq!(events.pop(), None);
        assert_eq!(events.dropped(), 0);
    }

    #[test]
    fn test_event_queue_counts_dropped_events() {
        let port = SimPort::new(0);
        let events = EventQueue::<1>::new();
        let mut debouncer = Debouncer::<2>::new(DebounceConfig { threshold: 1 });
        let first = debouncer.register(&port, 0, false, Some(&events)).unwrap();
        debouncer.register(&port, 1, false, Some(&events)).unwrap();

        port.set(0b11);
        debouncer.tick();

        assert_eq!(events.dropped(), 1);
        assert_eq!(events.pop().map(|event| event.channel), Some(first));
        assert!(events.is_empty());
    }

    struct FixedPin(bool);

    impl ErrorType for FixedPin {
        type Error = Infallible;
    }

    impl InputPin for FixedPin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(self.0)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.0)
        }
    }

    #[test]
    fn test_pin_port() {
        assert_eq!(PinPort::new(FixedPin(true)).read(), 1);
        assert_eq!(PinPort::new(FixedPin(false)).read(), 0);

        let port = PinPort::new(FixedPin(true));
        let mut debouncer = Debouncer::<1>::new(DebounceConfig::default());
        let id = debouncer.register(&port, 0, true, None).unwrap();
        assert_eq!(debouncer.get(id), Some(false));
    }
}
