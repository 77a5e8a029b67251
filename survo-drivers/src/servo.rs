//! Duty controller (edge event consumer)
//!
//! Turns edge events into servo pulse updates. For every event:
//!
//! 1. Read both input levels
//! 2. Step the duty up for input A, down for input B (clamped)
//! 3. Mirror input A to output A and input B to output B
//! 4. Commit the duty to the PWM driver and restart generation
//! 5. Read back the committed duty
//!
//! Driver errors during an event are discarded; the report carries what
//! the hardware actually holds.

use embassy_sync::blocking_mutex::raw::RawMutex;
use survo_core::config::{ConfigError, ServoConfig};
use survo_core::{DutyCycle, EdgeEvent, EdgeQueue};
use survo_hal::{InputPin, OutputPin, PwmChannel};

use crate::pwm::PwmDriver;

/// PWM channel carrying the servo signal
const SERVO_CHANNEL: usize = 0;

/// Consumer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConsumerState {
    /// Blocked on the queue
    Waiting,
    /// Handling an event
    Processing,
}

/// Outcome of one processed event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EventReport {
    /// Pin the event came from
    pub pin: u8,
    /// Level of the event pin, if it is one of the two inputs
    pub level: Option<bool>,
    /// Level read from input A
    pub input_a: bool,
    /// Level read from input B
    pub input_b: bool,
    /// Duty after stepping
    pub duty: u32,
    /// Duty read back from the PWM channel
    pub committed: u32,
}

/// Edge event consumer driving the mirror outputs and the servo PWM
pub struct DutyController<I, O, C> {
    duty: DutyCycle,
    input_a: I,
    input_b: I,
    output_a: O,
    output_b: O,
    /// GPIO numbers of the inputs
    pin_a: u8,
    pin_b: u8,
    pwm: PwmDriver<C>,
    state: ConsumerState,
}

impl<I: InputPin, O: OutputPin, C: PwmChannel> DutyController<I, O, C> {
    /// Create a controller from a validated configuration
    ///
    /// The PWM driver must already be initialized with the servo channel
    /// at index 0.
    pub fn new(
        config: &ServoConfig,
        inputs: (I, I),
        outputs: (O, O),
        pwm: PwmDriver<C>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let duty = DutyCycle::from_config(config)?;

        Ok(Self {
            duty,
            input_a: inputs.0,
            input_b: inputs.1,
            output_a: outputs.0,
            output_b: outputs.1,
            pin_a: config.input_a,
            pin_b: config.input_b,
            pwm,
            state: ConsumerState::Waiting,
        })
    }

    /// Current consumer state
    pub fn state(&self) -> ConsumerState {
        self.state
    }

    /// Current duty state (not necessarily committed)
    pub fn duty(&self) -> u32 {
        self.duty.value()
    }

    /// The PWM driver
    pub fn pwm(&self) -> &PwmDriver<C> {
        &self.pwm
    }

    /// The mirror outputs (A, B)
    pub fn outputs(&self) -> (&O, &O) {
        (&self.output_a, &self.output_b)
    }

    /// Handle one edge event
    pub fn handle(&mut self, event: EdgeEvent) -> EventReport {
        let input_a = self.input_a.is_high();
        let input_b = self.input_b.is_high();

        // Independent checks; an unknown pin changes nothing
        if event.pin == self.pin_a {
            self.duty.increase();
        }
        if event.pin == self.pin_b {
            self.duty.decrease();
        }

        self.output_a.set_state(input_a);
        self.output_b.set_state(input_b);

        let duty = self.duty.value();
        self.pwm.set_duty(SERVO_CHANNEL, duty).ok();
        self.pwm.start();
        let committed = self.pwm.duty(SERVO_CHANNEL).unwrap_or(0);

        let level = if event.pin == self.pin_a {
            Some(input_a)
        } else if event.pin == self.pin_b {
            Some(input_b)
        } else {
            None
        };

        EventReport {
            pin: event.pin,
            level,
            input_a,
            input_b,
            duty,
            committed,
        }
    }

    /// Wait for the next queued event and handle it
    ///
    /// Suspends without a timeout while the queue is empty.
    pub async fn process_next<M: RawMutex, const N: usize>(
        &mut self,
        queue: &EdgeQueue<M, N>,
    ) -> EventReport {
        self.state = ConsumerState::Waiting;
        let event = queue.receive().await;

        self.state = ConsumerState::Processing;
        let report = self.handle(event);
        self.state = ConsumerState::Waiting;
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pwm::tests::MockChannel;
    use core::pin::pin;
    use core::task::Poll;
    use embassy_futures::{block_on, poll_once};
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use proptest::prelude::*;
    use survo_core::config::{INPUT_A_PIN, INPUT_B_PIN};
    use survo_core::{EdgeBridge, LatchedInput};

    #[derive(Default)]
    struct MockOutput {
        high: bool,
    }

    impl OutputPin for MockOutput {
        fn set_high(&mut self) {
            self.high = true;
        }

        fn set_low(&mut self) {
            self.high = false;
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    type Bridge<'q> = EdgeBridge<'q, NoopRawMutex, 10>;
    type Controller<'b> = DutyController<LatchedInput<'b>, MockOutput, MockChannel>;

    fn controller<'b>(bridge: &'b Bridge<'_>, config: &ServoConfig) -> Controller<'b> {
        let pwm = PwmDriver::init(
            config.period,
            &[config.initial_duty],
            &[config.phase_deg],
            [MockChannel::default()],
        )
        .unwrap();

        DutyController::new(
            config,
            (bridge.input(config.input_a), bridge.input(config.input_b)),
            (MockOutput::default(), MockOutput::default()),
            pwm,
        )
        .unwrap()
    }

    #[test]
    fn test_pin_a_steps_up_and_clamps() {
        let queue = EdgeQueue::new();
        let bridge: Bridge = EdgeBridge::new(&queue);
        let mut ctl = controller(&bridge, &ServoConfig::default());
        assert_eq!(ctl.duty(), 1_000);

        let first = ctl.handle(EdgeEvent::new(INPUT_A_PIN));
        assert_eq!(first.duty, 1_010);
        assert_eq!(first.committed, 1_010);

        for _ in 1..150 {
            ctl.handle(EdgeEvent::new(INPUT_A_PIN));
        }
        assert_eq!(ctl.duty(), 2_000);
        assert_eq!(ctl.pwm().duty(0), Some(2_000));
    }

    #[test]
    fn test_pin_b_from_max() {
        let queue = EdgeQueue::new();
        let bridge: Bridge = EdgeBridge::new(&queue);
        let config = ServoConfig {
            initial_duty: 2_000,
            ..Default::default()
        };
        let mut ctl = controller(&bridge, &config);

        let report = ctl.handle(EdgeEvent::new(INPUT_B_PIN));
        assert_eq!(report.duty, 1_990);
        assert_eq!(report.committed, 1_990);
    }

    #[test]
    fn test_outputs_mirror_inputs() {
        let queue = EdgeQueue::new();
        let bridge: Bridge = EdgeBridge::new(&queue);
        let mut ctl = controller(&bridge, &ServoConfig::default());

        bridge.latch(INPUT_A_PIN, true);
        bridge.latch(INPUT_B_PIN, false);
        let report = ctl.handle(EdgeEvent::new(INPUT_A_PIN));
        assert_eq!(report.level, Some(true));
        assert!(report.input_a && !report.input_b);
        let (a, b) = ctl.outputs();
        assert!(a.is_set_high());
        assert!(b.is_set_low());

        bridge.latch(INPUT_A_PIN, false);
        bridge.latch(INPUT_B_PIN, true);
        let report = ctl.handle(EdgeEvent::new(INPUT_B_PIN));
        assert_eq!(report.level, Some(true));
        let (a, b) = ctl.outputs();
        assert!(a.is_set_low());
        assert!(b.is_set_high());
    }

    #[test]
    fn test_unknown_pin_only_mirrors() {
        let queue = EdgeQueue::new();
        let bridge: Bridge = EdgeBridge::new(&queue);
        let mut ctl = controller(&bridge, &ServoConfig::default());

        bridge.latch(INPUT_B_PIN, true);
        let report = ctl.handle(EdgeEvent::new(22));
        assert_eq!(report.pin, 22);
        assert_eq!(report.level, None);
        assert_eq!(report.duty, 1_000);
        assert_eq!(report.committed, 1_000);
        assert!(ctl.outputs().1.is_set_high());
    }

    #[test]
    fn test_blocks_without_events() {
        let queue = EdgeQueue::new();
        let bridge: Bridge = EdgeBridge::new(&queue);
        let mut ctl = controller(&bridge, &ServoConfig::default());
        ctl.handle(EdgeEvent::new(INPUT_A_PIN));

        {
            let mut fut = pin!(ctl.process_next(&queue));
            assert!(poll_once(fut.as_mut()).is_pending());
            assert!(poll_once(fut.as_mut()).is_pending());
        }
        assert_eq!(ctl.state(), ConsumerState::Waiting);
        assert_eq!(ctl.pwm().duty(0), Some(1_010));
        assert!(ctl.pwm().is_running());
    }

    #[test]
    fn test_process_next_consumes_in_order() {
        let queue = EdgeQueue::new();
        let bridge: Bridge = EdgeBridge::new(&queue);
        let mut ctl = controller(&bridge, &ServoConfig::default());

        queue.post(EdgeEvent::new(INPUT_A_PIN));
        queue.post(EdgeEvent::new(INPUT_A_PIN));
        queue.post(EdgeEvent::new(INPUT_B_PIN));

        assert_eq!(block_on(ctl.process_next(&queue)).duty, 1_010);
        assert_eq!(block_on(ctl.process_next(&queue)).duty, 1_020);

        let mut fut = pin!(ctl.process_next(&queue));
        match poll_once(fut.as_mut()) {
            Poll::Ready(report) => {
                assert_eq!(report.pin, INPUT_B_PIN);
                assert_eq!(report.duty, 1_010);
            }
            Poll::Pending => panic!("queued event not consumed"),
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let queue = EdgeQueue::new();
        let bridge: Bridge = EdgeBridge::new(&queue);
        let config = ServoConfig {
            duty_step: 0,
            ..Default::default()
        };
        let pwm = PwmDriver::init(20_000, &[1_000], &[0], [MockChannel::default()]).unwrap();

        let result = DutyController::new(
            &config,
            (bridge.input(INPUT_A_PIN), bridge.input(INPUT_B_PIN)),
            (MockOutput::default(), MockOutput::default()),
            pwm,
        );
        assert_eq!(result.err(), Some(ConfigError::ZeroStep));
    }

    proptest! {
        #[test]
        fn prop_steps_and_mirrors(events in proptest::collection::vec((any::<bool>(), any::<bool>(), any::<bool>()), 0..300)) {
            let queue = EdgeQueue::new();
            let bridge: Bridge = EdgeBridge::new(&queue);
            let mut ctl = controller(&bridge, &ServoConfig::default());

            for (is_a, level_a, level_b) in events {
                bridge.latch(INPUT_A_PIN, level_a);
                bridge.latch(INPUT_B_PIN, level_b);
                let before = ctl.duty();
                let pin = if is_a { INPUT_A_PIN } else { INPUT_B_PIN };
                let report = ctl.handle(EdgeEvent::new(pin));

                prop_assert!((1_000..=2_000).contains(&report.duty));
                prop_assert_eq!(report.committed, report.duty);
                if is_a {
                    prop_assert_eq!(report.duty, (before + 10).min(2_000));
                } else {
                    prop_assert_eq!(report.duty, before.saturating_sub(10).max(1_000));
                }

                let (a, b) = ctl.outputs();
                prop_assert_eq!(a.is_set_high(), level_a);
                prop_assert_eq!(b.is_set_high(), level_b);
            }
        }
    }
}
