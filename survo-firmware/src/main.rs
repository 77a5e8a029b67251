//! Survo - edge-driven servo pulse controller
//!
//! Two pulled-up inputs (GPIO 4 and 5) step a 20 ms servo pulse up and
//! down between 1000 and 2000 µs on GPIO 14. Each input is mirrored to an
//! output (GPIO 15 and 16) whenever an edge is processed.
//!
//! Edge watchers feed an interrupt bridge, the bridge feeds a bounded
//! queue, and a single servo task consumes the queue.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::clocks::clk_sys_freq;
use embassy_rp::gpio::{Input, Level, Output};
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_time::Timer;
use {defmt_rtt as _, panic_probe as _};

use survo_core::config::ServoConfig;
use survo_drivers::{DutyController, EdgeWatcher, HalOutput, PwmDriver};
use survo_hal_rp2040::{pwm_slice, GpioAllocator, PwmOutputChannel};

use crate::board::RpPwm;
use crate::channels::{EDGE_BRIDGE, EDGE_QUEUE};

mod board;
mod channels;
mod tasks;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Survo firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = ServoConfig::default();
    boot_check("servo config", config.validate());
    info!(
        "Servo config: period={} duty={}..{} step={} initial={}",
        config.period, config.duty_min, config.duty_max, config.duty_step, config.initial_duty
    );

    // Pin configuration
    let outputs = config.output_pins();
    let inputs = config.input_pins();
    let mut gpio = GpioAllocator::new();
    boot_check("output pins", gpio.apply(&outputs));
    boot_check("input pins", gpio.apply(&inputs));
    boot_check("pwm pin", gpio.allocate(config.pwm_pin));
    info!("{} GPIOs claimed", gpio.allocated_count());

    let output_a = HalOutput::new(Output::new(p.PIN_15, Level::Low), false);
    let output_b = HalOutput::new(Output::new(p.PIN_16, Level::Low), false);

    let pull = board::pull_for(&inputs);
    let watcher_a = EdgeWatcher::new(Input::new(p.PIN_4, pull), config.input_a);
    let watcher_b = EdgeWatcher::new(Input::new(p.PIN_5, pull), config.input_b);

    // Interrupt bridge: group trigger, then the input A override
    boot_check("edge triggers", EDGE_BRIDGE.configure(&inputs));
    boot_check(
        "input A trigger",
        EDGE_BRIDGE.set_trigger(config.input_a, config.input_a_trigger),
    );
    boot_check("input A handler", EDGE_BRIDGE.add_handler(config.input_a));
    boot_check("input B handler", EDGE_BRIDGE.add_handler(config.input_b));

    // Input A is detached and reattached before its watcher starts
    EDGE_BRIDGE.remove_handler(config.input_a);
    boot_check("input A handler", EDGE_BRIDGE.add_handler(config.input_a));
    info!(
        "Handlers: GPIO{}={} GPIO{}={}",
        config.input_a,
        EDGE_BRIDGE.has_handler(config.input_a),
        config.input_b,
        EDGE_BRIDGE.has_handler(config.input_b)
    );

    boot_check(
        "edge queue",
        config.check_queue_capacity(EDGE_QUEUE.capacity()),
    );
    info!("Edge queue ready ({} slots)", EDGE_QUEUE.capacity());

    // Servo PWM on GPIO 14 (slice 7, channel A)
    let (slice, channel) = boot_check("pwm pin", pwm_slice(config.pwm_pin));
    if slice != 7 || channel != PwmOutputChannel::A {
        error!("PWM pin GPIO{} is not wired to slice 7 A", config.pwm_pin);
        panic!("pwm pin mismatch");
    }
    let slice = Pwm::new_output_a(p.PWM_SLICE7, p.PIN_14, PwmConfig::default());
    let channel = RpPwm::new(slice, channel, clk_sys_freq());

    let mut pwm = boot_check(
        "pwm init",
        PwmDriver::init(
            config.period,
            &[config.initial_duty],
            &[config.phase_deg],
            [channel],
        ),
    );
    pwm.start();
    info!("PWM started, duty {}", pwm.duty(0).unwrap_or(0));

    let controller = boot_check(
        "servo controller",
        DutyController::new(
            &config,
            (
                EDGE_BRIDGE.input(config.input_a),
                EDGE_BRIDGE.input(config.input_b),
            ),
            (output_a, output_b),
            pwm,
        ),
    );

    // Consumer first so no event waits on a missing task
    spawner.spawn(tasks::servo_task(controller).unwrap());
    spawner.spawn(tasks::edge_task(watcher_a).unwrap());
    spawner.spawn(tasks::edge_task(watcher_b).unwrap());

    info!("All tasks spawned, firmware running");

    let mut reported = 0;
    loop {
        Timer::after_secs(60).await;
        trace!("Main loop heartbeat");

        let dropped = EDGE_QUEUE.dropped();
        if dropped != reported {
            warn!("{} edge events dropped since boot", dropped);
            reported = dropped;
        }
    }
}

/// Unwrap a setup result, logging and halting on error
fn boot_check<T, E: Format>(step: &str, result: Result<T, E>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            error!("Boot failed at {}: {}", step, e);
            panic!("boot failed");
        }
    }
}
