#![no_std]
#![no_main]

mod peripherals;
mod system;

// Panic handler and debugging
use defmt::unwrap;

use defmt_rtt as _;
use panic_probe as _;

// Device
use embassy_executor::Spawner;
use embassy_nrf::{
    bind_interrupts,
    gpio::{Input, Level, Output, OutputDrive, Pin, Pull},
    peripherals::SPI2,
    spim,
};
use embassy_time::{Duration, Instant, Timer};

bind_interrupts!(struct Irqs {
    SPIM2_SPIS2_SPI2 => spim::InterruptHandler<SPI2>;
});

// Crate
use peripherals::{backlight::Backlight, button::Button, display::Display};
use pinetime_daynight::{clock::Clock, DayNightWatchface, Runtime};
use system::{
    config::{SystemConfig, BRIGHTNESS, CLOCK_24H, TIMEZONE_OFFSET_SECS, WATCHFACE},
    time::{TimeManager, TimeReference},
};

// Include current UTC epoch at compile time
include!(concat!(env!("OUT_DIR"), "/utc.rs"));

/// Button sampling interval while waiting for other events
const BUTTON_POLL: Duration = Duration::from_millis(10);

type Watchface<'a> = DayNightWatchface<Runtime, &'a TimeManager>;

/// Deliver tick and timer events to the watchface until the button is pressed.
async fn run_event_loop(
    watchface: &mut Watchface<'_>,
    time: &TimeManager,
    display: &mut Display,
    button: &mut Button,
) {
    loop {
        let uptime = Instant::now().as_millis();
        let now = time.local_time();

        for event in watchface.toolkit_mut().poll_events(now, uptime) {
            if let Err(err) = watchface.handle_event(event) {
                defmt::warn!("Event handling failed: {}", err);
            }
        }

        if watchface.toolkit().needs_redraw() {
            display.present(watchface.toolkit_mut());
        }

        if button.pressed().await {
            defmt::info!("Button pressed, leaving watchface");
            return;
        }

        // Sleep until the next tick or timer, waking up to sample the button
        let poll = Instant::now() + BUTTON_POLL;
        let deadline = match watchface.toolkit().next_wakeup_ms(&now, uptime) {
            Some(wakeup) => Instant::from_millis(wakeup).min(poll),
            None => poll,
        };
        Timer::at(deadline).await;
    }
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_nrf::init(SystemConfig::new());
    defmt::info!("Initializing");

    // Initialize Backlight
    let mut backlight = Backlight::init(
        Output::new(p.P0_14.degrade(), Level::High, OutputDrive::Standard),
        Output::new(p.P0_22.degrade(), Level::High, OutputDrive::Standard),
        Output::new(p.P0_23.degrade(), Level::High, OutputDrive::Standard),
        BRIGHTNESS,
    );

    // Initialize Button
    let mut button = Button::init(
        Input::new(p.P0_13.degrade(), Pull::None),
        Output::new(p.P0_15.degrade(), Level::Low, OutputDrive::Standard),
    );

    // Initialize SPI
    let mut spim_config = spim::Config::default();
    // Use SPI at 8MHz (the fastest clock available on the nRF52832),
    // otherwise refreshing will be super slow.
    spim_config.frequency = spim::Frequency::M8;
    // SPI must be used in mode 3. Mode 0 (the default) won't work.
    spim_config.mode = spim::MODE_3;

    let spim = spim::Spim::new(p.SPI2, Irqs, p.P0_02, p.P0_04, p.P0_03, spim_config);

    // Initialize LCD
    let mut display = unwrap!(Display::init(
        spim,
        Output::new(p.P0_25.degrade(), Level::High, OutputDrive::Standard),
        Output::new(p.P0_18.degrade(), Level::Low, OutputDrive::Standard),
        Output::new(p.P0_26.degrade(), Level::Low, OutputDrive::Standard),
    ));

    // Wall clock starts at the build time
    let time = TimeManager::init(
        TimeReference::from_epoch(UTC_EPOCH),
        TIMEZONE_OFFSET_SECS,
        CLOCK_24H,
    );

    defmt::info!("Initialization finished");

    loop {
        let mut runtime = Runtime::new(Display::SIZE);
        runtime.set_uptime_ms(Instant::now().as_millis());

        let mut watchface = DayNightWatchface::new(runtime, &time, WATCHFACE);
        unwrap!(watchface.initialize());
        display.present(watchface.toolkit_mut());
        backlight.on();

        run_event_loop(&mut watchface, &time, &mut display, &mut button).await;

        watchface.deinitialize();
        backlight.off();

        // Start again on the next press
        while !button.pressed().await {
            Timer::after(BUTTON_POLL).await;
        }
    }
}
