#![no_std]
#![no_main]

mod hardware;
mod led;
mod midi_task;
mod serial_task;
mod uart;
mod usb;

use config::{BridgeConfig, Mode};
use defmt::info;
use embassy_executor::{Executor, InterruptExecutor};
use embassy_stm32::interrupt;
use embassy_stm32::interrupt::{InterruptExt, Priority};
use static_cell::StaticCell;

use defmt_rtt as _;
use panic_probe as _;

static EXECUTOR: StaticCell<Executor> = StaticCell::new();
static CONFIG: StaticCell<BridgeConfig> = StaticCell::new();

/// Runs the UART receive side above the main loop.
static UART_EXECUTOR: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn UART7() {
    unsafe { UART_EXECUTOR.on_interrupt() }
}

#[cortex_m_rt::entry]
fn main() -> ! {
    let hardware = hardware::Hardware::get();
    let config: &'static BridgeConfig = CONFIG.init(hardware.config);
    info!("Starting in {} mode", config.mode);

    interrupt::UART7.set_priority(Priority::P6);
    let uart_spawner = UART_EXECUTOR.start(interrupt::UART7);

    let executor = EXECUTOR.init(Executor::new());
    executor.run(|spawner| match config.mode {
        Mode::MidiTranslator => midi_task::spawn_tasks(config, hardware, spawner, uart_spawner),
        Mode::SerialBridge => serial_task::spawn_tasks(config, hardware, spawner, uart_spawner),
    })
}
