mod midi_uart;
mod midi_usb;
mod port;

use config::{BridgeConfig, USB_PACKET_SIZE};
use defmt::info;
use embassy_executor::{SendSpawner, Spawner};
use embassy_futures::yield_now;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::pipe::Pipe;
use embassy_usb::class::midi::MidiClass;
use midi::{HandoffSlot, MidiBridge, MidiListener, UsbMidiPacket};
use static_cell::StaticCell;

use crate::hardware::Hardware;
use crate::led::Led;
use midi_uart::{MIDI_UART_STATE, MidiUartState};
use port::{UartMidiOut, UsbMidiPort};

pub const INBOUND_CHANNEL_SIZE: usize = 16;
pub const UART_RX_BUFFER_SIZE: usize = 32;
pub const MIDI_UART_TX_SIZE: usize = 32;

/// Latest decoded message, written from the UART receive task.
pub static HANDOFF: HandoffSlot<CriticalSectionRawMutex> = HandoffSlot::new();

/// Holds at most one packet: anything queued here means the IN endpoint is
/// still busy with the previous one.
pub static OUTBOUND_CHANNEL: Channel<CriticalSectionRawMutex, UsbMidiPacket, 1> = Channel::new();

pub static INBOUND_CHANNEL: Channel<CriticalSectionRawMutex, UsbMidiPacket, INBOUND_CHANNEL_SIZE> =
    Channel::new();

/// Host bytes waiting for the UART, so the main loop never waits on it.
pub static MIDI_UART_TX: Pipe<CriticalSectionRawMutex, MIDI_UART_TX_SIZE> = Pipe::new();

static UART_RX_BUFFER: StaticCell<[u8; UART_RX_BUFFER_SIZE]> = StaticCell::new();

type Bridge = MidiBridge<'static, CriticalSectionRawMutex, UsbMidiPort, UartMidiOut, Led<'static>>;

static BRIDGE: StaticCell<Bridge> = StaticCell::new();

pub fn spawn_tasks(
    config: &'static BridgeConfig,
    hardware: Hardware<'static>,
    spawner: Spawner,
    uart_spawner: SendSpawner,
) {
    let mut builder = crate::usb::builder(hardware.usb, config.mode);
    let midi_class = MidiClass::new(&mut builder, 1, 1, USB_PACKET_SIZE);
    let usb_device = builder.build();
    let (usb_sender, usb_receiver) = midi_class.split();

    let (uart_tx, uart_rx) = hardware.uart.split();
    let uart_rx = uart_rx.into_ring_buffered(UART_RX_BUFFER.init([0; UART_RX_BUFFER_SIZE]));

    let uart_state = MIDI_UART_STATE.init(MidiUartState::new(MidiListener::new(&HANDOFF), uart_rx));

    let bridge = BRIDGE.init(MidiBridge::new(
        config,
        &HANDOFF,
        UsbMidiPort,
        UartMidiOut,
        Led::new(hardware.tx_led),
        Led::new(hardware.rx_led),
    ));

    uart_spawner
        .spawn(midi_uart::midi_uart_task(uart_state))
        .unwrap();
    spawner.spawn(crate::usb::usb_task(usb_device)).unwrap();
    spawner.spawn(midi_uart::midi_uart_tx_task(uart_tx)).unwrap();
    spawner.spawn(midi_usb::midi_usb_in_task(usb_sender)).unwrap();
    spawner.spawn(midi_usb::midi_usb_out_task(usb_receiver)).unwrap();
    spawner.spawn(bridge_task(bridge)).unwrap();

    info!("MIDI translator running");
}

#[embassy_executor::task]
async fn bridge_task(bridge: &'static mut Bridge) {
    loop {
        bridge.poll();
        yield_now().await;
    }
}
