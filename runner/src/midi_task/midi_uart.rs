use defmt::trace;
use embassy_stm32::mode::Async;
use embassy_stm32::usart::{RingBufferedUartRx, UartTx};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use midi::MidiListener;
use static_cell::StaticCell;

use super::{MIDI_UART_TX, MIDI_UART_TX_SIZE};
use crate::usb;

pub struct MidiUartState<'a> {
    midi_listener: MidiListener<'a, CriticalSectionRawMutex>,
    midi_uart_buffered: RingBufferedUartRx<'a>,
}

impl<'a> MidiUartState<'a> {
    pub fn new(
        midi_listener: MidiListener<'a, CriticalSectionRawMutex>,
        midi_uart_buffered: RingBufferedUartRx<'a>,
    ) -> MidiUartState<'a> {
        MidiUartState {
            midi_listener,
            midi_uart_buffered,
        }
    }
}

pub static MIDI_UART_STATE: StaticCell<MidiUartState<'static>> = StaticCell::new();

#[embassy_executor::task]
pub async fn midi_uart_task(state: &'static mut MidiUartState<'static>) {
    let mut buffer = [0; 1];
    loop {
        match state.midi_uart_buffered.read(&mut buffer).await {
            // Nothing is decoded until the host has configured the device.
            Ok(1) if usb::is_configured() => {
                state.midi_listener.process_byte(buffer[0]);
            }
            Ok(1) => {}
            Ok(other_size) => {
                trace!(
                    "Unexpected number of bytes read on MIDI UART: {}",
                    other_size
                );
            }
            Err(err) => {
                trace!("Error reading from MIDI UART: {}", err);
            }
        };
    }
}

#[embassy_executor::task]
pub async fn midi_uart_tx_task(mut uart_tx: UartTx<'static, Async>) {
    let mut buffer = [0; MIDI_UART_TX_SIZE];
    loop {
        let n = MIDI_UART_TX.read(&mut buffer).await;
        if let Err(err) = uart_tx.write(&buffer[..n]).await {
            trace!("Error writing to MIDI UART: {}", err);
        }
    }
}
