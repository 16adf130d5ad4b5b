use defmt::{Format, trace};
use midi::decoder::MAX_MESSAGE_LEN;
use midi::{MidiPort, SerialOut, UsbMidiPacket};

use super::{INBOUND_CHANNEL, MIDI_UART_TX, OUTBOUND_CHANNEL};
use crate::usb;

/// Main-loop side of the USB MIDI endpoints. The endpoint tasks do the
/// actual transfers; this only touches their channels, so it never blocks.
pub struct UsbMidiPort;

#[derive(Format, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointBusy;

impl MidiPort for UsbMidiPort {
    type Error = EndpointBusy;

    fn device_configured(&self) -> bool {
        usb::is_configured()
    }

    fn channel_ready(&self) -> bool {
        OUTBOUND_CHANNEL.is_empty()
    }

    fn send_packet(&mut self, packet: UsbMidiPacket) -> Result<(), EndpointBusy> {
        OUTBOUND_CHANNEL.try_send(packet).map_err(|_| EndpointBusy)
    }

    fn receive_packet(&mut self) -> Option<UsbMidiPacket> {
        INBOUND_CHANNEL.try_receive().ok()
    }
}

/// Queues bytes for [`midi_uart_tx_task`](super::midi_uart::midi_uart_tx_task).
pub struct UartMidiOut;

impl SerialOut for UartMidiOut {
    fn ready(&self) -> bool {
        MIDI_UART_TX.free_capacity() >= MAX_MESSAGE_LEN
    }

    fn transmit_byte(&mut self, byte: u8) {
        if MIDI_UART_TX.try_write(&[byte]).is_err() {
            trace!("MIDI UART queue full, dropped {=u8:#x}", byte);
        }
    }
}
