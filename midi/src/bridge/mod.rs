use config::BridgeConfig;
use defmt::{Format, debug, trace};
use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::activity::{ActivityIndicator, StatusLed};
use crate::handoff::HandoffSlot;
use crate::packet::UsbMidiPacket;

/// Host facing USB-MIDI endpoint pair. None of these may block.
pub trait MidiPort {
    type Error: Format;

    /// False until the host has configured the device.
    fn device_configured(&self) -> bool;

    /// True when a packet handed to [`send_packet`](Self::send_packet) will be
    /// accepted right away.
    fn channel_ready(&self) -> bool;

    fn send_packet(&mut self, packet: UsbMidiPacket) -> Result<(), Self::Error>;

    fn receive_packet(&mut self) -> Option<UsbMidiPacket>;
}

/// UART transmit path. Fire and forget.
pub trait SerialOut {
    /// True when a whole packet payload can be queued without waiting.
    fn ready(&self) -> bool;

    fn transmit_byte(&mut self, byte: u8);
}

/// Main-loop half of the MIDI persona.
///
/// Each [`poll`](Self::poll) is one loop iteration: age the activity LEDs,
/// pass one packet from the host to the UART, and send the message waiting in
/// the handoff slot to the host.
pub struct MidiBridge<'s, M, P, S, L>
where
    M: RawMutex,
    P: MidiPort,
    S: SerialOut,
    L: StatusLed,
{
    slot: &'s HandoffSlot<M>,
    port: P,
    serial: S,
    tx_activity: ActivityIndicator<L>,
    rx_activity: ActivityIndicator<L>,
}

impl<'s, M, P, S, L> MidiBridge<'s, M, P, S, L>
where
    M: RawMutex,
    P: MidiPort,
    S: SerialOut,
    L: StatusLed,
{
    /// `tx_led` shows traffic towards the host, `rx_led` traffic from it.
    pub fn new(
        config: &BridgeConfig,
        slot: &'s HandoffSlot<M>,
        port: P,
        serial: S,
        tx_led: L,
        rx_led: L,
    ) -> Self {
        Self {
            slot,
            port,
            serial,
            tx_activity: ActivityIndicator::new(tx_led, config.activity_ticks),
            rx_activity: ActivityIndicator::new(rx_led, config.activity_ticks),
        }
    }

    pub fn poll(&mut self) {
        self.tx_activity.tick();
        self.rx_activity.tick();

        self.forward_inbound();
        self.dispatch_outbound();

        let lost = self.slot.take_overwritten();
        if lost > 0 {
            debug!("{} MIDI messages replaced before reaching USB", lost);
        }
    }

    /// Sends the decoded message, if any, once the endpoint can take it.
    /// Returns true if a packet went out.
    pub fn dispatch_outbound(&mut self) -> bool {
        if !self.port.device_configured() || !self.port.channel_ready() {
            return false;
        }

        let Some(packet) = self.slot.take() else {
            return false;
        };

        match self.port.send_packet(packet) {
            Ok(()) => {
                trace!("UART >>> USB {}", packet);
                self.tx_activity.arm();
                true
            }
            Err(err) => {
                debug!("Dropped {}: {}", packet, err);
                false
            }
        }
    }

    /// Writes the payload of one packet from the host to the UART, as is.
    /// Returns true if a packet was consumed. A busy UART leaves the packet
    /// with the port.
    pub fn forward_inbound(&mut self) -> bool {
        if !self.port.device_configured() || !self.serial.ready() {
            return false;
        }

        let Some(packet) = self.port.receive_packet() else {
            return false;
        };

        trace!("USB >>> UART {}", packet);
        for byte in packet.payload() {
            self.serial.transmit_byte(byte);
        }
        self.rx_activity.arm();
        true
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    pub fn serial(&self) -> &S {
        &self.serial
    }

    pub fn serial_mut(&mut self) -> &mut S {
        &mut self.serial
    }

    pub fn tx_activity(&self) -> &ActivityIndicator<L> {
        &self.tx_activity
    }

    pub fn rx_activity(&self) -> &ActivityIndicator<L> {
        &self.rx_activity
    }
}

#[cfg(test)]
mod test;
