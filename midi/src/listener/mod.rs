use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::decoder::MidiDecoder;
use crate::handoff::HandoffSlot;

/// Receive side of the MIDI persona. Owns the decoder, so it must live in the
/// UART receive context only, and publishes every completed message to the
/// shared slot.
pub struct MidiListener<'s, M: RawMutex> {
    slot: &'s HandoffSlot<M>,
    decoder: MidiDecoder,
}

impl<'s, M: RawMutex> MidiListener<'s, M> {
    pub fn new(slot: &'s HandoffSlot<M>) -> Self {
        MidiListener {
            slot,
            decoder: MidiDecoder::new(),
        }
    }

    /// Returns true if the byte completed a message.
    pub fn process_byte(&mut self, byte: u8) -> bool {
        match self.decoder.push(byte) {
            Some(packet) => {
                self.slot.write(packet);
                true
            }
            None => false,
        }
    }

    pub fn process_bytes(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.process_byte(*byte);
        }
    }

    pub fn decoder(&self) -> &MidiDecoder {
        &self.decoder
    }
}
