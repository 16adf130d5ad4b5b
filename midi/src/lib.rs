#![cfg_attr(not(test), no_std)]

//! MIDI side of the bridge: turns a raw UART MIDI byte stream into USB-MIDI
//! event packets and forwards packets from the host back to the UART.
//!
//! The decoder runs in the UART receive context and hands its results to the
//! main loop through a single [`HandoffSlot`]; everything else here runs in the
//! main loop.

pub mod activity;
pub mod bridge;
pub mod decoder;
pub mod handoff;
pub mod listener;
pub mod packet;
pub mod status;

pub use activity::{ActivityIndicator, StatusLed};
pub use bridge::{MidiBridge, MidiPort, SerialOut};
pub use decoder::MidiDecoder;
pub use handoff::HandoffSlot;
pub use listener::MidiListener;
pub use packet::UsbMidiPacket;
pub use status::{MessageCategory, MessageType};
