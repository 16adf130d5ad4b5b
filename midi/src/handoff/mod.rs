use core::cell::Cell;

use embassy_sync::blocking_mutex::{Mutex, raw::RawMutex};

use crate::packet::UsbMidiPacket;

#[derive(Clone, Copy, Default)]
struct SlotState {
    packet: Option<UsbMidiPacket>,
    overwritten: u32,
}

/// Single message cell between the UART receive context and the main loop.
///
/// The receive side [`write`](Self::write)s every decoded message, replacing
/// whatever the main loop hasn't picked up yet. The main loop
/// [`take`](Self::take)s it. Both run with `M` held, so with a
/// `CriticalSectionRawMutex` the reader never sees a half written packet.
pub struct HandoffSlot<M: RawMutex> {
    state: Mutex<M, Cell<SlotState>>,
}

impl<M: RawMutex> HandoffSlot<M> {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(Cell::new(SlotState {
                packet: None,
                overwritten: 0,
            })),
        }
    }

    pub fn write(&self, packet: UsbMidiPacket) {
        self.state.lock(|state| {
            let mut slot = state.get();
            if slot.packet.is_some() {
                slot.overwritten = slot.overwritten.wrapping_add(1);
            }
            slot.packet = Some(packet);
            state.set(slot);
        })
    }

    pub fn take(&self) -> Option<UsbMidiPacket> {
        self.state.lock(|state| {
            let mut slot = state.get();
            let packet = slot.packet.take();
            state.set(slot);
            packet
        })
    }

    pub fn is_valid(&self) -> bool {
        self.state.lock(|state| state.get().packet.is_some())
    }

    /// Messages lost to overwrites since the last call.
    pub fn take_overwritten(&self) -> u32 {
        self.state.lock(|state| {
            let mut slot = state.get();
            let overwritten = slot.overwritten;
            slot.overwritten = 0;
            state.set(slot);
            overwritten
        })
    }
}

impl<M: RawMutex> Default for HandoffSlot<M> {
    fn default() -> Self {
        Self::new()
    }
}
