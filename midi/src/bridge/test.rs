use std::collections::VecDeque;

use config::BridgeConfig;
use defmt::Format;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use pretty_assertions::assert_eq;

use super::*;
use crate::listener::MidiListener;

#[derive(Format, Debug, Clone, Copy, PartialEq, Eq)]
struct Stalled;

struct FakePort {
    configured: bool,
    ready: bool,
    stalled: bool,
    sent: Vec<[u8; 4]>,
    inbound: VecDeque<UsbMidiPacket>,
}

impl FakePort {
    fn new() -> Self {
        Self {
            configured: true,
            ready: true,
            stalled: false,
            sent: Vec::new(),
            inbound: VecDeque::new(),
        }
    }
}

impl MidiPort for FakePort {
    type Error = Stalled;

    fn device_configured(&self) -> bool {
        self.configured
    }

    fn channel_ready(&self) -> bool {
        self.ready
    }

    fn send_packet(&mut self, packet: UsbMidiPacket) -> Result<(), Stalled> {
        if self.stalled {
            return Err(Stalled);
        }
        self.sent.push(packet.to_bytes());
        Ok(())
    }

    fn receive_packet(&mut self) -> Option<UsbMidiPacket> {
        self.inbound.pop_front()
    }
}

#[derive(Default)]
struct FakeSerial {
    busy: bool,
    bytes: Vec<u8>,
}

impl SerialOut for FakeSerial {
    fn ready(&self) -> bool {
        !self.busy
    }

    fn transmit_byte(&mut self, byte: u8) {
        self.bytes.push(byte);
    }
}

#[derive(Default)]
struct FakeLed {
    on: bool,
}

impl StatusLed for FakeLed {
    fn set_on(&mut self) {
        self.on = true;
    }

    fn set_off(&mut self) {
        self.on = false;
    }
}

const TEST_ACTIVITY_TICKS: u16 = 3;

macro_rules! setup {
    ($slot:ident, $bridge:ident) => {
        let mut config = BridgeConfig::from_strap(true);
        config.activity_ticks = TEST_ACTIVITY_TICKS;
        let $slot = HandoffSlot::<NoopRawMutex>::new();
        #[allow(unused_mut)]
        let mut $bridge = MidiBridge::new(
            &config,
            &$slot,
            FakePort::new(),
            FakeSerial::default(),
            FakeLed::default(),
            FakeLed::default(),
        );
    };
}

#[test]
fn uart_note_on_reaches_usb() {
    setup!(slot, bridge);
    let mut listener = MidiListener::new(&slot);

    listener.process_bytes(&[0x90, 0x3C, 0x64]);
    bridge.poll();

    assert_eq!(bridge.port().sent, vec![[0x09, 0x90, 0x3C, 0x64]]);
    assert!(bridge.tx_activity().led().on);
    assert!(!bridge.rx_activity().led().on);
    assert!(!slot.is_valid());
}

#[test]
fn busy_channel_leaves_message_in_slot() {
    setup!(slot, bridge);
    slot.write(UsbMidiPacket::from_message(&[0xC0, 0x05]));

    bridge.port_mut().ready = false;
    bridge.poll();
    assert_eq!(bridge.port().sent, Vec::<[u8; 4]>::new());
    assert!(slot.is_valid());

    bridge.port_mut().ready = true;
    bridge.poll();
    assert_eq!(bridge.port().sent, vec![[0x0C, 0xC0, 0x05, 0x00]]);
}

#[test]
fn unconfigured_device_does_nothing() {
    setup!(slot, bridge);
    slot.write(UsbMidiPacket::single_byte(0xF8));
    bridge.port_mut().configured = false;
    bridge
        .port_mut()
        .inbound
        .push_back(UsbMidiPacket::from_bytes([0x09, 0x90, 0x40, 0x7F]));

    bridge.poll();

    assert_eq!(bridge.port().sent, Vec::<[u8; 4]>::new());
    assert_eq!(bridge.serial().bytes, Vec::<u8>::new());
    assert_eq!(bridge.port().inbound.len(), 1);
    assert!(slot.is_valid());
}

#[test]
fn host_packet_payload_goes_to_uart() {
    setup!(slot, bridge);
    bridge
        .port_mut()
        .inbound
        .extend([
            UsbMidiPacket::from_bytes([0x09, 0x90, 0x40, 0x7F]),
            UsbMidiPacket::from_bytes([0x0F, 0xF8, 0x00, 0x00]),
        ]);

    bridge.poll();
    assert_eq!(bridge.serial().bytes, vec![0x90, 0x40, 0x7F]);
    assert!(bridge.rx_activity().led().on);
    assert!(!bridge.tx_activity().led().on);

    bridge.poll();
    assert_eq!(
        bridge.serial().bytes,
        vec![0x90, 0x40, 0x7F, 0xF8, 0x00, 0x00]
    );
    assert!(bridge.port().inbound.is_empty());
    assert!(!slot.is_valid());
}

#[test]
fn busy_uart_keeps_host_packet_queued() {
    setup!(slot, bridge);
    bridge
        .port_mut()
        .inbound
        .push_back(UsbMidiPacket::from_bytes([0x0B, 0xB0, 0x07, 0x64]));
    bridge.serial_mut().busy = true;

    bridge.poll();
    assert_eq!(bridge.serial().bytes, Vec::<u8>::new());
    assert_eq!(bridge.port().inbound.len(), 1);
    assert!(!bridge.rx_activity().led().on);

    bridge.serial_mut().busy = false;
    bridge.poll();
    assert_eq!(bridge.serial().bytes, vec![0xB0, 0x07, 0x64]);
    assert!(bridge.port().inbound.is_empty());
}

#[test]
fn busy_uart_still_lets_uart_messages_out() {
    setup!(slot, bridge);
    slot.write(UsbMidiPacket::single_byte(0xF8));
    bridge.serial_mut().busy = true;

    bridge.poll();
    assert_eq!(bridge.port().sent, vec![[0x0F, 0xF8, 0, 0]]);
}

#[test]
fn only_latest_message_survives_between_polls() {
    setup!(slot, bridge);
    let mut listener = MidiListener::new(&slot);

    listener.process_bytes(&[0x90, 0x3C, 0x64, 0xF8]);
    bridge.poll();

    assert_eq!(bridge.port().sent, vec![[0x0F, 0xF8, 0, 0]]);
}

#[test]
fn failed_send_drops_the_message() {
    setup!(slot, bridge);
    slot.write(UsbMidiPacket::from_message(&[0x90, 0x3C, 0x64]));
    bridge.port_mut().stalled = true;

    assert!(!bridge.dispatch_outbound());
    assert!(!slot.is_valid());
    assert!(!bridge.tx_activity().led().on);
}

#[test]
fn activity_leds_go_dark_after_configured_ticks() {
    setup!(slot, bridge);
    slot.write(UsbMidiPacket::single_byte(0xFA));
    bridge
        .port_mut()
        .inbound
        .push_back(UsbMidiPacket::from_bytes([0x0F, 0xFC, 0, 0]));

    bridge.poll();
    assert!(bridge.tx_activity().led().on);
    assert!(bridge.rx_activity().led().on);

    for _ in 0..TEST_ACTIVITY_TICKS - 1 {
        bridge.poll();
    }
    assert!(bridge.tx_activity().led().on);
    assert!(bridge.rx_activity().led().on);

    bridge.poll();
    assert!(!bridge.tx_activity().led().on);
    assert!(!bridge.rx_activity().led().on);
}
