use pretty_assertions::assert_eq;

use crate::{
    ACTIVITY_TICKS, BridgeConfig, DataBits, HOST_CHUNK_LIMIT, LineSettings, MIDI_BAUD_RATE, Mode,
    Parity, StopBits,
};

#[test]
fn strap_high_selects_midi_translator() {
    assert_eq!(Mode::from_strap(true), Mode::MidiTranslator);
    assert_eq!(Mode::from_strap(false), Mode::SerialBridge);
}

#[test]
fn config_from_strap_carries_timing_constants() {
    let config = BridgeConfig::from_strap(true);

    assert_eq!(config.mode, Mode::MidiTranslator);
    assert_eq!(config.activity_ticks, ACTIVITY_TICKS);
    assert_eq!(config.midi_baud_rate, 31_250);
}

#[test]
fn midi_persona_starts_at_midi_baud_rate() {
    let config = BridgeConfig::from_strap(true);

    assert_eq!(
        config.initial_line_settings(),
        LineSettings {
            baud_rate: MIDI_BAUD_RATE,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    );
}

#[test]
fn serial_persona_starts_at_serial_defaults() {
    let config = BridgeConfig::from_strap(false);

    assert_eq!(config.initial_line_settings(), LineSettings::default());
}

#[test]
fn line_coding_with_parity_and_two_stop_bits() {
    let settings = LineSettings::from_line_coding(115_200, 7, 2, 2);

    assert_eq!(
        settings,
        LineSettings {
            baud_rate: 115_200,
            data_bits: DataBits::Seven,
            parity: Parity::Even,
            stop_bits: StopBits::Two,
        }
    );
}

#[test]
fn unsupported_line_coding_falls_back() {
    // mark parity, 1.5 stop bits, 5 data bits
    let settings = LineSettings::from_line_coding(0, 5, 3, 1);

    assert_eq!(settings.baud_rate, LineSettings::default().baud_rate);
    assert_eq!(settings.data_bits, DataBits::Eight);
    assert_eq!(settings.parity, Parity::None);
    assert_eq!(settings.stop_bits, StopBits::One);
}

#[test]
fn line_coding_change_is_reported_once() {
    let mut current = LineSettings::default();
    let requested = LineSettings::from_line_coding(115_200, 8, 0, 0);

    assert!(current.update(requested));
    assert_eq!(current.baud_rate, 115_200);
    assert!(!current.update(requested));
}

#[test]
fn repeated_line_coding_keeps_settings() {
    let mut current = LineSettings::default();

    assert!(!current.update(LineSettings::from_line_coding(9600, 8, 0, 0)));
    assert_eq!(current, LineSettings::default());
}

#[test]
fn host_chunk_stays_below_packet_size() {
    assert_eq!(HOST_CHUNK_LIMIT, 63);
}
