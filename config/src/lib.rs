#![cfg_attr(not(test), no_std)]

use defmt::Format;

/// Main-loop iterations an activity LED stays lit after the last transfer.
pub const ACTIVITY_TICKS: u16 = 5000;

pub const MIDI_BAUD_RATE: u32 = 31_250;

/// Capacity of each direction of the transparent serial bridge.
pub const SERIAL_BUFFER_SIZE: usize = 128;

pub const USB_PACKET_SIZE: u16 = 64;

/// Never fill a whole bulk packet towards the host, so a full-size transfer
/// doesn't have to be terminated by a zero length packet the host may never
/// ask for.
pub const HOST_CHUNK_LIMIT: usize = USB_PACKET_SIZE as usize - 1;

/// Which persona the firmware runs. Fixed at boot.
#[derive(Format, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    SerialBridge,
    MidiTranslator,
}

impl Mode {
    /// The strap pin is pulled up; fitting the jumper pulls it low and selects
    /// the serial bridge.
    pub fn from_strap(level_high: bool) -> Self {
        if level_high {
            Mode::MidiTranslator
        } else {
            Mode::SerialBridge
        }
    }
}

#[derive(Format, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeConfig {
    pub mode: Mode,
    pub activity_ticks: u16,
    pub midi_baud_rate: u32,
    pub serial: LineSettings,
}

impl BridgeConfig {
    pub fn from_strap(level_high: bool) -> Self {
        Self {
            mode: Mode::from_strap(level_high),
            activity_ticks: ACTIVITY_TICKS,
            midi_baud_rate: MIDI_BAUD_RATE,
            serial: LineSettings::default(),
        }
    }

    /// Line settings the UART starts with for the selected persona.
    pub fn initial_line_settings(&self) -> LineSettings {
        match self.mode {
            Mode::SerialBridge => self.serial,
            Mode::MidiTranslator => LineSettings {
                baud_rate: self.midi_baud_rate,
                ..LineSettings::default()
            },
        }
    }
}

#[derive(Format, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataBits {
    Six,
    Seven,
    Eight,
}

#[derive(Format, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Odd,
    Even,
}

#[derive(Format, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    One,
    Two,
}

/// UART framing requested by the USB host.
#[derive(Format, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSettings {
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
}

impl Default for LineSettings {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

impl LineSettings {
    /// Builds settings from the raw fields of a CDC `SET_LINE_CODING` request.
    ///
    /// Codes the UART can't reproduce map onto the nearest supported framing:
    /// mark and space parity become no parity, 1.5 stop bits become one, and
    /// unknown word lengths become eight bits. A zero baud rate keeps the
    /// current default.
    pub fn from_line_coding(baud_rate: u32, data_bits: u8, parity: u8, stop_bits: u8) -> Self {
        let data_bits = match data_bits {
            6 => DataBits::Six,
            7 => DataBits::Seven,
            _ => DataBits::Eight,
        };

        let parity = match parity {
            1 => Parity::Odd,
            2 => Parity::Even,
            _ => Parity::None,
        };

        let stop_bits = match stop_bits {
            2 => StopBits::Two,
            _ => StopBits::One,
        };

        let baud_rate = if baud_rate == 0 {
            LineSettings::default().baud_rate
        } else {
            baud_rate
        };

        Self {
            baud_rate,
            data_bits,
            parity,
            stop_bits,
        }
    }

    /// Adopts `requested` if it differs from the current settings. Returns
    /// true when the UART has to be reconfigured.
    pub fn update(&mut self, requested: LineSettings) -> bool {
        if *self == requested {
            return false;
        }
        *self = requested;
        true
    }
}

#[cfg(test)]
mod test;
