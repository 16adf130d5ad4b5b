use defmt::Format;

#[derive(Format, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageCategory {
    ChannelVoice,
    SystemCommon,
    SystemRealTime,
    Invalid,
}

/// Message kinds as identified by their status byte. Channel voice kinds carry
/// the status byte with the channel nibble cleared.
#[derive(Format, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    Invalid = 0x00,
    NoteOff = 0x80,
    NoteOn = 0x90,
    AfterTouchPoly = 0xA0,
    ControlChange = 0xB0,
    ProgramChange = 0xC0,
    AfterTouchChannel = 0xD0,
    PitchBend = 0xE0,
    SystemExclusive = 0xF0,
    TimeCodeQuarterFrame = 0xF1,
    SongPosition = 0xF2,
    SongSelect = 0xF3,
    TuneRequest = 0xF6,
    EndOfExclusive = 0xF7,
    Clock = 0xF8,
    Start = 0xFA,
    Continue = 0xFB,
    Stop = 0xFC,
    ActiveSensing = 0xFE,
    SystemReset = 0xFF,
}

pub fn is_status_byte(byte: u8) -> bool {
    byte & 0x80 != 0
}

/// Channel (1 to 16) encoded in a channel voice status byte.
pub fn channel_from_status_byte(byte: u8) -> Option<u8> {
    if MessageType::from_status_byte(byte).is_channel_voice() {
        Some((byte & 0x0F) + 1)
    } else {
        None
    }
}

impl MessageType {
    /// Classifies a byte. Data bytes and the undefined system bytes
    /// (0xF4, 0xF5, 0xF9, 0xFD) come out as [`MessageType::Invalid`].
    pub fn from_status_byte(byte: u8) -> Self {
        match byte {
            0x00..=0x7F => MessageType::Invalid,
            0x80..=0x8F => MessageType::NoteOff,
            0x90..=0x9F => MessageType::NoteOn,
            0xA0..=0xAF => MessageType::AfterTouchPoly,
            0xB0..=0xBF => MessageType::ControlChange,
            0xC0..=0xCF => MessageType::ProgramChange,
            0xD0..=0xDF => MessageType::AfterTouchChannel,
            0xE0..=0xEF => MessageType::PitchBend,
            0xF0 => MessageType::SystemExclusive,
            0xF1 => MessageType::TimeCodeQuarterFrame,
            0xF2 => MessageType::SongPosition,
            0xF3 => MessageType::SongSelect,
            0xF4 | 0xF5 => MessageType::Invalid,
            0xF6 => MessageType::TuneRequest,
            0xF7 => MessageType::EndOfExclusive,
            0xF8 => MessageType::Clock,
            0xF9 => MessageType::Invalid,
            0xFA => MessageType::Start,
            0xFB => MessageType::Continue,
            0xFC => MessageType::Stop,
            0xFD => MessageType::Invalid,
            0xFE => MessageType::ActiveSensing,
            0xFF => MessageType::SystemReset,
        }
    }

    pub fn category(self) -> MessageCategory {
        match self {
            MessageType::NoteOff
            | MessageType::NoteOn
            | MessageType::AfterTouchPoly
            | MessageType::ControlChange
            | MessageType::ProgramChange
            | MessageType::AfterTouchChannel
            | MessageType::PitchBend => MessageCategory::ChannelVoice,
            MessageType::SystemExclusive
            | MessageType::TimeCodeQuarterFrame
            | MessageType::SongPosition
            | MessageType::SongSelect
            | MessageType::TuneRequest
            | MessageType::EndOfExclusive => MessageCategory::SystemCommon,
            MessageType::Clock
            | MessageType::Start
            | MessageType::Continue
            | MessageType::Stop
            | MessageType::ActiveSensing
            | MessageType::SystemReset => MessageCategory::SystemRealTime,
            MessageType::Invalid => MessageCategory::Invalid,
        }
    }

    /// Only channel voice messages may be sent with running status.
    pub fn is_channel_voice(self) -> bool {
        self.category() == MessageCategory::ChannelVoice
    }

    /// Real-time messages may be interleaved anywhere in the stream.
    pub fn is_real_time(self) -> bool {
        self.category() == MessageCategory::SystemRealTime
    }

    /// Total length of the message including its status byte.
    ///
    /// `None` for kinds that are never completed by the decoder: system
    /// exclusive (variable length), its terminator, and invalid bytes.
    pub fn expected_length(self) -> Option<usize> {
        match self {
            MessageType::Start
            | MessageType::Continue
            | MessageType::Stop
            | MessageType::Clock
            | MessageType::ActiveSensing
            | MessageType::SystemReset
            | MessageType::TuneRequest => Some(1),
            MessageType::ProgramChange
            | MessageType::AfterTouchChannel
            | MessageType::TimeCodeQuarterFrame
            | MessageType::SongSelect => Some(2),
            MessageType::NoteOn
            | MessageType::NoteOff
            | MessageType::ControlChange
            | MessageType::PitchBend
            | MessageType::AfterTouchPoly
            | MessageType::SongPosition => Some(3),
            MessageType::SystemExclusive | MessageType::EndOfExclusive | MessageType::Invalid => {
                None
            }
        }
    }

    /// Status byte for this kind. `channel` (1 to 16) only matters for
    /// channel voice kinds and wraps like the four bit field it ends up in.
    pub fn status_byte(self, channel: u8) -> u8 {
        if self.is_channel_voice() {
            self as u8 | (channel.wrapping_sub(1) & 0x0F)
        } else {
            self as u8
        }
    }
}
