//! Incremental UTF-8 decoding in front of the state machine.
//!
//! Malformed input never stops the stream: an invalid lead byte becomes
//! U+FFFD, and a sequence cut short by a byte that cannot continue it
//! becomes U+FFFD followed by that byte decoded on its own.

use std::char::REPLACEMENT_CHARACTER;

#[derive(Debug, Clone)]
pub struct Utf8Decoder {
    code_point: u32,
    needed: u8,
    seen: u8,
    /// Valid range for the next continuation byte
    lower: u8,
    upper: u8,
}

impl Default for Utf8Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self {
            code_point: 0,
            needed: 0,
            seen: 0,
            lower: 0x80,
            upper: 0xBF,
        }
    }

    /// True when no multi-byte sequence is pending
    pub fn is_idle(&self) -> bool {
        self.needed == 0
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Feed one byte, calling `emit` for each completed code point (at most two).
    pub fn decode<F: FnMut(char)>(&mut self, byte: u8, emit: &mut F) {
        if self.needed == 0 {
            match byte {
                0x00..=0x7F => emit(byte as char),
                0xC2..=0xDF => {
                    self.needed = 1;
                    self.code_point = u32::from(byte & 0x1F);
                }
                0xE0..=0xEF => {
                    match byte {
                        0xE0 => self.lower = 0xA0,
                        0xED => self.upper = 0x9F,
                        _ => {}
                    }
                    self.needed = 2;
                    self.code_point = u32::from(byte & 0x0F);
                }
                0xF0..=0xF4 => {
                    match byte {
                        0xF0 => self.lower = 0x90,
                        0xF4 => self.upper = 0x8F,
                        _ => {}
                    }
                    self.needed = 3;
                    self.code_point = u32::from(byte & 0x07);
                }
                _ => emit(REPLACEMENT_CHARACTER),
            }
            return;
        }

        if byte < self.lower || byte > self.upper {
            self.reset();
            emit(REPLACEMENT_CHARACTER);
            self.decode(byte, emit);
            return;
        }

        self.lower = 0x80;
        self.upper = 0xBF;
        self.code_point = (self.code_point << 6) | u32::from(byte & 0x3F);
        self.seen += 1;
        if self.seen == self.needed {
            let cp = self.code_point;
            self.reset();
            emit(char::from_u32(cp).unwrap_or(REPLACEMENT_CHARACTER));
        }
    }
}
