//! Telnet input decoding: IAC negotiation filtering and line assembly.

const IAC: u8 = 255;
const WILL: u8 = 251;
const WONT: u8 = 252;
const DO: u8 = 253;
const DONT: u8 = 254;
const SB: u8 = 250;
const SE: u8 = 240;

/// Longest line kept; bytes past this are dropped until the next newline.
pub const MAX_LINE_LEN: usize = 4096;

/// Position inside a Telnet command sequence. Carried across reads so a
/// sequence split between two TCP segments is still removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum IacState {
    #[default]
    Data,
    Command,
    Option,
    Subnegotiation,
    SubnegotiationIac,
}

/// Advance the IAC filter by one byte, returning the byte if it is data.
fn step(state: &mut IacState, byte: u8) -> Option<u8> {
    match *state {
        IacState::Data => {
            if byte == IAC {
                *state = IacState::Command;
                None
            } else {
                Some(byte)
            }
        }
        IacState::Command => match byte {
            WILL | WONT | DO | DONT => {
                *state = IacState::Option;
                None
            }
            SB => {
                *state = IacState::Subnegotiation;
                None
            }
            IAC => {
                // Escaped literal 255
                *state = IacState::Data;
                Some(IAC)
            }
            _ => {
                *state = IacState::Data;
                None
            }
        },
        IacState::Option => {
            *state = IacState::Data;
            None
        }
        IacState::Subnegotiation => {
            if byte == IAC {
                *state = IacState::SubnegotiationIac;
            }
            None
        }
        IacState::SubnegotiationIac => {
            *state = if byte == SE {
                IacState::Data
            } else {
                IacState::Subnegotiation
            };
            None
        }
    }
}

/// Buffered line reader for Telnet input.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
    iac: IacState,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw data into the buffer. Returns any complete lines.
    pub fn feed(&mut self, data: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();

        for &raw in data {
            let Some(byte) = step(&mut self.iac, raw) else {
                continue;
            };
            match byte {
                b'\n' => lines.push(self.take_line()),
                b'\r' => {}
                _ if self.buf.len() < MAX_LINE_LEN => self.buf.push(byte),
                _ => {}
            }
        }

        lines
    }

    /// Take whatever unterminated text is buffered, if any.
    pub fn finish(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            None
        } else {
            Some(self.take_line())
        }
    }

    fn take_line(&mut self) -> String {
        let bytes = std::mem::take(&mut self.buf);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}
