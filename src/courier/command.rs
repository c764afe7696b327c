use std::fmt;

use super::error::{CourierError, CourierResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Opcode {
    Insert = 1,
    Delete = 2,
    Space = 3,
    Newline = 4,
    Print = 5,
}

impl TryFrom<i32> for Opcode {
    type Error = CourierError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Opcode::Insert),
            2 => Ok(Opcode::Delete),
            3 => Ok(Opcode::Space),
            4 => Ok(Opcode::Newline),
            5 => Ok(Opcode::Print),
            other => Err(CourierError::UnknownOpcode(other)),
        }
    }
}

/// Editing command as it travels between client and server. Positions may be
/// negative, counting back from the end of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Insert { position: i32, text: Vec<u8> },
    Delete { from: i32, to: i32 },
    Space { position: i32 },
    Newline { position: i32 },
    Print,
}

impl Command {
    pub fn opcode(&self) -> Opcode {
        match self {
            Command::Insert { .. } => Opcode::Insert,
            Command::Delete { .. } => Opcode::Delete,
            Command::Space { .. } => Opcode::Space,
            Command::Newline { .. } => Opcode::Newline,
            Command::Print => Opcode::Print,
        }
    }

    /// Appends the network form of the command to `buf`. Integers are
    /// big-endian; insert text carries a 16 bit length prefix.
    pub fn encode(&self, buf: &mut Vec<u8>) -> CourierResult<()> {
        if let Command::Insert { text, .. } = self {
            if i16::try_from(text.len()).is_err() {
                return Err(CourierError::TooLong {
                    field: "insert text",
                    len: text.len(),
                });
            }
        }

        buf.extend_from_slice(&(self.opcode() as i32).to_be_bytes());

        match self {
            Command::Insert { position, text } => {
                buf.extend_from_slice(&position.to_be_bytes());
                buf.extend_from_slice(&(text.len() as i16).to_be_bytes());
                buf.extend_from_slice(text);
            }
            Command::Delete { from, to } => {
                buf.extend_from_slice(&from.to_be_bytes());
                buf.extend_from_slice(&to.to_be_bytes());
            }
            Command::Space { position } | Command::Newline { position } => {
                buf.extend_from_slice(&position.to_be_bytes());
            }
            Command::Print => {}
        }

        Ok(())
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Insert { position, text } => {
                write!(f, "insert {} {}", position, String::from_utf8_lossy(text))
            }
            Command::Delete { from, to } => write!(f, "delete {} {}", from, to),
            Command::Space { position } => write!(f, "space {}", position),
            Command::Newline { position } => write!(f, "newline {}", position),
            Command::Print => f.write_str("print"),
        }
    }
}

/// Full contents of a document, sent back for every print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub text: Vec<u8>,
}

impl Response {
    pub fn encode(&self, buf: &mut Vec<u8>) -> CourierResult<()> {
        let len = i32::try_from(self.text.len()).map_err(|_| CourierError::TooLong {
            field: "response",
            len: self.text.len(),
        })?;

        buf.extend_from_slice(&len.to_be_bytes());
        buf.extend_from_slice(&self.text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert(position: i32, text: &[u8]) -> Command {
        Command::Insert {
            position,
            text: text.to_vec(),
        }
    }

    #[test]
    fn insert_layout_matches_wire_format() {
        let mut buf = Vec::new();
        insert(3, b"ab").encode(&mut buf).unwrap();

        assert_eq!(buf, [0, 0, 0, 1, 0, 0, 0, 3, 0, 2, b'a', b'b']);
    }

    #[test]
    fn negative_positions_are_twos_complement() {
        let mut buf = Vec::new();
        Command::Delete { from: 5, to: -1 }.encode(&mut buf).unwrap();

        assert_eq!(buf, [0, 0, 0, 2, 0, 0, 0, 5, 0xff, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn print_is_a_bare_opcode() {
        let mut buf = Vec::new();
        Command::Print.encode(&mut buf).unwrap();
        Command::Newline { position: 0 }.encode(&mut buf).unwrap();

        assert_eq!(buf, [0, 0, 0, 5, 0, 0, 0, 4, 0, 0, 0, 0]);
    }

    #[test]
    fn oversized_insert_text_is_rejected() {
        let mut buf = Vec::new();
        let command = insert(0, &vec![b'x'; i16::MAX as usize + 1]);

        assert!(matches!(
            command.encode(&mut buf),
            Err(CourierError::TooLong {
                field: "insert text",
                ..
            })
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn response_uses_a_32_bit_length() {
        let mut buf = Vec::new();
        let response = Response {
            text: b"hi".to_vec(),
        };
        response.encode(&mut buf).unwrap();

        assert_eq!(buf, [0, 0, 0, 2, b'h', b'i']);
    }

    #[test]
    fn opcodes_outside_the_vocabulary_are_rejected() {
        assert_eq!(Opcode::try_from(3).unwrap(), Opcode::Space);
        assert!(matches!(
            Opcode::try_from(0),
            Err(CourierError::UnknownOpcode(0))
        ));
        assert!(matches!(
            Opcode::try_from(6),
            Err(CourierError::UnknownOpcode(6))
        ));
    }

    #[test]
    fn display_renders_text_form() {
        assert_eq!(insert(-1, b"hey").to_string(), "insert -1 hey");
        assert_eq!(Command::Delete { from: 0, to: 4 }.to_string(), "delete 0 4");
        assert_eq!(Command::Print.to_string(), "print");
    }
}
