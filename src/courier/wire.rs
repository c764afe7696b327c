use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::{
    command::{Command, Opcode, Response},
    error::{CourierError, CourierResult},
};

/// Binary protocol endpoint over a reliable byte stream.
pub struct Courier<S> {
    stream: S,
}

impl<S> Courier<S> {
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: AsyncRead + Unpin> Courier<S> {
    /// Reads the next command. `Ok(None)` means the peer shut down cleanly
    /// before sending any byte of a new command.
    pub async fn recv_command(&mut self) -> CourierResult<Option<Command>> {
        let Some(opcode) = self.recv_opcode().await? else {
            return Ok(None);
        };

        let command = match Opcode::try_from(opcode)? {
            Opcode::Insert => {
                let position = self.recv_i32("insert position").await?;
                let text = self.recv_short_string().await?;
                Command::Insert { position, text }
            }
            Opcode::Delete => {
                let from = self.recv_i32("delete start").await?;
                let to = self.recv_i32("delete end").await?;
                Command::Delete { from, to }
            }
            Opcode::Space => {
                let position = self.recv_i32("space position").await?;
                Command::Space { position }
            }
            Opcode::Newline => {
                let position = self.recv_i32("newline position").await?;
                Command::Newline { position }
            }
            Opcode::Print => Command::Print,
        };

        Ok(Some(command))
    }

    pub async fn recv_response(&mut self) -> CourierResult<Response> {
        let len = self.recv_i32("response length").await?;
        let len = u64::try_from(len).map_err(|_| CourierError::InvalidLength {
            field: "response",
            len: len.into(),
        })?;

        // grows only as bytes arrive, whatever length the peer announced
        let mut text = Vec::new();
        let read = (&mut self.stream).take(len).read_to_end(&mut text).await?;
        if read as u64 != len {
            return Err(CourierError::Truncated("response"));
        }

        Ok(Response { text })
    }

    async fn recv_opcode(&mut self) -> CourierResult<Option<i32>> {
        let mut buf = [0u8; 4];
        let mut filled = 0;

        while filled < buf.len() {
            let n = self.stream.read(&mut buf[filled..]).await?;
            if n == 0 {
                if filled == 0 {
                    return Ok(None);
                }
                return Err(CourierError::Truncated("opcode"));
            }
            filled += n;
        }

        Ok(Some(i32::from_be_bytes(buf)))
    }

    async fn recv_i32(&mut self, field: &'static str) -> CourierResult<i32> {
        self.stream
            .read_i32()
            .await
            .map_err(|e| CourierError::truncated(e, field))
    }

    async fn recv_short_string(&mut self) -> CourierResult<Vec<u8>> {
        let len = self
            .stream
            .read_i16()
            .await
            .map_err(|e| CourierError::truncated(e, "insert length"))?;
        let len = usize::try_from(len).map_err(|_| CourierError::InvalidLength {
            field: "insert text",
            len: len.into(),
        })?;

        let mut text = vec![0; len];
        self.stream
            .read_exact(&mut text)
            .await
            .map_err(|e| CourierError::truncated(e, "insert text"))?;
        Ok(text)
    }
}

impl<S: AsyncWrite + Unpin> Courier<S> {
    pub async fn send_command(&mut self, command: &Command) -> CourierResult<()> {
        let mut buf = Vec::new();
        command.encode(&mut buf)?;
        self.send(&buf, "command").await
    }

    pub async fn send_response(&mut self, response: &Response) -> CourierResult<()> {
        let mut buf = Vec::with_capacity(response.text.len() + 4);
        response.encode(&mut buf)?;
        self.send(&buf, "response").await
    }

    async fn send(&mut self, buf: &[u8], what: &'static str) -> CourierResult<()> {
        self.stream
            .write_all(buf)
            .await
            .map_err(|e| CourierError::short_write(e, what))?;
        self.stream.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    fn encoded(commands: &[Command]) -> Vec<u8> {
        let mut buf = Vec::new();
        for command in commands {
            command.encode(&mut buf).unwrap();
        }
        buf
    }

    #[tokio::test]
    async fn insert_roundtrips_through_the_wire() {
        let command = Command::Insert {
            position: 3,
            text: b"ab".to_vec(),
        };

        let mut sender = Courier::new(Vec::new());
        sender.send_command(&command).await.unwrap();
        let bytes = sender.into_inner();

        let mut receiver = Courier::new(&bytes[..]);
        assert_eq!(receiver.recv_command().await.unwrap(), Some(command));
        assert_eq!(receiver.recv_command().await.unwrap(), None);
    }

    #[tokio::test]
    async fn decodes_a_sequence_of_commands() {
        let commands = vec![
            Command::Delete { from: 0, to: -1 },
            Command::Space { position: 7 },
            Command::Newline { position: -1 },
            Command::Insert {
                position: 0,
                text: Vec::new(),
            },
            Command::Print,
        ];
        let bytes = encoded(&commands);

        let mut receiver = Courier::new(&bytes[..]);
        for command in commands {
            assert_eq!(receiver.recv_command().await.unwrap(), Some(command));
        }
        assert_eq!(receiver.recv_command().await.unwrap(), None);
    }

    #[tokio::test]
    async fn empty_stream_is_a_clean_end() {
        let mut receiver = Courier::new(&[0u8; 0][..]);
        assert_eq!(receiver.recv_command().await.unwrap(), None);
    }

    #[tokio::test]
    async fn partial_opcode_is_truncation() {
        let mut receiver = Courier::new(&[0u8, 0][..]);
        assert!(matches!(
            receiver.recv_command().await,
            Err(CourierError::Truncated("opcode"))
        ));
    }

    #[tokio::test]
    async fn missing_fields_are_truncation() {
        let bytes = encoded(&[Command::Delete { from: 1, to: 2 }]);
        let mut receiver = Courier::new(&bytes[..bytes.len() - 2]);
        assert!(matches!(
            receiver.recv_command().await,
            Err(CourierError::Truncated("delete end"))
        ));

        let bytes = encoded(&[Command::Insert {
            position: 0,
            text: b"hello".to_vec(),
        }]);
        let mut receiver = Courier::new(&bytes[..bytes.len() - 1]);
        assert!(matches!(
            receiver.recv_command().await,
            Err(CourierError::Truncated("insert text"))
        ));
    }

    #[tokio::test]
    async fn unknown_opcode_is_rejected() {
        let bytes = 9i32.to_be_bytes();
        let mut receiver = Courier::new(&bytes[..]);
        assert!(matches!(
            receiver.recv_command().await,
            Err(CourierError::UnknownOpcode(9))
        ));
    }

    #[tokio::test]
    async fn negative_insert_length_is_rejected() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1i32.to_be_bytes());
        bytes.extend_from_slice(&0i32.to_be_bytes());
        bytes.extend_from_slice(&(-2i16).to_be_bytes());

        let mut receiver = Courier::new(&bytes[..]);
        assert!(matches!(
            receiver.recv_command().await,
            Err(CourierError::InvalidLength {
                field: "insert text",
                len: -2
            })
        ));
    }

    #[tokio::test]
    async fn response_roundtrips_through_the_wire() {
        let response = Response {
            text: b"Hello World!\n".to_vec(),
        };

        let mut sender = Courier::new(Vec::new());
        sender.send_response(&response).await.unwrap();
        let bytes = sender.into_inner();
        assert_eq!(&bytes[..4], &13i32.to_be_bytes());

        let mut receiver = Courier::new(&bytes[..]);
        assert_eq!(receiver.recv_response().await.unwrap(), response);
    }

    #[tokio::test]
    async fn truncated_response_is_reported() {
        let mut receiver = Courier::new(&[0u8, 0, 0, 4, b'a'][..]);
        assert!(matches!(
            receiver.recv_response().await,
            Err(CourierError::Truncated("response"))
        ));
    }

    #[tokio::test]
    async fn huge_response_length_without_bytes_is_truncation() {
        let mut bytes = i32::MAX.to_be_bytes().to_vec();
        bytes.extend_from_slice(b"only a few bytes");

        let mut receiver = Courier::new(&bytes[..]);
        assert!(matches!(
            receiver.recv_response().await,
            Err(CourierError::Truncated("response"))
        ));
    }

    #[tokio::test]
    async fn negative_response_length_is_rejected() {
        let bytes = (-1i32).to_be_bytes();
        let mut receiver = Courier::new(&bytes[..]);
        assert!(matches!(
            receiver.recv_response().await,
            Err(CourierError::InvalidLength {
                field: "response",
                len: -1
            })
        ));
    }

    #[tokio::test]
    async fn full_transport_is_a_short_write() {
        let mut storage = [0u8; 6];
        let mut sender = Courier::new(Cursor::new(&mut storage[..]));

        let command = Command::Insert {
            position: 0,
            text: b"abc".to_vec(),
        };
        let result = sender.send_command(&command).await;
        assert!(matches!(result, Err(CourierError::ShortWrite("command"))));
    }
}
