// Connect-phase messages exchanged on the well-known port before a client
// moves to its own V086 session port. All are ASCII terminated by NUL.

use std::fmt;

use crate::error::FormatError;

const HELLO: &str = "HELLO";
const HELLO_D00D: &str = "HELLOD00D";
const TOO: &str = "TOO";
const PING: &str = "PING";
const PONG: &str = "PONG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectMessage {
    /// Client asks for a session speaking `protocol` (e.g. "0.83").
    Hello { protocol: String },
    /// Server grants a session on `port`.
    HelloD00d { port: u16 },
    /// Server is full.
    TooMany,
    Ping,
    Pong,
}

impl ConnectMessage {
    pub fn parse(data: &[u8]) -> Result<Self, FormatError> {
        let text = match data.split_last() {
            Some((&0, text)) => text,
            _ => return Err(FormatError::UnknownConnectMessage(printable(data))),
        };
        let text = std::str::from_utf8(text)
            .map_err(|_| FormatError::UnknownConnectMessage(printable(data)))?;

        // HELLOD00D must be checked before HELLO
        if let Some(port) = text.strip_prefix(HELLO_D00D) {
            let port = port.parse::<u16>().map_err(|_| FormatError::InvalidField {
                field: "port",
                value: -1,
            })?;
            return Ok(ConnectMessage::HelloD00d { port });
        }
        if let Some(protocol) = text.strip_prefix(HELLO) {
            return Ok(ConnectMessage::Hello {
                protocol: protocol.to_string(),
            });
        }
        match text {
            TOO => Ok(ConnectMessage::TooMany),
            PING => Ok(ConnectMessage::Ping),
            PONG => Ok(ConnectMessage::Pong),
            _ => Err(FormatError::UnknownConnectMessage(printable(data))),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = self.to_string().into_bytes();
        out.push(0);
        out
    }
}

impl fmt::Display for ConnectMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectMessage::Hello { protocol } => write!(f, "{}{}", HELLO, protocol),
            ConnectMessage::HelloD00d { port } => write!(f, "{}{}", HELLO_D00D, port),
            ConnectMessage::TooMany => f.write_str(TOO),
            ConnectMessage::Ping => f.write_str(PING),
            ConnectMessage::Pong => f.write_str(PONG),
        }
    }
}

fn printable(data: &[u8]) -> String {
    data.iter()
        .take(64)
        .map(|&b| if b.is_ascii_graphic() { b as char } else { '.' })
        .collect()
}
