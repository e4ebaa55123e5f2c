//! HTTPS Transport Abstraction Traits
//!
//! Traits for the one blocking request/response exchange each operation
//! needs. MCU-specific crates implement these using their HTTP stack.

use sesami_proto::{Request, Response};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// No connection to the host could be established
    #[error("connection failed: {0}")]
    Connect(String),
    /// The connection was up but sending or reading failed
    #[error("exchange failed: {0}")]
    Exchange(String),
}

/// Trait for opening HTTPS connections
///
/// MCU-specific crates implement this trait using their HTTP client
/// (`EspHttpConnection` for ESP32, `reqwest` on a host, etc.)
pub trait Transport {
    /// Connection handle for a single request
    type Connection: Connection;

    /// Open a connection for one request to `url`
    fn open(&mut self, url: &str) -> Result<Self::Connection, TransportError>;
}

/// An open connection, used for exactly one exchange
///
/// Dropping the connection releases it; implementations close sockets and
/// free buffers in `Drop`.
pub trait Connection {
    /// Send the request and read the complete response
    fn send(&mut self, request: &Request) -> Result<Response, TransportError>;
}

/// Read a whole response body through `read`, which fills the buffer it is
/// given and returns 0 at end of body. A body longer than `max_len` is an
/// error, never a shortened body.
pub fn read_body<E, F>(mut read: F, max_len: usize) -> Result<String, TransportError>
where
    E: std::fmt::Debug,
    F: FnMut(&mut [u8]) -> Result<usize, E>,
{
    let mut body = Vec::new();
    let mut buf = [0u8; 512];
    loop {
        let n = read(&mut buf).map_err(|e| TransportError::Exchange(format!("{e:?}")))?;
        if n == 0 {
            break;
        }
        if body.len() + n > max_len {
            return Err(TransportError::Exchange(format!(
                "response body over {max_len} bytes"
            )));
        }
        body.extend_from_slice(&buf[..n]);
    }
    Ok(String::from_utf8_lossy(&body).into_owned())
}
