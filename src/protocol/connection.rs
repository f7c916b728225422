//! Client connection to a FalkorDB server over RESP
//!
//! One TCP stream, one request in flight at a time. Replies are read into a
//! growable buffer; the decoder scans each byte once and builds the value
//! when the frame is complete.

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

use crate::client::GraphHandle;
use crate::error::{ExportError, ExportResult};
use crate::protocol::resp::{RespDecoder, RespValue};

/// An open session to one server endpoint that has passed the PING handshake
pub struct FalkorConnection {
    stream: TcpStream,
    buffer: BytesMut,
    decoder: RespDecoder,
    addr: String,
}

impl FalkorConnection {
    /// Connect to `host:port` and verify the server speaks RESP.
    ///
    /// Fails with [`ExportError::Connection`] if the endpoint is unreachable
    /// or does not answer `PING` with `PONG`. There is no retry.
    pub async fn connect(host: &str, port: u16) -> ExportResult<Self> {
        let addr = format!("{}:{}", host, port);
        debug!("Connecting to {}", addr);

        let stream = TcpStream::connect((host, port))
            .await
            .map_err(|e| ExportError::Connection(format!("Failed to connect to {}: {}", addr, e)))?;

        let mut conn = Self {
            stream,
            buffer: BytesMut::with_capacity(4096),
            decoder: RespDecoder::new(),
            addr,
        };
        conn.handshake().await?;
        Ok(conn)
    }

    /// Address this connection was opened against
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Bind the session to a named graph. No network round-trip happens here;
    /// a graph that does not exist simply returns empty results when queried.
    pub fn select_graph(self, name: impl Into<String>) -> GraphHandle {
        GraphHandle::new(self, name.into())
    }

    async fn handshake(&mut self) -> ExportResult<()> {
        let reply = self
            .request(&RespValue::command(["PING"]))
            .await
            .map_err(|e| ExportError::Connection(format!("Handshake with {} failed: {}", self.addr, e)))?;

        match reply {
            RespValue::SimpleString(ref s) if s.eq_ignore_ascii_case("PONG") => Ok(()),
            other => Err(ExportError::Connection(format!(
                "Handshake with {} failed: unexpected PING reply {:?}",
                self.addr, other
            ))),
        }
    }

    /// Send one command frame and wait for its reply frame
    pub async fn request(&mut self, command: &RespValue) -> ExportResult<RespValue> {
        let mut out = Vec::new();
        command.encode(&mut out)?;
        self.stream
            .write_all(&out)
            .await
            .map_err(|e| ExportError::Connection(format!("Failed to write to {}: {}", self.addr, e)))?;

        loop {
            if let Some(value) = self.decoder.decode(&mut self.buffer)? {
                return Ok(value);
            }

            let n = self
                .stream
                .read_buf(&mut self.buffer)
                .await
                .map_err(|e| ExportError::Connection(format!("Failed to read from {}: {}", self.addr, e)))?;

            if n == 0 {
                return Err(ExportError::Connection(format!(
                    "Connection to {} closed before a full reply arrived",
                    self.addr
                )));
            }
        }
    }
}
