//! TCP client for the mixer daemon

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::sync::Mutex;
use tracing::{debug, instrument, trace};

use super::wire::{WireReply, WireRequest};
use jmctl_core::domain::port::{Direction, Port, PortRef, Property};
use jmctl_core::domain::target::{MixerError, MixerTarget, Result};

struct Connection {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

/// Client holding one connection to the daemon
///
/// Requests are serialized over the connection; each one waits for its reply
/// before the next is sent.
pub struct JamyxerClient {
    conn: Mutex<Connection>,
}

impl JamyxerClient {
    #[instrument(skip(addr))]
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        debug!(peer = ?stream.peer_addr().ok(), "Connected to mixer daemon");

        let (read, writer) = stream.into_split();
        Ok(Self {
            conn: Mutex::new(Connection {
                lines: BufReader::new(read).lines(),
                writer,
            }),
        })
    }

    async fn call<R: DeserializeOwned>(&self, request: WireRequest) -> Result<R> {
        let mut line = serde_json::to_string(&request)
            .map_err(|e| MixerError::Protocol(format!("Failed to encode request: {e}")))?;
        line.push('\n');

        let mut conn = self.conn.lock().await;
        trace!(request = line.trim_end(), "Sending");
        conn.writer.write_all(line.as_bytes()).await?;
        conn.writer.flush().await?;

        let reply = conn.lines.next_line().await?.ok_or_else(|| {
            MixerError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "daemon closed the connection",
            ))
        })?;
        trace!(reply = %reply, "Received");

        let reply: WireReply = serde_json::from_str(&reply)
            .map_err(|e| MixerError::Protocol(format!("Malformed reply: {e}")))?;
        match reply {
            WireReply::Ok(payload) => serde_json::from_value(payload)
                .map_err(|e| MixerError::Protocol(format!("Unexpected payload: {e}"))),
            WireReply::Error(err) => Err(err.into_mixer_error(request.subject())),
        }
    }

    async fn command(&self, request: WireRequest) -> Result<()> {
        let _: serde_json::Value = self.call(request).await?;
        Ok(())
    }
}

#[async_trait]
impl MixerTarget for JamyxerClient {
    async fn ports(&self, direction: Direction) -> Result<Vec<Port>> {
        self.call(WireRequest::Ports { direction }).await
    }

    async fn port(&self, port: &PortRef) -> Result<Port> {
        self.call(WireRequest::Port { port: port.clone() }).await
    }

    async fn monitor(&self) -> Result<Port> {
        let monitor: Option<Port> = self.call(WireRequest::Monitor).await?;
        monitor.ok_or(MixerError::NoMonitor)
    }

    async fn set_volume(&self, port: &PortRef, volume: f32) -> Result<()> {
        self.command(WireRequest::SetVolume {
            port: port.clone(),
            value: volume,
        })
        .await
    }

    async fn set_balance(&self, port: &PortRef, balance: f32) -> Result<()> {
        self.command(WireRequest::SetBalance {
            port: port.clone(),
            value: balance,
        })
        .await
    }

    async fn connect(&self, port: &PortRef, other: &str) -> Result<()> {
        self.command(WireRequest::Connect {
            port: port.clone(),
            other: other.to_string(),
        })
        .await
    }

    async fn disconnect(&self, port: &PortRef, other: &str) -> Result<()> {
        self.command(WireRequest::Disconnect {
            port: port.clone(),
            other: other.to_string(),
        })
        .await
    }

    async fn toggle_connection(&self, port: &PortRef, other: &str) -> Result<()> {
        self.command(WireRequest::Toggle {
            port: port.clone(),
            other: other.to_string(),
        })
        .await
    }

    async fn set_monitor(&self, port: &PortRef) -> Result<()> {
        self.command(WireRequest::SetMonitor { port: port.clone() }).await
    }

    async fn wait_for_change(&self, port: &PortRef, property: Property) -> Result<Port> {
        debug!(%port, %property, "Waiting for change");
        self.call(WireRequest::Wait {
            port: port.clone(),
            property,
        })
        .await
    }
}
