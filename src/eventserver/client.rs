//! UDP client for one EventServer session: HELO, BUTTON, PING, BYE.

use chrono::{DateTime, Local};
use tokio::net::UdpSocket;
use tracing::{debug, info};

use super::packet::{self, PacketType};
use crate::mapping::ButtonEvent;

/// Transport failures talking to the EventServer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Failed to reach EventServer: {0}")]
    Io(#[from] std::io::Error),
}

/// Connection status, updated on every send.
#[derive(Clone, Debug, Default)]
pub struct ClientStatus {
    pub datagrams_sent: usize,
    pub last_activity: Option<DateTime<Local>>,
}

/// One EventServer session over UDP.
pub struct EventClient {
    socket: UdpSocket,
    uid: u32,
    status: ClientStatus,
}

impl EventClient {
    /// Opens the session: binds a socket, connects it to the receiver, and
    /// sends the HELO handshake. Returns the client plus the handshake bytes
    /// written; any failure here is fatal to startup.
    pub async fn connect(
        host: &str,
        port: u16,
        device_name: &str,
    ) -> Result<(Self, usize), TransportError> {
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        socket.connect((host, port)).await?;

        let mut client = Self {
            socket,
            uid: std::process::id(),
            status: ClientStatus::default(),
        };

        debug!("Sending HELO as {:?}", device_name);
        let bytes = client
            .send(PacketType::Helo, &packet::helo_payload(device_name))
            .await?;
        info!("EventServer session opened");
        Ok((client, bytes))
    }

    /// Sends one button state event. Failures are the caller's to log; the
    /// session stays usable afterwards.
    pub async fn send_button_state(
        &mut self,
        event: &ButtonEvent,
    ) -> Result<usize, TransportError> {
        self.send(PacketType::Button, &packet::button_payload(event))
            .await
    }

    /// Keep-alive; the receiver drops sessions idle for about a minute.
    pub async fn ping(&mut self) -> Result<usize, TransportError> {
        self.send(PacketType::Ping, &[]).await
    }

    /// Announces the end of the session.
    pub async fn bye(&mut self) -> Result<usize, TransportError> {
        self.send(PacketType::Bye, &[]).await
    }

    pub fn status(&self) -> &ClientStatus {
        &self.status
    }

    async fn send(
        &mut self,
        packet_type: PacketType,
        payload: &[u8],
    ) -> Result<usize, TransportError> {
        let datagram = packet::encode(packet_type, payload, self.uid);
        let bytes = self.socket.send(&datagram).await?;
        self.status.datagrams_sent += 1;
        self.status.last_activity = Some(Local::now());
        Ok(bytes)
    }
}
