use std::fmt;
use std::sync::Arc;

use bytes::BytesMut;
use tally_protocol::encode::{PacketEncoder, WritePacket};
use tally_protocol::{Encode, Packet};
use tracing::warn;

/// The transport behind a connected client.
///
/// Implementations are shared between the host and the registry, so both
/// methods take `&self`.
pub trait ClientConnection: Send + Sync + 'static {
    /// Sends encoded clientbound packet data. This function must not block and
    /// the data should be sent as soon as possible.
    fn try_send(&self, bytes: BytesMut) -> anyhow::Result<()>;
    /// Sets the text rendered underneath the client's nametag. An empty string
    /// clears it.
    fn set_score_tag(&self, tag: &str) -> anyhow::Result<()>;
}

/// A cheap, clonable handle to a connected client.
#[derive(Clone)]
pub struct ClientHandle {
    username: Arc<str>,
    conn: Arc<dyn ClientConnection>,
}

impl ClientHandle {
    pub fn new<S, C>(username: S, conn: C) -> Self
    where
        S: Into<Arc<str>>,
        C: ClientConnection,
    {
        Self::from_shared(username, Arc::new(conn))
    }

    pub fn from_shared<S>(username: S, conn: Arc<dyn ClientConnection>) -> Self
    where
        S: Into<Arc<str>>,
    {
        Self {
            username: username.into(),
            conn,
        }
    }

    /// The name this client is currently known by.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Sets the score tag shown under the client's nametag. Failures are
    /// logged and discarded.
    pub fn set_score_tag(&self, tag: &str) {
        if let Err(e) = self.conn.set_score_tag(tag) {
            warn!("failed to set score tag of '{}': {e:#}", self.username);
        }
    }

    /// Returns `true` if both handles share the same connection.
    pub fn same_connection(&self, other: &ClientHandle) -> bool {
        Arc::ptr_eq(&self.conn, &other.conn)
    }
}

impl WritePacket for ClientHandle {
    fn write_packet_fallible<P>(&mut self, packet: &P) -> anyhow::Result<()>
    where
        P: Packet + Encode,
    {
        let mut enc = PacketEncoder::new();
        enc.append_packet(packet)?;
        self.conn.try_send(enc.take())
    }

    fn write_packet_bytes(&mut self, bytes: &[u8]) {
        if let Err(e) = self.conn.try_send(BytesMut::from(bytes)) {
            warn!("failed to write packet bytes to '{}': {e:#}", self.username);
        }
    }
}

impl fmt::Debug for ClientHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientHandle")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Looks up connected clients by name.
pub trait PlayerDirectory: Send + Sync + 'static {
    /// Returns the client currently connected under `name`, if any.
    fn resolve(&self, name: &str) -> Option<ClientHandle>;
}
