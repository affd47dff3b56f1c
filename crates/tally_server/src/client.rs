use std::fmt;
use std::sync::Arc;

use bevy_ecs::prelude::*;
use derive_more::{Deref, From, Into};
use tally_protocol::encode::WritePacket;
use tally_protocol::{Encode, Packet};
use tally_scoreboard::{ClientConnection, ClientHandle};

/// The bundle of components a connected player needs for scoreboards to reach
/// it.
#[derive(Bundle, Debug)]
pub struct ClientBundle {
    pub client: Client,
    pub username: Username,
}

impl ClientBundle {
    pub fn new<S, C>(username: S, conn: C) -> Self
    where
        S: Into<String>,
        C: ClientConnection,
    {
        Self::from_shared(username, Arc::new(conn))
    }

    pub fn from_shared<S>(username: S, conn: Arc<dyn ClientConnection>) -> Self
    where
        S: Into<String>,
    {
        let username = username.into();

        Self {
            client: Client(ClientHandle::from_shared(username.as_str(), conn)),
            username: Username(username),
        }
    }
}

/// A player's connection. Removing this component marks the player as
/// disconnected.
#[derive(Component, Clone, Debug, Deref, From, Into)]
pub struct Client(ClientHandle);

impl WritePacket for Client {
    fn write_packet_fallible<P>(&mut self, packet: &P) -> anyhow::Result<()>
    where
        P: Packet + Encode,
    {
        self.0.write_packet_fallible(packet)
    }

    fn write_packet_bytes(&mut self, bytes: &[u8]) {
        self.0.write_packet_bytes(bytes)
    }
}

/// The name scoreboards address a player by.
#[derive(Component, Clone, PartialEq, Eq, Default, Debug, Deref)]
pub struct Username(pub String);

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}
