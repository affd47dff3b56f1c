use std::sync::Arc;

use bevy_app::prelude::*;
use bevy_ecs::prelude::*;
use bytes::BytesMut;
use parking_lot::Mutex;
use tally_protocol::decode::PacketFrame;
use tally_protocol::{Decode, Packet, PacketDecoder};
use tally_scoreboard::ClientConnection;
use tally_server::ClientBundle;

use crate::DefaultPlugins;

pub struct ScenarioSingleClient {
    /// The new bevy application.
    pub app: App,
    /// Entity handle for the single client.
    pub client: Entity,
    /// Helper for receiving packets as the mock client.
    pub helper: MockClientHelper,
}

impl ScenarioSingleClient {
    /// Sets up Tally with a single mock client named `test`.
    ///
    /// Reduces boilerplate in unit tests.
    pub fn new() -> Self {
        let mut app = App::new();

        app.add_plugins(test_plugins());

        app.update(); // Initialize plugins.

        let (client, helper) = create_mock_client("test");
        let client = app.world_mut().spawn(client).id();

        ScenarioSingleClient {
            app,
            client,
            helper,
        }
    }
}

impl Default for ScenarioSingleClient {
    fn default() -> Self {
        Self::new()
    }
}

/// [`DefaultPlugins`] without anything that installs global state.
pub fn test_plugins() -> bevy_app::PluginGroupBuilder {
    #[allow(unused_mut)]
    let mut group = DefaultPlugins.build();

    #[cfg(feature = "log")]
    {
        group = group.disable::<bevy_log::LogPlugin>();
    }

    group
}

/// Creates a mock client bundle that can be used for unit testing.
///
/// Returns the client, and a helper to receive packets as if the client
/// received them.
pub fn create_mock_client(name: impl Into<String>) -> (ClientBundle, MockClientHelper) {
    let conn = MockClientConnection::new();

    let bundle = ClientBundle::new(name, conn.clone());
    let helper = MockClientHelper::new(conn);

    (bundle, helper)
}

/// A mock client connection that can be used for testing.
///
/// Safe to clone, but note that the clone will share the same buffers.
#[derive(Clone)]
pub struct MockClientConnection {
    inner: Arc<Mutex<MockClientConnectionInner>>,
}

struct MockClientConnectionInner {
    /// The queue of packets to send from the server to the client.
    send_buf: BytesMut,
    /// The text currently shown under the client's nametag.
    score_tag: String,
}

impl MockClientConnection {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockClientConnectionInner {
                send_buf: BytesMut::new(),
                score_tag: String::new(),
            })),
        }
    }

    fn take_received(&self) -> BytesMut {
        self.inner.lock().send_buf.split()
    }

    fn clear_received(&self) {
        self.inner.lock().send_buf.clear();
    }
}

impl ClientConnection for MockClientConnection {
    fn try_send(&self, bytes: BytesMut) -> anyhow::Result<()> {
        self.inner.lock().send_buf.unsplit(bytes);
        Ok(())
    }

    fn set_score_tag(&self, tag: &str) -> anyhow::Result<()> {
        tag.clone_into(&mut self.inner.lock().score_tag);
        Ok(())
    }
}

impl Default for MockClientConnection {
    fn default() -> Self {
        Self::new()
    }
}

/// Contains the mocked client connection and helper methods to read packets
/// from the send stream.
pub struct MockClientHelper {
    conn: MockClientConnection,
    dec: PacketDecoder,
}

impl MockClientHelper {
    pub fn new(conn: MockClientConnection) -> Self {
        Self {
            conn,
            dec: PacketDecoder::new(),
        }
    }

    /// Collect all packets that have been received by the client.
    #[track_caller]
    pub fn collect_received(&mut self) -> PacketFrames {
        self.dec.queue_bytes(self.conn.take_received());

        let mut res = vec![];

        while let Some(frame) = self
            .dec
            .try_next_packet()
            .expect("failed to decode packet frame")
        {
            res.push(frame);
        }

        PacketFrames(res)
    }

    pub fn clear_received(&mut self) {
        self.conn.clear_received();
    }

    /// The text currently shown under the client's nametag.
    pub fn score_tag(&self) -> String {
        self.conn.inner.lock().score_tag.clone()
    }
}

#[derive(Clone, Debug)]
pub struct PacketFrames(pub Vec<PacketFrame>);

impl PacketFrames {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[track_caller]
    pub fn assert_count<P: Packet>(&self, expected_count: usize) {
        let actual_count = self.0.iter().filter(|f| f.id == P::ID).count();

        assert_eq!(
            expected_count,
            actual_count,
            "unexpected packet count for {}",
            P::NAME
        );
    }

    #[track_caller]
    pub fn assert_order<L: PacketList>(&self) {
        let positions: Vec<_> = self
            .0
            .iter()
            .filter_map(|f| L::packets().iter().position(|(id, _)| f.id == *id))
            .collect();

        let is_sorted = positions.windows(2).all(|w| w[0] <= w[1]);

        assert!(
            is_sorted,
            "packets out of order (expected {:?}, got {:?})",
            L::packets(),
            self.debug_order::<L>()
        );
    }

    /// Finds the first occurrence of `P` in the packet list and decodes it.
    ///
    /// # Panics
    ///
    /// Panics if the packet was not found or a decoding error occurs.
    #[track_caller]
    pub fn first<'a, P>(&'a self) -> P
    where
        P: Packet + Decode<'a>,
    {
        if let Some(frame) = self.0.iter().find(|p| p.id == P::ID) {
            frame.decode::<P>().unwrap()
        } else {
            panic!("failed to find packet {}", P::NAME)
        }
    }

    /// Decodes every occurrence of `P`, in the order they were received.
    #[track_caller]
    pub fn all<'a, P>(&'a self) -> Vec<P>
    where
        P: Packet + Decode<'a>,
    {
        self.0
            .iter()
            .filter(|p| p.id == P::ID)
            .map(|frame| frame.decode::<P>().unwrap())
            .collect()
    }

    pub fn debug_order<L: PacketList>(&self) -> impl std::fmt::Debug {
        self.0
            .iter()
            .filter_map(|f| L::packets().iter().find(|(id, _)| f.id == *id).copied())
            .collect::<Vec<_>>()
    }
}

pub trait PacketList {
    fn packets() -> &'static [(i32, &'static str)];
}

macro_rules! impl_packet_list {
    ($($ty:ident),*) => {
        impl<$($ty: Packet,)*> PacketList for ($($ty,)*) {
            fn packets() -> &'static [(i32, &'static str)] {
                &[
                    $(
                        (
                            $ty::ID,
                            $ty::NAME
                        ),
                    )*
                ]
            }
        }
    }
}

impl_packet_list!(A);
impl_packet_list!(A, B);
impl_packet_list!(A, B, C);
impl_packet_list!(A, B, C, D);
