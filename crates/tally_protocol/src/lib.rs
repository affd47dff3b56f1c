#![doc = include_str!("../README.md")]
#![deny(
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
    rustdoc::missing_crate_level_docs,
    rustdoc::invalid_codeblock_attributes,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::bare_urls,
    rustdoc::invalid_html_tags
)]
#![warn(
    trivial_casts,
    trivial_numeric_casts,
    unused_lifetimes,
    unused_import_braces,
    unreachable_pub,
    clippy::dbg_macro
)]

pub mod decode;
pub mod encode;
mod impls;
pub mod packets;
mod types;
pub mod var_int;
pub mod var_long;

use std::io::Write;

use anyhow::Context;
pub use decode::{PacketDecoder, PacketFrame};
pub use encode::{PacketEncoder, WritePacket};
pub use packets::{RemoveObjectiveS2c, SetDisplayObjectiveS2c, SetScoreS2c};
pub use types::{DisplaySlot, ScoreAction, ScoreIdentity, ScorePacketEntry, SortOrder};
pub use var_int::VarInt;
pub use var_long::VarLong;
pub use {anyhow, bytes};

/// The maximum number of bytes in a single packet.
pub const MAX_PACKET_SIZE: i32 = 2097152;

/// The `Encode` trait allows objects to be written to the wire. It is the
/// inverse of [`Decode`].
///
/// Components of a packet are encoded in the order they appear in the type
/// definition.
///
/// ```
/// use tally_protocol::{Encode, VarInt};
///
/// let mut buf = vec![];
/// VarInt(300).encode(&mut buf).unwrap();
/// "hello".encode(&mut buf).unwrap();
///
/// assert_eq!(buf.len(), 2 + 1 + 5);
/// ```
pub trait Encode {
    /// Writes this object to the provided writer.
    ///
    /// If this type also implements [`Decode`] then successful calls to this
    /// function returning `Ok(())` must always successfully [`decode`] using
    /// the data that was written to the writer. The exact number of bytes
    /// that were originally written must be consumed during the decoding.
    ///
    /// [`decode`]: Decode::decode
    fn encode(&self, w: impl Write) -> anyhow::Result<()>;
}

/// The `Decode` trait allows objects to be read from the wire. It is the
/// inverse of [`Encode`].
///
/// `Decode` is parameterized by a lifetime. This allows the decoded value to
/// borrow data from the byte slice it was read from.
pub trait Decode<'a>: Sized {
    /// Reads this object from the provided byte slice.
    ///
    /// Implementations of `Decode` are expected to shrink the slice from the
    /// front as bytes are read.
    fn decode(r: &mut &'a [u8]) -> anyhow::Result<Self>;
}

/// Types considered to be packets.
///
/// In serialized form, a packet begins with a [`VarInt`] packet ID followed by
/// the body of the packet. The implementations of [`Encode`] and [`Decode`] on
/// `Self` are expected to only encode/decode the _body_ of this packet without
/// the leading ID.
pub trait Packet: std::fmt::Debug {
    /// The leading VarInt ID of this packet.
    const ID: i32;
    /// The name of this packet for debugging purposes.
    const NAME: &'static str;

    /// Encodes this packet's VarInt ID first, followed by the packet's body.
    fn encode_with_id(&self, mut w: impl Write) -> anyhow::Result<()>
    where
        Self: Encode,
    {
        VarInt(Self::ID)
            .encode(&mut w)
            .context("failed to encode packet ID")?;

        self.encode(w)
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use bytes::BytesMut;

    use super::*;

    fn display_packet(name: &str) -> SetDisplayObjectiveS2c<'_> {
        SetDisplayObjectiveS2c {
            display_slot: DisplaySlot::Sidebar,
            objective_name: name.into(),
            display_name: "Health".into(),
            criteria_name: SetDisplayObjectiveS2c::DUMMY_CRITERIA.into(),
            sort_order: SortOrder::Descending,
        }
    }

    #[test]
    fn packet_name() {
        assert_eq!(SetDisplayObjectiveS2c::NAME, "SetDisplayObjectiveS2c");
        assert_eq!(SetScoreS2c::NAME, "SetScoreS2c");
        assert_eq!(RemoveObjectiveS2c::NAME, "RemoveObjectiveS2c");
    }

    #[test]
    fn frames_survive_the_encoder_and_decoder() {
        let mut enc = PacketEncoder::new();

        enc.append_packet(&display_packet("first")).unwrap();
        enc.append_packet(&SetScoreS2c {
            action: ScoreAction::Change,
            entries: vec![ScorePacketEntry {
                scoreboard_id: 7,
                objective_name: "first".into(),
                score: -12,
                identity: Some(ScoreIdentity::FakePlayer("Alice".into())),
            }],
        })
        .unwrap();
        enc.append_packet(&RemoveObjectiveS2c {
            objective_name: Cow::Borrowed("first"),
        })
        .unwrap();

        let mut buf = BytesMut::new();
        buf.unsplit(enc.take());

        let mut dec = PacketDecoder::new();
        dec.queue_bytes(buf);

        let frame = dec.try_next_packet().unwrap().unwrap();
        assert_eq!(
            frame.decode::<SetDisplayObjectiveS2c>().unwrap(),
            display_packet("first")
        );

        let frame = dec.try_next_packet().unwrap().unwrap();
        let scores = frame.decode::<SetScoreS2c>().unwrap();
        assert_eq!(scores.action, ScoreAction::Change);
        assert_eq!(scores.entries.len(), 1);
        assert_eq!(scores.entries[0].score, -12);
        assert_eq!(
            scores.entries[0].identity,
            Some(ScoreIdentity::FakePlayer("Alice".into()))
        );

        let frame = dec.try_next_packet().unwrap().unwrap();
        assert_eq!(frame.id, RemoveObjectiveS2c::ID);
        assert_eq!(
            frame.decode::<RemoveObjectiveS2c>().unwrap().objective_name,
            "first"
        );

        assert!(dec.try_next_packet().unwrap().is_none());
    }

    #[test]
    fn decoding_the_wrong_packet_fails() {
        let mut enc = PacketEncoder::new();
        enc.append_packet(&display_packet("foo")).unwrap();

        let mut dec = PacketDecoder::new();
        dec.queue_bytes(enc.take());

        let frame = dec.try_next_packet().unwrap().unwrap();
        assert!(frame.decode::<RemoveObjectiveS2c>().is_err());
    }
}
