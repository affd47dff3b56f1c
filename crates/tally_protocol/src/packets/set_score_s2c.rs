use std::io::Write;

use anyhow::ensure;

use crate::{Decode, Encode, Packet, ScoreAction, ScorePacketEntry, VarInt};

/// Changes or removes scoreboard lines on the client.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SetScoreS2c<'a> {
    pub action: ScoreAction,
    pub entries: Vec<ScorePacketEntry<'a>>,
}

impl Packet for SetScoreS2c<'_> {
    const ID: i32 = 0x6c;
    const NAME: &'static str = "SetScoreS2c";
}

impl Encode for SetScoreS2c<'_> {
    fn encode(&self, mut w: impl Write) -> anyhow::Result<()> {
        self.action.encode(&mut w)?;
        VarInt(i32::try_from(self.entries.len())?).encode(&mut w)?;

        for entry in &self.entries {
            entry.encode_for(self.action, &mut w)?;
        }

        Ok(())
    }
}

impl<'a> Decode<'a> for SetScoreS2c<'a> {
    fn decode(r: &mut &'a [u8]) -> anyhow::Result<Self> {
        let action = ScoreAction::decode(r)?;
        let len = VarInt::decode(r)?.0;
        ensure!(len >= 0, "attempt to decode score list with negative length");

        // Every entry takes at least a few bytes, so this bounds the allocation.
        let mut entries = Vec::with_capacity((len as usize).min(r.len()));
        for _ in 0..len {
            entries.push(ScorePacketEntry::decode_for(action, r)?);
        }

        Ok(Self { action, entries })
    }
}
