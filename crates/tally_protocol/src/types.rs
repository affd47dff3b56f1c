use std::borrow::Cow;
use std::fmt;
use std::io::Write;

use anyhow::bail;

use crate::{Decode, Encode, VarInt, VarLong};

/// Where a client renders an objective.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub enum DisplaySlot {
    /// The player list (tab menu).
    List,
    /// The sidebar on the right side of the screen.
    #[default]
    Sidebar,
    /// Underneath player nameplates.
    BelowName,
}

impl DisplaySlot {
    pub const fn as_str(self) -> &'static str {
        match self {
            DisplaySlot::List => "list",
            DisplaySlot::Sidebar => "sidebar",
            DisplaySlot::BelowName => "belowname",
        }
    }
}

impl fmt::Display for DisplaySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Encode for DisplaySlot {
    fn encode(&self, w: impl Write) -> anyhow::Result<()> {
        self.as_str().encode(w)
    }
}

impl Decode<'_> for DisplaySlot {
    fn decode(r: &mut &[u8]) -> anyhow::Result<Self> {
        Ok(match <&str>::decode(r)? {
            "list" => DisplaySlot::List,
            "sidebar" => DisplaySlot::Sidebar,
            "belowname" => DisplaySlot::BelowName,
            other => bail!("unknown display slot `{other}`"),
        })
    }
}

/// The order in which a client sorts the lines of an objective.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl Encode for SortOrder {
    fn encode(&self, w: impl Write) -> anyhow::Result<()> {
        let tag = match self {
            SortOrder::Ascending => 0,
            SortOrder::Descending => 1,
        };

        VarInt(tag).encode(w)
    }
}

impl Decode<'_> for SortOrder {
    fn decode(r: &mut &[u8]) -> anyhow::Result<Self> {
        Ok(match VarInt::decode(r)?.0 {
            0 => SortOrder::Ascending,
            1 => SortOrder::Descending,
            n => bail!("unknown sort order {n}"),
        })
    }
}

/// Whether a [`SetScoreS2c`](crate::SetScoreS2c) adds/changes lines or removes
/// them.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum ScoreAction {
    Change,
    Remove,
}

impl Encode for ScoreAction {
    fn encode(&self, w: impl Write) -> anyhow::Result<()> {
        let tag: u8 = match self {
            ScoreAction::Change => 0,
            ScoreAction::Remove => 1,
        };

        tag.encode(w)
    }
}

impl Decode<'_> for ScoreAction {
    fn decode(r: &mut &[u8]) -> anyhow::Result<Self> {
        Ok(match u8::decode(r)? {
            0 => ScoreAction::Change,
            1 => ScoreAction::Remove,
            n => bail!("unknown score action {n}"),
        })
    }
}

/// Who a scoreboard line belongs to.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum ScoreIdentity<'a> {
    /// An online player, by entity unique ID.
    Player(i64),
    /// Any other entity, by entity unique ID.
    Entity(i64),
    /// Free text shown in place of a player name.
    FakePlayer(Cow<'a, str>),
}

impl ScoreIdentity<'_> {
    const PLAYER: u8 = 1;
    const ENTITY: u8 = 2;
    const FAKE_PLAYER: u8 = 3;

    pub fn into_owned(self) -> ScoreIdentity<'static> {
        match self {
            ScoreIdentity::Player(id) => ScoreIdentity::Player(id),
            ScoreIdentity::Entity(id) => ScoreIdentity::Entity(id),
            ScoreIdentity::FakePlayer(name) => ScoreIdentity::FakePlayer(name.into_owned().into()),
        }
    }
}

impl Encode for ScoreIdentity<'_> {
    fn encode(&self, mut w: impl Write) -> anyhow::Result<()> {
        match self {
            ScoreIdentity::Player(id) => {
                Self::PLAYER.encode(&mut w)?;
                VarLong(*id).encode(w)
            }
            ScoreIdentity::Entity(id) => {
                Self::ENTITY.encode(&mut w)?;
                VarLong(*id).encode(w)
            }
            ScoreIdentity::FakePlayer(name) => {
                Self::FAKE_PLAYER.encode(&mut w)?;
                name.encode(w)
            }
        }
    }
}

impl<'a> Decode<'a> for ScoreIdentity<'a> {
    fn decode(r: &mut &'a [u8]) -> anyhow::Result<Self> {
        Ok(match u8::decode(r)? {
            Self::PLAYER => ScoreIdentity::Player(VarLong::decode(r)?.0),
            Self::ENTITY => ScoreIdentity::Entity(VarLong::decode(r)?.0),
            Self::FAKE_PLAYER => ScoreIdentity::FakePlayer(<Cow<'a, str>>::decode(r)?),
            n => bail!("unknown score identity type {n}"),
        })
    }
}

/// A single line inside a [`SetScoreS2c`](crate::SetScoreS2c).
///
/// `identity` is only written for [`ScoreAction::Change`]; removals identify
/// the line by `scoreboard_id` alone.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ScorePacketEntry<'a> {
    pub scoreboard_id: i64,
    pub objective_name: Cow<'a, str>,
    pub score: i32,
    pub identity: Option<ScoreIdentity<'a>>,
}

impl ScorePacketEntry<'_> {
    pub(crate) fn encode_for(&self, action: ScoreAction, mut w: impl Write) -> anyhow::Result<()> {
        VarLong(self.scoreboard_id).encode(&mut w)?;
        self.objective_name.encode(&mut w)?;
        self.score.encode(&mut w)?;

        if action == ScoreAction::Change {
            match &self.identity {
                Some(identity) => identity.encode(w)?,
                None => bail!(
                    "score entry {} of `{}` has no identity",
                    self.scoreboard_id,
                    self.objective_name
                ),
            }
        }

        Ok(())
    }
}

impl<'a> ScorePacketEntry<'a> {
    pub(crate) fn decode_for(action: ScoreAction, r: &mut &'a [u8]) -> anyhow::Result<Self> {
        let scoreboard_id = VarLong::decode(r)?.0;
        let objective_name = <Cow<'a, str>>::decode(r)?;
        let score = i32::decode(r)?;
        let identity = match action {
            ScoreAction::Change => Some(ScoreIdentity::decode(r)?),
            ScoreAction::Remove => None,
        };

        Ok(Self {
            scoreboard_id,
            objective_name,
            score,
            identity,
        })
    }
}
