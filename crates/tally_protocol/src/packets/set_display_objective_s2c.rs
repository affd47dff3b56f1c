use std::borrow::Cow;
use std::io::Write;

use crate::{Decode, DisplaySlot, Encode, Packet, SortOrder};

/// Creates (or replaces) an objective on the client and shows it in a display
/// slot.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SetDisplayObjectiveS2c<'a> {
    pub display_slot: DisplaySlot,
    pub objective_name: Cow<'a, str>,
    pub display_name: Cow<'a, str>,
    pub criteria_name: Cow<'a, str>,
    pub sort_order: SortOrder,
}

impl SetDisplayObjectiveS2c<'_> {
    /// Scores are driven entirely by the server.
    pub const DUMMY_CRITERIA: &'static str = "dummy";
}

impl Packet for SetDisplayObjectiveS2c<'_> {
    const ID: i32 = 0x6b;
    const NAME: &'static str = "SetDisplayObjectiveS2c";
}

impl Encode for SetDisplayObjectiveS2c<'_> {
    fn encode(&self, mut w: impl Write) -> anyhow::Result<()> {
        self.display_slot.encode(&mut w)?;
        self.objective_name.encode(&mut w)?;
        self.display_name.encode(&mut w)?;
        self.criteria_name.encode(&mut w)?;
        self.sort_order.encode(w)
    }
}

impl<'a> Decode<'a> for SetDisplayObjectiveS2c<'a> {
    fn decode(r: &mut &'a [u8]) -> anyhow::Result<Self> {
        Ok(Self {
            display_slot: Decode::decode(r)?,
            objective_name: Decode::decode(r)?,
            display_name: Decode::decode(r)?,
            criteria_name: Decode::decode(r)?,
            sort_order: Decode::decode(r)?,
        })
    }
}
