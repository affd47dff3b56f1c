use std::borrow::Cow;
use std::io::Write;

use crate::{Decode, Encode, Packet};

/// Removes an objective, and every score attached to it, from the client.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RemoveObjectiveS2c<'a> {
    pub objective_name: Cow<'a, str>,
}

impl Packet for RemoveObjectiveS2c<'_> {
    const ID: i32 = 0x6a;
    const NAME: &'static str = "RemoveObjectiveS2c";
}

impl Encode for RemoveObjectiveS2c<'_> {
    fn encode(&self, w: impl Write) -> anyhow::Result<()> {
        self.objective_name.encode(w)
    }
}

impl<'a> Decode<'a> for RemoveObjectiveS2c<'a> {
    fn decode(r: &mut &'a [u8]) -> anyhow::Result<Self> {
        Ok(Self {
            objective_name: Decode::decode(r)?,
        })
    }
}
