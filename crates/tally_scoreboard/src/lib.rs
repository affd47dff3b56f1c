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

mod client;
mod entry;
mod error;
mod registry;
mod scoreboard;

pub use client::{ClientConnection, ClientHandle, PlayerDirectory};
pub use entry::{
    EntryIdentity, EntryKind, ScoreboardEntry, ViewerKey, MAX_LINES, MAX_SCOREBOARD_ID,
};
pub use error::{ErrorKind, ScoreboardError};
pub use registry::{NewObjective, ScoreboardMut, ScoreboardRegistry};
pub use scoreboard::{Scoreboard, ScoreboardState};
pub use tally_protocol::{DisplaySlot, SortOrder};
