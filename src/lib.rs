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

use bevy_app::{PluginGroup, PluginGroupBuilder};

#[cfg(feature = "testing")]
pub mod testing;

#[cfg(test)]
mod tests;

#[cfg(feature = "log")]
pub use bevy_log as log;
pub use tally_server::*;
pub use {tally_protocol as protocol, tally_scoreboard as scoreboard};

/// Contains the most frequently used items in Tally projects.
///
/// This is usually glob imported like so:
///
/// ```
/// use tally::prelude::*; // Glob import.
///
/// let mut app = App::new();
/// app.add_plugins(DefaultPlugins);
/// app.update();
///
/// assert!(app.world().resource::<Scoreboards>().is_empty());
/// ```
pub mod prelude {
    pub use bevy_app::prelude::*;
    pub use bevy_ecs; // Needed for bevy_ecs macros to function correctly.
    pub use bevy_ecs::prelude::*;
    pub use tally_scoreboard::{
        ClientConnection, ClientHandle, DisplaySlot, EntryIdentity, NewObjective,
        PlayerDirectory, Scoreboard, ScoreboardEntry, ScoreboardError, ScoreboardMut,
        ScoreboardRegistry, SortOrder,
    };
    pub use tally_server::{
        Client, ClientBundle, OnlinePlayers, PlayerJoinEvent, ScoreboardPlugin,
        ScoreboardSettings, Scoreboards, Username,
    };

    pub use super::DefaultPlugins;
}

/// This plugin group will add all the default plugins for a Tally application.
///
/// [`DefaultPlugins`] obeys Cargo feature flags. With the `log` feature
/// enabled it also installs bevy's `LogPlugin`.
pub struct DefaultPlugins;

impl PluginGroup for DefaultPlugins {
    fn build(self) -> PluginGroupBuilder {
        #[allow(unused_mut)]
        let mut group = PluginGroupBuilder::start::<Self>().add(ScoreboardPlugin);

        #[cfg(feature = "log")]
        {
            group = group.add(bevy_log::LogPlugin::default());
        }

        group
    }
}
