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

use std::sync::Arc;

use bevy_app::prelude::*;
use bevy_app::AppExit;
use bevy_ecs::prelude::*;
use derive_more::{Deref, DerefMut};
use tally_scoreboard::{ClientHandle, PlayerDirectory, ScoreboardRegistry};
use tracing::debug;

mod client;
mod online;

pub use client::{Client, ClientBundle, Username};
pub use online::OnlinePlayers;

/// Keeps a [`ScoreboardRegistry`] in sync with the clients in the world.
pub struct ScoreboardPlugin;

/// The [`SystemSet`] in [`PostUpdate`] where connecting and disconnecting
/// clients are picked up. Systems that rely on [`OnlinePlayers`] being current
/// should run after this.
#[derive(SystemSet, Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct UpdateOnlinePlayersSet;

impl Plugin for ScoreboardPlugin {
    fn build(&self, app: &mut App) {
        let online = app
            .world_mut()
            .get_resource_or_insert_with(OnlinePlayers::default)
            .clone();

        if !app.world().contains_resource::<Scoreboards>() {
            app.insert_resource(Scoreboards::new(Arc::new(online)));
        }

        app.init_resource::<ScoreboardSettings>()
            .add_event::<PlayerJoinEvent>()
            .add_systems(
                PostUpdate,
                (
                    (unregister_disconnected_clients, register_new_clients)
                        .chain()
                        .in_set(UpdateOnlinePlayersSet),
                    resync_joined_players.after(UpdateOnlinePlayersSet),
                ),
            )
            .add_systems(Last, teardown_on_exit);
    }
}

/// Configuration for [`ScoreboardPlugin`]. Insert before adding the plugin to
/// override the defaults.
#[derive(Resource, Clone, Debug)]
pub struct ScoreboardSettings {
    /// Resend every subscribed objective to players when they join.
    pub resync_on_join: bool,
    /// Remove every objective from every client when the app exits.
    pub teardown_on_exit: bool,
}

impl Default for ScoreboardSettings {
    fn default() -> Self {
        Self {
            resync_on_join: true,
            teardown_on_exit: true,
        }
    }
}

/// The scoreboard registry of the app.
#[derive(Resource, Debug, Deref, DerefMut)]
pub struct Scoreboards(ScoreboardRegistry);

impl Scoreboards {
    pub fn new(directory: Arc<dyn PlayerDirectory>) -> Self {
        Self(ScoreboardRegistry::new(directory))
    }
}

/// Sent when a client entity is first seen by [`ScoreboardPlugin`].
#[derive(Event, Clone, PartialEq, Eq, Debug)]
pub struct PlayerJoinEvent {
    pub client: Entity,
    pub username: String,
}

fn register_new_clients(
    clients: Query<(Entity, &Client, &Username), Added<Client>>,
    online: Res<OnlinePlayers>,
    mut joins: EventWriter<PlayerJoinEvent>,
) {
    for (entity, client, username) in &clients {
        if online
            .insert(entity, &username.0, ClientHandle::clone(client))
            .is_some()
        {
            debug!("client {entity:?} replaced an existing connection for '{username}'");
        }

        joins.send(PlayerJoinEvent {
            client: entity,
            username: username.0.clone(),
        });
    }
}

fn unregister_disconnected_clients(
    mut disconnected: RemovedComponents<Client>,
    online: Res<OnlinePlayers>,
) {
    for entity in disconnected.read() {
        if let Some(username) = online.remove_entity(entity) {
            debug!("'{username}' disconnected");
        }
    }
}

fn resync_joined_players(
    mut joins: EventReader<PlayerJoinEvent>,
    mut scoreboards: ResMut<Scoreboards>,
    settings: Res<ScoreboardSettings>,
) {
    if !settings.resync_on_join {
        joins.clear();
        return;
    }

    for event in joins.read() {
        scoreboards.on_player_join(&event.username);
    }
}

fn teardown_on_exit(
    mut exits: EventReader<AppExit>,
    mut scoreboards: ResMut<Scoreboards>,
    settings: Res<ScoreboardSettings>,
) {
    if exits.read().count() == 0 || !settings.teardown_on_exit {
        return;
    }

    debug!("tearing down {} objective(s) on exit", scoreboards.len());
    scoreboards.on_shutdown();
}
