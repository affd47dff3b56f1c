use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bevy_ecs::prelude::*;
use parking_lot::RwLock;
use tally_scoreboard::{ClientHandle, PlayerDirectory};

/// Index of the players currently connected, by username.
///
/// Clones share the same index. The registry inside
/// [`Scoreboards`](crate::Scoreboards) resolves viewer names through a clone of
/// this resource.
#[derive(Resource, Clone, Default)]
pub struct OnlinePlayers {
    inner: Arc<RwLock<OnlinePlayersInner>>,
}

#[derive(Default)]
struct OnlinePlayersInner {
    by_name: HashMap<String, (Entity, ClientHandle)>,
    by_entity: HashMap<Entity, String>,
}

impl OnlinePlayers {
    pub fn get(&self, username: &str) -> Option<ClientHandle> {
        self.inner
            .read()
            .by_name
            .get(username)
            .map(|(_, handle)| handle.clone())
    }

    pub fn contains(&self, username: &str) -> bool {
        self.inner.read().by_name.contains_key(username)
    }

    /// The entity of the client connected under `username`.
    pub fn entity(&self, username: &str) -> Option<Entity> {
        self.inner
            .read()
            .by_name
            .get(username)
            .map(|(entity, _)| *entity)
    }

    pub fn len(&self) -> usize {
        self.inner.read().by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().by_name.is_empty()
    }

    /// Registers `client` under `username`. A client already connected under
    /// that name is replaced and returned.
    pub(crate) fn insert(
        &self,
        entity: Entity,
        username: &str,
        client: ClientHandle,
    ) -> Option<ClientHandle> {
        let mut inner = self.inner.write();

        let old = inner
            .by_name
            .insert(username.to_owned(), (entity, client));

        if let Some((old_entity, _)) = &old {
            inner.by_entity.remove(old_entity);
        }

        if let Some(old_name) = inner.by_entity.insert(entity, username.to_owned()) {
            if old_name != username {
                inner.by_name.remove(&old_name);
            }
        }

        old.map(|(_, handle)| handle)
    }

    /// Unregisters the client owned by `entity`. Names that have since been
    /// taken over by another entity are kept.
    pub(crate) fn remove_entity(&self, entity: Entity) -> Option<String> {
        let mut inner = self.inner.write();

        let name = inner.by_entity.remove(&entity)?;

        if inner
            .by_name
            .get(&name)
            .is_some_and(|(owner, _)| *owner == entity)
        {
            inner.by_name.remove(&name);
        }

        Some(name)
    }
}

impl PlayerDirectory for OnlinePlayers {
    fn resolve(&self, name: &str) -> Option<ClientHandle> {
        self.get(name)
    }
}

impl fmt::Debug for OnlinePlayers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();

        f.debug_map()
            .entries(inner.by_name.iter().map(|(name, (entity, _))| (name, entity)))
            .finish()
    }
}
