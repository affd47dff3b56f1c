use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use tally_protocol::encode::WritePacket;
use tally_protocol::{DisplaySlot, Encode, Packet, ScoreAction, SetScoreS2c, SortOrder};
use tracing::debug;

use crate::client::{ClientHandle, PlayerDirectory};
use crate::entry::{EntryKind, ScoreboardEntry, MAX_SCOREBOARD_ID};
use crate::error::ScoreboardError;
use crate::scoreboard::{Scoreboard, ScoreboardState};

/// Parameters for [`ScoreboardRegistry::create_scoreboard`].
///
/// ```
/// use tally_scoreboard::{DisplaySlot, NewObjective};
///
/// let objective = NewObjective {
///     display_slot: DisplaySlot::List,
///     ..NewObjective::new("kills", "Kills")
/// };
///
/// assert_eq!(objective.scoreboard_id, None);
/// ```
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct NewObjective {
    pub objective_name: String,
    pub display_name: String,
    /// Defaults to [`DisplaySlot::Sidebar`].
    pub display_slot: DisplaySlot,
    /// Defaults to [`SortOrder::Ascending`].
    pub sort_order: SortOrder,
    /// Base line ID. Assigned from the registry's counter when `None`.
    pub scoreboard_id: Option<i64>,
}

impl NewObjective {
    pub fn new<N, D>(objective_name: N, display_name: D) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        Self {
            objective_name: objective_name.into(),
            display_name: display_name.into(),
            ..Default::default()
        }
    }
}

/// A registered scoreboard and the names subscribed to the objective itself.
#[derive(Debug)]
struct Objective {
    scoreboard: Scoreboard,
    viewers: IndexSet<String>,
}

impl Objective {
    /// The viewer names an operation applies to: the explicit list if there
    /// is one, otherwise every objective-level viewer.
    fn targets(&self, explicit: &[&str]) -> Vec<String> {
        if explicit.is_empty() {
            self.viewers.iter().cloned().collect()
        } else {
            explicit.iter().map(|&name| name.to_owned()).collect()
        }
    }

    /// Subscribes `viewer` (if needed) and sends it the full objective state.
    ///
    /// A first-time subscriber is registered for every existing line. Known
    /// subscribers only get the lines they are registered for.
    fn sync_viewer(&mut self, directory: &dyn PlayerDirectory, viewer: &str) {
        if self.viewers.insert(viewer.to_owned()) {
            self.scoreboard.subscribe_to_all_entries(viewer);
        }

        let Some(mut client) = directory.resolve(viewer) else {
            return;
        };

        let sb = &self.scoreboard;

        if sb.display_slot() == DisplaySlot::BelowName {
            client.set_score_tag(sb.display_name());
        }

        client.write_packet(&sb.display_packet());

        let entries = sb.entries_visible_to(viewer);

        if !entries.is_empty() {
            client.write_packet(&SetScoreS2c {
                action: ScoreAction::Change,
                entries,
            });
        }
    }

    /// Removes the objective from one viewer's screen without touching any
    /// subscription.
    fn hide_from(&self, directory: &dyn PlayerDirectory, viewer: &str) {
        let Some(mut client) = directory.resolve(viewer) else {
            return;
        };

        if self.scoreboard.display_slot() == DisplaySlot::BelowName {
            client.set_score_tag("");
        }

        client.write_packet(&self.scoreboard.remove_packet());
    }

    fn hide_from_all(&self, directory: &dyn PlayerDirectory) {
        for viewer in &self.viewers {
            self.hide_from(directory, viewer);
        }
    }

    fn show_to_all(&mut self, directory: &dyn PlayerDirectory) {
        let viewers: Vec<String> = self.viewers.iter().cloned().collect();

        for viewer in &viewers {
            self.sync_viewer(directory, viewer);
        }
    }
}

/// Sends `packet` to every name in `viewers` that resolves to a connected
/// client.
fn deliver<P>(directory: &dyn PlayerDirectory, viewers: &[String], packet: &P)
where
    P: Packet + Encode,
{
    for mut client in viewers.iter().filter_map(|name| directory.resolve(name)) {
        client.write_packet(packet);
    }
}

/// Owns every scoreboard and the objective-level viewer subscriptions.
///
/// The registry is an ordinary value: construct it with the
/// [`PlayerDirectory`] it should deliver through and hand it to whatever needs
/// it.
pub struct ScoreboardRegistry {
    objectives: IndexMap<String, Objective>,
    counter: i64,
    directory: Arc<dyn PlayerDirectory>,
}

impl ScoreboardRegistry {
    pub fn new(directory: Arc<dyn PlayerDirectory>) -> Self {
        Self {
            objectives: IndexMap::new(),
            counter: 0,
            directory,
        }
    }

    pub fn directory(&self) -> &Arc<dyn PlayerDirectory> {
        &self.directory
    }

    /// Registers a new objective.
    ///
    /// Fails with [`ScoreboardError::DuplicateObjective`] if the name is taken,
    /// or [`ScoreboardError::ScoreboardIdOutOfRange`] if an explicit base line
    /// ID is above [`MAX_SCOREBOARD_ID`].
    /// Nothing is sent until the objective has viewers; see
    /// [`ScoreboardRegistry::send_scoreboard_to`].
    pub fn create_scoreboard(
        &mut self,
        new: NewObjective,
    ) -> Result<ScoreboardMut<'_>, ScoreboardError> {
        if self.objectives.contains_key(&new.objective_name) {
            return Err(ScoreboardError::DuplicateObjective(new.objective_name));
        }

        let scoreboard_id = match new.scoreboard_id {
            Some(id) if id > MAX_SCOREBOARD_ID => {
                return Err(ScoreboardError::ScoreboardIdOutOfRange(id));
            }
            Some(id) => id,
            None => {
                self.counter += 1;
                self.counter
            }
        };

        let mut scoreboard = Scoreboard::new(
            new.objective_name.clone(),
            new.display_name,
            new.display_slot,
            new.sort_order,
            scoreboard_id,
        );
        scoreboard.set_state(ScoreboardState::Active);

        debug!(
            "created objective '{}' with base line id {scoreboard_id}",
            new.objective_name
        );

        let (index, _) = self.objectives.insert_full(
            new.objective_name,
            Objective {
                scoreboard,
                viewers: IndexSet::new(),
            },
        );

        Ok(ScoreboardMut {
            registry: self,
            index,
        })
    }

    pub fn scoreboard(&self, objective_name: &str) -> Option<&Scoreboard> {
        self.objectives.get(objective_name).map(|o| &o.scoreboard)
    }

    /// Returns a handle for mutating a registered objective.
    ///
    /// Fails with [`ScoreboardError::Inactive`] if the objective was never
    /// created or has been removed.
    pub fn scoreboard_mut(
        &mut self,
        objective_name: &str,
    ) -> Result<ScoreboardMut<'_>, ScoreboardError> {
        let index = self.index_of(objective_name)?;

        Ok(ScoreboardMut {
            registry: self,
            index,
        })
    }

    pub fn scoreboards(&self) -> impl ExactSizeIterator<Item = &Scoreboard> + '_ {
        self.objectives.values().map(|o| &o.scoreboard)
    }

    pub fn len(&self) -> usize {
        self.objectives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objectives.is_empty()
    }

    /// Re-sends the full objective state to every subscribed viewer.
    pub fn send_scoreboard(&mut self, objective_name: &str) -> Result<(), ScoreboardError> {
        self.send_scoreboard_to(objective_name, &[])
    }

    /// Subscribes `viewers` to the objective and sends each of them its full
    /// state: the objective itself followed by the lines that viewer is
    /// registered for. An empty list means every current viewer.
    ///
    /// Calling this again for the same viewers sends the same packets.
    pub fn send_scoreboard_to(
        &mut self,
        objective_name: &str,
        viewers: &[&str],
    ) -> Result<(), ScoreboardError> {
        let index = self.index_of(objective_name)?;
        let directory = &*self.directory;
        let objective = &mut self.objectives[index];

        for viewer in objective.targets(viewers) {
            objective.sync_viewer(directory, &viewer);
        }

        Ok(())
    }

    /// Tears the objective down for everyone and drops it from the registry.
    ///
    /// Every connected viewer is sent a removal packet. The returned scoreboard
    /// is in the [`ScoreboardState::Removed`] state.
    pub fn remove_scoreboard(&mut self, objective_name: &str) -> Result<Scoreboard, ScoreboardError> {
        let index = self.index_of(objective_name)?;

        let Some((_, objective)) = self.objectives.shift_remove_index(index) else {
            return Err(ScoreboardError::Inactive(objective_name.to_owned()));
        };

        objective.hide_from_all(&*self.directory);

        debug!(
            "removed objective '{objective_name}' from {} viewer(s)",
            objective.viewers.len()
        );

        let mut scoreboard = objective.scoreboard;
        scoreboard.set_state(ScoreboardState::Removed);

        Ok(scoreboard)
    }

    /// Removes the objective from the named viewers and unsubscribes them. The
    /// objective itself stays registered.
    ///
    /// An empty list tears the objective down for everyone, like
    /// [`ScoreboardRegistry::remove_scoreboard`].
    pub fn remove_scoreboard_for(
        &mut self,
        objective_name: &str,
        viewers: &[&str],
    ) -> Result<(), ScoreboardError> {
        if viewers.is_empty() {
            return self.remove_scoreboard(objective_name).map(drop);
        }

        let index = self.index_of(objective_name)?;
        let directory = &*self.directory;
        let objective = &mut self.objectives[index];

        for &viewer in viewers {
            objective.hide_from(directory, viewer);
            objective.viewers.shift_remove(viewer);
            objective.scoreboard.unsubscribe_from_all_entries(viewer);
        }

        Ok(())
    }

    /// The connected clients subscribed to the objective. Subscribers that are
    /// not currently connected are left out.
    pub fn scoreboard_viewers(&self, objective_name: &str) -> Vec<ClientHandle> {
        self.objectives
            .get(objective_name)
            .map(|objective| {
                objective
                    .viewers
                    .iter()
                    .filter_map(|name| self.directory.resolve(name))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns `true` if `viewer` is subscribed to the objective, connected or
    /// not.
    pub fn is_subscribed(&self, objective_name: &str, viewer: &str) -> bool {
        self.objectives
            .get(objective_name)
            .is_some_and(|objective| objective.viewers.contains(viewer))
    }

    /// Catches a (re)connecting player up on every objective they are
    /// subscribed to.
    pub fn on_player_join(&mut self, player: &str) {
        let directory = &*self.directory;

        for (name, objective) in &mut self.objectives {
            if objective.viewers.contains(player) {
                debug!("resending objective '{name}' to '{player}'");
                objective.sync_viewer(directory, player);
            }
        }
    }

    /// Tears down every objective and resets the registry.
    pub fn on_shutdown(&mut self) {
        for (name, objective) in self.objectives.drain(..) {
            objective.hide_from_all(&*self.directory);
            debug!("removed objective '{name}' on shutdown");
        }

        self.counter = 0;
    }

    fn index_of(&self, objective_name: &str) -> Result<usize, ScoreboardError> {
        self.objectives
            .get_index_of(objective_name)
            .ok_or_else(|| ScoreboardError::Inactive(objective_name.to_owned()))
    }
}

impl fmt::Debug for ScoreboardRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScoreboardRegistry")
            .field("objectives", &self.objectives)
            .field("counter", &self.counter)
            .finish_non_exhaustive()
    }
}

/// Mutable access to one registered scoreboard.
///
/// Every method sends the packets needed to keep viewers in sync before
/// returning. Methods that take a `viewers` list treat an empty list as "every
/// objective-level viewer".
pub struct ScoreboardMut<'a> {
    registry: &'a mut ScoreboardRegistry,
    index: usize,
}

impl Deref for ScoreboardMut<'_> {
    type Target = Scoreboard;

    fn deref(&self) -> &Self::Target {
        &self.registry.objectives[self.index].scoreboard
    }
}

impl ScoreboardMut<'_> {
    fn objective(&self) -> &Objective {
        &self.registry.objectives[self.index]
    }

    fn parts(&mut self) -> (&mut Objective, &dyn PlayerDirectory) {
        let registry = &mut *self.registry;
        (&mut registry.objectives[self.index], &*registry.directory)
    }

    pub fn add_entry(&mut self, entry: ScoreboardEntry) -> Result<&mut Self, ScoreboardError> {
        self.add_entry_for(entry, &[])
    }

    /// Attaches `entry`, replacing whatever is on the same line, registers
    /// `viewers` for it and sends it to them.
    pub fn add_entry_for(
        &mut self,
        entry: ScoreboardEntry,
        viewers: &[&str],
    ) -> Result<&mut Self, ScoreboardError> {
        self.validate(&entry)?;
        let targets = self.objective().targets(viewers);
        self.attach(entry, &targets);
        Ok(self)
    }

    pub fn remove_entry(&mut self, entry: &ScoreboardEntry) -> Result<&mut Self, ScoreboardError> {
        self.remove_entry_for(entry, &[])
    }

    /// Detaches the entry on `entry`'s line, unregisters `viewers` from it and
    /// tells them it is gone.
    pub fn remove_entry_for(
        &mut self,
        entry: &ScoreboardEntry,
        viewers: &[&str],
    ) -> Result<&mut Self, ScoreboardError> {
        self.validate(entry)?;
        let targets = self.objective().targets(viewers);
        self.detach(entry, &targets);
        Ok(self)
    }

    pub fn update_entry(&mut self, entry: ScoreboardEntry) -> Result<&mut Self, ScoreboardError> {
        self.update_entry_for(entry, &[])
    }

    /// Replaces the attached entry on `entry`'s line and sends the new value to
    /// `viewers`. The entry keeps its registered viewers.
    ///
    /// Fails with [`ScoreboardError::EntryNotFound`] if nothing is attached on
    /// that line.
    pub fn update_entry_for(
        &mut self,
        entry: ScoreboardEntry,
        viewers: &[&str],
    ) -> Result<&mut Self, ScoreboardError> {
        self.validate(&entry)?;

        let (objective, directory) = self.parts();

        if objective.scoreboard.entry(entry.scoreboard_id()).is_none() {
            return Err(ScoreboardError::EntryNotFound {
                objective: objective.scoreboard.objective_name().to_owned(),
                scoreboard_id: entry.scoreboard_id(),
            });
        }

        let targets = objective.targets(viewers);

        deliver(
            directory,
            &targets,
            &SetScoreS2c {
                action: ScoreAction::Change,
                entries: vec![entry.to_packet_entry()],
            },
        );

        objective.scoreboard.replace_entry(entry)?;

        Ok(self)
    }

    /// Pads the names of all fake player entries so their scores line up.
    ///
    /// Entries are re-sent in their stored order, each to the viewers it is
    /// registered for. Names that already end in a space are left alone, so
    /// calling this repeatedly is harmless.
    pub fn pad_entries(&mut self) -> Result<&mut Self, ScoreboardError> {
        let pending: Vec<_> = {
            let sb = &self.objective().scoreboard;
            let max_width = sb.max_fake_player_width();

            sb.entries()
                .filter_map(|entry| {
                    let padded = entry.padded(max_width)?;
                    Some((entry.clone(), padded, sb.registered_viewers(entry)))
                })
                .collect()
        };

        for (old, padded, viewers) in pending {
            self.repad(&old, padded, &viewers)?;
        }

        Ok(self)
    }

    /// Pads the name of the attached fake player entry on `entry`'s line. See
    /// [`ScoreboardMut::pad_entries`].
    pub fn pad_entry(&mut self, entry: &ScoreboardEntry) -> Result<&mut Self, ScoreboardError> {
        if entry.kind() != EntryKind::FakePlayer {
            return Err(ScoreboardError::NotFakePlayer);
        }

        self.validate(entry)?;

        let sb = &self.objective().scoreboard;

        let Some(stored) = sb.entry(entry.scoreboard_id()) else {
            return Err(ScoreboardError::EntryNotFound {
                objective: sb.objective_name().to_owned(),
                scoreboard_id: entry.scoreboard_id(),
            });
        };

        if stored.kind() != EntryKind::FakePlayer {
            return Err(ScoreboardError::NotFakePlayer);
        }

        let Some(padded) = stored.padded(sb.max_fake_player_width()) else {
            return Ok(self);
        };

        let old = stored.clone();
        let viewers = sb.registered_viewers(&old);

        self.repad(&old, padded, &viewers)?;

        Ok(self)
    }

    /// Renames the objective. Viewers are moved over to the new name.
    ///
    /// Fails with [`ScoreboardError::DuplicateObjective`] if another objective
    /// already uses `objective_name`.
    pub fn set_objective_name<S: Into<String>>(
        &mut self,
        objective_name: S,
    ) -> Result<&mut Self, ScoreboardError> {
        let objective_name = objective_name.into();

        if objective_name == self.objective_name() {
            return Ok(self);
        }

        if self.registry.objectives.contains_key(&objective_name) {
            return Err(ScoreboardError::DuplicateObjective(objective_name));
        }

        let directory = Arc::clone(&self.registry.directory);

        let Some((old_name, mut objective)) = self.registry.objectives.shift_remove_index(self.index)
        else {
            return Err(ScoreboardError::Inactive(objective_name));
        };

        objective.hide_from_all(&*directory);

        let base = objective.scoreboard.scoreboard_id();
        objective.scoreboard.rebase(objective_name.clone(), base);

        debug!("renamed objective '{old_name}' to '{objective_name}'");

        // Keep the objective where it was in iteration order.
        self.registry
            .objectives
            .shift_insert(self.index, objective_name, objective);

        self.parts().0.show_to_all(&*directory);

        Ok(self)
    }

    pub fn set_display_name<S: Into<String>>(
        &mut self,
        display_name: S,
    ) -> Result<&mut Self, ScoreboardError> {
        let display_name = display_name.into();

        if display_name != self.display_name() {
            self.resync_with(|sb| sb.set_display_name(display_name));
        }

        Ok(self)
    }

    pub fn set_display_slot(
        &mut self,
        display_slot: DisplaySlot,
    ) -> Result<&mut Self, ScoreboardError> {
        if display_slot != self.display_slot() {
            self.resync_with(|sb| sb.set_display_slot(display_slot));
        }

        Ok(self)
    }

    pub fn set_sort_order(&mut self, sort_order: SortOrder) -> Result<&mut Self, ScoreboardError> {
        if sort_order != self.sort_order() {
            self.resync_with(|sb| sb.set_sort_order(sort_order));
        }

        Ok(self)
    }

    /// Moves the objective to a new base line ID. Attached entries keep their
    /// line index and get new line IDs.
    ///
    /// Fails with [`ScoreboardError::ScoreboardIdOutOfRange`] above
    /// [`MAX_SCOREBOARD_ID`].
    pub fn set_scoreboard_id(&mut self, scoreboard_id: i64) -> Result<&mut Self, ScoreboardError> {
        if scoreboard_id > MAX_SCOREBOARD_ID {
            return Err(ScoreboardError::ScoreboardIdOutOfRange(scoreboard_id));
        }

        if scoreboard_id != self.scoreboard_id() {
            self.resync_with(|sb| {
                let name = sb.objective_name().to_owned();
                sb.rebase(name, scoreboard_id);
            });
        }

        Ok(self)
    }

    /// Removes the objective from every viewer, applies `f`, then sends the
    /// updated objective back.
    fn resync_with<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Scoreboard),
    {
        let (objective, directory) = self.parts();

        objective.hide_from_all(directory);
        f(&mut objective.scoreboard);
        objective.show_to_all(directory);
    }

    fn attach(&mut self, entry: ScoreboardEntry, viewers: &[String]) {
        let (objective, directory) = self.parts();

        deliver(
            directory,
            viewers,
            &SetScoreS2c {
                action: ScoreAction::Change,
                entries: vec![entry.to_packet_entry()],
            },
        );

        objective.scoreboard.upsert_entry(entry, viewers);
    }

    fn detach(&mut self, entry: &ScoreboardEntry, viewers: &[String]) {
        let (objective, directory) = self.parts();

        let stored = objective.scoreboard.detach_entry(entry);

        deliver(
            directory,
            viewers,
            &SetScoreS2c {
                action: ScoreAction::Remove,
                entries: vec![stored.as_ref().unwrap_or(entry).to_packet_entry()],
            },
        );
    }

    /// Removes `old` from `viewers` and sends them `padded` in its place. The
    /// line keeps every viewer of its identity, even when another line shares
    /// that identity.
    fn repad(
        &mut self,
        old: &ScoreboardEntry,
        padded: ScoreboardEntry,
        viewers: &[String],
    ) -> Result<(), ScoreboardError> {
        let (objective, directory) = self.parts();

        deliver(
            directory,
            viewers,
            &SetScoreS2c {
                action: ScoreAction::Remove,
                entries: vec![old.to_packet_entry()],
            },
        );
        deliver(
            directory,
            viewers,
            &SetScoreS2c {
                action: ScoreAction::Change,
                entries: vec![padded.to_packet_entry()],
            },
        );

        objective.scoreboard.replace_entry(padded)
    }
}

impl fmt::Debug for ScoreboardMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScoreboardMut")
            .field("scoreboard", &**self)
            .finish()
    }
}
