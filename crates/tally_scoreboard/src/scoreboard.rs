use std::borrow::Cow;
use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};
use tally_protocol::{
    DisplaySlot, RemoveObjectiveS2c, ScorePacketEntry, SetDisplayObjectiveS2c, SortOrder,
};

use crate::entry::{EntryIdentity, EntryKind, ScoreboardEntry, ViewerKey, MAX_LINES};
use crate::error::ScoreboardError;

/// Where a [`Scoreboard`] is in its lifecycle.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum ScoreboardState {
    /// Built but not yet owned by a registry. Only seen inside
    /// [`ScoreboardRegistry::create_scoreboard`](crate::ScoreboardRegistry::create_scoreboard),
    /// which hands out scoreboards already [`Active`](Self::Active).
    Unregistered,
    /// Owned by a registry and reachable through it.
    Active,
    /// Torn down. A removed scoreboard can no longer be mutated.
    Removed,
}

/// An objective: its metadata, its lines, and who can see each line.
///
/// A `Scoreboard` is read-only from the outside. Mutations go through
/// [`ScoreboardMut`](crate::ScoreboardMut) so that they are always paired
/// with the packets that keep viewers in sync.
#[derive(Clone, Debug)]
pub struct Scoreboard {
    objective_name: String,
    display_name: String,
    display_slot: DisplaySlot,
    sort_order: SortOrder,
    scoreboard_id: i64,
    /// Keyed by effective line ID, in insertion order.
    entries: IndexMap<i64, ScoreboardEntry>,
    entry_viewers: HashMap<ViewerKey, IndexSet<String>>,
    state: ScoreboardState,
}

impl Scoreboard {
    pub(crate) fn new(
        objective_name: String,
        display_name: String,
        display_slot: DisplaySlot,
        sort_order: SortOrder,
        scoreboard_id: i64,
    ) -> Self {
        Self {
            objective_name,
            display_name,
            display_slot,
            sort_order,
            scoreboard_id,
            entries: IndexMap::new(),
            entry_viewers: HashMap::new(),
            state: ScoreboardState::Unregistered,
        }
    }

    pub fn objective_name(&self) -> &str {
        &self.objective_name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn display_slot(&self) -> DisplaySlot {
        self.display_slot
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// Base offset added to every line index to form its line ID.
    pub fn scoreboard_id(&self) -> i64 {
        self.scoreboard_id
    }

    pub fn state(&self) -> ScoreboardState {
        self.state
    }

    /// Builds an entry for this objective without attaching it.
    pub fn create_entry(
        &self,
        line: i32,
        score: i32,
        identity: EntryIdentity,
    ) -> Result<ScoreboardEntry, ScoreboardError> {
        ScoreboardEntry::new(self, line, score, identity)
    }

    /// The attached entries, in the order they were first added.
    pub fn entries(&self) -> impl ExactSizeIterator<Item = &ScoreboardEntry> + '_ {
        self.entries.values()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Looks up the attached entry with the given line ID.
    pub fn entry(&self, scoreboard_id: i64) -> Option<&ScoreboardEntry> {
        self.entries.get(&scoreboard_id)
    }

    /// Names of the viewers registered for `entry`. Unknown entries have no
    /// viewers.
    pub fn entry_viewers(&self, entry: &ScoreboardEntry) -> impl Iterator<Item = &str> + '_ {
        self.entry_viewers
            .get(&entry.viewer_key())
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    pub fn is_entry_viewer(&self, entry: &ScoreboardEntry, viewer: &str) -> bool {
        self.entry_viewers
            .get(&entry.viewer_key())
            .is_some_and(|viewers| viewers.contains(viewer))
    }

    pub(crate) fn set_state(&mut self, state: ScoreboardState) {
        self.state = state;
    }

    /// Checks that `entry` was built for this objective and that its line ID
    /// falls inside this objective's line range.
    pub(crate) fn validate(&self, entry: &ScoreboardEntry) -> Result<(), ScoreboardError> {
        if entry.objective_name() != self.objective_name {
            return Err(ScoreboardError::ObjectiveMismatch {
                expected: self.objective_name.clone(),
                found: entry.objective_name().to_owned(),
            });
        }

        let line = entry.scoreboard_id().saturating_sub(self.scoreboard_id);

        if !(0..=MAX_LINES).contains(&line) {
            return Err(ScoreboardError::LineOutOfRange { line });
        }

        Ok(())
    }

    /// Inserts or replaces the entry on the same line and registers `viewers`
    /// under its identity.
    pub(crate) fn upsert_entry(&mut self, entry: ScoreboardEntry, viewers: &[String]) {
        let key = entry.viewer_key();

        if let Some(old) = self.entries.insert(entry.scoreboard_id(), entry) {
            let old_key = old.viewer_key();
            if old_key != key {
                self.drop_viewer_key_if_unused(&old_key);
            }
        }

        if !viewers.is_empty() {
            self.entry_viewers
                .entry(key)
                .or_default()
                .extend(viewers.iter().cloned());
        }
    }

    /// Detaches the entry on the same line as `entry` and returns the stored
    /// value. Viewers of the stored identity are forgotten once no other line
    /// shows that identity.
    pub(crate) fn detach_entry(&mut self, entry: &ScoreboardEntry) -> Option<ScoreboardEntry> {
        let stored = self.entries.shift_remove(&entry.scoreboard_id());

        let key = stored.as_ref().unwrap_or(entry).viewer_key();
        self.drop_viewer_key_if_unused(&key);

        stored
    }

    /// Replaces the stored entry on the same line, carrying its viewers over
    /// to the new identity.
    pub(crate) fn replace_entry(&mut self, entry: ScoreboardEntry) -> Result<(), ScoreboardError> {
        let Some(stored) = self.entries.get_mut(&entry.scoreboard_id()) else {
            return Err(ScoreboardError::EntryNotFound {
                objective: self.objective_name.clone(),
                scoreboard_id: entry.scoreboard_id(),
            });
        };

        let old_key = stored.viewer_key();
        let new_key = entry.viewer_key();
        *stored = entry;

        if old_key != new_key {
            let still_used = self.entries.values().any(|e| e.viewer_key() == old_key);

            let viewers = if still_used {
                self.entry_viewers.get(&old_key).cloned()
            } else {
                self.entry_viewers.remove(&old_key)
            };

            if let Some(viewers) = viewers {
                self.entry_viewers.entry(new_key).or_default().extend(viewers);
            }
        }

        Ok(())
    }

    /// Current viewer names of the entry stored on the same line as `entry`.
    pub(crate) fn registered_viewers(&self, entry: &ScoreboardEntry) -> Vec<String> {
        self.entry_viewers(entry).map(str::to_owned).collect()
    }

    /// Registers `viewer` for every attached entry.
    pub(crate) fn subscribe_to_all_entries(&mut self, viewer: &str) {
        for entry in self.entries.values() {
            self.entry_viewers
                .entry(entry.viewer_key())
                .or_default()
                .insert(viewer.to_owned());
        }
    }

    /// Unregisters `viewer` from every entry.
    pub(crate) fn unsubscribe_from_all_entries(&mut self, viewer: &str) {
        self.entry_viewers.retain(|_, viewers| {
            viewers.shift_remove(viewer);
            !viewers.is_empty()
        });
    }

    /// The widest rendered score among fake player entries.
    pub(crate) fn max_fake_player_width(&self) -> usize {
        self.entries
            .values()
            .filter(|e| e.kind() == EntryKind::FakePlayer)
            .map(ScoreboardEntry::score_width)
            .max()
            .unwrap_or(0)
    }

    pub(crate) fn set_display_name(&mut self, display_name: String) {
        self.display_name = display_name;
    }

    pub(crate) fn set_display_slot(&mut self, display_slot: DisplaySlot) {
        self.display_slot = display_slot;
    }

    pub(crate) fn set_sort_order(&mut self, sort_order: SortOrder) {
        self.sort_order = sort_order;
    }

    /// Moves the objective to a new name and base ID, rewriting the line ID of
    /// every entry to match.
    pub(crate) fn rebase(&mut self, objective_name: String, scoreboard_id: i64) {
        self.objective_name = objective_name;
        self.scoreboard_id = scoreboard_id;

        let entries = std::mem::take(&mut self.entries);
        self.entries = entries
            .into_values()
            .map(|mut entry| {
                entry.rebase(&self.objective_name, scoreboard_id);
                (entry.scoreboard_id(), entry)
            })
            .collect();
    }

    pub(crate) fn display_packet(&self) -> SetDisplayObjectiveS2c<'_> {
        SetDisplayObjectiveS2c {
            display_slot: self.display_slot,
            objective_name: Cow::Borrowed(&self.objective_name),
            display_name: Cow::Borrowed(&self.display_name),
            criteria_name: Cow::Borrowed(SetDisplayObjectiveS2c::DUMMY_CRITERIA),
            sort_order: self.sort_order,
        }
    }

    pub(crate) fn remove_packet(&self) -> RemoveObjectiveS2c<'_> {
        RemoveObjectiveS2c {
            objective_name: Cow::Borrowed(&self.objective_name),
        }
    }

    /// Packet entries for every line `viewer` is registered for.
    pub(crate) fn entries_visible_to(&self, viewer: &str) -> Vec<ScorePacketEntry<'_>> {
        self.entries
            .values()
            .filter(|entry| self.is_entry_viewer(entry, viewer))
            .map(ScoreboardEntry::to_packet_entry)
            .collect()
    }

    fn drop_viewer_key_if_unused(&mut self, key: &ViewerKey) {
        if !self.entries.values().any(|e| e.viewer_key() == *key) {
            self.entry_viewers.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::entry::MAX_SCOREBOARD_ID;
    use crate::error::ErrorKind;

    fn scoreboard() -> Scoreboard {
        Scoreboard::new(
            "health".into(),
            "Health".into(),
            DisplaySlot::Sidebar,
            SortOrder::Ascending,
            1,
        )
    }

    fn viewers(names: &[&str]) -> Vec<String> {
        names.iter().map(|&n| n.to_owned()).collect()
    }

    #[test]
    fn foreign_entries_are_rejected() {
        let sb = scoreboard();
        let other = Scoreboard::new(
            "mana".into(),
            "Mana".into(),
            DisplaySlot::List,
            SortOrder::Descending,
            1,
        );

        let entry = other
            .create_entry(0, 1, EntryIdentity::fake_player("x"))
            .unwrap();
        assert_eq!(sb.validate(&entry).unwrap_err().kind(), ErrorKind::Mismatch);
    }

    #[test]
    fn entries_from_an_older_base_are_out_of_range() {
        let mut sb = scoreboard();
        let entry = sb
            .create_entry(0, 1, EntryIdentity::fake_player("x"))
            .unwrap();

        sb.rebase("health".into(), 20);

        assert_eq!(
            sb.validate(&entry).unwrap_err(),
            ScoreboardError::LineOutOfRange { line: -19 }
        );
    }

    #[test]
    fn upsert_keeps_one_entry_per_line() {
        let mut sb = scoreboard();
        let first = sb.create_entry(3, 1, EntryIdentity::fake_player("a")).unwrap();
        let second = sb.create_entry(3, 2, EntryIdentity::fake_player("b")).unwrap();

        sb.upsert_entry(first.clone(), &viewers(&["steve"]));
        sb.upsert_entry(second.clone(), &viewers(&["steve"]));

        assert_eq!(sb.entry_count(), 1);
        assert_eq!(sb.entry(second.scoreboard_id()), Some(&second));
        assert_eq!(sb.entry_viewers(&first).count(), 0);
        assert_eq!(sb.entry_viewers(&second).collect::<Vec<_>>(), ["steve"]);
    }

    #[test]
    fn detach_removes_by_line_id() {
        let mut sb = scoreboard();
        let entry = sb.create_entry(0, 5, EntryIdentity::Entity(9)).unwrap();
        sb.upsert_entry(entry.clone(), &viewers(&["steve", "alex"]));

        // A distinct value describing the same line.
        let same_line = entry.clone().with_score(99);
        assert_eq!(sb.detach_entry(&same_line), Some(entry.clone()));

        assert_eq!(sb.entry_count(), 0);
        assert_eq!(sb.entry_viewers(&entry).count(), 0);
    }

    #[test]
    fn detach_cleans_the_stored_identity() {
        let mut sb = scoreboard();
        let stored = sb.create_entry(0, 5, EntryIdentity::fake_player("a")).unwrap();
        sb.upsert_entry(stored.clone(), &viewers(&["steve"]));

        let other = sb.create_entry(0, 5, EntryIdentity::fake_player("b")).unwrap();
        sb.detach_entry(&other);
        assert_eq!(sb.entry_viewers(&stored).count(), 0);

        let later = sb.create_entry(5, 1, EntryIdentity::fake_player("a")).unwrap();
        sb.upsert_entry(later.clone(), &viewers(&["alex"]));
        assert_eq!(sb.entry_viewers(&later).collect::<Vec<_>>(), ["alex"]);
    }

    #[test]
    fn detach_keeps_viewers_while_the_identity_is_shown() {
        let mut sb = scoreboard();
        let first = sb.create_entry(0, 5, EntryIdentity::Entity(9)).unwrap();
        let second = sb.create_entry(1, 6, EntryIdentity::Entity(9)).unwrap();
        sb.upsert_entry(first.clone(), &viewers(&["steve", "alex"]));
        sb.upsert_entry(second.clone(), &viewers(&["steve"]));

        sb.detach_entry(&first);
        assert_eq!(sb.entry_viewers(&second).collect::<Vec<_>>(), ["steve", "alex"]);

        sb.detach_entry(&second);
        assert_eq!(sb.entry_viewers(&second).count(), 0);
    }

    #[test]
    fn validate_handles_distant_bases() {
        let sb = Scoreboard::new(
            "health".into(),
            "Health".into(),
            DisplaySlot::Sidebar,
            SortOrder::Ascending,
            MAX_SCOREBOARD_ID,
        );
        let far = Scoreboard::new(
            "health".into(),
            "Health".into(),
            DisplaySlot::Sidebar,
            SortOrder::Ascending,
            i64::MIN,
        );

        let entry = far.create_entry(0, 1, EntryIdentity::Entity(1)).unwrap();
        assert_eq!(sb.validate(&entry).unwrap_err().kind(), ErrorKind::Range);

        let top = sb.create_entry(15, 1, EntryIdentity::Entity(1)).unwrap();
        assert_eq!(top.scoreboard_id(), i64::MAX);
        assert_eq!(far.validate(&top).unwrap_err().kind(), ErrorKind::Range);
    }

    #[test]
    fn replace_moves_viewers_to_new_identity() {
        let mut sb = scoreboard();
        let entry = sb.create_entry(0, 5, EntryIdentity::fake_player("old")).unwrap();
        sb.upsert_entry(entry.clone(), &viewers(&["steve"]));

        let mut renamed = entry.clone();
        renamed.set_identity(EntryIdentity::fake_player("new"));
        sb.replace_entry(renamed.clone()).unwrap();

        assert_eq!(sb.entry_viewers(&renamed).collect::<Vec<_>>(), ["steve"]);
        assert_eq!(sb.entry_viewers(&entry).count(), 0);
    }

    #[test]
    fn replace_requires_existing_line() {
        let mut sb = scoreboard();
        let entry = sb.create_entry(0, 5, EntryIdentity::Entity(1)).unwrap();

        let err = sb.replace_entry(entry).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn rebase_rewrites_line_ids() {
        let mut sb = scoreboard();
        let entry = sb.create_entry(4, 5, EntryIdentity::Entity(1)).unwrap();
        sb.upsert_entry(entry, &[]);

        sb.rebase("hp".into(), 100);

        let rebased = sb.entries().next().unwrap();
        assert_eq!(rebased.scoreboard_id(), 104);
        assert_eq!(rebased.objective_name(), "hp");
        assert!(sb.entry(104).is_some());
    }

    #[test]
    fn visible_entries_follow_registration() {
        let mut sb = scoreboard();
        let a = sb.create_entry(0, 1, EntryIdentity::fake_player("a")).unwrap();
        let b = sb.create_entry(1, 2, EntryIdentity::fake_player("b")).unwrap();
        sb.upsert_entry(a, &viewers(&["steve", "alex"]));
        sb.upsert_entry(b, &viewers(&["alex"]));

        assert_eq!(sb.entries_visible_to("steve").len(), 1);
        assert_eq!(sb.entries_visible_to("alex").len(), 2);

        sb.unsubscribe_from_all_entries("alex");
        assert!(sb.entries_visible_to("alex").is_empty());

        sb.subscribe_to_all_entries("herobrine");
        assert_eq!(sb.entries_visible_to("herobrine").len(), 2);
    }
}
