use std::borrow::Cow;

use tally_protocol::{ScoreIdentity, ScorePacketEntry};

use crate::error::ScoreboardError;
use crate::scoreboard::Scoreboard;

/// The highest line index an objective can hold. Lines are numbered from zero.
pub const MAX_LINES: i64 = 15;

/// The highest base line ID an objective can use. Every line ID of the
/// objective must fit in an `i64`.
pub const MAX_SCOREBOARD_ID: i64 = i64::MAX - MAX_LINES;

/// The kind of thing a scoreboard line is attached to.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum EntryKind {
    Player,
    Entity,
    FakePlayer,
}

/// Who a scoreboard line belongs to.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum EntryIdentity {
    /// A player, by entity unique ID.
    Player(i64),
    /// A non-player entity, by entity unique ID.
    Entity(i64),
    /// Arbitrary text rendered where a player name would be.
    FakePlayer(String),
}

impl EntryIdentity {
    pub fn fake_player<S: Into<String>>(name: S) -> Self {
        EntryIdentity::FakePlayer(name.into())
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            EntryIdentity::Player(_) => EntryKind::Player,
            EntryIdentity::Entity(_) => EntryKind::Entity,
            EntryIdentity::FakePlayer(_) => EntryKind::FakePlayer,
        }
    }

    /// The key this identity's viewers are indexed under.
    pub fn viewer_key(&self) -> ViewerKey {
        match self {
            EntryIdentity::Player(id) | EntryIdentity::Entity(id) => ViewerKey::EntityId(*id),
            EntryIdentity::FakePlayer(name) => ViewerKey::Name(name.clone()),
        }
    }

    fn to_packet(&self) -> ScoreIdentity<'_> {
        match self {
            EntryIdentity::Player(id) => ScoreIdentity::Player(*id),
            EntryIdentity::Entity(id) => ScoreIdentity::Entity(*id),
            EntryIdentity::FakePlayer(name) => ScoreIdentity::FakePlayer(Cow::Borrowed(name)),
        }
    }
}

/// Per-entry viewer index key: the custom name of fake players, the entity
/// unique ID of everything else.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum ViewerKey {
    Name(String),
    EntityId(i64),
}

/// One line of an objective.
///
/// Entries are built with [`Scoreboard::create_entry`] and only take effect
/// once attached through [`ScoreboardMut`](crate::ScoreboardMut). Editing an
/// entry value does nothing on its own; pass the edited value to
/// [`ScoreboardMut::update_entry`](crate::ScoreboardMut::update_entry).
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ScoreboardEntry {
    objective_name: String,
    line: u8,
    scoreboard_id: i64,
    score: i32,
    identity: EntryIdentity,
}

impl ScoreboardEntry {
    /// Creates an entry for `line` of `scoreboard`.
    ///
    /// Fails with [`ScoreboardError::LineOutOfRange`] unless `line` is within
    /// `0..=MAX_LINES`.
    pub fn new(
        scoreboard: &Scoreboard,
        line: i32,
        score: i32,
        identity: EntryIdentity,
    ) -> Result<Self, ScoreboardError> {
        let line = u8::try_from(line)
            .ok()
            .filter(|line| i64::from(*line) <= MAX_LINES)
            .ok_or(ScoreboardError::LineOutOfRange {
                line: i64::from(line),
            })?;

        let scoreboard_id = scoreboard
            .scoreboard_id()
            .checked_add(i64::from(line))
            .ok_or(ScoreboardError::LineOutOfRange {
                line: i64::from(line),
            })?;

        Ok(Self {
            objective_name: scoreboard.objective_name().to_owned(),
            line,
            scoreboard_id,
            score,
            identity,
        })
    }

    pub fn objective_name(&self) -> &str {
        &self.objective_name
    }

    pub fn line(&self) -> u8 {
        self.line
    }

    /// The effective line ID: the owning objective's base ID plus the line.
    pub fn scoreboard_id(&self) -> i64 {
        self.scoreboard_id
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn set_score(&mut self, score: i32) {
        self.score = score;
    }

    #[must_use]
    pub fn with_score(mut self, score: i32) -> Self {
        self.score = score;
        self
    }

    pub fn identity(&self) -> &EntryIdentity {
        &self.identity
    }

    pub fn set_identity(&mut self, identity: EntryIdentity) {
        self.identity = identity;
    }

    pub fn kind(&self) -> EntryKind {
        self.identity.kind()
    }

    /// The display text of a fake player entry.
    pub fn custom_name(&self) -> Option<&str> {
        match &self.identity {
            EntryIdentity::FakePlayer(name) => Some(name),
            _ => None,
        }
    }

    /// The entity unique ID of a player or entity entry.
    pub fn entity_unique_id(&self) -> Option<i64> {
        match self.identity {
            EntryIdentity::Player(id) | EntryIdentity::Entity(id) => Some(id),
            EntryIdentity::FakePlayer(_) => None,
        }
    }

    pub fn viewer_key(&self) -> ViewerKey {
        self.identity.viewer_key()
    }

    /// Number of characters the score takes up when rendered, sign included.
    pub fn score_width(&self) -> usize {
        self.score.to_string().len()
    }

    /// Returns a copy of this fake player entry with its name padded so its
    /// score lines up with scores `max_width` characters wide.
    ///
    /// Returns `None` when nothing would change: the entry is not a fake
    /// player, its name already ends in a space, or its score is already the
    /// widest.
    pub(crate) fn padded(&self, max_width: usize) -> Option<Self> {
        let EntryIdentity::FakePlayer(name) = &self.identity else {
            return None;
        };

        let width = self.score_width();

        if name.ends_with(' ') || width >= max_width {
            return None;
        }

        // One separating space plus one per missing digit.
        let mut name = name.clone();
        name.extend(std::iter::repeat(' ').take(max_width - width + 1));

        Some(Self {
            identity: EntryIdentity::FakePlayer(name),
            ..self.clone()
        })
    }

    /// `base_id` must not exceed [`MAX_SCOREBOARD_ID`].
    pub(crate) fn rebase(&mut self, objective_name: &str, base_id: i64) {
        objective_name.clone_into(&mut self.objective_name);
        self.scoreboard_id = base_id + i64::from(self.line);
    }

    pub(crate) fn to_packet_entry(&self) -> ScorePacketEntry<'_> {
        ScorePacketEntry {
            scoreboard_id: self.scoreboard_id,
            objective_name: Cow::Borrowed(&self.objective_name),
            score: self.score,
            identity: Some(self.identity.to_packet()),
        }
    }
}

#[cfg(test)]
mod tests {
    use tally_protocol::{DisplaySlot, SortOrder};

    use super::*;
    use crate::error::ErrorKind;

    fn scoreboard() -> Scoreboard {
        Scoreboard::new(
            "health".into(),
            "Health".into(),
            DisplaySlot::Sidebar,
            SortOrder::Ascending,
            10,
        )
    }

    #[test]
    fn every_valid_line_is_accepted() {
        let sb = scoreboard();

        for line in 0..=15 {
            let entry = ScoreboardEntry::new(&sb, line, 1, EntryIdentity::Entity(7)).unwrap();
            assert_eq!(entry.scoreboard_id(), 10 + i64::from(line));
            assert_eq!(entry.line(), line as u8);
            assert_eq!(entry.objective_name(), "health");
        }
    }

    #[test]
    fn lines_outside_range_are_rejected() {
        let sb = scoreboard();

        for line in [-1, 16, 255, 256, i32::MIN, i32::MAX] {
            let err = ScoreboardEntry::new(&sb, line, 1, EntryIdentity::Entity(7)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Range);
            assert_eq!(
                err,
                ScoreboardError::LineOutOfRange {
                    line: i64::from(line)
                }
            );
        }
    }

    #[test]
    fn identity_fields_follow_kind() {
        let sb = scoreboard();

        let fake = ScoreboardEntry::new(&sb, 0, 1, EntryIdentity::fake_player("Alice")).unwrap();
        assert_eq!(fake.kind(), EntryKind::FakePlayer);
        assert_eq!(fake.custom_name(), Some("Alice"));
        assert_eq!(fake.entity_unique_id(), None);
        assert_eq!(fake.viewer_key(), ViewerKey::Name("Alice".into()));

        let player = ScoreboardEntry::new(&sb, 1, 1, EntryIdentity::Player(42)).unwrap();
        assert_eq!(player.kind(), EntryKind::Player);
        assert_eq!(player.custom_name(), None);
        assert_eq!(player.entity_unique_id(), Some(42));
        assert_eq!(player.viewer_key(), ViewerKey::EntityId(42));
    }

    #[test]
    fn padding_aligns_narrower_scores() {
        let sb = scoreboard();

        let alice = ScoreboardEntry::new(&sb, 0, 5, EntryIdentity::fake_player("Alice")).unwrap();
        let bob = ScoreboardEntry::new(&sb, 1, 120, EntryIdentity::fake_player("Bob")).unwrap();

        let padded = alice.padded(bob.score_width()).unwrap();
        assert_eq!(padded.custom_name(), Some("Alice   "));
        assert_eq!(padded.scoreboard_id(), alice.scoreboard_id());
        assert!(bob.padded(3).is_none());
        assert!(padded.padded(3).is_none());
    }

    #[test]
    fn empty_names_are_padded() {
        let sb = scoreboard();

        let blank = ScoreboardEntry::new(&sb, 0, -1, EntryIdentity::fake_player("")).unwrap();
        assert_eq!(blank.score_width(), 2);

        let padded = blank.padded(4).unwrap();
        assert_eq!(padded.custom_name(), Some("   "));
    }
}
