use pretty_assertions::assert_eq;
use tally_protocol::{RemoveObjectiveS2c, ScoreAction, SetDisplayObjectiveS2c, SetScoreS2c};
use tally_scoreboard::{DisplaySlot, EntryIdentity, NewObjective};

use crate::testing::{create_mock_client, ScenarioSingleClient};
use crate::Scoreboards;

#[test]
fn show_scoreboard_when_subscribed() {
    let ScenarioSingleClient {
        mut app,
        client: _,
        mut helper,
    } = ScenarioSingleClient::new();

    // Process a tick to get past the "on join" logic.
    app.update();
    helper.clear_received();

    {
        let mut scoreboards = app.world_mut().resource_mut::<Scoreboards>();

        let mut health = scoreboards
            .create_scoreboard(NewObjective::new("health", "Health"))
            .unwrap();
        let line = health
            .create_entry(0, 20, EntryIdentity::fake_player("Hearts"))
            .unwrap();
        health.add_entry(line).unwrap();

        scoreboards.send_scoreboard_to("health", &["test"]).unwrap();
    }

    let recvd = helper.collect_received();

    recvd.assert_count::<SetDisplayObjectiveS2c>(1);
    recvd.assert_count::<SetScoreS2c>(1);
    recvd.assert_order::<(SetDisplayObjectiveS2c, SetScoreS2c)>();

    let display = recvd.first::<SetDisplayObjectiveS2c>();
    assert_eq!(display.objective_name, "health");
    assert_eq!(display.display_slot, DisplaySlot::Sidebar);

    let scores = recvd.first::<SetScoreS2c>();
    assert_eq!(scores.action, ScoreAction::Change);
    assert_eq!(scores.entries.len(), 1);
    assert_eq!(scores.entries[0].score, 20);
}

#[test]
fn rejoining_subscriber_gets_its_entries() {
    let ScenarioSingleClient {
        mut app,
        client,
        mut helper,
    } = ScenarioSingleClient::new();

    app.update();

    {
        let mut scoreboards = app.world_mut().resource_mut::<Scoreboards>();

        scoreboards
            .create_scoreboard(NewObjective::new("kills", "Kills"))
            .unwrap();
        scoreboards.send_scoreboard_to("kills", &["test"]).unwrap();

        let mut kills = scoreboards.scoreboard_mut("kills").unwrap();
        let mine = kills
            .create_entry(0, 3, EntryIdentity::fake_player("mine"))
            .unwrap();
        let theirs = kills
            .create_entry(1, 7, EntryIdentity::fake_player("theirs"))
            .unwrap();
        kills.add_entry(mine).unwrap();
        kills.add_entry_for(theirs, &["someone_else"]).unwrap();
    }

    // Disconnect.
    app.world_mut().despawn(client);
    app.update();
    helper.clear_received();

    assert!(app.world().resource::<Scoreboards>().scoreboard_viewers("kills").is_empty());

    // Reconnect under the same name.
    let (client, mut helper) = create_mock_client("test");
    app.world_mut().spawn(client);
    app.update();

    let recvd = helper.collect_received();

    recvd.assert_count::<SetDisplayObjectiveS2c>(1);
    recvd.assert_count::<SetScoreS2c>(1);
    recvd.assert_order::<(SetDisplayObjectiveS2c, SetScoreS2c)>();

    let scores = recvd.first::<SetScoreS2c>();
    assert_eq!(scores.entries.len(), 1);
    assert_eq!(scores.entries[0].score, 3);
}

#[test]
fn removing_scoreboard_notifies_viewers() {
    let ScenarioSingleClient {
        mut app,
        client: _,
        mut helper,
    } = ScenarioSingleClient::new();

    let (second, mut second_helper) = create_mock_client("second");
    app.world_mut().spawn(second);
    app.update();

    {
        let mut scoreboards = app.world_mut().resource_mut::<Scoreboards>();

        scoreboards
            .create_scoreboard(NewObjective::new("health", "Health"))
            .unwrap();
        scoreboards
            .send_scoreboard_to("health", &["test", "second"])
            .unwrap();
    }

    helper.clear_received();
    second_helper.clear_received();

    let removed = app
        .world_mut()
        .resource_mut::<Scoreboards>()
        .remove_scoreboard("health")
        .unwrap();
    assert_eq!(removed.objective_name(), "health");

    for helper in [&mut helper, &mut second_helper] {
        let recvd = helper.collect_received();
        recvd.assert_count::<RemoveObjectiveS2c>(1);
        assert_eq!(recvd.first::<RemoveObjectiveS2c>().objective_name, "health");
    }

    assert!(app.world().resource::<Scoreboards>().is_empty());
}

#[test]
fn below_name_sets_score_tag() {
    let ScenarioSingleClient {
        mut app,
        client: _,
        helper,
    } = ScenarioSingleClient::new();

    app.update();

    let mut scoreboards = app.world_mut().resource_mut::<Scoreboards>();

    scoreboards
        .create_scoreboard(NewObjective {
            display_slot: DisplaySlot::BelowName,
            ..NewObjective::new("hp", "Hearts")
        })
        .unwrap();
    scoreboards.send_scoreboard_to("hp", &["test"]).unwrap();

    assert_eq!(helper.score_tag(), "Hearts");

    scoreboards.remove_scoreboard_for("hp", &["test"]).unwrap();

    assert_eq!(helper.score_tag(), "");
    assert!(scoreboards.scoreboard("hp").is_some());
}

#[test]
fn padded_entries_are_resent() {
    let ScenarioSingleClient {
        mut app,
        client: _,
        mut helper,
    } = ScenarioSingleClient::new();

    app.update();

    let mut scoreboards = app.world_mut().resource_mut::<Scoreboards>();

    scoreboards
        .create_scoreboard(NewObjective::new("top", "Top"))
        .unwrap();
    scoreboards.send_scoreboard_to("top", &["test"]).unwrap();

    let mut top = scoreboards.scoreboard_mut("top").unwrap();
    let alice = top
        .create_entry(0, 5, EntryIdentity::fake_player("Alice"))
        .unwrap();
    let bob = top
        .create_entry(1, 120, EntryIdentity::fake_player("Bob"))
        .unwrap();
    top.add_entry(alice).unwrap().add_entry(bob).unwrap();

    helper.clear_received();

    top.pad_entries().unwrap();

    let recvd = helper.collect_received();
    let updates = recvd.all::<SetScoreS2c>();

    assert_eq!(updates.len(), 2);
    assert_eq!(updates[0].action, ScoreAction::Remove);
    assert_eq!(updates[1].action, ScoreAction::Change);
    assert_eq!(updates[1].entries[0].scoreboard_id, 1);
}
