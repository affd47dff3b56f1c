use bevy_app::prelude::*;
use tally_protocol::{RemoveObjectiveS2c, SetDisplayObjectiveS2c};
use tally_scoreboard::NewObjective;

use crate::testing::{create_mock_client, test_plugins, ScenarioSingleClient};
use crate::{ScoreboardSettings, Scoreboards};

fn subscribe_offline(app: &mut App, objective: &str, viewer: &str) {
    let mut scoreboards = app.world_mut().resource_mut::<Scoreboards>();

    scoreboards
        .create_scoreboard(NewObjective::new(objective, objective))
        .unwrap();
    scoreboards.send_scoreboard_to(objective, &[viewer]).unwrap();
}

#[test]
fn join_resync_can_be_disabled() {
    let mut app = App::new();

    app.insert_resource(ScoreboardSettings {
        resync_on_join: false,
        ..Default::default()
    })
    .add_plugins(test_plugins());

    app.update();

    subscribe_offline(&mut app, "health", "late");

    let (client, mut helper) = create_mock_client("late");
    app.world_mut().spawn(client);
    app.update();

    assert!(helper.collect_received().is_empty());
}

#[test]
fn join_resync_is_on_by_default() {
    let mut app = App::new();
    app.add_plugins(test_plugins());
    app.update();

    subscribe_offline(&mut app, "health", "late");

    let (client, mut helper) = create_mock_client("late");
    app.world_mut().spawn(client);
    app.update();

    helper
        .collect_received()
        .assert_count::<SetDisplayObjectiveS2c>(1);
}

#[test]
fn app_exit_tears_down_scoreboards() {
    let ScenarioSingleClient {
        mut app,
        client: _,
        mut helper,
    } = ScenarioSingleClient::new();

    app.update();

    subscribe_offline(&mut app, "a", "test");
    subscribe_offline(&mut app, "b", "test");
    helper.clear_received();

    app.world_mut().send_event(AppExit::Success);
    app.update();

    helper
        .collect_received()
        .assert_count::<RemoveObjectiveS2c>(2);
    assert!(app.world().resource::<Scoreboards>().is_empty());
}

#[test]
fn app_exit_teardown_can_be_disabled() {
    let mut app = App::new();

    app.insert_resource(ScoreboardSettings {
        teardown_on_exit: false,
        ..Default::default()
    })
    .add_plugins(test_plugins());

    app.update();

    subscribe_offline(&mut app, "health", "nobody");

    app.world_mut().send_event(AppExit::Success);
    app.update();

    assert_eq!(app.world().resource::<Scoreboards>().len(), 1);
}
