use bevy_ecs::event::Events;

use crate::testing::{create_mock_client, ScenarioSingleClient};
use crate::{OnlinePlayers, PlayerJoinEvent};

#[test]
fn spawned_clients_are_online() {
    let ScenarioSingleClient { mut app, client, .. } = ScenarioSingleClient::new();

    app.update();

    let online = app.world().resource::<OnlinePlayers>();
    assert!(online.contains("test"));
    assert_eq!(online.entity("test"), Some(client));

    let events = app.world().resource::<Events<PlayerJoinEvent>>();
    let mut reader = events.get_reader();
    let joined: Vec<_> = reader
        .read(events)
        .map(|e| e.username.as_str())
        .collect();
    assert_eq!(joined, ["test"]);
}

#[test]
fn despawned_clients_go_offline() {
    let ScenarioSingleClient { mut app, client, .. } = ScenarioSingleClient::new();

    app.update();
    app.world_mut().despawn(client);
    app.update();

    assert!(app.world().resource::<OnlinePlayers>().is_empty());
}

#[test]
fn reconnect_in_same_tick_keeps_new_connection() {
    let ScenarioSingleClient { mut app, client, .. } = ScenarioSingleClient::new();

    app.update();

    let (bundle, _helper) = create_mock_client("test");
    app.world_mut().despawn(client);
    let new_client = app.world_mut().spawn(bundle).id();
    app.update();

    let online = app.world().resource::<OnlinePlayers>();
    assert_eq!(online.len(), 1);
    assert_eq!(online.entity("test"), Some(new_client));
}
