//! End-to-end tests across the delegation boundary.
//!
//! A delegated registry talks through a loopback RPC client into the export
//! surface of a real authoritative registry, so every layer — wire encoding,
//! dispatch, id resolution, boundary error translation, fan-out — runs for
//! real. Only the process boundary itself is simulated.

use crate::context::PlayerRef;
use crate::exports::ChannelExports;
use crate::registry::{ChannelRegistry, LocalChannelRegistry, RemoteChannelRegistry};
use crate::test_support::{LoopbackRpc, RecordingTransport, StaticDirectory, TestPlayer};
use crate::types::{CallerContext, ChannelId, ChannelMetadata, ChannelType, ClientId};
use std::sync::Arc;

struct Harness {
    delegate: RemoteChannelRegistry,
    exports: Arc<ChannelExports>,
    transport: Arc<RecordingTransport>,
}

fn harness(players: Vec<Arc<dyn PlayerRef>>) -> Harness {
    let transport = Arc::new(RecordingTransport::default());
    let directory = StaticDirectory::new(players);
    let authority = Arc::new(LocalChannelRegistry::new(transport.clone(), directory.clone()));
    let exports = Arc::new(ChannelExports::new(authority, directory.clone()));
    let delegate = RemoteChannelRegistry::new(
        LoopbackRpc::new(exports.clone()),
        directory,
        "core-comms",
    );
    Harness {
        delegate,
        exports,
        transport,
    }
}

#[tokio::test]
async fn delegated_create_subscribe_broadcast_reaches_the_transport() {
    let ada = TestPlayer::connected(1, "Ada");
    let brie = TestPlayer::connected(2, "Brie");
    let h = harness(vec![ada.clone(), brie.clone()]);
    let ctx = CallerContext::new("voice-hud");
    let id = ChannelId::from("team:alpha");

    let snapshot = h
        .delegate
        .create(&ctx, id.clone(), ChannelMetadata::of(ChannelType::Group), None)
        .await
        .expect("created through the boundary");
    assert_eq!(snapshot.id, id);

    assert!(h
        .delegate
        .subscribe(&id, ada.clone(), None)
        .await
        .expect("subscribed"));
    assert!(h
        .delegate
        .subscribe(&id, brie.clone(), None)
        .await
        .expect("subscribed"));
    assert!(h.delegate.is_subscribed(&id, ada.clone()).await.expect("ok"));

    h.delegate
        .broadcast(&id, ada.clone(), "hello team", None, None)
        .await
        .expect("broadcast accepted");

    let emitted = h.transport.take();
    assert_eq!(emitted.len(), 1);
    let mut targets = emitted[0].targets.clone();
    targets.sort_by_key(|c| c.0);
    assert_eq!(targets, vec![ClientId(1), ClientId(2)]);
    assert_eq!(emitted[0].payload.author, "Ada");

    let subscribers = h.delegate.get_subscribers(&id).await.expect("resolved");
    assert_eq!(subscribers.len(), 2);
}

#[tokio::test]
async fn delegated_duplicate_create_surfaces_as_an_error() {
    let h = harness(vec![]);
    let ctx = CallerContext::new("voice-hud");
    let id = ChannelId::from("global");

    h.delegate
        .create(&ctx, id.clone(), ChannelMetadata::of(ChannelType::Global), None)
        .await
        .expect("first create");
    h.delegate
        .create(&ctx, id, ChannelMetadata::of(ChannelType::Global), None)
        .await
        .expect_err("the boundary's null reply becomes a local error");
}

#[tokio::test]
async fn stopping_a_resource_cleans_up_its_channels_at_the_authority() {
    let h = harness(vec![]);
    let ctx = CallerContext::new("voice-hud");

    h.delegate
        .create(
            &ctx,
            ChannelId::from("radio:100"),
            ChannelMetadata::of(ChannelType::Radio),
            None,
        )
        .await
        .expect("created");
    assert!(h
        .delegate
        .exists(&ChannelId::from("radio:100"))
        .await
        .expect("ok"));

    h.exports.resource_stopped("voice-hud").await;

    assert!(!h
        .delegate
        .exists(&ChannelId::from("radio:100"))
        .await
        .expect("ok"));
    assert!(h.delegate.get_all_channels().await.expect("ok").is_empty());
}

#[tokio::test]
async fn delegated_proximity_creation_resolves_positions_at_the_authority() {
    let origin = TestPlayer::at(1, "Ada", 0.0, 0.0, 0.0);
    let near = TestPlayer::at(2, "Brie", 5.0, 0.0, 0.0);
    let far = TestPlayer::at(3, "Cleo", 50.0, 0.0, 0.0);
    let h = harness(vec![origin.clone(), near, far]);

    let snapshot = h
        .delegate
        .create_proximity(&CallerContext::new("voice-hud"), origin, 10.0, None)
        .await
        .expect("no error")
        .expect("origin has a position");
    assert_eq!(snapshot.subscriber_count, 2);
    assert!(snapshot.id.as_str().starts_with("proximity:1:"));
}
