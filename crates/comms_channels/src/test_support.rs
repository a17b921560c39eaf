//! Mock capability implementations shared by the test modules.

use crate::context::{NetworkTransport, PlayerDirectory, PlayerRef};
use crate::exports::ChannelExports;
use crate::rpc::{RemoteProcedureClient, RpcError};
use crate::types::{ChatPayload, ClientId, PlayerId, Position};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A fake player with a fixed identity and optional position.
pub struct TestPlayer {
    id: PlayerId,
    client_id: ClientId,
    name: String,
    position: Option<Position>,
}

impl TestPlayer {
    /// A connected player standing at the world origin.
    pub fn connected(client_id: u32, name: &str) -> Arc<Self> {
        Self::build(client_id, name, Some(Position::new(0.0, 0.0, 0.0)))
    }

    /// A connected player at the given coordinates.
    pub fn at(client_id: u32, name: &str, x: f64, y: f64, z: f64) -> Arc<Self> {
        Self::build(client_id, name, Some(Position::new(x, y, z)))
    }

    /// A connected player whose position cannot be resolved.
    pub fn unplaced(client_id: u32, name: &str) -> Arc<Self> {
        Self::build(client_id, name, None)
    }

    fn build(client_id: u32, name: &str, position: Option<Position>) -> Arc<Self> {
        Arc::new(Self {
            id: PlayerId::new(),
            client_id: ClientId(client_id),
            name: name.to_string(),
            position,
        })
    }
}

impl PlayerRef for TestPlayer {
    fn id(&self) -> PlayerId {
        self.id
    }

    fn client_id(&self) -> ClientId {
        self.client_id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn position(&self) -> Option<Position> {
        self.position
    }
}

/// One call captured by [`RecordingTransport`].
pub struct EmittedBroadcast {
    pub event: String,
    pub targets: Vec<ClientId>,
    pub payload: ChatPayload,
}

/// Transport that records every fan-out instead of sending anything.
#[derive(Default)]
pub struct RecordingTransport {
    emitted: Mutex<Vec<EmittedBroadcast>>,
}

impl RecordingTransport {
    /// Drains and returns everything emitted so far.
    pub fn take(&self) -> Vec<EmittedBroadcast> {
        std::mem::take(&mut *self.emitted.lock().expect("transport lock"))
    }
}

#[async_trait]
impl NetworkTransport for RecordingTransport {
    async fn emit_to_targets(&self, event_name: &str, targets: &[ClientId], payload: &ChatPayload) {
        self.emitted.lock().expect("transport lock").push(EmittedBroadcast {
            event: event_name.to_string(),
            targets: targets.to_vec(),
            payload: payload.clone(),
        });
    }
}

/// Directory over a fixed set of players.
pub struct StaticDirectory {
    players: Vec<Arc<dyn PlayerRef>>,
}

impl StaticDirectory {
    pub fn new(players: Vec<Arc<dyn PlayerRef>>) -> Arc<Self> {
        Arc::new(Self { players })
    }
}

#[async_trait]
impl PlayerDirectory for StaticDirectory {
    async fn get_by_client(&self, client_id: ClientId) -> Option<Arc<dyn PlayerRef>> {
        self.players
            .iter()
            .find(|p| p.client_id() == client_id)
            .cloned()
    }

    async fn get_all(&self) -> Vec<Arc<dyn PlayerRef>> {
        self.players.clone()
    }

    async fn get_many(&self, client_ids: &[ClientId]) -> Vec<Arc<dyn PlayerRef>> {
        let mut resolved = Vec::new();
        for client_id in client_ids {
            if let Some(player) = self.get_by_client(*client_id).await {
                resolved.push(player);
            }
        }
        resolved
    }
}

/// RPC client that replays scripted replies and records every call.
pub struct ScriptedRpc {
    calls: Mutex<Vec<(String, Value)>>,
    replies: Mutex<VecDeque<Result<Value, RpcError>>>,
}

impl ScriptedRpc {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            replies: Mutex::new(VecDeque::new()),
        }
    }

    pub fn push_reply(&self, reply: Value) {
        self.replies.lock().expect("rpc lock").push_back(Ok(reply));
    }

    pub fn push_error(&self, error: RpcError) {
        self.replies.lock().expect("rpc lock").push_back(Err(error));
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().expect("rpc lock").clone()
    }
}

#[async_trait]
impl RemoteProcedureClient for ScriptedRpc {
    async fn call(&self, procedure: &str, args: Value) -> Result<Value, RpcError> {
        self.calls
            .lock()
            .expect("rpc lock")
            .push((procedure.to_string(), args));
        self.replies
            .lock()
            .expect("rpc lock")
            .pop_front()
            .unwrap_or_else(|| Err(RpcError::Transport("no scripted reply".to_string())))
    }
}

/// RPC client that short-circuits straight into an in-process export
/// surface, exercising the full delegate → boundary → authority path.
pub struct LoopbackRpc {
    exports: Arc<ChannelExports>,
}

impl LoopbackRpc {
    pub fn new(exports: Arc<ChannelExports>) -> Arc<Self> {
        Arc::new(Self { exports })
    }
}

#[async_trait]
impl RemoteProcedureClient for LoopbackRpc {
    async fn call(&self, procedure: &str, args: Value) -> Result<Value, RpcError> {
        Ok(self.exports.dispatch(procedure, args).await)
    }
}
