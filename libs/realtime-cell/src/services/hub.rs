use std::collections::{HashMap, HashSet};

use chrono::Utc;
use serde_json::{json, Value};
use tokio::sync::{mpsc, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::models::Channel;

pub type SessionSender = mpsc::UnboundedSender<String>;
pub type SessionReceiver = mpsc::UnboundedReceiver<String>;

/// Transport hub: maps live sessions to their outbound pipes and channels to
/// their member sessions. Delivery is fire-and-forget; a session whose pipe
/// is gone simply misses the event and resynchronizes on reconnect.
pub struct ChannelHub {
    sessions: RwLock<HashMap<Uuid, SessionSender>>,
    members: RwLock<HashMap<Channel, HashSet<Uuid>>>,
}

impl ChannelHub {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            members: RwLock::new(HashMap::new()),
        }
    }

    /// Register a session and hand back the receiving end of its pipe.
    pub async fn register(&self, session_id: Uuid) -> SessionReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut sessions = self.sessions.write().await;
        sessions.insert(session_id, tx);
        debug!("Registered realtime session {}", session_id);
        rx
    }

    /// Drop the session's pipe and every channel membership it held.
    pub async fn unregister(&self, session_id: Uuid) {
        {
            let mut sessions = self.sessions.write().await;
            sessions.remove(&session_id);
        }
        self.leave_all(session_id).await;
        debug!("Unregistered realtime session {}", session_id);
    }

    pub async fn join(&self, session_id: Uuid, channel: Channel) {
        let mut members = self.members.write().await;
        members.entry(channel).or_default().insert(session_id);
    }

    pub async fn leave(&self, session_id: Uuid, channel: &Channel) {
        let mut members = self.members.write().await;
        if let Some(set) = members.get_mut(channel) {
            set.remove(&session_id);
            if set.is_empty() {
                members.remove(channel);
            }
        }
    }

    pub async fn leave_all(&self, session_id: Uuid) {
        let mut members = self.members.write().await;
        members.retain(|_, set| {
            set.remove(&session_id);
            !set.is_empty()
        });
    }

    /// Deliver one event to the union of members across the given channels:
    /// at most once per session even when it belongs to several of them.
    pub async fn emit(&self, channels: &[Channel], event: &str, payload: Value) {
        let audience: HashSet<Uuid> = {
            let members = self.members.read().await;
            channels
                .iter()
                .filter_map(|c| members.get(c))
                .flatten()
                .copied()
                .collect()
        };
        if audience.is_empty() {
            return;
        }

        let message = envelope(event, payload);
        let sessions = self.sessions.read().await;
        for session_id in audience {
            if let Some(tx) = sessions.get(&session_id) {
                if tx.send(message.clone()).is_err() {
                    debug!("Dropping event {} for closed session {}", event, session_id);
                }
            }
        }
    }

    /// Direct delivery to a single session, used for resync and errors.
    pub async fn emit_to_session(&self, session_id: Uuid, event: &str, payload: Value) {
        let sessions = self.sessions.read().await;
        if let Some(tx) = sessions.get(&session_id) {
            if tx.send(envelope(event, payload)).is_err() {
                debug!("Dropping event {} for closed session {}", event, session_id);
            }
        }
    }

    pub async fn member_count(&self, channel: &Channel) -> usize {
        let members = self.members.read().await;
        members.get(channel).map(|s| s.len()).unwrap_or(0)
    }
}

impl Default for ChannelHub {
    fn default() -> Self {
        Self::new()
    }
}

fn envelope(event: &str, payload: Value) -> String {
    json!({
        "event": event,
        "data": payload,
        "timestamp": Utc::now().to_rfc3339(),
    })
    .to_string()
}
