use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::{debug, info};
use uuid::Uuid;

use crate::dto::social_dto::RequestAction;
use crate::models::connection::{Connection, ConnectionRequest, RequestStatus};
use crate::models::user::{Session, User};
use crate::services::store::{lock, MutationOutcome, Publisher};
use crate::utils::text::contains_ci;
use crate::utils::time::Clock;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionAnalytics {
    pub total_connections: usize,
    pub pending_incoming: usize,
    pub pending_outgoing: usize,
    pub suggestion_count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionSnapshot {
    pub connections: Vec<Connection>,
    pub incoming: Vec<ConnectionRequest>,
    pub outgoing: Vec<ConnectionRequest>,
    pub suggestions: Vec<User>,
    pub analytics: ConnectionAnalytics,
}

struct ConnectionState {
    directory: Vec<User>,
    connections: Vec<Connection>,
    incoming: Vec<ConnectionRequest>,
    outgoing: Vec<ConnectionRequest>,
    suggestions: Vec<User>,
}

impl ConnectionState {
    fn user(&self, user_id: &str) -> Option<&User> {
        self.directory.iter().find(|u| u.id == user_id)
    }

    fn suggest(&mut self, user_id: &str) {
        if self.suggestions.iter().any(|u| u.id == user_id) {
            return;
        }
        if let Some(user) = self.user(user_id).cloned() {
            self.suggestions.push(user);
        }
    }

    fn snapshot(&self) -> ConnectionSnapshot {
        ConnectionSnapshot {
            connections: self.connections.clone(),
            incoming: self.incoming.clone(),
            outgoing: self.outgoing.clone(),
            suggestions: self.suggestions.clone(),
            analytics: ConnectionAnalytics {
                total_connections: self.connections.len(),
                pending_incoming: self.incoming.len(),
                pending_outgoing: self.outgoing.len(),
                suggestion_count: self.suggestions.len(),
            },
        }
    }
}

/// The session user's network: connections, pending invitations and
/// people-you-may-know suggestions.
#[derive(Clone)]
pub struct ConnectionStore {
    state: Arc<Mutex<ConnectionState>>,
    publisher: Arc<Publisher<ConnectionSnapshot>>,
    clock: Arc<dyn Clock>,
    session: Session,
}

impl ConnectionStore {
    /// Everyone in `directory` who is neither connected nor part of a pending
    /// request becomes a suggestion.
    pub fn new(
        directory: Vec<User>,
        connections: Vec<Connection>,
        incoming: Vec<ConnectionRequest>,
        session: Session,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let suggestions = directory
            .iter()
            .filter(|u| u.id != session.user_id)
            .filter(|u| !connections.iter().any(|c| c.user.id == u.id))
            .filter(|u| !incoming.iter().any(|r| r.from_user_id == u.id))
            .cloned()
            .collect();
        let state = ConnectionState {
            directory,
            connections,
            incoming,
            outgoing: Vec::new(),
            suggestions,
        };
        let publisher = Publisher::new(state.snapshot());

        Self {
            state: Arc::new(Mutex::new(state)),
            publisher: Arc::new(publisher),
            clock,
            session,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionSnapshot> {
        self.publisher.subscribe()
    }

    pub fn snapshot(&self) -> ConnectionSnapshot {
        self.publisher.current()
    }

    fn publish(&self, state: &ConnectionState) {
        self.publisher.publish(state.snapshot());
    }

    pub fn get_by_id(&self, user_id: &str) -> Option<Connection> {
        lock(&self.state, "connections")
            .connections
            .iter()
            .find(|c| c.user.id == user_id)
            .cloned()
    }

    /// Connections whose name, headline or company contains `keyword`.
    pub fn search(&self, keyword: &str) -> Vec<Connection> {
        let state = lock(&self.state, "connections");
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            return state.connections.clone();
        }
        state
            .connections
            .iter()
            .filter(|c| {
                contains_ci(&c.user.name, &keyword)
                    || contains_ci(&c.user.headline, &keyword)
                    || contains_ci(&c.user.company, &keyword)
            })
            .cloned()
            .collect()
    }

    /// Invites a suggested user. Anyone not currently suggested is ignored.
    pub fn send_request(&self, user_id: &str, message: Option<String>) -> MutationOutcome {
        let mut state = lock(&self.state, "connections");
        let Some(index) = state.suggestions.iter().position(|u| u.id == user_id) else {
            debug!(user_id, "connection request to non-suggested user ignored");
            return MutationOutcome::Ignored;
        };
        state.suggestions.remove(index);
        let request = ConnectionRequest {
            id: Uuid::new_v4().to_string(),
            from_user_id: self.session.user_id.clone(),
            to_user_id: user_id.to_string(),
            message: message.filter(|m| !m.trim().is_empty()),
            status: RequestStatus::Pending,
            sent_at: self.clock.now(),
        };
        info!(request_id = %request.id, to = user_id, "connection request sent");
        state.outgoing.insert(0, request);
        self.publish(&state);
        MutationOutcome::Applied
    }

    pub fn respond(&self, request_id: &str, action: RequestAction) -> MutationOutcome {
        match action {
            RequestAction::Accept => self.accept(request_id),
            RequestAction::Decline => self.decline(request_id),
            RequestAction::Withdraw => self.withdraw(request_id),
        }
    }

    pub fn accept(&self, request_id: &str) -> MutationOutcome {
        let mut state = lock(&self.state, "connections");
        let Some(index) = state.incoming.iter().position(|r| r.id == request_id) else {
            return MutationOutcome::Ignored;
        };
        let Some(user) = state.user(&state.incoming[index].from_user_id).cloned() else {
            return MutationOutcome::Ignored;
        };
        let mut request = state.incoming.remove(index);
        request.status = RequestStatus::Accepted;

        state.suggestions.retain(|u| u.id != user.id);
        state.connections.insert(
            0,
            Connection {
                user,
                connected_at: self.clock.now(),
                mutual_connections: 0,
            },
        );
        info!(request_id, from = %request.from_user_id, "connection request accepted");
        self.publish(&state);
        MutationOutcome::Applied
    }

    pub fn decline(&self, request_id: &str) -> MutationOutcome {
        let mut state = lock(&self.state, "connections");
        let before = state.incoming.len();
        state.incoming.retain(|r| r.id != request_id);
        if state.incoming.len() == before {
            return MutationOutcome::Ignored;
        }
        info!(request_id, "connection request declined");
        self.publish(&state);
        MutationOutcome::Applied
    }

    /// Cancels an outgoing request; the invitee goes back to suggestions.
    pub fn withdraw(&self, request_id: &str) -> MutationOutcome {
        let mut state = lock(&self.state, "connections");
        let Some(index) = state.outgoing.iter().position(|r| r.id == request_id) else {
            return MutationOutcome::Ignored;
        };
        let request = state.outgoing.remove(index);
        state.suggest(&request.to_user_id);
        info!(request_id, "connection request withdrawn");
        self.publish(&state);
        MutationOutcome::Applied
    }

    pub fn remove_connection(&self, user_id: &str) -> MutationOutcome {
        let mut state = lock(&self.state, "connections");
        let before = state.connections.len();
        state.connections.retain(|c| c.user.id != user_id);
        if state.connections.len() == before {
            return MutationOutcome::Ignored;
        }
        state.suggest(user_id);
        info!(user_id, "connection removed");
        self.publish(&state);
        MutationOutcome::Applied
    }
}
