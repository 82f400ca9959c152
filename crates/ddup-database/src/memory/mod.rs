//! In-memory implementations of the store traits.
//!
//! One [`MemoryStore`] holds every table behind a single `tokio` mutex and
//! implements all three traits, so cross-table rules (a session needs an
//! existing user, deleting an organization drops its memberships) hold the
//! same way they do in PostgreSQL. Each trait method takes the lock once;
//! that acquisition is its transaction boundary.
//!
//! Suitable for tests and single-process development only.

mod organization;
mod session;
mod user;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::Mutex;

use ddup_core::types::{OrganizationId, SessionId, UserId};
use ddup_entity::organization::{Organization, OrganizationMember};
use ddup_entity::session::Session;
use ddup_entity::user::User;

/// Tables and key sequences.
#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    sessions: BTreeMap<SessionId, Session>,
    organizations: BTreeMap<OrganizationId, Organization>,
    members: HashMap<(OrganizationId, UserId), OrganizationMember>,
    next_user_id: i64,
    next_session_id: i64,
    next_organization_id: i64,
}

impl Tables {
    fn next_user_id(&mut self) -> UserId {
        self.next_user_id += 1;
        UserId::new(self.next_user_id)
    }

    fn next_session_id(&mut self) -> SessionId {
        self.next_session_id += 1;
        SessionId::new(self.next_session_id)
    }

    fn next_organization_id(&mut self) -> OrganizationId {
        self.next_organization_id += 1;
        OrganizationId::new(self.next_organization_id)
    }
}

/// In-memory store implementing [`crate::UserStore`],
/// [`crate::SessionStore`], and [`crate::OrganizationStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}
