//! # ddup-database
//!
//! Persistence for the DDUP identity backend. The rest of the workspace
//! talks to storage only through the capability traits in [`store`]; the
//! concrete driver (PostgreSQL or in-memory) is picked once at startup by
//! [`Stores::from_config`].

pub mod connection;
pub mod memory;
pub mod migration;
pub mod postgres;
pub mod probe;
pub mod store;
pub mod stores;

pub use connection::DatabasePool;
pub use store::{OrganizationStore, SessionStore, UserStore};
pub use stores::Stores;
