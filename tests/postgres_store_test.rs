//! Concurrency tests for the PostgreSQL driver.
//!
//! These run only when `DATABASE_URL` points at a disposable database; the
//! migrations are applied on first use. Every test creates its own users and
//! organization so runs do not interfere with each other.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::Barrier;

use ddup_core::config::{DatabaseConfig, DatabaseDriver};
use ddup_core::error::ErrorKind;
use ddup_core::types::UserId;
use ddup_database::migration::run_migrations;
use ddup_database::{DatabasePool, OrganizationStore, SessionStore, Stores, UserStore};
use ddup_entity::organization::{NewOrganization, OrgRole};
use ddup_entity::session::NewSession;
use ddup_entity::user::{NewUser, User};

async fn pg_stores() -> Option<Stores> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping PostgreSQL test");
        return None;
    };
    let config = DatabaseConfig {
        driver: DatabaseDriver::Postgres,
        url,
        max_connections: 16,
        ..DatabaseConfig::default()
    };
    let pool = DatabasePool::connect(&config).await.expect("connect");
    run_migrations(pool.pool()).await.expect("migrations");
    Some(Stores::postgres(pool))
}

/// A suffix unique to this run, short enough for a 32-character username.
fn run_tag() -> String {
    let nanos = Utc::now().timestamp_nanos_opt().expect("timestamp in range");
    format!("{}", nanos % 1_000_000_000_000_000)
}

/// A 64-character fingerprint unique per run and index.
fn fingerprint(tag: &str, index: usize) -> String {
    format!("{tag:0>48}{index:016x}")
}

async fn create_user(stores: &Stores, name: &str) -> User {
    stores
        .users
        .create(NewUser::new(name, "not-a-real-hash"))
        .await
        .expect("create user")
}

fn new_session(user_id: UserId, token_hash: String) -> NewSession {
    NewSession::new(user_id, token_hash, Utc::now() + Duration::hours(1))
}

async fn valid_session_count(stores: &Stores, user_id: UserId) -> i64 {
    let pool = stores.pool.as_ref().expect("postgres pool");
    sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE user_id = $1 AND valid")
        .bind(user_id)
        .fetch_one(pool.pool())
        .await
        .expect("count sessions")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_logins_leave_one_valid_session() {
    let Some(stores) = pg_stores().await else {
        return;
    };
    let tag = run_tag();
    let user = create_user(&stores, &format!("pg_login_{tag}")).await;

    const LOGINS: usize = 8;
    let barrier = Arc::new(Barrier::new(LOGINS));
    let mut handles = Vec::with_capacity(LOGINS);
    for i in 0..LOGINS {
        let sessions = stores.sessions.clone();
        let barrier = Arc::clone(&barrier);
        let session = new_session(user.id, fingerprint(&tag, i));
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            sessions.replace_for_user(session).await
        }));
    }
    for handle in handles {
        handle.await.expect("join").expect("login succeeds");
    }

    assert_eq!(valid_session_count(&stores, user.id).await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_rotate_after_newer_login_changes_nothing() {
    let Some(stores) = pg_stores().await else {
        return;
    };
    let tag = run_tag();
    let user = create_user(&stores, &format!("pg_rotate_{tag}")).await;

    let first = fingerprint(&tag, 1);
    let second = fingerprint(&tag, 2);
    stores
        .sessions
        .replace_for_user(new_session(user.id, first.clone()))
        .await
        .expect("first login");
    stores
        .sessions
        .replace_for_user(new_session(user.id, second.clone()))
        .await
        .expect("second login");

    let rotated = stores
        .sessions
        .rotate(&first, new_session(user.id, fingerprint(&tag, 3)))
        .await
        .expect("rotate");
    assert!(rotated.is_none());

    let current = stores
        .sessions
        .find_by_token_hash(&second)
        .await
        .expect("lookup")
        .expect("second session exists");
    assert!(current.valid);
    assert_eq!(valid_session_count(&stores, user.id).await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_rotate_racing_login_keeps_one_valid_session() {
    let Some(stores) = pg_stores().await else {
        return;
    };
    let tag = run_tag();
    let user = create_user(&stores, &format!("pg_race_{tag}")).await;

    let old = fingerprint(&tag, 1);
    stores
        .sessions
        .replace_for_user(new_session(user.id, old.clone()))
        .await
        .expect("login");

    let barrier = Arc::new(Barrier::new(2));
    let refresh = {
        let sessions = stores.sessions.clone();
        let barrier = Arc::clone(&barrier);
        let session = new_session(user.id, fingerprint(&tag, 2));
        tokio::spawn(async move {
            barrier.wait().await;
            sessions.rotate(&old, session).await
        })
    };
    let login = {
        let sessions = stores.sessions.clone();
        let barrier = Arc::clone(&barrier);
        let session = new_session(user.id, fingerprint(&tag, 3));
        tokio::spawn(async move {
            barrier.wait().await;
            sessions.replace_for_user(session).await
        })
    };

    refresh.await.expect("join").expect("rotate");
    login.await.expect("join").expect("login");

    assert_eq!(valid_session_count(&stores, user.id).await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_demotions_keep_one_admin() {
    let Some(stores) = pg_stores().await else {
        return;
    };
    let tag = run_tag();
    let alice = create_user(&stores, &format!("pg_alice_{tag}")).await;
    let bob = create_user(&stores, &format!("pg_bob_{tag}")).await;

    let org = stores
        .organizations
        .create_with_admin(NewOrganization::new(format!("pg-org-{tag}"), alice.id))
        .await
        .expect("create org");
    stores
        .organizations
        .add_member(org.id, bob.id, OrgRole::Admin)
        .await
        .expect("add bob");

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = [alice.id, bob.id]
        .into_iter()
        .map(|user_id| {
            let organizations = stores.organizations.clone();
            let barrier = Arc::clone(&barrier);
            tokio::spawn(async move {
                barrier.wait().await;
                organizations
                    .update_member_role(org.id, user_id, OrgRole::Member)
                    .await
            })
        })
        .collect();

    let mut demoted = 0;
    for handle in handles {
        match handle.await.expect("join") {
            Ok(_) => demoted += 1,
            Err(e) => assert_eq!(e.kind, ErrorKind::Forbidden),
        }
    }
    assert_eq!(demoted, 1);

    let admins = stores
        .organizations
        .list_members(org.id)
        .await
        .expect("members")
        .into_iter()
        .filter(|m| m.role == OrgRole::Admin)
        .count();
    assert_eq!(admins, 1);
}
