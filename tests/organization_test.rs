//! Integration tests for organizations, memberships, and role gating.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::TestApp;

struct Org {
    app: TestApp,
    org_id: i64,
    alice: String,
    bob: String,
    bob_id: i64,
}

/// Alice creates `acme`; Bob is added as a plain member.
async fn acme_with_member() -> Org {
    let app = TestApp::new();
    app.create_test_user("alice", "alice-password").await;
    let bob_id = app.create_test_user("bob", "bobs-password").await;
    let alice = app.login("alice", "alice-password").await;
    let bob = app.login("bob", "bobs-password").await;

    let created = app
        .request("POST", "/api/orgs", Some(json!({ "name": "acme" })), Some(&alice))
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{:?}", created.body);
    let org_id = created.body["data"]["id"].as_i64().expect("org id");

    let added = app
        .request(
            "POST",
            &format!("/api/orgs/{org_id}/members"),
            Some(json!({ "user_id": bob_id, "role": "member" })),
            Some(&alice),
        )
        .await;
    assert_eq!(added.status, StatusCode::CREATED, "{:?}", added.body);

    Org {
        app,
        org_id,
        alice,
        bob,
        bob_id,
    }
}

#[tokio::test]
async fn test_creator_becomes_admin() {
    let org = acme_with_member().await;

    let members = org
        .app
        .request(
            "GET",
            &format!("/api/orgs/{}/members", org.org_id),
            None,
            Some(&org.bob),
        )
        .await;
    assert_eq!(members.status, StatusCode::OK);

    let list = members.body["data"].as_array().expect("members");
    assert_eq!(list.len(), 2);
    let admins: Vec<_> = list.iter().filter(|m| m["role"] == "admin").collect();
    assert_eq!(admins.len(), 1);
    assert_ne!(admins[0]["user_id"], org.bob_id);
}

#[tokio::test]
async fn test_member_cannot_use_admin_operations() {
    let org = acme_with_member().await;
    let path = format!("/api/orgs/{}", org.org_id);

    let as_member = org
        .app
        .request("PUT", &path, Some(json!({ "display_name": "ACME" })), Some(&org.bob))
        .await;
    assert_eq!(as_member.status, StatusCode::FORBIDDEN);

    let as_admin = org
        .app
        .request("PUT", &path, Some(json!({ "display_name": "ACME" })), Some(&org.alice))
        .await;
    assert_eq!(as_admin.status, StatusCode::OK);
    assert_eq!(as_admin.body["data"]["display_name"], "ACME");

    let read = org.app.request("GET", &path, None, Some(&org.bob)).await;
    assert_eq!(read.status, StatusCode::OK);
    assert_eq!(read.body["data"]["name"], "acme");
}

#[tokio::test]
async fn test_non_member_sees_not_found() {
    let org = acme_with_member().await;
    org.app.create_test_user("carol", "carol-password").await;
    let carol = org.app.login("carol", "carol-password").await;

    let response = org
        .app
        .request("GET", &format!("/api/orgs/{}", org.org_id), None, Some(&carol))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sole_admin_cannot_leave_or_be_demoted() {
    let org = acme_with_member().await;
    let members = org
        .app
        .request(
            "GET",
            &format!("/api/orgs/{}/members", org.org_id),
            None,
            Some(&org.alice),
        )
        .await;
    let alice_id = members.body["data"]
        .as_array()
        .expect("members")
        .iter()
        .find(|m| m["role"] == "admin")
        .and_then(|m| m["user_id"].as_i64())
        .expect("admin id");
    let alice_path = format!("/api/orgs/{}/members/{alice_id}", org.org_id);

    let remove = org
        .app
        .request("DELETE", &alice_path, None, Some(&org.alice))
        .await;
    assert_eq!(remove.status, StatusCode::FORBIDDEN);

    let demote = org
        .app
        .request("PUT", &alice_path, Some(json!({ "role": "member" })), Some(&org.alice))
        .await;
    assert_eq!(demote.status, StatusCode::FORBIDDEN);

    // With a second admin the first may step down.
    let promote = org
        .app
        .request(
            "PUT",
            &format!("/api/orgs/{}/members/{}", org.org_id, org.bob_id),
            Some(json!({ "role": "admin" })),
            Some(&org.alice),
        )
        .await;
    assert_eq!(promote.status, StatusCode::OK);

    let remove = org
        .app
        .request("DELETE", &alice_path, None, Some(&org.alice))
        .await;
    assert_eq!(remove.status, StatusCode::OK);
}

#[tokio::test]
async fn test_member_may_leave() {
    let org = acme_with_member().await;
    let path = format!("/api/orgs/{}/members/{}", org.org_id, org.bob_id);

    let response = org.app.request("DELETE", &path, None, Some(&org.bob)).await;
    assert_eq!(response.status, StatusCode::OK);

    let mine = org.app.request("GET", "/api/orgs", None, Some(&org.bob)).await;
    assert_eq!(mine.status, StatusCode::OK);
    assert_eq!(mine.body["data"].as_array().expect("orgs").len(), 0);
}

#[tokio::test]
async fn test_membership_errors() {
    let org = acme_with_member().await;
    let path = format!("/api/orgs/{}/members", org.org_id);

    let duplicate = org
        .app
        .request("POST", &path, Some(json!({ "user_id": org.bob_id })), Some(&org.alice))
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let unknown = org
        .app
        .request("POST", &path, Some(json!({ "user_id": 9999 })), Some(&org.alice))
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_organization_name_rules() {
    let org = acme_with_member().await;

    let duplicate = org
        .app
        .request("POST", "/api/orgs", Some(json!({ "name": "acme" })), Some(&org.bob))
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let invalid = org
        .app
        .request("POST", "/api/orgs", Some(json!({ "name": "Not A Slug" })), Some(&org.bob))
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);

    let anonymous = org
        .app
        .request("POST", "/api/orgs", Some(json!({ "name": "other" })), None)
        .await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_delete_organization() {
    let org = acme_with_member().await;
    let path = format!("/api/orgs/{}", org.org_id);

    let by_member = org.app.request("DELETE", &path, None, Some(&org.bob)).await;
    assert_eq!(by_member.status, StatusCode::FORBIDDEN);

    let by_admin = org.app.request("DELETE", &path, None, Some(&org.alice)).await;
    assert_eq!(by_admin.status, StatusCode::OK);

    let gone = org.app.request("GET", &path, None, Some(&org.alice)).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}
