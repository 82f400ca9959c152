//! Shared wiring for service tests.

use std::sync::Arc;

use ddup_auth::{
    Gatekeeper, JwtDecoder, JwtEncoder, PasswordHasher, PasswordValidator, RbacResolver,
    SessionLedger,
};
use ddup_core::config::AuthConfig;
use ddup_database::Stores;

use crate::{OrganizationService, RegisterRequest, RequestContext, SessionService, UserService};

pub(crate) struct Services {
    pub stores: Stores,
    pub sessions: SessionService,
    pub users: UserService,
    pub organizations: OrganizationService,
}

pub(crate) fn auth_config(grace_seconds: u64) -> AuthConfig {
    AuthConfig {
        jwt_secret: "service-test-secret".into(),
        token_ttl_seconds: 600,
        refresh_grace_seconds: grace_seconds,
        hash_memory_kib: 1024,
        hash_iterations: 1,
        hash_parallelism: 1,
        ..AuthConfig::default()
    }
}

pub(crate) fn services_with(config: &AuthConfig) -> Services {
    let stores = Stores::memory();
    let hasher = Arc::new(PasswordHasher::new(config).expect("hasher"));
    let validator = Arc::new(PasswordValidator::new(config));
    let encoder = Arc::new(JwtEncoder::new(config).expect("encoder"));
    let decoder = Arc::new(JwtDecoder::new(config).expect("decoder"));
    let ledger = Arc::new(SessionLedger::new(stores.sessions.clone(), config));
    let gatekeeper = Arc::new(Gatekeeper::new(Arc::clone(&decoder), Arc::clone(&ledger)));
    let rbac = Arc::new(RbacResolver::new(stores.organizations.clone()));

    Services {
        sessions: SessionService::new(
            stores.users.clone(),
            Arc::clone(&hasher),
            encoder,
            decoder,
            ledger,
            gatekeeper,
        ),
        users: UserService::new(stores.users.clone(), hasher, validator),
        organizations: OrganizationService::new(
            stores.organizations.clone(),
            stores.users.clone(),
            rbac,
        ),
        stores,
    }
}

pub(crate) fn services() -> Services {
    services_with(&auth_config(0))
}

impl Services {
    /// Registers a user and returns a context acting as them.
    pub async fn register(&self, username: &str, password: &str) -> RequestContext {
        let user = self
            .users
            .register(RegisterRequest {
                username: username.into(),
                password: password.into(),
                nickname: None,
                email: None,
            })
            .await
            .expect("register");
        RequestContext::new(user.id, user.username)
    }
}
