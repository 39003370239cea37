//! Test helpers for inbound HTTP components.
//!
//! [`TestHarness`] wires the real account and alert services to in-memory
//! repositories, the fixture hasher, and the JWT adapter so handler tests
//! exercise the full request path without a database.

use std::sync::Arc;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header::{AUTHORIZATION, HeaderName};
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use serde_json::{Value, json};

use crate::Trace;
use crate::domain::ports::TokenVerifier;
use crate::domain::{AccountService, AlertService, AuthenticatedUser, Error, Role, UserId};
use crate::inbound::http::api_scope;
use crate::inbound::http::state::{AuthCookieSettings, HttpState, HttpStatePorts};
use crate::outbound::crypto::{JwtSecret, JwtTokenService};
use crate::test_support::{
    FixturePasswordHasher, InMemoryAlertRepository, InMemoryUserRepository, MutableClock,
    TEST_JWT_SECRET,
};

pub(crate) fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// Fully wired HTTP state over in-memory adapters.
pub(crate) struct TestHarness {
    pub users: Arc<InMemoryUserRepository>,
    pub alerts: Arc<InMemoryAlertRepository>,
    pub clock: Arc<MutableClock>,
    state: HttpState,
}

impl TestHarness {
    pub(crate) fn new() -> Self {
        let users = Arc::new(InMemoryUserRepository::new());
        let alerts = Arc::new(InMemoryAlertRepository::new());
        let clock = Arc::new(MutableClock::new(fixed_now()));
        let secret = JwtSecret::new(TEST_JWT_SECRET.to_vec()).expect("test secret is long enough");
        let tokens = JwtTokenService::new(&secret, TimeDelta::minutes(30), clock.clone());
        let accounts = Arc::new(AccountService::new(
            users.clone(),
            Arc::new(FixturePasswordHasher),
            Arc::new(tokens),
            clock.clone(),
        ));
        let alert_service = Arc::new(AlertService::new(alerts.clone(), clock.clone()));
        let state = HttpState::new(
            HttpStatePorts {
                login: accounts.clone(),
                tokens: accounts.clone(),
                accounts: accounts.clone(),
                users: accounts,
                alerts: alert_service.clone(),
                alerts_query: alert_service,
            },
            AuthCookieSettings { secure: false },
        );
        Self {
            users,
            alerts,
            clock,
            state,
        }
    }

    pub(crate) fn state(&self) -> HttpState {
        self.state.clone()
    }

    pub(crate) fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(web::Data::new(self.state()))
            .wrap(Trace)
            .service(api_scope())
    }
}

/// Token verifier accepting exactly one token.
pub(crate) struct StubTokenVerifier {
    token: String,
    identity: AuthenticatedUser,
}

impl StubTokenVerifier {
    pub(crate) fn accepting(token: &str, id: UserId, role: Role) -> Self {
        Self {
            token: token.to_owned(),
            identity: AuthenticatedUser { id, role },
        }
    }
}

#[async_trait]
impl TokenVerifier for StubTokenVerifier {
    async fn verify(&self, token: &str) -> Result<AuthenticatedUser, Error> {
        if token == self.token {
            Ok(self.identity)
        } else {
            Err(Error::unauthorized("token signature is invalid")
                .with_details(json!({ "code": "invalid_signature" })))
        }
    }
}

/// Harness state with the token verifier swapped for `verifier`.
pub(crate) fn http_state_with_verifier(verifier: StubTokenVerifier) -> HttpState {
    let mut state = TestHarness::new().state();
    state.tokens = Arc::new(verifier);
    state
}

/// Register `email` with password `pw1` and log in, returning the new user's
/// id and bearer token.
pub(crate) async fn sign_up<S, B>(app: &S, email: &str) -> (String, String)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let registered: Value = test::call_and_read_body_json(
        app,
        TestRequest::post()
            .uri("/api/v1/users")
            .set_json(json!({ "email": email, "password": "pw1" }))
            .to_request(),
    )
    .await;
    let id = registered["id"].as_str().expect("user id").to_owned();

    let login: Value = test::call_and_read_body_json(
        app,
        TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "email": email, "password": "pw1" }))
            .to_request(),
    )
    .await;
    let token = login["accessToken"].as_str().expect("access token").to_owned();
    (id, token)
}

/// `Authorization` header carrying `token`.
pub(crate) fn bearer(token: &str) -> (HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {token}"))
}
