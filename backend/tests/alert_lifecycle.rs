//! End-to-end alert lifecycle over the public HTTP surface.
//!
//! The real account and alert services run against the in-memory adapters
//! from `test-support`, so the journey covers routing, token handling,
//! ownership checks, and serialisation without PostgreSQL.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use chrono::{TimeDelta, TimeZone, Utc};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use communalert::Trace;
use communalert::domain::{AccountService, AlertService, Role, UserId};
use communalert::inbound::http::api_scope;
use communalert::inbound::http::state::{AuthCookieSettings, HttpState, HttpStatePorts};
use communalert::outbound::crypto::{JwtSecret, JwtTokenService};
use communalert::test_support::{
    FixturePasswordHasher, InMemoryAlertRepository, InMemoryUserRepository, MutableClock,
    TEST_JWT_SECRET,
};

struct World {
    users: Arc<InMemoryUserRepository>,
    clock: Arc<MutableClock>,
    state: HttpState,
}

#[fixture]
fn world() -> World {
    let users = Arc::new(InMemoryUserRepository::new());
    let alerts = Arc::new(InMemoryAlertRepository::new());
    let clock = Arc::new(MutableClock::new(
        Utc.with_ymd_and_hms(2026, 6, 1, 7, 30, 0)
            .single()
            .expect("valid timestamp"),
    ));
    let secret = JwtSecret::new(TEST_JWT_SECRET.to_vec()).expect("secret");
    let tokens = Arc::new(JwtTokenService::new(
        &secret,
        TimeDelta::minutes(30),
        clock.clone(),
    ));
    let accounts = Arc::new(AccountService::new(
        users.clone(),
        Arc::new(FixturePasswordHasher),
        tokens,
        clock.clone(),
    ));
    let alert_service = Arc::new(AlertService::new(alerts, clock.clone()));
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
    World {
        users,
        clock,
        state,
    }
}

macro_rules! init_app {
    ($world:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($world.state.clone()))
                .wrap(Trace)
                .service(api_scope()),
        )
        .await
    };
}

macro_rules! sign_up {
    ($app:expr, $email:expr) => {{
        let register = TestRequest::post()
            .uri("/api/v1/users")
            .set_json(json!({ "email": $email, "password": "correct horse" }))
            .to_request();
        let created: Value = test::call_and_read_body_json(&$app, register).await;
        let login = TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "email": $email, "password": "correct horse" }))
            .to_request();
        let token: Value = test::call_and_read_body_json(&$app, login).await;
        (
            created["id"].as_str().expect("user id").to_owned(),
            format!("Bearer {}", token["accessToken"].as_str().expect("token")),
        )
    }};
}

fn alert_body(title: &str) -> Value {
    json!({
        "title": title,
        "description": "Reported by a neighbour",
        "alertType": 3,
        "postalCode": "H2X 1Y4"
    })
}

#[rstest]
#[actix_web::test]
async fn owner_manages_alert_while_strangers_see_nothing(world: World) {
    let app = init_app!(world);
    let (_, alice) = sign_up!(app, "alice@example.org");
    let (_, bob) = sign_up!(app, "bob@example.org");

    let create = TestRequest::post()
        .uri("/api/v1/alerts")
        .insert_header((AUTHORIZATION, alice.clone()))
        .set_json(alert_body("Broken streetlight"))
        .to_request();
    let response = test::call_service(&app, create).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(response).await;
    let alert_uri = format!("/api/v1/alerts/{}", created["id"].as_str().expect("id"));
    assert_eq!(created["status"], "open");

    let fetch = TestRequest::get()
        .uri(&alert_uri)
        .insert_header((AUTHORIZATION, alice.clone()))
        .to_request();
    let fetched: Value = test::call_and_read_body_json(&app, fetch).await;
    assert_eq!(fetched, created);

    let snoop = TestRequest::get()
        .uri(&alert_uri)
        .insert_header((AUTHORIZATION, bob.clone()))
        .to_request();
    let response = test::call_service(&app, snoop).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let bobs_list = TestRequest::get()
        .uri("/api/v1/alerts")
        .insert_header((AUTHORIZATION, bob))
        .to_request();
    let listed: Value = test::call_and_read_body_json(&app, bobs_list).await;
    assert_eq!(listed, json!([]));

    let resolve = TestRequest::put()
        .uri(&alert_uri)
        .insert_header((AUTHORIZATION, alice.clone()))
        .set_json(json!({ "status": "resolved" }))
        .to_request();
    let resolved: Value = test::call_and_read_body_json(&app, resolve).await;
    assert_eq!(resolved["status"], "resolved");
    assert_eq!(resolved["title"], "Broken streetlight");

    let delete = TestRequest::delete()
        .uri(&alert_uri)
        .insert_header((AUTHORIZATION, alice.clone()))
        .to_request();
    let response = test::call_service(&app, delete).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let gone = TestRequest::get()
        .uri(&alert_uri)
        .insert_header((AUTHORIZATION, alice))
        .to_request();
    let response = test::call_service(&app, gone).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn admins_reach_any_alert_but_list_only_their_own(world: World) {
    let app = init_app!(world);
    let (_, member) = sign_up!(app, "member@example.org");
    let (admin_id, admin) = sign_up!(app, "admin@example.org");
    world
        .users
        .set_role(&UserId::new(&admin_id).expect("uuid"), Role::Admin);

    let create = TestRequest::post()
        .uri("/api/v1/alerts")
        .insert_header((AUTHORIZATION, member))
        .set_json(alert_body("Icy sidewalk"))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, create).await;
    let alert_uri = format!("/api/v1/alerts/{}", created["id"].as_str().expect("id"));

    let fetch = TestRequest::get()
        .uri(&alert_uri)
        .insert_header((AUTHORIZATION, admin.clone()))
        .to_request();
    let response = test::call_service(&app, fetch).await;
    assert_eq!(response.status(), StatusCode::OK);

    let list = TestRequest::get()
        .uri("/api/v1/alerts")
        .insert_header((AUTHORIZATION, admin))
        .to_request();
    let listed: Value = test::call_and_read_body_json(&app, list).await;
    assert_eq!(listed, json!([]));
}

#[rstest]
#[actix_web::test]
async fn tokens_stop_working_after_their_lifetime(world: World) {
    let app = init_app!(world);
    let (_, token) = sign_up!(app, "carol@example.org");

    world.clock.advance(TimeDelta::minutes(30));
    let me = TestRequest::get()
        .uri("/api/v1/auth/me")
        .insert_header((AUTHORIZATION, token))
        .to_request();
    let response = test::call_service(&app, me).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["details"]["code"], "token_expired");
}

#[rstest]
#[actix_web::test]
async fn disabled_accounts_lose_access_immediately(world: World) {
    let app = init_app!(world);
    let (user_id, token) = sign_up!(app, "dave@example.org");

    world
        .users
        .set_active(&UserId::new(&user_id).expect("uuid"), false);
    let list = TestRequest::get()
        .uri("/api/v1/alerts")
        .insert_header((AUTHORIZATION, token))
        .to_request();
    let response = test::call_service(&app, list).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[rstest]
#[actix_web::test]
async fn registering_twice_conflicts(world: World) {
    let app = init_app!(world);
    let _ = sign_up!(app, "erin@example.org");

    let again = TestRequest::post()
        .uri("/api/v1/users")
        .set_json(json!({ "email": "ERIN@example.org", "password": "another" }))
        .to_request();
    let response = test::call_service(&app, again).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["code"], "conflict");
}
