//! Tests for the alert service.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use mockall::predicate::eq;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::MockAlertRepository;
use crate::domain::{
    AlertDescription, AlertStatus, AlertTitle, AlertType, ErrorCode, PostalCode, Role, UserId,
};
use crate::test_support::MutableClock;

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 12, 18, 30, 0)
        .single()
        .expect("valid timestamp")
}

#[fixture]
fn owner() -> AuthenticatedUser {
    AuthenticatedUser {
        id: UserId::random(),
        role: Role::Member,
    }
}

fn draft() -> AlertDraft {
    AlertDraft {
        title: AlertTitle::new("Fallen tree on Elm Street").expect("title"),
        description: AlertDescription::new("Blocking both lanes").expect("description"),
        alert_type: AlertType::new(1).expect("alert type"),
        status: AlertStatus::Open,
        closing_date: None,
        postal_code: Some(PostalCode::new("H2X 1Y4").expect("postal code")),
    }
}

fn stored_alert(owner: &AuthenticatedUser, at: DateTime<Utc>) -> Alert {
    draft().into_alert(owner.id, at)
}

fn service(repo: MockAlertRepository, now: DateTime<Utc>) -> AlertService<MockAlertRepository> {
    AlertService::new(Arc::new(repo), Arc::new(MutableClock::new(now)))
}

#[rstest]
#[tokio::test]
async fn create_assigns_caller_as_owner(owner: AuthenticatedUser, now: DateTime<Utc>) {
    let mut repo = MockAlertRepository::new();
    repo.expect_insert()
        .withf(move |alert| alert.owner == owner.id)
        .times(1)
        .return_once(|_| Ok(()));

    let alert = service(repo, now)
        .create(&owner, draft())
        .await
        .expect("create succeeds");

    assert_eq!(alert.owner, owner.id);
    assert_eq!(alert.created_at, now);
    assert_eq!(alert.status, AlertStatus::Open);
}

#[rstest]
#[tokio::test]
async fn create_persists_what_it_returns_at_microsecond_precision(
    owner: AuthenticatedUser,
    now: DateTime<Utc>,
) {
    let precise = Utc
        .timestamp_opt(now.timestamp(), 987_654_321)
        .single()
        .expect("valid timestamp");
    let persisted = Arc::new(std::sync::Mutex::new(None));
    let sink = Arc::clone(&persisted);
    let mut repo = MockAlertRepository::new();
    repo.expect_insert().times(1).return_once(move |alert| {
        *sink.lock().expect("sink lock") = Some(alert.clone());
        Ok(())
    });

    let alert = service(repo, precise)
        .create(&owner, draft())
        .await
        .expect("create succeeds");

    assert_eq!(alert.created_at.timestamp_subsec_nanos(), 987_654_000);
    assert_eq!(persisted.lock().expect("sink lock").as_ref(), Some(&alert));
}

#[rstest]
#[tokio::test]
async fn create_maps_connection_error_to_service_unavailable(
    owner: AuthenticatedUser,
    now: DateTime<Utc>,
) {
    let mut repo = MockAlertRepository::new();
    repo.expect_insert()
        .return_once(|_| Err(AlertPersistenceError::connection("pool exhausted")));

    let error = service(repo, now)
        .create(&owner, draft())
        .await
        .expect_err("connection failure");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn get_returns_alert_for_owner(owner: AuthenticatedUser, now: DateTime<Utc>) {
    let alert = stored_alert(&owner, now);
    let id = alert.id;
    let returned = alert.clone();
    let mut repo = MockAlertRepository::new();
    repo.expect_find_by_id()
        .with(eq(id))
        .return_once(move |_| Ok(Some(returned)));

    let fetched = service(repo, now).get(&owner, &id).await.expect("get");
    assert_eq!(fetched, alert);
}

#[rstest]
#[tokio::test]
async fn get_hides_alerts_owned_by_someone_else(owner: AuthenticatedUser, now: DateTime<Utc>) {
    let alert = stored_alert(&owner, now);
    let id = alert.id;
    let mut repo = MockAlertRepository::new();
    repo.expect_find_by_id()
        .return_once(move |_| Ok(Some(alert)));
    let stranger = AuthenticatedUser {
        id: UserId::random(),
        role: Role::Member,
    };

    let error = service(repo, now)
        .get(&stranger, &id)
        .await
        .expect_err("stranger is rejected");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn admin_may_read_any_alert(owner: AuthenticatedUser, now: DateTime<Utc>) {
    let alert = stored_alert(&owner, now);
    let id = alert.id;
    let mut repo = MockAlertRepository::new();
    repo.expect_find_by_id()
        .return_once(move |_| Ok(Some(alert)));
    let admin = AuthenticatedUser {
        id: UserId::random(),
        role: Role::Admin,
    };

    let fetched = service(repo, now).get(&admin, &id).await.expect("admin read");
    assert_eq!(fetched.owner, owner.id);
}

#[rstest]
#[tokio::test]
async fn get_reports_missing_alert(owner: AuthenticatedUser, now: DateTime<Utc>) {
    let mut repo = MockAlertRepository::new();
    repo.expect_find_by_id().return_once(|_| Ok(None));

    let error = service(repo, now)
        .get(&owner, &AlertId::random())
        .await
        .expect_err("missing alert");

    assert_eq!(error.code(), ErrorCode::NotFound);
    let details = error.details().expect("details present");
    assert_eq!(details["code"], "alert_not_found");
}

#[rstest]
#[tokio::test]
async fn update_applies_patch_for_owner(owner: AuthenticatedUser, now: DateTime<Utc>) {
    let alert = stored_alert(&owner, now - Duration::hours(2));
    let id = alert.id;
    let mut repo = MockAlertRepository::new();
    repo.expect_find_by_id()
        .return_once(move |_| Ok(Some(alert)));
    repo.expect_update()
        .withf(|alert| alert.status == AlertStatus::Resolved)
        .times(1)
        .return_once(|_| Ok(true));

    let patch = AlertPatch {
        status: Some(AlertStatus::Resolved),
        ..AlertPatch::default()
    };
    let updated = service(repo, now)
        .update(&owner, &id, patch)
        .await
        .expect("owner update succeeds");

    assert_eq!(updated.status, AlertStatus::Resolved);
    assert_eq!(updated.updated_at, now);
}

#[rstest]
#[tokio::test]
async fn update_rejects_non_owner_without_writing(owner: AuthenticatedUser, now: DateTime<Utc>) {
    let alert = stored_alert(&owner, now);
    let id = alert.id;
    let mut repo = MockAlertRepository::new();
    repo.expect_find_by_id()
        .return_once(move |_| Ok(Some(alert)));
    repo.expect_update().times(0);
    let stranger = AuthenticatedUser {
        id: UserId::random(),
        role: Role::Member,
    };

    let patch = AlertPatch {
        title: Some(AlertTitle::new("Hijacked").expect("title")),
        ..AlertPatch::default()
    };
    let error = service(repo, now)
        .update(&stranger, &id, patch)
        .await
        .expect_err("stranger is rejected");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn update_rejects_empty_patch_before_reading(owner: AuthenticatedUser, now: DateTime<Utc>) {
    let mut repo = MockAlertRepository::new();
    repo.expect_find_by_id().times(0);

    let error = service(repo, now)
        .update(&owner, &AlertId::random(), AlertPatch::default())
        .await
        .expect_err("empty patch");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn update_reports_concurrent_delete_as_not_found(
    owner: AuthenticatedUser,
    now: DateTime<Utc>,
) {
    let alert = stored_alert(&owner, now);
    let id = alert.id;
    let mut repo = MockAlertRepository::new();
    repo.expect_find_by_id()
        .return_once(move |_| Ok(Some(alert)));
    repo.expect_update().return_once(|_| Ok(false));

    let patch = AlertPatch {
        status: Some(AlertStatus::Resolved),
        ..AlertPatch::default()
    };
    let error = service(repo, now)
        .update(&owner, &id, patch)
        .await
        .expect_err("row vanished");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn delete_soft_deletes_owned_alert(owner: AuthenticatedUser, now: DateTime<Utc>) {
    let alert = stored_alert(&owner, now);
    let id = alert.id;
    let mut repo = MockAlertRepository::new();
    repo.expect_find_by_id()
        .return_once(move |_| Ok(Some(alert)));
    repo.expect_soft_delete()
        .with(eq(id), eq(now))
        .times(1)
        .return_once(|_, _| Ok(true));

    service(repo, now)
        .delete(&owner, &id)
        .await
        .expect("delete succeeds");
}

#[rstest]
#[tokio::test]
async fn list_is_scoped_to_caller(owner: AuthenticatedUser, now: DateTime<Utc>) {
    let alert = stored_alert(&owner, now);
    let mut repo = MockAlertRepository::new();
    repo.expect_list_for_owner()
        .withf(move |requested, filter| {
            *requested == owner.id && filter.status == Some(AlertStatus::Open)
        })
        .times(1)
        .return_once(move |_, _| Ok(vec![alert]));

    let filter = AlertFilter {
        status: Some(AlertStatus::Open),
        alert_type: None,
    };
    let alerts = service(repo, now)
        .list(&owner, filter)
        .await
        .expect("list succeeds");

    assert_eq!(alerts.len(), 1);
    assert!(alerts.iter().all(|alert| alert.owner == owner.id));
}

#[rstest]
#[tokio::test]
async fn list_maps_query_error_to_internal(owner: AuthenticatedUser, now: DateTime<Utc>) {
    let mut repo = MockAlertRepository::new();
    repo.expect_list_for_owner()
        .return_once(|_, _| Err(AlertPersistenceError::query("syntax error")));

    let error = service(repo, now)
        .list(&owner, AlertFilter::default())
        .await
        .expect_err("query failure");

    assert_eq!(error.code(), ErrorCode::InternalError);
}
