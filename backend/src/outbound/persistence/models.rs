//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions back into domain types
//! re-run domain validation so corrupt rows surface as query errors.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Alert, AlertDescription, AlertId, AlertStatus, AlertTitle, AlertType, EmailAddress,
    PasswordHash, PersonName, PostalCode, Role, User, UserAccount, UserId, Username,
};

use super::schema::{alerts, users};

// ---------------------------------------------------------------------------
// User models
// ---------------------------------------------------------------------------

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserAccount {
    type Error = String;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let invalid = |column: &str, err: &dyn std::fmt::Display| {
            format!("user {} has invalid {column}: {err}", row.id)
        };
        let email = EmailAddress::new(&row.email).map_err(|err| invalid("email", &err))?;
        let username = row
            .username
            .clone()
            .map(Username::new)
            .transpose()
            .map_err(|err| invalid("username", &err))?;
        let first_name = row
            .first_name
            .as_deref()
            .map(PersonName::new)
            .transpose()
            .map_err(|err| invalid("first_name", &err))?;
        let last_name = row
            .last_name
            .as_deref()
            .map(PersonName::new)
            .transpose()
            .map_err(|err| invalid("last_name", &err))?;
        let role = row
            .role
            .parse::<Role>()
            .map_err(|err| invalid("role", &err))?;

        Ok(Self {
            user: User {
                id: UserId::from_uuid(row.id),
                username,
                email,
                first_name,
                last_name,
                role,
                is_active: row.is_active,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            password_hash: PasswordHash::new(row.password_hash),
        })
    }
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: Option<&'a str>,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub role: &'a str,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> NewUserRow<'a> {
    pub(crate) fn from_domain(user: &'a User, password_hash: &'a PasswordHash) -> Self {
        Self {
            id: *user.id.as_uuid(),
            username: user.username.as_ref().map(AsRef::as_ref),
            email: user.email.as_ref(),
            password_hash: password_hash.as_str(),
            first_name: user.first_name.as_ref().map(AsRef::as_ref),
            last_name: user.last_name.as_ref().map(AsRef::as_ref),
            role: user.role.as_str(),
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Alert models
// ---------------------------------------------------------------------------

/// Row struct for reading live rows from the alerts table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = alerts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AlertRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub alert_type: i32,
    pub status: String,
    pub closing_date: Option<DateTime<Utc>>,
    pub postal_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<AlertRow> for Alert {
    type Error = String;

    fn try_from(row: AlertRow) -> Result<Self, Self::Error> {
        let invalid = |column: &str, err: &dyn std::fmt::Display| {
            format!("alert {} has invalid {column}: {err}", row.id)
        };
        let title = AlertTitle::new(&row.title).map_err(|err| invalid("title", &err))?;
        let description = AlertDescription::new(row.description.clone())
            .map_err(|err| invalid("description", &err))?;
        let alert_type =
            AlertType::new(row.alert_type).map_err(|err| invalid("alert_type", &err))?;
        let status = row
            .status
            .parse::<AlertStatus>()
            .map_err(|err| invalid("status", &err))?;
        let postal_code = row
            .postal_code
            .as_deref()
            .map(PostalCode::new)
            .transpose()
            .map_err(|err| invalid("postal_code", &err))?;

        Ok(Self {
            id: AlertId::from_uuid(row.id),
            owner: UserId::from_uuid(row.user_id),
            title,
            description,
            alert_type,
            status,
            closing_date: row.closing_date,
            postal_code,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Insertable struct for creating new alert records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = alerts)]
pub(crate) struct NewAlertRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub alert_type: i32,
    pub status: &'a str,
    pub closing_date: Option<DateTime<Utc>>,
    pub postal_code: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Alert> for NewAlertRow<'a> {
    fn from(alert: &'a Alert) -> Self {
        Self {
            id: *alert.id.as_uuid(),
            user_id: *alert.owner.as_uuid(),
            title: alert.title.as_ref(),
            description: alert.description.as_ref(),
            alert_type: alert.alert_type.value(),
            status: alert.status.as_str(),
            closing_date: alert.closing_date,
            postal_code: alert.postal_code.as_ref().map(AsRef::as_ref),
            created_at: alert.created_at,
            updated_at: alert.updated_at,
        }
    }
}

/// Changeset overwriting every mutable alert column.
///
/// `None` clears the column rather than skipping it, so the stored row always
/// mirrors the domain value after an update.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = alerts)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct AlertUpdate<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub alert_type: i32,
    pub status: &'a str,
    pub closing_date: Option<DateTime<Utc>>,
    pub postal_code: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Alert> for AlertUpdate<'a> {
    fn from(alert: &'a Alert) -> Self {
        Self {
            title: alert.title.as_ref(),
            description: alert.description.as_ref(),
            alert_type: alert.alert_type.value(),
            status: alert.status.as_str(),
            closing_date: alert.closing_date,
            postal_code: alert.postal_code.as_ref().map(AsRef::as_ref),
            updated_at: alert.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for row conversions.
    use super::*;
    use rstest::rstest;

    fn user_row() -> UserRow {
        let now = Utc::now();
        UserRow {
            id: Uuid::new_v4(),
            username: Some("ada_l".to_owned()),
            email: "ada@example.org".to_owned(),
            password_hash: "$argon2id$stub".to_owned(),
            first_name: Some("Ada".to_owned()),
            last_name: None,
            role: "admin".to_owned(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn alert_row() -> AlertRow {
        let now = Utc::now();
        AlertRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Flooded underpass".to_owned(),
            description: "Water up to the kerb".to_owned(),
            alert_type: 2,
            status: "resolved".to_owned(),
            closing_date: None,
            postal_code: Some("H2X 1Y4".to_owned()),
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn user_rows_convert_to_accounts() {
        let row = user_row();
        let id = row.id;

        let account = UserAccount::try_from(row).expect("valid row");

        assert_eq!(*account.user.id.as_uuid(), id);
        assert_eq!(account.user.role, Role::Admin);
        assert_eq!(account.user.username.as_ref().map(AsRef::as_ref), Some("ada_l"));
        assert_eq!(account.password_hash.as_str(), "$argon2id$stub");
    }

    #[rstest]
    fn unknown_roles_are_rejected() {
        let row = UserRow {
            role: "superuser".to_owned(),
            ..user_row()
        };

        let error = UserAccount::try_from(row).expect_err("invalid role");
        assert!(error.contains("role"));
    }

    #[rstest]
    fn alert_rows_convert_and_round_trip_into_changesets() {
        let row = alert_row();
        let alert = Alert::try_from(row.clone()).expect("valid row");

        assert_eq!(alert.status, AlertStatus::Resolved);
        assert_eq!(*alert.owner.as_uuid(), row.user_id);

        let update = AlertUpdate::from(&alert);
        assert_eq!(update.title, row.title);
        assert_eq!(update.postal_code, row.postal_code.as_deref());
        assert_eq!(update.alert_type, 2);
    }

    #[rstest]
    #[case("unknown", "status")]
    #[case("", "status")]
    fn corrupt_alert_rows_name_the_bad_column(#[case] status: &str, #[case] column: &str) {
        let row = AlertRow {
            status: status.to_owned(),
            ..alert_row()
        };

        let error = Alert::try_from(row).expect_err("invalid row");
        assert!(error.contains(column));
    }
}
