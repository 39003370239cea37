//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When a
//! migration changes the schema, regenerate with `diesel print-schema` or
//! update by hand.

diesel::table! {
    /// Registered accounts.
    ///
    /// `email` is stored lower-cased and is unique (`users_email_key`);
    /// `username` is unique when present (`users_username_key`).
    users (id) {
        id -> Uuid,
        username -> Nullable<Varchar>,
        email -> Varchar,
        /// Argon2id PHC string.
        password_hash -> Text,
        first_name -> Nullable<Varchar>,
        last_name -> Nullable<Varchar>,
        /// `member` or `admin`.
        role -> Varchar,
        is_active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Community alerts. Rows are soft-deleted via `deleted_at`.
    alerts (id) {
        id -> Uuid,
        /// Owning account; never changes after insert.
        user_id -> Uuid,
        title -> Varchar,
        description -> Text,
        alert_type -> Int4,
        /// `open` or `resolved`.
        status -> Varchar,
        closing_date -> Nullable<Timestamptz>,
        postal_code -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        deleted_at -> Nullable<Timestamptz>,
    }
}

diesel::joinable!(alerts -> users (user_id));
diesel::allow_tables_to_appear_in_same_query!(alerts, users);
