//! Diesel table definitions for the PostgreSQL schema.
//!
//! These must match `backend/migrations` exactly; `diesel print-schema`
//! against a migrated database regenerates them.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Uuid,
        email -> Varchar,
        /// Upper-case form of `email`; unique.
        normalized_email -> Varchar,
        user_name -> Varchar,
        /// Upper-case form of `user_name`; unique.
        normalized_user_name -> Varchar,
        first_name -> Varchar,
        last_name -> Varchar,
        password_hash -> Varchar,
        /// Rotated on every profile update for optimistic concurrency.
        concurrency_stamp -> Uuid,
        avatar_url -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Authorisation roles, seeded by the initial migration.
    roles (id) {
        id -> Uuid,
        name -> Varchar,
        normalized_name -> Varchar,
    }
}

diesel::table! {
    user_roles (user_id, role_id) {
        user_id -> Uuid,
        role_id -> Uuid,
    }
}

diesel::table! {
    /// Free-form claims attached to a user. Not exposed over HTTP.
    user_claims (id) {
        id -> Int4,
        user_id -> Uuid,
        claim_type -> Nullable<Text>,
        claim_value -> Nullable<Text>,
    }
}

diesel::table! {
    /// External login links. Not exposed over HTTP.
    user_logins (login_provider, provider_key) {
        login_provider -> Varchar,
        provider_key -> Varchar,
        provider_display_name -> Nullable<Varchar>,
        user_id -> Uuid,
    }
}

diesel::table! {
    /// Issued access tokens, keyed by the SHA-256 digest of the token.
    user_tokens (value) {
        user_id -> Uuid,
        login_provider -> Varchar,
        name -> Varchar,
        value -> Varchar,
        expires_at -> Timestamptz,
    }
}

diesel::table! {
    authors (id) {
        id -> Uuid,
        name -> Varchar,
        /// Slug derived from `name`; unique.
        web_url -> Varchar,
    }
}

diesel::table! {
    posts (id) {
        id -> Uuid,
        user_id -> Uuid,
        /// Cleared when the author is deleted.
        author_id -> Nullable<Uuid>,
        title -> Varchar,
        summary -> Varchar,
        body -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    comments (id) {
        id -> Uuid,
        /// Cascades on post deletion.
        post_id -> Uuid,
        /// Restricts user deletion.
        user_id -> Uuid,
        body -> Text,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(user_roles -> users (user_id));
diesel::joinable!(user_roles -> roles (role_id));
diesel::joinable!(user_claims -> users (user_id));
diesel::joinable!(user_logins -> users (user_id));
diesel::joinable!(user_tokens -> users (user_id));
diesel::joinable!(posts -> users (user_id));
diesel::joinable!(posts -> authors (author_id));
diesel::joinable!(comments -> posts (post_id));
diesel::joinable!(comments -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    authors,
    comments,
    posts,
    roles,
    user_claims,
    user_logins,
    user_roles,
    user_tokens,
    users,
);
