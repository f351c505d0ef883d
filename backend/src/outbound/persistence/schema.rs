//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are
//! used by Diesel for compile-time query validation and type-safe SQL
//! generation.

diesel::table! {
    /// User accounts, one per `(oauth_id, oauth_provider)` pair.
    ///
    /// The pair carries a unique index; `id` is the store-assigned UUID.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Account email; empty when the provider withheld it.
        email -> Text,
        /// Display name from the first successful login.
        name -> Text,
        /// Provider-scoped account identifier.
        oauth_id -> Text,
        /// Provider name: google, facebook, or github.
        oauth_provider -> Text,
        /// First-login timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Executed searches, one row per execution.
    searches (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning user.
        user_id -> Uuid,
        /// The literal search term as typed.
        query -> Text,
        /// Total results reported by the external API.
        image_count -> Int8,
        /// External result identifiers the user marked.
        selected_images -> Array<Text>,
        /// Execution timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Global popularity counters, one row per distinct query string.
    top_searches (query) {
        /// Primary key: the exact query string, no normalisation.
        query -> Text,
        /// Execution count across all users, at least 1.
        count -> Int8,
        /// Timestamp of the most recent execution.
        last_searched -> Timestamptz,
    }
}

diesel::joinable!(searches -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, searches, top_searches);
