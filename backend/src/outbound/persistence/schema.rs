//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        email -> Varchar,
        /// PHC-formatted Argon2id hash.
        password_hash -> Text,
        is_active -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Cities geocoded on first subscription; `name` is unique.
    cities (id) {
        id -> Uuid,
        name -> Varchar,
        latitude -> Float8,
        longitude -> Float8,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Forecast subscriptions, unique per (user_id, city_id).
    subscriptions (id) {
        id -> Uuid,
        user_id -> Uuid,
        city_id -> Uuid,
        /// Hours between emails.
        period -> Int4,
        next_message -> Timestamptz,
        is_active -> Bool,
        temperature -> Bool,
        precipitation -> Bool,
        cloudiness -> Bool,
        humidity -> Bool,
        wind -> Bool,
        wind_speed -> Bool,
        pressure -> Bool,
        feels_like -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Latest provider payload per city.
    weather_data (city_id) {
        city_id -> Uuid,
        updated_at -> Timestamptz,
        /// Provider payload, stored verbatim.
        #[sql_name = "weather_data"]
        payload -> Jsonb,
    }
}

diesel::joinable!(subscriptions -> users (user_id));
diesel::joinable!(subscriptions -> cities (city_id));
diesel::joinable!(weather_data -> cities (city_id));

diesel::allow_tables_to_appear_in_same_query!(users, cities, subscriptions, weather_data);
