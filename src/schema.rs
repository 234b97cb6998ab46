// Must stay in sync with the DDL in `db::run_migrations`.

diesel::table! {
    users (id) {
        id -> Integer,
        first_name -> Text,
        last_name -> Text,
        username -> Text,
        email -> Text,
        password_hash -> Text,
        user_type -> Text,
        skills -> Text,
        embeddings -> Nullable<Text>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    jobs (id) {
        id -> Integer,
        title -> Text,
        description -> Text,
        user_id -> Integer,
        categories -> Text,
        embeddings -> Nullable<Text>,
        created_at -> Timestamp,
        closed_at -> Nullable<Timestamp>,
        updated_at -> Timestamp,
    }
}

diesel::allow_tables_to_appear_in_same_query!(users, jobs);
