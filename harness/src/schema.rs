// Fixture table created by `migrations/0001_create_users.sql`.

diesel::table! {
    users (id) {
        id -> Int4,
        name -> Text,
    }
}
