//! Fixed statements issued against the fixture database.

/// Smoke-test query; yields a single text column.
pub const GREETING_SQL: &str = "select 'hello world'";

/// The statement executed inside every transaction under test.
pub const UPDATE_SQL: &str = "UPDATE users SET name = 'Bob' WHERE id = 1";

/// Row touched by [`UPDATE_SQL`].
pub const FIXTURE_USER_ID: i32 = 1;
