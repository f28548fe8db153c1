//! Migrations of the `pg_array_fields` app, in application order.

mod m0001_initial;

use pgarray_db_migrations::Migration;

pub use m0001_initial::initial;

/// Returns every migration of the app, in order.
pub fn all() -> Vec<Migration> {
    vec![initial()]
}
