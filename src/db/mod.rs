//! Persistence layer: connection setup, schema bootstrap, entities and the
//! per-entity services that encapsulate every query.

pub mod entities;
pub mod schema;
pub mod services;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Pool options for `database_url`.
///
/// An in-memory SQLite database lives and dies with its connection, so the
/// pool is pinned to a single connection that is never recycled.
pub fn connect_options(database_url: &str) -> ConnectOptions {
    let mut opt = ConnectOptions::new(database_url.to_owned());
    if database_url.contains(":memory:") {
        opt.max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    } else {
        opt.max_connections(10);
    }
    opt.sqlx_logging(false);
    opt
}

/// Opens the connection pool for `database_url`.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(connect_options(database_url)).await
}

#[cfg(test)]
pub(crate) mod test_fixtures;
