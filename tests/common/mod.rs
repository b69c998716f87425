use identity_seaorm_store::{migration::Migrator, SeaOrmStore};
use rstest::fixture;
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;
use tracing_subscriber::EnvFilter;

/// A migrated store over a private in-memory SQLite database.
///
/// The pool is pinned to one connection: every connection to `:memory:` opens
/// a separate database.
#[fixture]
pub async fn store() -> SeaOrmStore {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let conn = Database::connect(options)
        .await
        .expect("in-memory sqlite should open");
    Migrator::up(&conn, None)
        .await
        .expect("migrations should apply");

    SeaOrmStore::new(conn)
}
