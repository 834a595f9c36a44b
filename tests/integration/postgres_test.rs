//! Store tests against a live PostgreSQL server.
//!
//! Ignored by default. Point `ENGHUB_TEST_DATABASE_URL` at a scratch
//! database and run them with `--ignored`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use enghub_core::config::DatabaseConfig;
use enghub_core::traits::{
    Column, ColumnType, Entity, Repository, SoftDeletable, TableSchema, UnitOfWork,
};
use enghub_core::types::{Filter, FilterField};
use enghub_database::migration::run_migrations;
use enghub_database::store::PostgresStore;
use enghub_database::{Database, DatabasePool, EntityRepository, StoreUnitOfWork};
use enghub_entity::Engineer;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Site {
    id: Uuid,
    title: String,
    deleted: bool,
}

const SITE_COLUMNS: &[Column] = &[
    Column::required("id", ColumnType::Uuid),
    Column::text("title", 50),
    Column::required("deleted", ColumnType::Boolean),
];

impl Entity for Site {
    const SCHEMA: TableSchema = TableSchema {
        name: "test_sites",
        key: "id",
        columns: SITE_COLUMNS,
    };

    fn id(&self) -> Uuid {
        self.id
    }

    fn as_soft_deletable(&mut self) -> Option<&mut dyn SoftDeletable> {
        Some(self)
    }
}

impl SoftDeletable for Site {
    fn is_deleted(&self) -> bool {
        self.deleted
    }

    fn mark_deleted(&mut self) {
        self.deleted = true;
    }
}

async fn connect() -> Database {
    let url = std::env::var("ENGHUB_TEST_DATABASE_URL")
        .expect("ENGHUB_TEST_DATABASE_URL must point at a scratch database");
    let config = DatabaseConfig {
        provider: "postgres".to_string(),
        url,
        ..DatabaseConfig::default()
    };
    let pool = DatabasePool::connect(&config).await.expect("connect");
    run_migrations(pool.pool()).await.expect("migrate");
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS test_sites (
            id UUID PRIMARY KEY,
            title VARCHAR(50) NOT NULL,
            deleted BOOLEAN NOT NULL DEFAULT FALSE
        )",
    )
    .execute(pool.pool())
    .await
    .expect("create test_sites");

    Database::from_provider(Arc::new(PostgresStore::new(pool)))
}

#[tokio::test]
#[ignore = "requires ENGHUB_TEST_DATABASE_URL"]
async fn test_soft_delete_keeps_flagged_row() {
    let database = connect().await;
    let session = database.open_session();
    let sites: EntityRepository<Site> = EntityRepository::new(Arc::clone(&session));
    let uow = StoreUnitOfWork::new(session);
    let cancel = CancellationToken::new();

    let mut site = Site {
        id: Uuid::new_v4(),
        title: "Riyadh".to_string(),
        deleted: false,
    };
    sites.insert(&site).expect("stage");
    uow.commit(&cancel).await.expect("insert");

    sites.delete(&mut site).expect("stage delete");
    assert_eq!(uow.commit(&cancel).await.expect("soft delete"), 1);

    let this_site = FilterField::eq("id", site.id);
    let stored = sites
        .get_all(Some(Filter::from_field(this_site.clone())), false, &cancel)
        .await
        .expect("read");
    assert_eq!(stored.len(), 1);
    assert!(stored[0].deleted);

    let live = sites
        .get_all(
            Some(Filter::from_field(this_site).and(FilterField::eq("deleted", false))),
            false,
            &cancel,
        )
        .await
        .expect("live");
    assert!(live.is_empty());
}

#[tokio::test]
#[ignore = "requires ENGHUB_TEST_DATABASE_URL"]
async fn test_hard_delete_and_revert_round_trip() {
    let database = connect().await;
    let cancel = CancellationToken::new();

    let session = database.open_session();
    let engineers: EntityRepository<Engineer> = EntityRepository::new(Arc::clone(&session));
    let uow = StoreUnitOfWork::new(session);
    let engineer = Engineer::new("Ali", "علي");
    engineers.insert(&engineer).expect("stage");
    uow.commit(&cancel).await.expect("insert");

    let session = database.open_session();
    let engineers: EntityRepository<Engineer> = EntityRepository::new(Arc::clone(&session));
    let uow = StoreUnitOfWork::new(session);
    let mut loaded = engineers
        .get_by_id(engineer.id.into_uuid(), &cancel)
        .await
        .expect("lookup")
        .expect("present");
    loaded.name = "Changed".to_string();
    engineers.update(&loaded).expect("stage");
    loaded.name = "Ali".to_string();
    engineers.update(&loaded).expect("stage");
    assert_eq!(uow.commit(&cancel).await.expect("commit"), 0);

    engineers.delete(&mut loaded).expect("stage delete");
    assert_eq!(uow.commit(&cancel).await.expect("delete"), 1);
    let gone = engineers
        .get_by_id(engineer.id.into_uuid(), &cancel)
        .await
        .expect("lookup");
    assert!(gone.is_none());
}
