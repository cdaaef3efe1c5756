pub use sea_orm_migration::prelude::*;

mod m20241001_000001_create_directory_tables;
mod m20241001_000002_create_catalog_tables;
mod m20241001_000003_create_votes_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241001_000001_create_directory_tables::Migration),
            Box::new(m20241001_000002_create_catalog_tables::Migration),
            Box::new(m20241001_000003_create_votes_table::Migration),
        ]
    }
}
