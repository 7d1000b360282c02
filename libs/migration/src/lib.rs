pub use sea_orm_migration::prelude::*;

mod m20250115_000000_create_tables;
mod m20250116_000000_seed_initial_data;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250115_000000_create_tables::Migration),
            Box::new(m20250116_000000_seed_initial_data::Migration),
        ]
    }
}
