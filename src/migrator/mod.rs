use sea_orm_migration::prelude::*;

mod m20250918_000001_create_detection_tables;
mod m20250918_000002_create_favorite_records;
mod m20250918_000003_create_coffee_bean_grade_info;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250918_000001_create_detection_tables::Migration),
            Box::new(m20250918_000002_create_favorite_records::Migration),
            Box::new(m20250918_000003_create_coffee_bean_grade_info::Migration),
        ]
    }
}
