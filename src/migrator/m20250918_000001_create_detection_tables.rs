use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DetectionRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DetectionRecords::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DetectionRecords::UserId).integer().not_null())
                    .col(ColumnDef::new(DetectionRecords::ImagePath).string().not_null())
                    .col(ColumnDef::new(DetectionRecords::DefectsJson).text().not_null())
                    .col(ColumnDef::new(DetectionRecords::DefectsName).text().not_null())
                    .col(
                        ColumnDef::new(DetectionRecords::CreatedAt)
                            .date_time()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_detection_records_user_id")
                    .table(DetectionRecords::Table)
                    .col(DetectionRecords::UserId)
                    .to_owned(),
            )
            .await?;

        // History mirrors a record by value; no FK
        manager
            .create_table(
                Table::create()
                    .table(DetectionHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DetectionHistory::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DetectionHistory::UserId).integer().not_null())
                    .col(ColumnDef::new(DetectionHistory::DefectsName).text().not_null())
                    .col(ColumnDef::new(DetectionHistory::ImagePath).string().not_null())
                    .col(
                        ColumnDef::new(DetectionHistory::CreatedAt)
                            .date_time()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_detection_history_user_created")
                    .table(DetectionHistory::Table)
                    .col(DetectionHistory::UserId)
                    .col(DetectionHistory::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DetectionHistory::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DetectionRecords::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum DetectionRecords {
    Table,
    Id,
    UserId,
    ImagePath,
    DefectsJson,
    DefectsName,
    CreatedAt,
}

#[derive(DeriveIden)]
enum DetectionHistory {
    Table,
    Id,
    UserId,
    DefectsName,
    ImagePath,
    CreatedAt,
}
