use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FavoriteRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FavoriteRecords::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FavoriteRecords::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(FavoriteRecords::DetectionId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FavoriteRecords::DefectsName).text().not_null())
                    .col(ColumnDef::new(FavoriteRecords::ImagePath).string().not_null())
                    .col(
                        ColumnDef::new(FavoriteRecords::CreatedAt)
                            .date_time()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_favorite_records_detection")
                            .from(FavoriteRecords::Table, FavoriteRecords::DetectionId)
                            .to(DetectionRecords::Table, DetectionRecords::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One bookmark per (user, detection), enforced below the application check
        manager
            .create_index(
                Index::create()
                    .name("uq_favorite_records_user_detection")
                    .table(FavoriteRecords::Table)
                    .col(FavoriteRecords::UserId)
                    .col(FavoriteRecords::DetectionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FavoriteRecords::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum FavoriteRecords {
    Table,
    Id,
    UserId,
    DetectionId,
    DefectsName,
    ImagePath,
    CreatedAt,
}

#[derive(DeriveIden)]
enum DetectionRecords {
    Table,
    Id,
}
