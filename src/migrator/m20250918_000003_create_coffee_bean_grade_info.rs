use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CoffeeBeanGradeInfo::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CoffeeBeanGradeInfo::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CoffeeBeanGradeInfo::BeanName).string())
                    .col(
                        ColumnDef::new(CoffeeBeanGradeInfo::EnglishName)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CoffeeBeanGradeInfo::RecognitionResult).string())
                    .col(ColumnDef::new(CoffeeBeanGradeInfo::Category).string())
                    .col(ColumnDef::new(CoffeeBeanGradeInfo::Appearance).text())
                    .col(ColumnDef::new(CoffeeBeanGradeInfo::Cause).text())
                    .col(ColumnDef::new(CoffeeBeanGradeInfo::FlavorImpact).text())
                    .col(ColumnDef::new(CoffeeBeanGradeInfo::HandlingSuggestion).text())
                    .col(ColumnDef::new(CoffeeBeanGradeInfo::Prevention).text())
                    .col(ColumnDef::new(CoffeeBeanGradeInfo::SampleImageUrl).string())
                    .col(
                        ColumnDef::new(CoffeeBeanGradeInfo::CreatedAt)
                            .date_time()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CoffeeBeanGradeInfo::UpdatedAt)
                            .date_time()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_coffee_bean_grade_info_english_name")
                    .table(CoffeeBeanGradeInfo::Table)
                    .col(CoffeeBeanGradeInfo::EnglishName)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CoffeeBeanGradeInfo::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CoffeeBeanGradeInfo {
    Table,
    Id,
    BeanName,
    EnglishName,
    RecognitionResult,
    Category,
    Appearance,
    Cause,
    FlavorImpact,
    HandlingSuggestion,
    Prevention,
    SampleImageUrl,
    CreatedAt,
    UpdatedAt,
}
