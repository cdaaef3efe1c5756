use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Restaurants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Restaurants::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Restaurants::Name)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Restaurants::Address).text().not_null())
                    .col(ColumnDef::new(Restaurants::PhoneNumber).string_len(20).null())
                    .col(ColumnDef::new(Restaurants::CuisineType).string_len(100).null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Menus::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Menus::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Menus::RestaurantId).integer().not_null())
                    .col(ColumnDef::new(Menus::Date).date().not_null())
                    .col(ColumnDef::new(Menus::Items).text().not_null())
                    // Advisory counter, the tally aggregates votes instead
                    .col(
                        ColumnDef::new(Menus::Votes)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_menus_restaurant")
                            .from(Menus::Table, Menus::RestaurantId)
                            .to(Restaurants::Table, Restaurants::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_menus_restaurant_date")
                    .table(Menus::Table)
                    .col(Menus::RestaurantId)
                    .col(Menus::Date)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_menus_date")
                    .table(Menus::Table)
                    .col(Menus::Date)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Menus::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Restaurants::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum Restaurants {
    Table,
    Id,
    Name,
    Address,
    PhoneNumber,
    CuisineType,
}

#[derive(DeriveIden)]
pub(crate) enum Menus {
    Table,
    Id,
    RestaurantId,
    Date,
    Items,
    Votes,
}
