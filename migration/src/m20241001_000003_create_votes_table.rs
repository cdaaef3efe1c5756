use sea_orm_migration::prelude::*;

use crate::m20241001_000001_create_directory_tables::Employees;
use crate::m20241001_000002_create_catalog_tables::Menus;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Votes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Votes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Votes::MenuId).integer().not_null())
                    .col(ColumnDef::new(Votes::EmployeeId).integer().not_null())
                    .col(
                        ColumnDef::new(Votes::Points)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(Votes::VotedDate).date().not_null())
                    // 1..=3 for ranked ballots, NULL for single-choice votes
                    .col(ColumnDef::new(Votes::Rank).small_integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_votes_menu")
                            .from(Votes::Table, Votes::MenuId)
                            .to(Menus::Table, Menus::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_votes_employee")
                            .from(Votes::Table, Votes::EmployeeId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One vote per employee per menu per day, whatever the protocol
        manager
            .create_index(
                Index::create()
                    .name("uq_votes_employee_menu_date")
                    .table(Votes::Table)
                    .col(Votes::EmployeeId)
                    .col(Votes::MenuId)
                    .col(Votes::VotedDate)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // One ranked ballot per employee per day; NULL ranks never collide
        manager
            .create_index(
                Index::create()
                    .name("uq_votes_employee_date_rank")
                    .table(Votes::Table)
                    .col(Votes::EmployeeId)
                    .col(Votes::VotedDate)
                    .col(Votes::Rank)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Tally scans by date
        manager
            .create_index(
                Index::create()
                    .name("idx_votes_date_menu")
                    .table(Votes::Table)
                    .col(Votes::VotedDate)
                    .col(Votes::MenuId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Votes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Votes {
    Table,
    Id,
    MenuId,
    EmployeeId,
    Points,
    VotedDate,
    Rank,
}
