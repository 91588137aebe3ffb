use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create daily_stats table. Counter columns are nullable on purpose:
        // a column stays NULL until the first increment for that date.
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("daily_stats"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("date"))
                            .string_len(10)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Alias::new("page_views")).big_integer().null())
                    .col(ColumnDef::new(Alias::new("clicks")).big_integer().null())
                    .col(ColumnDef::new(Alias::new("web_views")).big_integer().null())
                    .col(
                        ColumnDef::new(Alias::new("mobile_views"))
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(Alias::new("web_clicks")).big_integer().null())
                    .col(
                        ColumnDef::new(Alias::new("mobile_clicks"))
                            .big_integer()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create clicks table (append-only log)
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("clicks"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Alias::new("date")).string_len(10).not_null())
                    .col(ColumnDef::new(Alias::new("button_id")).text().not_null())
                    .col(ColumnDef::new(Alias::new("channel")).string_len(16).null())
                    .col(
                        ColumnDef::new(Alias::new("created_at"))
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Create index on date for range scans
        manager
            .create_index(
                Index::create()
                    .name("idx_clicks_date")
                    .table(Alias::new("clicks"))
                    .col(Alias::new("date"))
                    .to_owned(),
            )
            .await?;

        // Create sessions table
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("sessions"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Alias::new("date")).string_len(10).not_null())
                    .col(ColumnDef::new(Alias::new("channel")).string_len(16).null())
                    .col(
                        ColumnDef::new(Alias::new("entry_time"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("exit_time"))
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("duration_seconds"))
                            .double()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create index on date for average-duration queries
        manager
            .create_index(
                Index::create()
                    .name("idx_sessions_date")
                    .table(Alias::new("sessions"))
                    .col(Alias::new("date"))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop indexes
        manager
            .drop_index(
                Index::drop()
                    .name("idx_sessions_date")
                    .table(Alias::new("sessions"))
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_clicks_date")
                    .table(Alias::new("clicks"))
                    .to_owned(),
            )
            .await?;

        // Drop tables
        manager
            .drop_table(Table::drop().table(Alias::new("sessions")).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Alias::new("clicks")).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Alias::new("daily_stats")).to_owned())
            .await?;

        Ok(())
    }
}
