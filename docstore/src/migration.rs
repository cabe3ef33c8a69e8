//! Schema of the document store.

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreateDocumentTables)]
    }
}

pub struct CreateDocumentTables;

impl MigrationName for CreateDocumentTables {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_document_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateDocumentTables {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Documents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Documents::DocumentRef)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Documents::Name).string().not_null())
                    .col(ColumnDef::new(Documents::Version).integer().not_null())
                    .col(
                        ColumnDef::new(Documents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Documents::ContentType).string().not_null())
                    .col(ColumnDef::new(Documents::AuthorRef).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DocumentFiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DocumentFiles::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DocumentFiles::DocumentRef)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(DocumentFiles::Payload).blob().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_document_files_document_ref")
                            .from(DocumentFiles::Table, DocumentFiles::DocumentRef)
                            .to(Documents::Table, Documents::DocumentRef),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DocumentFiles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Documents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Documents {
    Table,
    DocumentRef,
    Name,
    Version,
    CreatedAt,
    ContentType,
    AuthorRef,
}

#[derive(DeriveIden)]
enum DocumentFiles {
    Table,
    Id,
    DocumentRef,
    Payload,
}
