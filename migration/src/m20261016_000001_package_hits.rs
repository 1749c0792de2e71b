//! 包命中统计表迁移
//!
//! 创建 package → package_version → file → file_hits 四张表：
//! - package: `(name, type)` 唯一
//! - package_version: 归属于一个 package
//! - file: 归属于一个 package_version
//! - file_hits: 每个文件每天一行命中计数，`(file_id, date)` 为主键

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 1. package
        manager
            .create_table(
                Table::create()
                    .table(Package::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Package::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Package::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Package::Type).string_len(255).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_package_name_type")
                    .table(Package::Table)
                    .col(Package::Name)
                    .col(Package::Type)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 2. package_version
        manager
            .create_table(
                Table::create()
                    .table(PackageVersion::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PackageVersion::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PackageVersion::PackageId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PackageVersion::Version)
                            .string_len(255)
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_package_version_package")
                            .from(PackageVersion::Table, PackageVersion::PackageId)
                            .to(Package::Table, Package::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_package_version_package_version")
                    .table(PackageVersion::Table)
                    .col(PackageVersion::PackageId)
                    .col(PackageVersion::Version)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 3. file
        manager
            .create_table(
                Table::create()
                    .table(File::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(File::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(File::PackageVersionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(File::Path).text().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_file_package_version")
                            .from(File::Table, File::PackageVersionId)
                            .to(PackageVersion::Table, PackageVersion::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_file_package_version")
                    .table(File::Table)
                    .col(File::PackageVersionId)
                    .to_owned(),
            )
            .await?;

        // 4. file_hits
        manager
            .create_table(
                Table::create()
                    .table(FileHits::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(FileHits::FileId).big_integer().not_null())
                    .col(ColumnDef::new(FileHits::Date).date().not_null())
                    .col(
                        ColumnDef::new(FileHits::Hits)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .primary_key(Index::create().col(FileHits::FileId).col(FileHits::Date))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_file_hits_file")
                            .from(FileHits::Table, FileHits::FileId)
                            .to(File::Table, File::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 索引：date（范围查询）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_file_hits_date")
                    .table(FileHits::Table)
                    .col(FileHits::Date)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FileHits::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(File::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PackageVersion::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Package::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Package {
    #[sea_orm(iden = "package")]
    Table,
    Id,
    Name,
    Type,
}

#[derive(DeriveIden)]
enum PackageVersion {
    #[sea_orm(iden = "package_version")]
    Table,
    Id,
    PackageId,
    Version,
}

#[derive(DeriveIden)]
enum File {
    #[sea_orm(iden = "file")]
    Table,
    Id,
    PackageVersionId,
    Path,
}

#[derive(DeriveIden)]
enum FileHits {
    #[sea_orm(iden = "file_hits")]
    Table,
    FileId,
    Date,
    Hits,
}
