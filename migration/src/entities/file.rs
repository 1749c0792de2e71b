use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "file")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub package_version_id: i64,
    #[sea_orm(column_type = "Text")]
    pub path: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::package_version::Entity",
        from = "Column::PackageVersionId",
        to = "super::package_version::Column::Id"
    )]
    PackageVersion,
    #[sea_orm(has_many = "super::file_hits::Entity")]
    FileHits,
}

impl Related<super::package_version::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PackageVersion.def()
    }
}

impl Related<super::file_hits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FileHits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
