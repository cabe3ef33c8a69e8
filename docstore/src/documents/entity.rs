//! Sea-ORM entities of the document store.

pub mod document {
    use sea_orm::entity::prelude::*;

    use crate::storage::FieldKind;
    use crate::storage::memory::{FieldSource, FieldValue};

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "documents")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub document_ref: String,
        pub name: String,
        pub version: i32,
        pub created_at: DateTimeUtc,
        pub content_type: String,
        pub author_ref: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_one = "super::document_file::Entity")]
        File,
    }

    impl Related<super::document_file::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::File.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl FieldSource for Model {
        fn fields() -> Vec<(&'static str, FieldKind)> {
            vec![
                ("documentRef", FieldKind::Text),
                ("name", FieldKind::Text),
                ("version", FieldKind::Integer),
                ("createdAt", FieldKind::Timestamp),
                ("contentType", FieldKind::Text),
                ("authorRef", FieldKind::Text),
            ]
        }

        fn field_value(&self, field: &str) -> Option<FieldValue> {
            match field {
                "documentRef" => Some(FieldValue::Text(self.document_ref.clone())),
                "name" => Some(FieldValue::Text(self.name.clone())),
                "version" => Some(FieldValue::Integer(i64::from(self.version))),
                "createdAt" => Some(FieldValue::Timestamp(self.created_at)),
                "contentType" => Some(FieldValue::Text(self.content_type.clone())),
                "authorRef" => Some(FieldValue::Text(self.author_ref.clone())),
                _ => None,
            }
        }
    }
}

pub mod document_file {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "document_files")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        #[sea_orm(unique)]
        pub document_ref: String,
        #[sea_orm(column_type = "Blob")]
        pub payload: Vec<u8>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::document::Entity",
            from = "Column::DocumentRef",
            to = "super::document::Column::DocumentRef"
        )]
        Document,
    }

    impl Related<super::document::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Document.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}
