use super::{Ident, Predicate, Statement};

use classmap_core::schema::db::{Index, Schema};

#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndex {
    /// Name of the index
    pub name: Ident,

    /// Which table to index
    pub on: Ident,

    pub columns: Vec<Ident>,

    /// When true, the index is unique
    pub unique: bool,

    /// Conditions of a partial index, joined with `AND`
    pub filter: Vec<Predicate>,
}

impl Statement {
    pub fn create_index(schema: &Schema, index: &Index) -> Self {
        let table = schema.table(index.on);
        let columns: Vec<_> = index
            .columns
            .iter()
            .map(|column| Ident::from(&schema.column(*column).name))
            .collect();

        let mut filter = vec![];

        if index.where_not_null {
            filter.extend(columns.iter().cloned().map(Predicate::IsNotNull));
        }

        if let (Some(classes), Some(class_id)) = (&index.class_filter, table.class_id_column()) {
            filter.push(Predicate::In(
                Ident::from(&class_id.name),
                classes.iter().map(|class| class.0).collect(),
            ));
        }

        CreateIndex {
            name: Ident::from(&index.name),
            on: Ident::from(&table.name),
            columns,
            unique: index.unique,
            filter,
        }
        .into()
    }
}

impl From<CreateIndex> for Statement {
    fn from(value: CreateIndex) -> Self {
        Self::CreateIndex(value)
    }
}
