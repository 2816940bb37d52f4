use super::{Column, ColumnId, Index, IndexId, Table, TableId, TableType};

/// The physical schema: an arena of tables addressed by [`TableId`].
#[derive(Debug, Default, Clone)]
pub struct Schema {
    pub tables: Vec<Table>,
}

impl Schema {
    pub fn column(&self, id: impl Into<ColumnId>) -> &Column {
        let id = id.into();
        self.table(id.table)
            .columns
            .get(id.index)
            .expect("invalid column ID")
    }

    pub fn column_mut(&mut self, id: impl Into<ColumnId>) -> &mut Column {
        let id = id.into();
        self.table_mut(id.table)
            .columns
            .get_mut(id.index)
            .expect("invalid column ID")
    }

    // NOTE: this is unlikely to confuse users given the context.
    #[allow(clippy::should_implement_trait)]
    pub fn index(&self, id: IndexId) -> &Index {
        self.table(id.table)
            .indices
            .get(id.index)
            .expect("invalid index ID")
    }

    pub fn table(&self, id: impl Into<TableId>) -> &Table {
        self.tables.get(id.into().0).expect("invalid table ID")
    }

    pub fn table_mut(&mut self, id: impl Into<TableId>) -> &mut Table {
        self.tables.get_mut(id.into().0).expect("invalid table ID")
    }

    /// Tables that have not been dropped.
    pub fn live_tables(&self) -> impl Iterator<Item = &Table> + '_ {
        self.tables.iter().filter(|table| !table.dropped)
    }

    pub fn find_table(&self, name: &str) -> Option<TableId> {
        self.live_tables()
            .find(|table| table.name.eq_ignore_ascii_case(name))
            .map(|table| table.id)
    }

    /// Finds a live index by name across all tables.
    pub fn find_index(&self, name: &str) -> Option<IndexId> {
        self.live_tables()
            .flat_map(|table| table.indices.iter())
            .find(|index| index.name.eq_ignore_ascii_case(name))
            .map(|index| index.id)
    }

    pub fn create_table(&mut self, name: impl Into<String>, ty: TableType) -> TableId {
        let id = TableId(self.tables.len());
        self.tables.push(Table::new(id, name, ty));
        id
    }

    /// Adds an index to its table and returns the new id.
    pub fn add_index(&mut self, mut index: Index) -> IndexId {
        let table = self.table_mut(index.on);
        let id = IndexId {
            table: table.id,
            index: table.indices.len(),
        };
        index.id = id;
        table.indices.push(index);
        id
    }

    /// Live tables whose parent is `id`.
    pub fn children(&self, id: TableId) -> Vec<TableId> {
        self.live_tables()
            .filter(|table| table.parent == Some(id))
            .map(|table| table.id)
            .collect()
    }

    /// The overflow table of `id`, if one exists.
    pub fn overflow_of(&self, id: TableId) -> Option<TableId> {
        self.children(id)
            .into_iter()
            .find(|child| self.table(*child).ty == TableType::Overflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::db::{ColumnKind, ColumnType};
    use pretty_assertions::assert_eq;

    #[test]
    fn tables_are_addressed_by_id() {
        let mut schema = Schema::default();
        let animal = schema.create_table("ts_Animal", TableType::Primary);
        let overflow = schema.create_table("ts_Animal_Overflow", TableType::Overflow);
        schema.table_mut(overflow).parent = Some(animal);

        let id = schema.table_mut(animal).add_column("Id", ColumnType::Integer);
        schema.column_mut(id).kind = ColumnKind::INSTANCE_ID;

        assert_eq!(schema.find_table("TS_ANIMAL"), Some(animal));
        assert_eq!(schema.overflow_of(animal), Some(overflow));
        assert_eq!(schema.table(animal).instance_id_column().map(|c| c.id), Some(id));
        assert_eq!(format!("{id:?}"), "ColumnId(0/0)");

        schema.table_mut(overflow).dropped = true;
        assert_eq!(schema.find_table("ts_Animal_Overflow"), None);
        assert!(schema.children(animal).is_empty());
    }

    #[test]
    fn virtual_tables_only_get_virtual_columns() {
        let mut schema = Schema::default();
        let mixin = schema.create_table("ts_IHasName", TableType::Virtual);
        let column = schema.table_mut(mixin).add_column("Name", ColumnType::Text);

        assert!(schema.column(column).is_virtual());
        assert_eq!(schema.table(mixin).physical_columns().count(), 0);
    }
}
