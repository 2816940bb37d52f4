use classmap_core::schema::{
    app::ClassId,
    db::{ColumnKind, ColumnType, ForeignKey, Index, IndexId, OnDelete, Schema, TableId, TableType},
};
use classmap_sql::{
    stmt::{Expr, Ident, InsertSelect, Predicate, Select, Update},
    Serializer, Statement,
};
use pretty_assertions::assert_eq;

fn pets() -> (Schema, TableId, TableId) {
    let mut schema = Schema::default();

    let person = schema.create_table("ts_Person", TableType::Primary);
    let person_id = schema.table_mut(person).add_column("Id", ColumnType::Integer);
    schema.column_mut(person_id).kind = ColumnKind::INSTANCE_ID;
    schema.column_mut(person_id).not_null = true;
    schema.table_mut(person).primary_key = Some(person_id);

    let pet = schema.create_table("ts_Pet", TableType::Primary);
    let pet_id = schema.table_mut(pet).add_column("Id", ColumnType::Integer);
    schema.column_mut(pet_id).kind = ColumnKind::INSTANCE_ID;
    schema.column_mut(pet_id).not_null = true;
    let class_id = schema.table_mut(pet).add_column("ECClassId", ColumnType::Integer);
    schema.column_mut(class_id).kind = ColumnKind::CLASS_ID;
    schema.column_mut(class_id).not_null = true;
    let shared = schema.table_mut(pet).add_column("ps1", ColumnType::Any);
    schema.column_mut(shared).kind = ColumnKind::SHARED_DATA;
    let owner = schema.table_mut(pet).add_column("OwnerId", ColumnType::Integer);
    schema.table_mut(pet).primary_key = Some(pet_id);
    schema.table_mut(pet).foreign_keys.push(ForeignKey {
        column: owner,
        references: person_id,
        on_delete: OnDelete::SetNull,
    });

    (schema, person, pet)
}

#[test]
fn create_table_lists_physical_columns_and_constraints() {
    let (mut schema, _, pet) = pets();
    let virtual_column = schema.table_mut(pet).add_column("Owns_SourceECClassId", ColumnType::Integer);
    schema.column_mut(virtual_column).persistence = classmap_core::schema::db::Persistence::Virtual;

    let sql = Serializer::sqlite().serialize(&Statement::create_table(&schema, pet));

    assert_eq!(
        sql,
        "CREATE TABLE \"ts_Pet\" (\n    \
         \"Id\" INTEGER NOT NULL,\n    \
         \"ECClassId\" INTEGER NOT NULL,\n    \
         \"ps1\",\n    \
         \"OwnerId\" INTEGER,\n    \
         PRIMARY KEY (\"Id\"),\n    \
         FOREIGN KEY (\"OwnerId\") REFERENCES \"ts_Person\" (\"Id\") ON DELETE SET NULL\n);"
    );
}

#[test]
fn postgresql_types_every_column() {
    let (schema, _, pet) = pets();

    let sql = Serializer::postgresql().serialize(&Statement::create_table(&schema, pet));

    assert!(sql.contains("\"Id\" BIGINT NOT NULL"), "{sql}");
    assert!(sql.contains("\"ps1\" TEXT"), "{sql}");
}

#[test]
fn add_column_carries_inline_reference() {
    let (schema, _, pet) = pets();
    let owner = schema.table(pet).find_column("OwnerId").map(|c| c.id).unwrap();

    let serializer = Serializer::sqlite();

    assert_eq!(
        serializer.serialize(&Statement::add_column(&schema, owner, true)),
        "ALTER TABLE \"ts_Pet\" ADD COLUMN \"OwnerId\" INTEGER REFERENCES \"ts_Person\" (\"Id\") ON DELETE SET NULL;"
    );
    assert_eq!(
        serializer.serialize(&Statement::add_column(&schema, owner, false)),
        "ALTER TABLE \"ts_Pet\" ADD COLUMN \"OwnerId\" INTEGER;"
    );
}

#[test]
fn partial_index_filters_by_class() {
    let (mut schema, _, pet) = pets();
    let owner = schema.table(pet).find_column("OwnerId").map(|c| c.id).unwrap();

    let id = schema.add_index(Index {
        id: IndexId::placeholder(),
        name: "ix_ts_Pet_fk_ts_Owns_target".into(),
        on: pet,
        columns: vec![owner],
        unique: false,
        where_not_null: true,
        class_filter: Some(vec![ClassId(7), ClassId(9)]),
        class: None,
        auto_generated: true,
        catalog_id: None,
    });

    let sql = Serializer::sqlite().serialize(&Statement::create_index(&schema, schema.index(id)));

    assert_eq!(
        sql,
        "CREATE INDEX \"ix_ts_Pet_fk_ts_Owns_target\" ON \"ts_Pet\" (\"OwnerId\") \
         WHERE \"OwnerId\" IS NOT NULL AND \"ECClassId\" IN (7, 9);"
    );
}

#[test]
fn correlated_update_between_tables() {
    let stmt: Statement = Update::new("ts_Animal_Overflow")
        .set(
            "os1",
            Expr::Subquery(Box::new(
                Select::column("ps3", "ts_Animal").filter(Predicate::ColumnsEq(
                    (Ident::from("ts_Animal"), Ident::from("Id")),
                    (Ident::from("ts_Animal_Overflow"), Ident::from("Id")),
                )),
            )),
        )
        .filter(Predicate::Eq(Ident::from("ECClassId"), 12))
        .into();

    assert_eq!(
        Serializer::sqlite().serialize(&stmt),
        "UPDATE \"ts_Animal_Overflow\" SET \"os1\" = (SELECT \"ps3\" FROM \"ts_Animal\" \
         WHERE \"ts_Animal\".\"Id\" = \"ts_Animal_Overflow\".\"Id\") WHERE \"ECClassId\" = 12;"
    );
}

#[test]
fn insert_missing_rows() {
    let stmt: Statement = InsertSelect {
        table: Ident::from("ts_Dog"),
        columns: vec![Ident::from("Id"), Ident::from("ECClassId")],
        source: Select::new(vec![Ident::from("Id"), Ident::from("ECClassId")], "ts_Animal").filter(
            Predicate::Eq(Ident::from("ECClassId"), 4).and(Predicate::NotInSelect(
                Ident::from("Id"),
                Box::new(Select::column("Id", "ts_Dog")),
            )),
        ),
    }
    .into();

    assert_eq!(
        Serializer::sqlite().serialize(&stmt),
        "INSERT INTO \"ts_Dog\" (\"Id\", \"ECClassId\") SELECT \"Id\", \"ECClassId\" FROM \"ts_Animal\" \
         WHERE \"ECClassId\" = 4 AND \"Id\" NOT IN (SELECT \"Id\" FROM \"ts_Dog\");"
    );
}

#[test]
fn drop_and_count() {
    let serializer = Serializer::sqlite();

    assert_eq!(
        serializer.serialize(&Statement::drop_table("ts_Gone")),
        "DROP TABLE \"ts_Gone\";"
    );
    assert_eq!(
        serializer.serialize(&Statement::count(
            "ts_Animal",
            Some(Predicate::IsNotNull(Ident::from("ps2")))
        )),
        "SELECT COUNT(*) FROM \"ts_Animal\" WHERE \"ps2\" IS NOT NULL;"
    );
}

#[test]
fn identifiers_are_escaped() {
    assert_eq!(
        Serializer::sqlite().serialize(&Statement::drop_table("odd\"name")),
        "DROP TABLE \"odd\"\"name\";"
    );
}
