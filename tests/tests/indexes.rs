use classmap::app::{ClassDef, UniqueKeyKind};
use pretty_assertions::assert_eq;
use tests::{schemas::*, MapTest};

fn index_sql(test: &mut MapTest, name: &str) -> String {
    test.query_string(
        r#"SELECT "sql" FROM "sqlite_master" WHERE "type" = 'index' AND "name" = ?1"#,
        &[name.into()],
    )
    .unwrap()
}

#[test]
fn declared_indexes_and_unique_keys_are_created() {
    let mut test = MapTest::new();

    let schema = zoo().class(
        ClassDef::entity("Person")
            .attrs(|attrs| {
                attrs
                    .index("ix_person_name", false, &["Name"])
                    .unique_key(UniqueKeyKind::BusinessKey, "Code");
            })
            .property(string("Name"))
            .property(string("Code")),
    );

    test.map(&[schema]).unwrap();

    assert_eq!(
        index_sql(&mut test, "ix_person_name"),
        r#"CREATE INDEX "ix_person_name" ON "zoo_Person" ("Name")"#
    );
    assert_eq!(
        index_sql(&mut test, "uix_zoo_Person_businesskey_Code"),
        r#"CREATE UNIQUE INDEX "uix_zoo_Person_businesskey_Code" ON "zoo_Person" ("Code")"#
    );

    let session = test.session();
    let index = session
        .db
        .find_index("uix_zoo_Person_businesskey_Code")
        .map(|index| session.db.index(index))
        .unwrap();
    assert!(index.unique);
    assert!(index.auto_generated);
}

#[test]
fn index_of_a_subclass_in_a_shared_table_is_partial() {
    let mut test = MapTest::new();

    let schema = zoo()
        .class(ClassDef::entity("Animal").attrs(|attrs| {
            attrs.table_per_hierarchy();
        }))
        .class(
            ClassDef::entity("Dog")
                .base("Animal")
                .attrs(|attrs| {
                    attrs.index("ix_dog_name", false, &["Name"]);
                })
                .property(string("Name")),
        )
        .class(ClassDef::entity("Cat").base("Animal").property(string("Color")));

    test.map(&[schema]).unwrap();

    let dog = test.session().class_id("Zoo", "Dog").unwrap();

    assert_eq!(
        index_sql(&mut test, "ix_dog_name"),
        format!(r#"CREATE INDEX "ix_dog_name" ON "zoo_Animal" ("Name") WHERE "ECClassId" IN ({})"#, dog.0)
    );
}

#[test]
fn index_on_unknown_property_is_rejected() {
    let mut test = MapTest::new();

    let schema = zoo().class(
        ClassDef::entity("Person")
            .attrs(|attrs| {
                attrs.index("ix_person_age", false, &["Age"]);
            })
            .property(string("Name")),
    );

    let err = test.map(&[schema]).unwrap_err();
    assert!(err.is_invalid_schema(), "{err}");
    assert!(err.to_string().contains("Age"), "{err}");
}
