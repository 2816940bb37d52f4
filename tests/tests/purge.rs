use classmap::app::{ClassDef, SchemaDef};
use pretty_assertions::assert_eq;
use tests::{schemas::*, MapTest};

fn animals(dog_has_breed: bool) -> SchemaDef {
    let mut dog = ClassDef::entity("Dog").base("Animal");
    if dog_has_breed {
        dog = dog.property(string("Breed"));
    }

    zoo()
        .class(
            ClassDef::entity("Animal")
                .attrs(|attrs| {
                    attrs.table_per_hierarchy().joined_table_per_direct_subclass = true;
                })
                .property(string("Name")),
        )
        .class(dog)
}

#[test]
fn unused_joined_table_is_dropped() {
    let mut test = MapTest::new();
    test.map(&[animals(true)]).unwrap();
    assert!(test.table_exists("zoo_Dog"));
    test.take_ddl();

    test.map(&[animals(false).version(1, 0, 1)]).unwrap();

    assert!(!test.table_exists("zoo_Dog"));
    assert_eq!(test.take_ddl(), [r#"DROP TABLE "zoo_Dog";"#]);

    let session = test.session();
    assert!(session.db.find_table("zoo_Dog").is_none());

    let dog = session.class_map("Zoo", "Dog").unwrap();
    assert_eq!(dog.tables.len(), 1);
    assert_eq!(session.table_name("Zoo", "Dog"), Some("zoo_Animal"));

    let catalog_rows = test.query_i64(
        r#"SELECT COUNT(*) FROM "ec_Table" WHERE "Name" = 'zoo_Dog'"#,
        &[],
    );
    assert_eq!(catalog_rows, 0);
}

#[test]
fn dropping_tables_can_be_disallowed() {
    let mut test = MapTest::with_builder(|builder| {
        builder.allow_changeset_incompatible_drops(false);
    });
    test.map(&[animals(true)]).unwrap();

    let err = test.map(&[animals(false).version(1, 0, 1)]).unwrap_err();
    assert!(err.is_structural_conflict(), "{err}");
    assert!(err.to_string().contains("`zoo_Dog`"), "{err}");
    assert_eq!(test.errors().len(), 1);

    // Everything the import did was rolled back.
    assert!(test.table_exists("zoo_Dog"));
    let session = test.session();
    assert!(session.column("Zoo", "Dog", "Breed").is_some());
}
