use classmap::{
    app::{ClassDef, Direction, End, Multiplicity, PropertyDef},
    mapping::{ClassMapKind, Strategy, SystemProperty},
};
use pretty_assertions::assert_eq;
use tests::{schemas::*, MapTest};

#[test]
fn one_to_many_relationship_uses_the_navigation_columns() {
    let mut test = MapTest::new();

    let schema = zoo()
        .class(ClassDef::entity("Person").property(string("Name")))
        .class(
            ClassDef::entity("Pet")
                .property(string("Name"))
                .property(PropertyDef::navigation("Owner", "Owns", Direction::Backward)),
        )
        .class(relationship(
            "Owns",
            ("Person", Multiplicity::ZERO_ONE),
            ("Pet", Multiplicity::ZERO_MANY),
        ));

    test.map(&[schema]).unwrap();

    assert!(!test.table_exists("zoo_Owns"));
    assert_eq!(
        test.columns("zoo_Pet"),
        ["Id", "Name", "OwnerId", "OwnerRelECClassId"]
    );
    assert!(test.index_exists("ix_zoo_Pet_fk_zoo_Owns_target"));

    let references = test.query_string(
        r#"SELECT "table" FROM pragma_foreign_key_list('zoo_Pet') WHERE "from" = 'OwnerId'"#,
        &[],
    );
    assert_eq!(references.as_deref(), Some("zoo_Person"));

    let session = test.session();
    let owns = session.class_map("Zoo", "Owns").unwrap();
    assert_eq!(owns.kind, ClassMapKind::RelationshipEndTable { fk_end: End::Target });
    assert_eq!(owns.strategy.strategy, Strategy::ForeignKeyInTarget);
    assert_eq!(session.table_name("Zoo", "Owns"), Some("zoo_Pet"));

    let owner_id = session.column("Zoo", "Pet", "Owner.Id").unwrap().id;
    let source = owns.system(SystemProperty::SourceInstanceId).unwrap();
    assert_eq!(source.columns, [owner_id]);

    let target = owns.system(SystemProperty::TargetInstanceId).unwrap();
    let pet_id = session
        .db
        .find_table("zoo_Pet")
        .and_then(|table| session.db.table(table).instance_id_column())
        .unwrap()
        .id;
    assert_eq!(target.columns, [pet_id]);
}

#[test]
fn foreign_key_columns_are_added_without_a_navigation_property() {
    let mut test = MapTest::new();

    let schema = zoo()
        .class(ClassDef::entity("Person"))
        .class(ClassDef::entity("Pet"))
        .class(relationship(
            "Owns",
            ("Person", Multiplicity::ZERO_ONE),
            ("Pet", Multiplicity::ZERO_MANY),
        ));

    test.map(&[schema]).unwrap();

    assert_eq!(test.columns("zoo_Pet"), ["Id", "ForeignECInstanceId_Owns"]);
}

#[test]
fn many_to_many_relationship_gets_a_link_table() {
    let mut test = MapTest::new();

    let schema = zoo()
        .class(ClassDef::entity("Person"))
        .class(ClassDef::entity("Tag").property(string("Label")))
        .class(relationship(
            "Labels",
            ("Person", Multiplicity::ZERO_MANY),
            ("Tag", Multiplicity::ZERO_MANY),
        ));

    test.map(&[schema]).unwrap();

    assert_eq!(
        test.columns("zoo_Labels"),
        ["Id", "SourceId", "SourceECClassId", "TargetId", "TargetECClassId"]
    );
    assert!(test.index_exists("ix_zoo_Labels_source"));
    assert!(test.index_exists("ix_zoo_Labels_target"));
    assert!(test.index_exists("uix_zoo_Labels_sourcetarget"));

    let foreign_keys = test.query_i64(
        r#"SELECT COUNT(*) FROM pragma_foreign_key_list('zoo_Labels')"#,
        &[],
    );
    assert_eq!(foreign_keys, 2);

    let session = test.session();
    let labels = session.class_map("Zoo", "Labels").unwrap();
    assert_eq!(labels.kind, ClassMapKind::RelationshipLinkTable);
    assert_eq!(labels.system.len(), 6);
}

#[test]
fn link_table_rejects_duplicate_pairs() {
    let mut test = MapTest::new();

    let schema = zoo()
        .class(ClassDef::entity("Person"))
        .class(ClassDef::entity("Tag"))
        .class(relationship(
            "Labels",
            ("Person", Multiplicity::ZERO_MANY),
            ("Tag", Multiplicity::ZERO_MANY),
        ));

    test.map(&[schema]).unwrap();

    test.execute(r#"INSERT INTO "zoo_Person" ("Id") VALUES (1)"#, &[]);
    test.execute(r#"INSERT INTO "zoo_Tag" ("Id") VALUES (1)"#, &[]);

    let insert = r#"INSERT INTO "zoo_Labels" ("Id", "SourceId", "SourceECClassId", "TargetId", "TargetECClassId") VALUES (?1, 1, 0, 1, 0)"#;
    assert_eq!(test.try_execute(insert, &[1_i64.into()]).unwrap(), 1);

    // A second row for the same pair violates the unique source/target index.
    let err = test.try_execute(insert, &[2_i64.into()]).unwrap_err();
    assert!(err.is_driver_operation_failed(), "{err}");
}

#[test]
fn many_to_many_relationship_cannot_declare_a_foreign_key() {
    let mut test = MapTest::new();

    let schema = zoo()
        .class(ClassDef::entity("Person"))
        .class(ClassDef::entity("Tag"))
        .class(
            relationship(
                "Labels",
                ("Person", Multiplicity::ZERO_MANY),
                ("Tag", Multiplicity::ZERO_MANY),
            )
            .attrs(|attrs| {
                attrs.strategy(Strategy::ForeignKeyInTarget, false);
            }),
        );

    let err = test.map(&[schema]).unwrap_err();
    assert!(err.is_structural_conflict(), "{err}");
    assert!(err.to_string().contains("many to many"), "{err}");
}
