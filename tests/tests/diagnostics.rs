use classmap::{
    app::{ClassDef, ClassRef, Constraint, Multiplicity, Relationship, Strength},
    mapping::ClassMapKind,
    ValidationMode,
};
use pretty_assertions::assert_eq;
use tests::{schemas::*, MapTest};

#[test]
fn foreign_key_end_spanning_several_tables_is_not_mapped() {
    let mut test = MapTest::new();

    let schema = zoo()
        .class(ClassDef::entity("Person"))
        .class(ClassDef::entity("Dog"))
        .class(ClassDef::entity("Fish"))
        .class(ClassDef::relationship(
            "Owns",
            Relationship::new(
                Strength::Referencing,
                Constraint::new(Multiplicity::ZERO_ONE, [ClassRef::from("Person")]),
                Constraint::new(
                    Multiplicity::ZERO_MANY,
                    [ClassRef::from("Dog"), ClassRef::from("Fish")],
                ),
            ),
        ));

    test.map(&[schema]).unwrap();

    let warnings = test.warnings();
    assert_eq!(warnings.len(), 1, "{warnings:?}");
    assert!(warnings[0].contains("Zoo:Owns"), "{warnings:?}");
    assert!(test.errors().is_empty());

    let session = test.session();
    let owns = session.class_map("Zoo", "Owns").unwrap();
    assert_eq!(owns.kind, ClassMapKind::NotMapped);
    assert!(owns.tables.is_empty());

    assert_eq!(test.columns("zoo_Dog"), ["Id"]);
    assert_eq!(test.columns("zoo_Fish"), ["Id"]);
}

#[test]
fn legacy_validation_does_not_hide_mapping_errors() {
    let mut test = MapTest::with_builder(|builder| {
        builder.validation(ValidationMode::Legacy);
    });

    let schema = zoo()
        .class(ClassDef::entity("Animal").attrs(|attrs| {
            attrs.table_per_hierarchy();
        }))
        .class(ClassDef::entity("Plant").attrs(|attrs| {
            attrs.table_per_hierarchy();
        }))
        .class(ClassDef::entity("Hybrid").base("Animal").base("Plant"));

    let err = test.map(&[schema]).unwrap_err();
    assert!(err.is_structural_conflict(), "{err}");
    assert_eq!(test.errors().len(), 1);
}

#[test]
fn custom_instance_id_column_name() {
    let mut test = MapTest::with_builder(|builder| {
        builder.default_instance_id_column("RowId");
    });

    test.map(&[zoo().class(ClassDef::entity("Person").property(string("Name")))])
        .unwrap();

    assert_eq!(test.columns("zoo_Person"), ["RowId", "Name"]);
}

#[test]
fn column_limit_is_enforced() {
    let mut test = MapTest::with_builder(|builder| {
        builder.max_columns_per_table(3);
    });

    let schema = zoo().class(
        ClassDef::entity("Person")
            .property(string("First"))
            .property(string("Last")),
    );

    // Id, the virtual class id and First fill the table.
    let err = test.map(&[schema]).unwrap_err();
    assert!(err.is_structural_conflict(), "{err}");
    assert!(err.to_string().contains("limit"), "{err}");
}

#[test]
fn duplicate_class_names_are_invalid() {
    let mut test = MapTest::new();

    let schema = zoo()
        .class(ClassDef::entity("Person"))
        .class(ClassDef::entity("Person"));

    let err = test.map(&[schema]).unwrap_err();
    assert!(err.is_invalid_schema(), "{err}");
}

#[test]
fn unknown_base_class_is_invalid() {
    let mut test = MapTest::new();

    let schema = zoo().class(ClassDef::entity("Dog").base("Animal"));

    let err = test.map(&[schema]).unwrap_err();
    assert!(err.is_invalid_schema(), "{err}");
    assert!(err.to_string().contains("Zoo:Animal"), "{err}");
}
