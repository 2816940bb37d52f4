use classmap::{
    app::{ClassDef, Modifier, PrimitiveType, PropertyDef},
    db::TableType,
    mapping::{ClassMapKind, Strategy},
};
use pretty_assertions::assert_eq;
use tests::{schemas::*, MapTest};

#[test]
fn abstract_classes_and_mixins_get_virtual_tables() {
    let mut test = MapTest::new();

    let schema = zoo()
        .class(ClassDef::mixin("IHasTag").property(string("Tag")))
        .class(
            ClassDef::entity("Shape")
                .modifier(Modifier::Abstract)
                .property(string("Name")),
        )
        .class(
            ClassDef::entity("Circle")
                .base("Shape")
                .base("IHasTag")
                .property(double("Radius")),
        );

    test.map(&[schema]).unwrap();

    assert!(!test.table_exists("zoo_Shape"));
    assert!(!test.table_exists("zoo_IHasTag"));

    // The class id column of a table holding a single class is virtual.
    assert_eq!(test.columns("zoo_Circle"), ["Id", "Name", "Tag", "Radius"]);

    let session = test.session();

    let shape = session.class_map("Zoo", "Shape").unwrap();
    assert_eq!(shape.strategy.strategy, Strategy::OwnTable);
    assert_eq!(session.db.table(shape.tables[0]).ty, TableType::Virtual);

    let mixin = session.class_map("Zoo", "IHasTag").unwrap();
    assert_eq!(session.db.table(mixin.tables[0]).ty, TableType::Virtual);

    let circle = session.class_map("Zoo", "Circle").unwrap();
    assert_eq!(circle.kind, ClassMapKind::Class);
    assert_eq!(session.table_name("Zoo", "Circle"), Some("zoo_Circle"));
    assert_eq!(session.column("Zoo", "Circle", "Tag").unwrap().name, "Tag");

    let class_id = session
        .db
        .table(circle.tables[0])
        .class_id_column()
        .unwrap();
    assert!(class_id.is_virtual());
}

#[test]
fn points_and_structs_are_flattened() {
    let mut test = MapTest::new();

    let schema = zoo()
        .class(
            ClassDef::structure("Address")
                .property(string("Street"))
                .property(string("City")),
        )
        .class(
            ClassDef::entity("Keeper")
                .property(PropertyDef::primitive("Location", PrimitiveType::Point2d))
                .property(PropertyDef::structure("Home", "Address"))
                .property(PropertyDef::primitive("Badge", PrimitiveType::String).column_name("badge_no")),
        );

    test.map(&[schema]).unwrap();

    assert!(!test.table_exists("zoo_Address"));
    assert_eq!(
        test.columns("zoo_Keeper"),
        ["Id", "Location_X", "Location_Y", "Home_Street", "Home_City", "badge_no"]
    );

    let session = test.session();
    assert_eq!(
        session.column("Zoo", "Keeper", "Home.City").unwrap().name,
        "Home_City"
    );
    assert_eq!(
        session.class_map("Zoo", "Address").unwrap().kind,
        ClassMapKind::NotMapped
    );
}

#[test]
fn classes_map_onto_existing_tables() {
    let mut test = MapTest::new();
    test.execute_ddl(r#"CREATE TABLE "legacy_people" ("Id" INTEGER PRIMARY KEY, "FullName" TEXT, "Notes" TEXT)"#);

    let schema = zoo().class(
        ClassDef::entity("Person")
            .attrs(|attrs| {
                attrs.existing_table("legacy_people");
            })
            .property(string("FullName")),
    );

    test.map(&[schema]).unwrap();

    // Existing tables are never altered.
    assert_eq!(test.columns("legacy_people"), ["Id", "FullName", "Notes"]);
    assert!(!test.table_exists("zoo_Person"));

    let session = test.session();
    assert_eq!(session.table_name("Zoo", "Person"), Some("legacy_people"));
    assert_eq!(
        session.column("Zoo", "Person", "FullName").unwrap().name,
        "FullName"
    );

    let person = session.class_map("Zoo", "Person").unwrap();
    assert_eq!(person.strategy.strategy, Strategy::ExistingTable);
    assert_eq!(session.db.table(person.tables[0]).ty, TableType::Existing);
}

#[test]
fn existing_table_without_the_property_column_is_drift() {
    let mut test = MapTest::new();
    test.execute_ddl(r#"CREATE TABLE "legacy_people" ("Id" INTEGER PRIMARY KEY)"#);

    let schema = zoo().class(
        ClassDef::entity("Person")
            .attrs(|attrs| {
                attrs.existing_table("legacy_people");
            })
            .property(string("FullName")),
    );

    let err = test.map(&[schema]).unwrap_err();
    assert!(err.is_physical_schema_drift(), "{err}");
    assert!(err.to_string().contains("FullName"), "{err}");
}

#[test]
fn missing_existing_table_is_drift() {
    let mut test = MapTest::new();

    let schema = zoo().class(ClassDef::entity("Person").attrs(|attrs| {
        attrs.existing_table("legacy_people");
    }));

    let err = test.map(&[schema]).unwrap_err();
    assert!(err.is_physical_schema_drift(), "{err}");
}

#[test]
fn unknown_table_in_storage_is_not_adopted() {
    let mut test = MapTest::new();
    test.execute_ddl(r#"CREATE TABLE "zoo_Person" ("Id" INTEGER PRIMARY KEY)"#);

    let schema = zoo().class(ClassDef::entity("Person").property(string("Name")));

    let err = test.map(&[schema]).unwrap_err();
    assert!(err.is_structural_conflict(), "{err}");
}
