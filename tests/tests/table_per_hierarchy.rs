use classmap::{
    app::{ClassDef, SchemaDef},
    db::TableType,
    mapping::{JoinedTableInfo, ShareColumnsMode, Strategy},
};
use pretty_assertions::assert_eq;
use tests::{schemas::*, MapTest};

fn animals(share_columns: Option<u32>) -> SchemaDef {
    zoo()
        .class(
            ClassDef::entity("Animal")
                .attrs(|attrs| {
                    attrs.table_per_hierarchy().share_columns(share_columns);
                })
                .property(int("Legs")),
        )
        .class(ClassDef::entity("Dog").base("Animal").property(string("Name")))
        .class(
            ClassDef::entity("Cat")
                .base("Animal")
                .property(string("Color"))
                .property(string("Name")),
        )
}

#[test]
fn siblings_reuse_shared_columns() {
    let mut test = MapTest::new();
    test.map(&[animals(None)]).unwrap();

    assert_eq!(
        test.columns("zoo_Animal"),
        ["Id", "ECClassId", "ps1", "ps2", "ps3"]
    );
    assert!(test.index_exists("ix_zoo_Animal_ecclassid"));
    assert!(!test.table_exists("zoo_Dog"));
    assert!(!test.table_exists("zoo_Cat"));

    let session = test.session();
    let column = |class: &str, access: &str| session.column("Zoo", class, access).unwrap().name.clone();

    assert_eq!(column("Animal", "Legs"), "ps1");
    assert_eq!(column("Dog", "Legs"), "ps1");
    assert_eq!(column("Dog", "Name"), "ps2");
    assert_eq!(column("Cat", "Color"), "ps2");
    assert_eq!(column("Cat", "Name"), "ps3");

    for class in ["Animal", "Dog", "Cat"] {
        assert_eq!(session.table_name("Zoo", class), Some("zoo_Animal"));
    }

    let dog = session.class_map("Zoo", "Dog").unwrap();
    assert_eq!(dog.strategy.strategy, Strategy::SharedTable);
    assert!(dog.strategy.applies_to_subclasses);
    assert_eq!(
        dog.strategy.tph.map(|tph| tph.share_columns),
        Some(ShareColumnsMode::Yes)
    );

    assert!(test.warnings().is_empty());
    assert!(test.errors().is_empty());
}

#[test]
fn rows_of_every_class_share_the_table() {
    let mut test = MapTest::new();
    test.map(&[animals(None)]).unwrap();

    let session = test.session();
    let dog = session.class_id("Zoo", "Dog").unwrap();
    let cat = session.class_id("Zoo", "Cat").unwrap();

    test.execute(
        r#"INSERT INTO "zoo_Animal" ("Id", "ECClassId", "ps1", "ps2") VALUES (1, ?1, 4, 'Rex')"#,
        &[dog.0.into()],
    );
    test.execute(
        r#"INSERT INTO "zoo_Animal" ("Id", "ECClassId", "ps1", "ps2", "ps3") VALUES (2, ?1, 4, 'black', 'Tom')"#,
        &[cat.0.into()],
    );

    let cats = test.query_i64(
        r#"SELECT COUNT(*) FROM "zoo_Animal" WHERE "ECClassId" = ?1"#,
        &[cat.0.into()],
    );
    assert_eq!(cats, 1);
}

#[test]
fn full_shared_table_spills_into_overflow_table() {
    let mut test = MapTest::new();

    let schema = zoo()
        .class(
            ClassDef::entity("Animal")
                .attrs(|attrs| {
                    attrs.table_per_hierarchy().share_columns(Some(2));
                })
                .property(int("Legs")),
        )
        .class(
            ClassDef::entity("Dog")
                .base("Animal")
                .property(string("Name"))
                .property(string("Breed"))
                .property(int("Age")),
        );

    test.map(&[schema]).unwrap();

    assert_eq!(test.columns("zoo_Animal"), ["Id", "ECClassId", "ps1", "ps2"]);
    assert_eq!(
        test.columns("zoo_Animal_Overflow"),
        ["Id", "ECClassId", "os1", "os2"]
    );

    let session = test.session();
    let breed = session.column("Zoo", "Dog", "Breed").unwrap();
    assert_eq!(breed.name, "os1");

    let overflow = session.db.table(breed.id.table);
    assert_eq!(overflow.name, "zoo_Animal_Overflow");
    assert_eq!(overflow.ty, TableType::Overflow);

    let animal_table = session.db.find_table("zoo_Animal").unwrap();
    assert_eq!(overflow.parent, Some(animal_table));

    assert_eq!(session.column("Zoo", "Dog", "Age").unwrap().name, "os2");

    let dog = session.class_map("Zoo", "Dog").unwrap();
    assert_eq!(dog.tables, [animal_table, overflow.id]);

    // The base class never spilled over.
    let animal = session.class_map("Zoo", "Animal").unwrap();
    assert_eq!(animal.tables, [animal_table]);
}

#[test]
fn direct_subclasses_get_joined_tables() {
    let mut test = MapTest::new();

    let schema = zoo()
        .class(
            ClassDef::entity("Animal")
                .attrs(|attrs| {
                    attrs.table_per_hierarchy().joined_table_per_direct_subclass = true;
                })
                .property(string("Name")),
        )
        .class(ClassDef::entity("Dog").base("Animal").property(string("Breed")));

    test.map(&[schema]).unwrap();

    assert_eq!(test.columns("zoo_Animal"), ["Id", "ECClassId", "Name"]);
    assert_eq!(test.columns("zoo_Dog"), ["Id", "ECClassId", "Breed"]);

    let session = test.session();
    assert_eq!(session.table_name("Zoo", "Dog"), Some("zoo_Animal"));
    assert_eq!(session.column("Zoo", "Dog", "Name").unwrap().name, "Name");

    let breed = session.column("Zoo", "Dog", "Breed").unwrap();
    let joined = session.db.table(breed.id.table);
    assert_eq!(joined.name, "zoo_Dog");
    assert_eq!(joined.ty, TableType::Joined);
    assert_eq!(joined.parent, session.db.find_table("zoo_Animal"));

    let animal = session.class_map("Zoo", "Animal").unwrap();
    assert_eq!(
        animal.strategy.joined_table(),
        JoinedTableInfo::ParentOfJoinedTable
    );

    let dog = session.class_map("Zoo", "Dog").unwrap();
    assert_eq!(dog.strategy.joined_table(), JoinedTableInfo::JoinedTable);
    assert_eq!(dog.tables.len(), 2);
}

#[test]
fn diamond_inheritance_within_one_table() {
    let mut test = MapTest::new();

    // Dog comes first, so the walk from Animal reaches it before Named.
    let schema = zoo()
        .class(
            ClassDef::entity("Animal")
                .attrs(|attrs| {
                    attrs.table_per_hierarchy().share_columns(None);
                })
                .property(int("Legs")),
        )
        .class(
            ClassDef::entity("Dog")
                .base("Animal")
                .base("Named")
                .property(string("Breed")),
        )
        .class(ClassDef::entity("Named").base("Animal").property(string("Name")));

    test.map(&[schema]).unwrap();

    let session = test.session();
    let column = |class: &str, access: &str| session.column("Zoo", class, access).unwrap().name.clone();

    assert_eq!(column("Named", "Name"), "ps2");
    assert_eq!(column("Dog", "Legs"), "ps1");
    assert_eq!(column("Dog", "Name"), "ps2");
    assert_eq!(column("Dog", "Breed"), "ps3");
    assert_eq!(session.table_name("Zoo", "Dog"), Some("zoo_Animal"));

    assert!(test.errors().is_empty());
}

#[test]
fn two_shared_table_bases_conflict() {
    let mut test = MapTest::new();

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
    assert!(err.to_string().contains("Zoo:Hybrid"), "{err}");

    assert_eq!(test.errors().len(), 1);

    // The failed import left nothing behind.
    assert!(!test.table_exists("zoo_Animal"));
    assert!(!test.table_exists("zoo_Plant"));
}

#[test]
fn subclass_cannot_redeclare_the_strategy() {
    let mut test = MapTest::new();

    let schema = zoo()
        .class(ClassDef::entity("Animal").attrs(|attrs| {
            attrs.table_per_hierarchy();
        }))
        .class(ClassDef::entity("Dog").base("Animal").attrs(|attrs| {
            attrs.strategy(Strategy::OwnTable, false);
        }));

    let err = test.map(&[schema]).unwrap_err();
    assert!(err.is_structural_conflict(), "{err}");
}
