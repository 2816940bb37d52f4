use classmap::app::{ClassDef, SchemaDef};
use pretty_assertions::assert_eq;
use tests::{schemas::*, MapTest};

fn animals() -> SchemaDef {
    zoo()
        .class(
            ClassDef::entity("Animal")
                .attrs(|attrs| {
                    attrs.table_per_hierarchy().share_columns(None);
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

fn people() -> SchemaDef {
    zoo().class(ClassDef::entity("Person").property(string("Name")))
}

#[test]
fn reimporting_the_same_schema_changes_nothing() {
    let mut test = MapTest::new();

    test.map(&[animals()]).unwrap();
    assert!(!test.take_ddl().is_empty());

    let before = test.query_i64(r#"SELECT COUNT(*) FROM "ec_PropertyMap""#, &[]);

    test.map(&[animals()]).unwrap();
    assert_eq!(test.take_ddl(), Vec::<String>::new());

    let after = test.query_i64(r#"SELECT COUNT(*) FROM "ec_PropertyMap""#, &[]);
    assert_eq!(before, after);
}

#[test]
fn new_subclass_reuses_free_shared_columns() {
    let mut test = MapTest::new();
    test.map(&[animals()]).unwrap();
    test.take_ddl();

    let upgraded = animals()
        .version(1, 0, 1)
        .class(ClassDef::entity("Bird").base("Animal").property(int("Wings")));

    test.map(&[upgraded]).unwrap();

    // ps2 is only used by Dog and Cat, which are siblings of Bird.
    assert_eq!(test.take_ddl(), Vec::<String>::new());

    let session = test.session();
    assert_eq!(session.column("Zoo", "Bird", "Wings").unwrap().name, "ps2");
    assert_eq!(session.column("Zoo", "Bird", "Legs").unwrap().name, "ps1");
}

#[test]
fn new_property_adds_a_column() {
    let mut test = MapTest::new();
    test.map(&[people()]).unwrap();
    test.take_ddl();

    let upgraded = zoo().version(1, 0, 1).class(
        ClassDef::entity("Person")
            .property(string("Name"))
            .property(int("Age")),
    );

    test.map(&[upgraded]).unwrap();

    let ddl = test.take_ddl();
    assert_eq!(ddl.len(), 1, "{ddl:?}");
    assert!(
        ddl[0].starts_with(r#"ALTER TABLE "zoo_Person" ADD COLUMN "Age""#),
        "{ddl:?}"
    );
    assert_eq!(test.columns("zoo_Person"), ["Id", "Name", "Age"]);
}

#[test]
fn property_moved_to_base_class_carries_its_data() {
    let mut test = MapTest::new();
    test.map(&[animals()]).unwrap();

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

    let mut upgraded = animals().version(1, 0, 1);
    if let Some(animal) = upgraded.class_mut("Animal") {
        animal.properties.push(string("Name"));
    }

    test.map(&[upgraded]).unwrap();

    let session = test.session();
    assert_eq!(session.column("Zoo", "Animal", "Name").unwrap().name, "ps3");
    assert_eq!(session.column("Zoo", "Dog", "Name").unwrap().name, "ps3");
    assert_eq!(session.column("Zoo", "Cat", "Name").unwrap().name, "ps3");
    assert_eq!(session.column("Zoo", "Cat", "Color").unwrap().name, "ps2");

    let value = |test: &mut MapTest, column: &str, id: i64| {
        test.query_string(
            &format!(r#"SELECT "{column}" FROM "zoo_Animal" WHERE "Id" = ?1"#),
            &[id.into()],
        )
    };

    assert_eq!(value(&mut test, "ps3", 1).as_deref(), Some("Rex"));
    assert_eq!(value(&mut test, "ps2", 1), None);
    assert_eq!(value(&mut test, "ps2", 2).as_deref(), Some("black"));
    assert_eq!(value(&mut test, "ps3", 2).as_deref(), Some("Tom"));
}

#[test]
fn property_moved_out_of_a_joined_table_carries_its_data() {
    let joined = |animal_has_name: bool| {
        let mut animal = ClassDef::entity("Animal")
            .attrs(|attrs| {
                attrs.table_per_hierarchy().share_columns(None).joined_table_per_direct_subclass = true;
            })
            .property(int("Legs"));
        if animal_has_name {
            animal = animal.property(string("Name"));
        }

        zoo()
            .class(animal)
            .class(ClassDef::entity("Dog").base("Animal").property(string("Name")))
            .class(ClassDef::entity("Cat").base("Animal").property(string("Color")))
    };

    let mut test = MapTest::new();
    test.map(&[joined(false)]).unwrap();

    assert_eq!(test.columns("zoo_Dog"), ["Id", "ECClassId", "js1"]);

    let session = test.session();
    let dog = session.class_id("Zoo", "Dog").unwrap();
    let cat = session.class_id("Zoo", "Cat").unwrap();

    test.execute(
        r#"INSERT INTO "zoo_Animal" ("Id", "ECClassId", "ps1") VALUES (1, ?1, 4)"#,
        &[dog.0.into()],
    );
    test.execute(
        r#"INSERT INTO "zoo_Dog" ("Id", "ECClassId", "js1") VALUES (1, ?1, 'Rex')"#,
        &[dog.0.into()],
    );
    test.execute(
        r#"INSERT INTO "zoo_Animal" ("Id", "ECClassId", "ps1") VALUES (2, ?1, 4)"#,
        &[cat.0.into()],
    );
    test.execute(
        r#"INSERT INTO "zoo_Cat" ("Id", "ECClassId", "js1") VALUES (2, ?1, 'black')"#,
        &[cat.0.into()],
    );

    test.map(&[joined(true).version(1, 0, 1)]).unwrap();

    let session = test.session();
    assert_eq!(session.column("Zoo", "Dog", "Name").unwrap().name, "ps2");
    assert_eq!(session.table_name("Zoo", "Dog"), Some("zoo_Animal"));

    // Nothing of Dog is left in its joined table.
    assert!(!test.table_exists("zoo_Dog"));

    let name = |test: &mut MapTest, id: i64| {
        test.query_string(r#"SELECT "ps2" FROM "zoo_Animal" WHERE "Id" = ?1"#, &[id.into()])
    };
    assert_eq!(name(&mut test, 1).as_deref(), Some("Rex"));
    assert_eq!(name(&mut test, 2), None);

    let color = test.query_string(r#"SELECT "js1" FROM "zoo_Cat" WHERE "Id" = 2"#, &[]);
    assert_eq!(color.as_deref(), Some("black"));
}

#[test]
fn properties_added_to_base_trade_columns_in_one_step() {
    let mut test = MapTest::new();

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
                .property(string("Name"))
                .property(string("Breed")),
        );

    test.map(&[schema.clone()]).unwrap();

    let dog = test.session().class_id("Zoo", "Dog").unwrap();
    test.execute(
        r#"INSERT INTO "zoo_Animal" ("Id", "ECClassId", "ps1", "ps2", "ps3") VALUES (1, ?1, 4, 'Rex', 'Beagle')"#,
        &[dog.0.into()],
    );

    let mut upgraded = schema.version(1, 0, 1);
    if let Some(animal) = upgraded.class_mut("Animal") {
        animal.properties.push(string("Breed"));
        animal.properties.push(string("Name"));
    }

    test.map(&[upgraded]).unwrap();

    let session = test.session();
    assert_eq!(session.column("Zoo", "Animal", "Breed").unwrap().name, "ps2");
    assert_eq!(session.column("Zoo", "Animal", "Name").unwrap().name, "ps3");
    assert_eq!(session.column("Zoo", "Dog", "Breed").unwrap().name, "ps2");
    assert_eq!(session.column("Zoo", "Dog", "Name").unwrap().name, "ps3");

    // Copying one column after the other would lose a value.
    let value = |test: &mut MapTest, column: &str| {
        test.query_string(&format!(r#"SELECT "{column}" FROM "zoo_Animal" WHERE "Id" = 1"#), &[])
    };
    assert_eq!(value(&mut test, "ps2").as_deref(), Some("Beagle"));
    assert_eq!(value(&mut test, "ps3").as_deref(), Some("Rex"));
    assert_eq!(test.columns("zoo_Animal"), ["Id", "ECClassId", "ps1", "ps2", "ps3"]);
}

#[test]
fn added_base_class_moves_colliding_columns() {
    let pets = |dog_is_pet: bool| {
        let mut dog = ClassDef::entity("Dog").base("Animal");
        if dog_is_pet {
            dog = dog.base("Pet");
        }

        zoo()
            .class(
                ClassDef::entity("Animal")
                    .attrs(|attrs| {
                        attrs.table_per_hierarchy().share_columns(None);
                    })
                    .property(int("Legs")),
            )
            .class(ClassDef::entity("Pet").base("Animal").property(string("Tag")))
            .class(dog.property(string("Name")))
    };

    let mut test = MapTest::new();
    test.map(&[pets(false)]).unwrap();

    let session = test.session();
    assert_eq!(session.column("Zoo", "Pet", "Tag").unwrap().name, "ps2");
    assert_eq!(session.column("Zoo", "Dog", "Name").unwrap().name, "ps2");

    let pet = session.class_id("Zoo", "Pet").unwrap();
    let dog = session.class_id("Zoo", "Dog").unwrap();

    test.execute(
        r#"INSERT INTO "zoo_Animal" ("Id", "ECClassId", "ps1", "ps2") VALUES (1, ?1, 4, 'Rex')"#,
        &[dog.0.into()],
    );
    test.execute(
        r#"INSERT INTO "zoo_Animal" ("Id", "ECClassId", "ps1", "ps2") VALUES (2, ?1, 2, 'T-1')"#,
        &[pet.0.into()],
    );

    test.map(&[pets(true).version(1, 0, 1)]).unwrap();

    let session = test.session();
    assert_eq!(session.column("Zoo", "Dog", "Legs").unwrap().name, "ps1");
    assert_eq!(session.column("Zoo", "Dog", "Tag").unwrap().name, "ps2");
    assert_eq!(session.column("Zoo", "Dog", "Name").unwrap().name, "ps3");
    assert_eq!(session.column("Zoo", "Pet", "Tag").unwrap().name, "ps2");

    let value = |test: &mut MapTest, column: &str, id: i64| {
        test.query_string(
            &format!(r#"SELECT "{column}" FROM "zoo_Animal" WHERE "Id" = ?1"#),
            &[id.into()],
        )
    };

    assert_eq!(value(&mut test, "ps3", 1).as_deref(), Some("Rex"));
    assert_eq!(value(&mut test, "ps2", 1), None);
    assert_eq!(value(&mut test, "ps2", 2).as_deref(), Some("T-1"));
}

#[test]
fn added_base_class_overriding_a_property_keeps_its_column() {
    let named = |dog_is_named: bool| {
        let mut schema = animals();
        if dog_is_named {
            schema = schema.class(ClassDef::entity("Named").base("Animal").property(string("Name")));
            if let Some(dog) = schema.class_mut("Dog") {
                dog.bases.push("Named".into());
            }
        }
        schema
    };

    let mut test = MapTest::new();
    test.map(&[named(false)]).unwrap();

    let dog = test.session().class_id("Zoo", "Dog").unwrap();
    test.execute(
        r#"INSERT INTO "zoo_Animal" ("Id", "ECClassId", "ps1", "ps2") VALUES (1, ?1, 4, 'Rex')"#,
        &[dog.0.into()],
    );

    test.map(&[named(true).version(1, 0, 1)]).unwrap();

    // Dog takes Name from the second base, which reuses the freed column.
    let session = test.session();
    assert_eq!(session.column("Zoo", "Named", "Name").unwrap().name, "ps2");
    assert_eq!(session.column("Zoo", "Dog", "Name").unwrap().name, "ps2");
    assert_eq!(session.column("Zoo", "Dog", "Legs").unwrap().name, "ps1");
    assert_eq!(test.columns("zoo_Animal"), ["Id", "ECClassId", "ps1", "ps2", "ps3"]);

    let name = test.query_string(r#"SELECT "ps2" FROM "zoo_Animal" WHERE "Id" = 1"#, &[]);
    assert_eq!(name.as_deref(), Some("Rex"));
}

#[test]
fn property_added_to_base_reuses_the_dedicated_column_of_a_subclass() {
    let animals = |animal_has_name: bool| {
        let mut animal = ClassDef::entity("Animal")
            .attrs(|attrs| {
                attrs.table_per_hierarchy();
            })
            .property(int("Legs"));
        if animal_has_name {
            animal = animal.property(string("Name"));
        }

        zoo()
            .class(animal)
            .class(ClassDef::entity("Dog").base("Animal").property(string("Name")))
    };

    let mut test = MapTest::new();
    test.map(&[animals(false)]).unwrap();
    assert_eq!(test.columns("zoo_Animal"), ["Id", "ECClassId", "Legs", "Name"]);

    let dog = test.session().class_id("Zoo", "Dog").unwrap();
    test.execute(
        r#"INSERT INTO "zoo_Animal" ("Id", "ECClassId", "Legs", "Name") VALUES (1, ?1, 4, 'Rex')"#,
        &[dog.0.into()],
    );

    test.map(&[animals(true).version(1, 0, 1)]).unwrap();

    let session = test.session();
    assert_eq!(session.column("Zoo", "Animal", "Name").unwrap().name, "Name");
    assert_eq!(session.column("Zoo", "Dog", "Name").unwrap().name, "Name");
    assert_eq!(test.columns("zoo_Animal"), ["Id", "ECClassId", "Legs", "Name"]);

    let name = test.query_string(r#"SELECT "Name" FROM "zoo_Animal" WHERE "Id" = 1"#, &[]);
    assert_eq!(name.as_deref(), Some("Rex"));
}

#[test]
fn schema_version_cannot_go_down() {
    let mut test = MapTest::new();
    test.map(&[people().version(1, 0, 2)]).unwrap();

    let err = test.map(&[people().version(1, 0, 1)]).unwrap_err();
    assert!(err.is_structural_conflict(), "{err}");
    assert!(err.to_string().contains("downgraded"), "{err}");
}

#[test]
fn schema_alias_cannot_change() {
    let mut test = MapTest::new();
    test.map(&[people()]).unwrap();

    let renamed = SchemaDef::new("Zoo", "z2").class(ClassDef::entity("Person").property(string("Name")));

    let err = test.map(&[renamed]).unwrap_err();
    assert!(err.is_structural_conflict(), "{err}");
}

#[test]
fn classes_cannot_be_deleted() {
    let mut test = MapTest::new();
    test.map(&[animals()]).unwrap();

    let mut upgraded = animals().version(1, 0, 1);
    upgraded.classes.retain(|class| class.name != "Cat");

    let err = test.map(&[upgraded]).unwrap_err();
    assert!(err.is_structural_conflict(), "{err}");
    assert!(err.to_string().contains("cannot be deleted"), "{err}");

    // The failed import was rolled back.
    let session = test.session();
    assert!(session.class_map("Zoo", "Cat").is_some());
}

#[test]
fn persisted_strategy_cannot_change() {
    let mut test = MapTest::new();
    test.map(&[people()]).unwrap();

    let upgraded = zoo().version(1, 0, 1).class(
        ClassDef::entity("Person")
            .attrs(|attrs| {
                attrs.table_per_hierarchy();
            })
            .property(string("Name")),
    );

    let err = test.map(&[upgraded]).unwrap_err();
    assert!(err.is_structural_conflict(), "{err}");
    assert!(err.to_string().contains("cannot change"), "{err}");
}

#[test]
fn property_type_cannot_change() {
    let mut test = MapTest::new();
    test.map(&[people()]).unwrap();

    let upgraded = zoo()
        .version(1, 0, 1)
        .class(ClassDef::entity("Person").property(double("Name")));

    let err = test.map(&[upgraded]).unwrap_err();
    assert!(err.is_structural_conflict(), "{err}");
    assert!(err.to_string().contains("Zoo:Person.Name"), "{err}");
}
