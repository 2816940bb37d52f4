use super::{
    sort::{self, Step},
    Move,
};
use crate::{Error, Result, Storage};

use classmap_core::schema::{
    app::ClassId,
    db::{self, Table},
};
use classmap_sql::{
    stmt::{Expr, Ident, InsertSelect, Predicate, Select, Update},
    Serializer, Statement,
};

use indexmap::IndexMap;

/// Applies the moves of every class. Every statement copying data must
/// touch exactly the rows the class has in the source table.
///
/// All moves are ordered before the first statement runs, so a cycle that
/// cannot be applied fails the import with the data untouched.
pub(crate) fn migrate(
    storage: &mut dyn Storage,
    db: &db::Schema,
    serializer: &Serializer,
    moves: Vec<Move>,
) -> Result<()> {
    if moves.is_empty() {
        return Ok(());
    }

    let mut by_class: IndexMap<ClassId, Vec<Move>> = IndexMap::new();
    for m in moves {
        by_class.entry(m.class).or_default().push(m);
    }

    let plan: Vec<(ClassId, Vec<Step>)> = by_class
        .iter()
        .map(|(class, moves)| (*class, sort::sort(moves)))
        .collect();

    for (class, steps) in &plan {
        for step in steps {
            if let Step::Cycle(cycle) = step {
                check_cycle(db, *class, cycle)?;
            }
        }
    }

    let mut cx = Migrate {
        storage,
        db,
        serializer,
    };

    for (class, steps) in plan {
        let count = steps.len();

        for step in steps {
            match step {
                Step::Move(m) if m.from.table == m.to.table => cx.move_in_table(&m)?,
                Step::Move(m) => cx.move_across_tables(&m)?,
                Step::Cycle(cycle) => cx.rotate(class, &cycle)?,
            }
        }

        log::info!("migrated property data; class={class:?} steps={count}");
    }

    Ok(())
}

/// A cycle can only be applied as one `UPDATE`, which needs every column
/// of it in one table.
fn check_cycle(db: &db::Schema, class: ClassId, cycle: &[Move]) -> Result<()> {
    let Some(first) = cycle.first() else {
        return Ok(());
    };

    let table = first.from.table;
    if cycle.iter().all(|m| m.from.table == table && m.to.table == table) {
        return Ok(());
    }

    let columns: Vec<String> = cycle
        .iter()
        .map(|m| format!("`{}.{}`", db.table(m.from.table).name, db.column(m.from).name))
        .collect();

    Err(Error::remap_integrity(format!(
        "columns {} of class {class:?} swap data across tables",
        columns.join(", ")
    )))
}

struct Migrate<'a> {
    storage: &'a mut dyn Storage,
    db: &'a db::Schema,
    serializer: &'a Serializer,
}

impl Migrate<'_> {
    fn move_in_table(&mut self, m: &Move) -> Result<()> {
        let db = self.db;
        let table = db.table(m.from.table);
        let from = &db.column(m.from).name;
        let to = &db.column(m.to).name;
        let filter = class_filter(table, m.class);

        let expected = self.count(&table.name, filter.clone())?;

        let copy = with_filter(Update::new(&table.name).set(to, Expr::Column(Ident::from(from))), filter.clone());
        let affected = self.execute(copy.into())?;
        self.check(m, expected, affected)?;

        let clear = with_filter(Update::new(&table.name).set(from, Expr::Null), filter);
        self.execute(clear.into())?;
        Ok(())
    }

    /// Copies through a subquery correlated on the instance id, creating
    /// the rows the target table is missing first.
    fn move_across_tables(&mut self, m: &Move) -> Result<()> {
        let db = self.db;
        let source = db.table(m.from.table);
        let target = db.table(m.to.table);
        let source_id = instance_id(source)?;
        let target_id = instance_id(target)?;
        let filter = class_filter(source, m.class);

        let expected = self.count(&source.name, filter.clone())?;

        if let (Some(source_class), Some(target_class)) = (physical_class_id(source), physical_class_id(target)) {
            let missing = Predicate::NotInSelect(
                Ident::from(source_id),
                Box::new(Select::column(target_id, &target.name)),
            );

            let rows = Select::new(vec![Ident::from(source_id), Ident::from(source_class)], &source.name)
                .filter(match filter.clone() {
                    Some(filter) => filter.and(missing),
                    None => missing,
                });

            let insert = InsertSelect {
                table: Ident::from(&target.name),
                columns: vec![Ident::from(target_id), Ident::from(target_class)],
                source: rows,
            };

            let created = self.execute(insert.into())?;
            if created > 0 {
                log::debug!("created rows for moved data; table={} rows={created}", target.name);
            }
        }

        let value = Select::column(&db.column(m.from).name, &source.name).filter(Predicate::ColumnsEq(
            (Ident::from(&source.name), Ident::from(source_id)),
            (Ident::from(&target.name), Ident::from(target_id)),
        ));

        let mut rows = Select::column(source_id, &source.name);
        if let Some(filter) = filter.clone() {
            rows = rows.filter(filter);
        }

        let copy = Update::new(&target.name)
            .set(&db.column(m.to).name, Expr::Subquery(Box::new(value)))
            .filter(Predicate::InSelect(Ident::from(target_id), Box::new(rows)));

        let affected = self.execute(copy.into())?;
        self.check(m, expected, affected)?;

        let clear = with_filter(
            Update::new(&source.name).set(&db.column(m.from).name, Expr::Null),
            filter,
        );
        self.execute(clear.into())?;
        Ok(())
    }

    /// Columns that trade places are assigned in one statement, which reads
    /// every value before writing any.
    fn rotate(&mut self, class: ClassId, cycle: &[Move]) -> Result<()> {
        let db = self.db;
        let Some(first) = cycle.first() else {
            return Ok(());
        };

        let table_id = first.from.table;
        let table = db.table(table_id);
        let filter = class_filter(table, class);
        let expected = self.count(&table.name, filter.clone())?;

        let mut swap = Update::new(&table.name);
        for m in cycle {
            swap = swap.set(
                &db.column(m.to).name,
                Expr::Column(Ident::from(&db.column(m.from).name)),
            );
        }

        let affected = self.execute(with_filter(swap, filter).into())?;
        self.check(first, expected, affected)
    }

    fn count(&mut self, table: &str, filter: Option<Predicate>) -> Result<i64> {
        let sql = self.serializer.serialize(&Statement::count(table, filter));
        self.storage.query_i64(&sql, &[])
    }

    fn execute(&mut self, stmt: Statement) -> Result<usize> {
        let sql = self.serializer.serialize(&stmt);
        log::debug!("{sql}");
        self.storage.execute(&sql, &[])
    }

    fn check(&self, m: &Move, expected: i64, affected: usize) -> Result<()> {
        let db = self.db;
        if i64::try_from(affected)? == expected {
            return Ok(());
        }

        Err(Error::remap_integrity(format!(
            "moving `{}` of class {:?} from `{}.{}` to `{}.{}` affected {affected} rows, expected {expected}",
            m.access,
            m.class,
            db.table(m.from.table).name,
            db.column(m.from).name,
            db.table(m.to.table).name,
            db.column(m.to).name,
        )))
    }
}

/// Rows of `class` only, when the table tells classes apart.
fn class_filter(table: &Table, class: ClassId) -> Option<Predicate> {
    let column = physical_class_id(table)?;
    Some(Predicate::Eq(Ident::from(column), class.0))
}

fn physical_class_id(table: &Table) -> Option<&str> {
    table
        .class_id_column()
        .filter(|column| column.is_physical())
        .map(|column| column.name.as_str())
}

fn instance_id(table: &Table) -> Result<&str> {
    table
        .instance_id_column()
        .map(|column| column.name.as_str())
        .ok_or_else(|| classmap_core::err!("table `{}` has no instance id column", table.name))
}

fn with_filter(update: Update, filter: Option<Predicate>) -> Update {
    match filter {
        Some(filter) => update.filter(filter),
        None => update,
    }
}
