use super::Verify;

use classmap_core::schema::db::{ColumnKind, ColumnType, Table, TableType};

impl Verify<'_> {
    pub(super) fn verify_table_structure(&mut self, table: &Table) {
        if table.is_virtual() {
            return;
        }

        let instance_ids: Vec<_> = table.columns_of_kind(ColumnKind::INSTANCE_ID).collect();
        let class_ids = table.columns_of_kind(ColumnKind::CLASS_ID).count();

        if instance_ids.len() != 1 {
            self.finding(format!(
                "table `{}` has {} instance id columns, expected one",
                table.name,
                instance_ids.len()
            ));
        }

        if class_ids != 1 {
            self.finding(format!(
                "table `{}` has {class_ids} class id columns, expected one",
                table.name
            ));
        }

        // The storage engine owns the layout of existing tables.
        if !table.is_managed() {
            return;
        }

        if let [instance_id] = instance_ids[..] {
            if table.primary_key != Some(instance_id.id) {
                self.finding(format!(
                    "the primary key of table `{}` is not its instance id column `{}`",
                    table.name, instance_id.name
                ));
            }

            if instance_id.ty != ColumnType::Integer {
                self.finding(format!(
                    "instance id column `{}.{}` is not an integer column",
                    table.name, instance_id.name
                ));
            }
        }

        self.verify_table_links(table);
    }

    /// Primary tables stand alone. A joined table hangs off a primary table
    /// and has at most its overflow table below it. An overflow table is
    /// always a leaf.
    fn verify_table_links(&mut self, table: &Table) {
        let session = self.session;
        let db = &session.db;
        let parent = table.parent.map(|parent| db.table(parent));
        let children: Vec<_> = db
            .children(table.id)
            .into_iter()
            .map(|child| db.table(child))
            .collect();

        let problem = match table.ty {
            TableType::Primary if parent.is_some() => Some("a primary table has a parent table"),
            TableType::Joined => match parent {
                None => Some("a joined table has no parent table"),
                Some(parent) if parent.ty != TableType::Primary => {
                    Some("a joined table hangs off a table that is not a primary table")
                }
                Some(_) if children.iter().any(|child| child.ty != TableType::Overflow) => {
                    Some("a joined table has a child that is not its overflow table")
                }
                Some(_) if children.len() > 1 => Some("a joined table has more than one overflow table"),
                Some(_) => None,
            },
            TableType::Overflow if parent.is_none() => Some("an overflow table has no parent table"),
            TableType::Overflow if !children.is_empty() => Some("an overflow table has child tables"),
            _ => None,
        };

        if let Some(problem) = problem {
            self.finding(format!("table `{}`: {problem}", table.name));
        }
    }
}
