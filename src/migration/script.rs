use chrono::{DateTime, Utc};
use log::debug;

use super::bill::Bill;
use super::category::CategoryCatalog;
use super::statements::{BillBatch, Blank, CategoryInsert, Comment, Directive};
use super::timestamp::Zone;
use super::{RenderSql, Statement};

pub const BATCH_SIZE: usize = 1000;

const RULE: &str = "===========================================";

/// The complete migration, in output order.
#[derive(Debug)]
pub struct Script {
    zone: Zone,
    statements: Vec<Statement>,
}

impl Script {
    pub fn build(catalog: &CategoryCatalog, bills: &[Bill], zone: Zone, generated_at: DateTime<Utc>) -> Script {
        let mut script = Script {
            zone,
            statements: Vec::new(),
        };

        script.banner(&["Bill data converted from accounts.json", format!("Generated at: {}", zone.format(generated_at)).as_str()]);
        script.push(Blank);
        script.push(Directive::CharacterSet);
        script.push(Directive::ForeignKeyChecks(false));
        script.push(Blank);

        script.banner(&["Categories"]);
        script.push(Blank);
        for (index, category) in catalog.sorted().into_iter().enumerate() {
            script.push(CategoryInsert {
                position: index + 1,
                category: category.clone(),
            });
        }
        script.push(Blank);

        script.banner(&["Bills"]);
        script.push(Blank);
        for (index, rows) in bills.chunks(BATCH_SIZE).enumerate() {
            debug!("batch {} holds {} bills", index + 1, rows.len());
            script.push(BillBatch {
                number: index + 1,
                rows: rows.to_vec(),
            });
            script.push(Blank);
        }

        script.push(Directive::ForeignKeyChecks(true));
        script.push(Blank);

        script
    }

    fn push(&mut self, statement: impl Into<Statement>) {
        self.statements.push(statement.into());
    }

    fn banner(&mut self, lines: &[&str]) {
        self.push(Comment::new(RULE));
        for line in lines {
            self.push(Comment::new(*line));
        }
        self.push(Comment::new(RULE));
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn batches(&self) -> impl Iterator<Item = &BillBatch> {
        self.statements.iter().filter_map(|statement| match statement {
            Statement::BillBatch(batch) => Some(batch),
            _ => None,
        })
    }

    pub fn category_inserts(&self) -> impl Iterator<Item = &CategoryInsert> {
        self.statements.iter().filter_map(|statement| match statement {
            Statement::CategoryInsert(insert) => Some(insert),
            _ => None,
        })
    }

    /// Statements joined by newlines; the trailing blank statement leaves the text newline-terminated.
    pub fn render(&self) -> String {
        self.statements
            .iter()
            .map(|statement| statement.render(self.zone))
            .collect::<Vec<String>>()
            .join("\n")
    }
}
