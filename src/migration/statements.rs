use rust_decimal::Decimal;

use super::bill::Bill;
use super::category::Category;
use super::timestamp::Zone;
use super::{Kind, RenderSql};

const NULL: &str = "NULL";
const NOW: &str = "NOW()";

/// Quotes text for a MySQL string literal; `None` renders as `NULL`.
pub fn sql_string(value: Option<&str>) -> String {
    match value {
        Some(value) => format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''")),
        None => NULL.to_string(),
    }
}

fn sql_decimal(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Subquery resolving a category id by key and kind at load time.
pub fn category_reference(key: &str, kind: Kind) -> String {
    format!(
        "(SELECT id FROM categories WHERE `key` = {} AND `type` = {} LIMIT 1)",
        sql_string(Some(key)),
        sql_string(Some(kind.as_str()))
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    text: String,
}

impl Comment {
    pub fn new(text: impl Into<String>) -> Comment {
        Comment { text: text.into() }
    }
}

impl RenderSql for Comment {
    fn render(&self, _zone: Zone) -> String {
        format!("-- {}", self.text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Blank;

impl RenderSql for Blank {
    fn render(&self, _zone: Zone) -> String {
        String::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    CharacterSet,
    ForeignKeyChecks(bool),
}

impl RenderSql for Directive {
    fn render(&self, _zone: Zone) -> String {
        match self {
            Directive::CharacterSet => "SET NAMES utf8mb4;".to_string(),
            Directive::ForeignKeyChecks(enabled) => format!("SET FOREIGN_KEY_CHECKS = {};", u8::from(*enabled)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryInsert {
    pub position: usize,
    pub category: Category,
}

impl RenderSql for CategoryInsert {
    fn render(&self, _zone: Zone) -> String {
        format!(
            "INSERT IGNORE INTO `categories` (`name`, `key`, `type`, `created_at`) VALUES ({}, {}, {}, NOW()); -- #{}",
            sql_string(Some(self.category.name().as_str())),
            sql_string(Some(self.category.key().as_str())),
            sql_string(Some(self.category.kind().as_str())),
            self.position
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BillBatch {
    pub number: usize,
    pub rows: Vec<Bill>,
}

impl BillBatch {
    fn render_row(bill: &Bill, zone: Zone) -> String {
        let created_at = match bill.created_at {
            Some(instant) => sql_string(Some(zone.format(instant).as_str())),
            None => NOW.to_string(),
        };

        format!(
            "({}, {}, {}, {}, {}, {}, {}, {}, {}, {})",
            sql_string(Some(bill.kind.as_str())),
            category_reference(&bill.category_key, bill.kind),
            sql_decimal(bill.amount),
            sql_string(Some(bill.description.as_str())),
            sql_string(Some(bill.date.as_str())),
            sql_string(Some(bill.period_type.as_str())),
            u8::from(bill.is_consumed),
            sql_decimal(bill.refund),
            bill.refund_class.code(),
            created_at
        )
    }
}

impl RenderSql for BillBatch {
    fn render(&self, zone: Zone) -> String {
        let rows: Vec<String> = self.rows.iter().map(|bill| BillBatch::render_row(bill, zone)).collect();

        [
            format!("-- Batch {} ({} rows)", self.number, self.rows.len()),
            "INSERT INTO `bills` (".to_string(),
            "  `type`, `category_id`, `amount`, `desc`, `date`, `period_type`,".to_string(),
            "  `is_consumed`, `refund`, `refund_type`, `created_at`".to_string(),
            ") VALUES".to_string(),
            format!("{};", rows.join(",\n")),
        ]
        .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_sql_string_escapes_quotes_and_backslashes() {
        assert_eq!(sql_string(Some("O'Brien\\path")), "'O''Brien\\\\path'");
        assert_eq!(sql_string(Some("")), "''");
    }

    #[test]
    fn test_sql_string_none_is_null() {
        assert_eq!(sql_string(None), "NULL");
    }

    #[test]
    fn test_category_reference() {
        assert_eq!(
            category_reference("income_salary", Kind::Income),
            "(SELECT id FROM categories WHERE `key` = 'income_salary' AND `type` = 'income' LIMIT 1)"
        );
    }

    #[test]
    fn test_directives() {
        assert_eq!(Directive::CharacterSet.render(Zone::utc()), "SET NAMES utf8mb4;");
        assert_eq!(Directive::ForeignKeyChecks(false).render(Zone::utc()), "SET FOREIGN_KEY_CHECKS = 0;");
        assert_eq!(Directive::ForeignKeyChecks(true).render(Zone::utc()), "SET FOREIGN_KEY_CHECKS = 1;");
    }

    #[test]
    fn test_category_insert() {
        let insert = CategoryInsert {
            position: 3,
            category: Category::new(Kind::Expense, "预/充值"),
        };

        assert_eq!(
            insert.render(Zone::utc()),
            "INSERT IGNORE INTO `categories` (`name`, `key`, `type`, `created_at`) VALUES ('预/充值', 'prepaid', 'expense', NOW()); -- #3"
        );
    }
}
