use std::fmt;
use std::path::PathBuf;

use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod bill;
pub mod category;
pub mod script;
pub mod statements;
pub mod timestamp;


use statements::{BillBatch, Blank, CategoryInsert, Comment, Directive};
use timestamp::Zone;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed records in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Direction of a transaction. The declaration order is also the order in
/// which categories are emitted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    #[default]
    Expense,
    Income,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Expense => "expense",
            Kind::Income => "income",
        }
    }

    /// Key referenced by bills whose category was never discovered.
    pub fn fallback_key(&self) -> &'static str {
        match self {
            Kind::Expense => "other",
            Kind::Income => "income_other",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[enum_dispatch]
pub trait RenderSql {
    /// Renders the statement as one or more lines of SQL, without a trailing newline.
    fn render(&self, zone: Zone) -> String;
}

#[enum_dispatch(RenderSql)]
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Comment,
    Blank,
    Directive,
    CategoryInsert,
    BillBatch,
}
