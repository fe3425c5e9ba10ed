use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use anyhow::Result;
use chrono::{DateTime, Utc};
use log::{debug, info};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::migration::bill::{classify_refund, compose_description, Bill, PeriodType};
use crate::migration::category::{CategoryCatalog, CategoryTally};
use crate::migration::script::Script;
use crate::migration::timestamp::{from_epoch_millis, Zone};
use crate::migration::{Kind, MigrationError};

/// One document of the `accounts` collection export.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    #[serde(rename = "type")]
    pub kind: Option<Kind>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub desc: Option<String>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub amount: Option<Decimal>,
    pub date: Option<String>,
    // Free-form in older exports, only "month" and "year" are meaningful.
    pub avg: Option<serde_json::Value>,
    pub create: Option<serde_json::Number>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub refund: Option<Decimal>,
    #[serde(rename = "close")]
    pub settled: Option<bool>,
    #[serde(rename = "chargeBack")]
    pub charged_back: Option<bool>,
}

/// Numbers and numeric strings become decimals; anything else (`""`, `false`, objects) counts as absent.
fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let parse = |text: &str| Decimal::from_str(text).or_else(|_| Decimal::from_scientific(text)).ok();

    let decimal = match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::Number(number)) => parse(&number.to_string()),
        Some(serde_json::Value::String(text)) => parse(text.trim()),
        Some(other) => {
            debug!("ignoring non-numeric amount {}", other);
            None
        },
    };

    Ok(decimal)
}

impl AccountRecord {
    /// The category pair, only when both `type` and `category` are present.
    pub fn category_pair(&self) -> Option<(Kind, &str)> {
        match (self.kind, self.category.as_deref()) {
            (Some(kind), Some(name)) => Some((kind, name)),
            _ => None,
        }
    }

    fn created_millis(&self) -> Option<i64> {
        let create = self.create.as_ref()?;
        create.as_i64().or_else(|| create.as_f64().map(|millis| millis as i64))
    }

    /// Applies every default so rendering never has to.
    pub fn normalize(&self, catalog: &CategoryCatalog) -> Bill {
        let kind = self.kind.unwrap_or_default();
        let category_name = self.category.clone().unwrap_or_default();
        let category_key = catalog.key_for(kind, &category_name).to_string();
        let (refund, refund_class) = classify_refund(self.refund, self.settled, self.charged_back);

        Bill {
            kind,
            category_name,
            category_key,
            amount: self.amount.unwrap_or(Decimal::ZERO),
            description: compose_description(self.sub_category.as_deref(), self.desc.as_deref()),
            date: self.date.clone().unwrap_or_default(),
            period_type: PeriodType::from_hint(self.avg.as_ref().and_then(|avg| avg.as_str())),
            is_consumed: true,
            refund,
            refund_class,
            created_at: self.created_millis().and_then(from_epoch_millis),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryReportRecord<'a> {
    #[serde(rename = "type")]
    pub kind: Kind,
    pub name: &'a str,
    pub key: &'a str,
    pub bills: usize,
    pub total: Decimal,
}

impl<'a> From<&CategoryTally<'a>> for CategoryReportRecord<'a> {
    fn from(tally: &CategoryTally<'a>) -> Self {
        CategoryReportRecord {
            kind: tally.category.kind(),
            name: tally.category.name(),
            key: tally.category.key(),
            bills: tally.bills,
            total: tally.total.normalize(),
        }
    }
}

/// Records discovered categories and their defaulted bills.
#[derive(Debug)]
pub struct Migration {
    pub catalog: CategoryCatalog,
    pub bills: Vec<Bill>,
}

impl Migration {
    pub fn prepare(records: &[AccountRecord]) -> Migration {
        let catalog = collect_categories(records);
        let bills = records.iter().map(|record| record.normalize(&catalog)).collect();

        Migration { catalog, bills }
    }

    pub fn script(&self, zone: Zone, generated_at: DateTime<Utc>) -> Script {
        Script::build(&self.catalog, &self.bills, zone, generated_at)
    }
}

pub fn load_records(path: &Path) -> Result<Vec<AccountRecord>, MigrationError> {
    let contents = fs::read_to_string(path).map_err(|source| MigrationError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&contents).map_err(|source| MigrationError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn collect_categories(records: &[AccountRecord]) -> CategoryCatalog {
    let mut catalog = CategoryCatalog::new();
    for record in records {
        match record.category_pair() {
            Some((kind, name)) => {
                catalog.discover(kind, name);
            },
            None => debug!("record without type or category, referencing the fallback category"),
        }
    }

    catalog
}

/// Replaces `path` with `contents` in one rename so a failed run never leaves a truncated file.
pub fn write_script(path: &Path, contents: &str) -> Result<(), MigrationError> {
    let write_error = |source| MigrationError::Write {
        path: path.to_path_buf(),
        source,
    };
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    // Created with the umask default, then aligned with the file being replaced.
    let mut builder = tempfile::Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let mut file = builder.tempfile_in(directory).map_err(write_error)?;
    if let Ok(existing) = fs::metadata(path) {
        file.as_file().set_permissions(existing.permissions()).map_err(write_error)?;
    }

    file.write_all(contents.as_bytes()).map_err(write_error)?;
    file.flush().map_err(write_error)?;
    file.persist(path).map_err(|err| write_error(err.error))?;

    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub categories: usize,
    pub bills: usize,
    pub batches: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Conversion finished")?;
        writeln!(f, "- categories: {}", self.categories)?;
        write!(f, "- bills: {} in {} batches", self.bills, self.batches)
    }
}

pub fn migrate(input: &Path, output: &Path, zone: Zone, generated_at: DateTime<Utc>) -> Result<(Migration, Summary)> {
    info!("reading {}", input.display());
    let records = load_records(input)?;
    info!("loaded {} records", records.len());

    let migration = Migration::prepare(&records);
    info!("discovered {} categories", migration.catalog.len());

    let script = migration.script(zone, generated_at);
    let summary = Summary {
        categories: migration.catalog.len(),
        bills: migration.bills.len(),
        batches: script.batches().count(),
    };

    info!("writing {}", output.display());
    write_script(output, &script.render())?;

    Ok((migration, summary))
}

pub fn export_report(migration: &Migration) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new().from_writer(std::io::stdout());
    for tally in migration.catalog.tally(&migration.bills) {
        let record: CategoryReportRecord = (&tally).into();
        csv_writer.serialize(record)?;
    }

    csv_writer.flush()?;

    Ok(())
}
