use std::collections::HashMap;

use getset::{CopyGetters, Getters};
use rust_decimal::Decimal;

use super::bill::Bill;
use super::Kind;

const INCOME_PREFIX: &str = "income_";

const EXPENSE_KEYS: &[(&str, &str)] = &[
    ("餐饮", "food"),
    ("购物", "shopping"),
    ("交通", "transport"),
    ("预/充值", "prepaid"),
    ("娱乐", "entertainment"),
    ("医疗", "medical"),
    ("教育", "education"),
    ("住房", "housing"),
    ("其他", "other"),
    ("旅游", "travel"),
    ("生活", "living"),
];

const INCOME_KEYS: &[(&str, &str)] = &[
    ("工资", "salary"),
    ("奖金", "bonus"),
    ("红包", "red_packet"),
    ("转账", "transfer"),
    ("返现", "cashback"),
    ("退款", "refund"),
    ("中奖", "lottery"),
    ("代付", "charge_back"),
    ("其他", "other"),
];

fn known_keys(kind: Kind) -> &'static [(&'static str, &'static str)] {
    match kind {
        Kind::Expense => EXPENSE_KEYS,
        Kind::Income => INCOME_KEYS,
    }
}

/// Derives the short ASCII key for a category. Known names come from the
/// curated tables; anything else is lowercased with `/` and spaces turned
/// into underscores. Income keys always carry the `income_` prefix.
pub fn derive_key(name: &str, kind: Kind) -> String {
    let base = known_keys(kind)
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, key)| (*key).to_string())
        .unwrap_or_else(|| transliterate(name));

    match kind {
        Kind::Expense => base,
        Kind::Income => format!("{INCOME_PREFIX}{base}"),
    }
}

fn transliterate(name: &str) -> String {
    name.to_lowercase().replace(['/', ' '], "_")
}

#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters)]
pub struct Category {
    #[getset(get_copy = "pub")]
    kind: Kind,
    #[getset(get = "pub")]
    name: String,
    #[getset(get = "pub")]
    key: String,
}

impl Category {
    pub fn new(kind: Kind, name: &str) -> Category {
        Category {
            kind,
            name: name.to_string(),
            key: derive_key(name, kind),
        }
    }
}

/// Per-category totals over the rendered bills.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTally<'a> {
    pub category: &'a Category,
    pub bills: usize,
    pub total: Decimal,
}

/// Distinct (kind, name) pairs, kept in order of first appearance.
#[derive(Debug, Default)]
pub struct CategoryCatalog {
    categories: Vec<Category>,
    index: HashMap<(Kind, String), usize>,
}

impl CategoryCatalog {
    pub fn new() -> CategoryCatalog {
        CategoryCatalog {
            categories: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Registers the pair if it has not been seen yet.
    pub fn discover(&mut self, kind: Kind, name: &str) -> &Category {
        let position = match self.index.get(&(kind, name.to_string())) {
            Some(position) => *position,
            None => {
                let position = self.categories.len();
                self.categories.push(Category::new(kind, name));
                self.index.insert((kind, name.to_string()), position);
                position
            },
        };

        &self.categories[position]
    }

    pub fn get(&self, kind: Kind, name: &str) -> Option<&Category> {
        self.index
            .get(&(kind, name.to_string()))
            .map(|position| &self.categories[*position])
    }

    /// Key a bill should reference for the pair, `other` when the pair was never discovered.
    pub fn key_for(&self, kind: Kind, name: &str) -> &str {
        match self.get(kind, name) {
            Some(category) => category.key(),
            None => kind.fallback_key(),
        }
    }

    pub fn discovered(&self) -> &[Category] {
        &self.categories
    }

    /// Categories ordered by kind, then by name.
    pub fn sorted(&self) -> Vec<&Category> {
        let mut sorted: Vec<&Category> = self.categories.iter().collect();
        sorted.sort_by(|a, b| (a.kind, &a.name).cmp(&(b.kind, &b.name)));
        sorted
    }

    pub fn tally<'a>(&'a self, bills: &[Bill]) -> Vec<CategoryTally<'a>> {
        let mut tallies: Vec<CategoryTally> = self
            .sorted()
            .into_iter()
            .map(|category| CategoryTally {
                category,
                bills: 0,
                total: Decimal::ZERO,
            })
            .collect();
        let positions: HashMap<(Kind, &str), usize> = tallies
            .iter()
            .enumerate()
            .map(|(position, tally)| {
                let category: &'a Category = tally.category;
                ((category.kind, category.name.as_str()), position)
            })
            .collect();

        for bill in bills {
            if let Some(position) = positions.get(&(bill.kind, bill.category_name.as_str())) {
                let tally = &mut tallies[*position];
                tally.bills += 1;
                tally.total += bill.amount;
            }
        }

        tallies
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
