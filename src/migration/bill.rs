use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::Kind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefundClass {
    None = 0,
    Refund = 1,
    ChargePending = 2,
}

impl RefundClass {
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

/// Charged-back wins over unsettled. Without either flag the raw refund
/// amount is dropped.
pub fn classify_refund(raw: Option<Decimal>, settled: Option<bool>, charged_back: Option<bool>) -> (Decimal, RefundClass) {
    let raw = raw.unwrap_or(Decimal::ZERO);

    if charged_back.unwrap_or(false) {
        (raw, RefundClass::Refund)
    } else if !settled.unwrap_or(true) {
        (raw, RefundClass::ChargePending)
    } else {
        (Decimal::ZERO, RefundClass::None)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PeriodType {
    #[default]
    Month,
    Year,
}

impl PeriodType {
    /// Anything other than `"month"` or `"year"` is treated as monthly.
    pub fn from_hint(hint: Option<&str>) -> PeriodType {
        match hint {
            Some("year") => PeriodType::Year,
            _ => PeriodType::Month,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodType::Month => "month",
            PeriodType::Year => "year",
        }
    }
}

/// Joins sub-category and description with a hyphen; empty parts count as absent.
pub fn compose_description(sub_category: Option<&str>, desc: Option<&str>) -> String {
    let sub_category = sub_category.filter(|s| !s.is_empty());
    let desc = desc.filter(|s| !s.is_empty());

    match (sub_category, desc) {
        (Some(sub_category), Some(desc)) => format!("{sub_category}-{desc}"),
        (Some(sub_category), None) => sub_category.to_string(),
        (None, Some(desc)) => desc.to_string(),
        (None, None) => String::new(),
    }
}

/// A fully defaulted row of the `bills` table.
#[derive(Debug, Clone, PartialEq)]
pub struct Bill {
    pub kind: Kind,
    pub category_name: String,
    pub category_key: String,
    pub amount: Decimal,
    pub description: String,
    pub date: String,
    pub period_type: PeriodType,
    // The source data has no notion of unconsumed bills.
    pub is_consumed: bool,
    pub refund: Decimal,
    pub refund_class: RefundClass,
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_refund_defaults_to_none() {
        assert_eq!(classify_refund(None, None, None), (dec!(0), RefundClass::None));
    }

    #[test]
    fn test_refund_amount_discarded_when_settled() {
        assert_eq!(classify_refund(Some(dec!(12.5)), Some(true), Some(false)), (dec!(0), RefundClass::None));
    }

    #[test]
    fn test_charged_back_is_refund() {
        assert_eq!(classify_refund(Some(dec!(30)), None, Some(true)), (dec!(30), RefundClass::Refund));
        assert_eq!(classify_refund(None, None, Some(true)), (dec!(0), RefundClass::Refund));
    }

    #[test]
    fn test_unsettled_is_charge_pending() {
        assert_eq!(classify_refund(Some(dec!(8.8)), Some(false), None), (dec!(8.8), RefundClass::ChargePending));
    }

    #[test]
    fn test_charged_back_takes_priority_over_unsettled() {
        assert_eq!(classify_refund(Some(dec!(5)), Some(false), Some(true)), (dec!(5), RefundClass::Refund));
    }

    #[test]
    fn test_refund_class_codes() {
        assert_eq!(RefundClass::None.code(), 0);
        assert_eq!(RefundClass::Refund.code(), 1);
        assert_eq!(RefundClass::ChargePending.code(), 2);
    }

    #[test]
    fn test_period_type_from_hint() {
        assert_eq!(PeriodType::from_hint(Some("year")), PeriodType::Year);
        assert_eq!(PeriodType::from_hint(Some("month")), PeriodType::Month);
        assert_eq!(PeriodType::from_hint(Some("week")), PeriodType::Month);
        assert_eq!(PeriodType::from_hint(None), PeriodType::Month);
    }

    #[test]
    fn test_compose_description() {
        assert_eq!(compose_description(Some("午餐"), Some("食堂")), "午餐-食堂");
        assert_eq!(compose_description(Some("午餐"), None), "午餐");
        assert_eq!(compose_description(Some(""), Some("食堂")), "食堂");
        assert_eq!(compose_description(None, None), "");
    }
}
