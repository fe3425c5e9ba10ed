use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Local, Offset, Utc};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timezone used to render `created_at` and the generation timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Local,
    Fixed(FixedOffset),
}

impl Zone {
    pub fn utc() -> Zone {
        Zone::Fixed(Utc.fix())
    }

    pub fn format(&self, instant: DateTime<Utc>) -> String {
        match self {
            Zone::Local => instant.with_timezone(&Local).format(DATETIME_FORMAT).to_string(),
            Zone::Fixed(offset) => instant.with_timezone(offset).format(DATETIME_FORMAT).to_string(),
        }
    }
}

/// Converts epoch milliseconds; zero and out-of-range values count as absent.
pub fn from_epoch_millis(millis: i64) -> Option<DateTime<Utc>> {
    if millis == 0 {
        return None;
    }

    DateTime::from_timestamp_millis(millis)
}

impl FromStr for Zone {
    type Err = String;

    /// Accepts `local`, `utc` or an offset such as `+08:00` / `-0530`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => return Ok(Zone::Local),
            "utc" | "z" => return Ok(Zone::utc()),
            _ => {},
        }

        let invalid = || format!("invalid timezone `{s}`, expected `local`, `utc` or an offset like `+08:00`");
        let (sign, rest) = match s.as_bytes().first() {
            Some(b'+') => (1, &s[1..]),
            Some(b'-') => (-1, &s[1..]),
            _ => return Err(invalid()),
        };
        let digits: String = rest.chars().filter(|c| *c != ':').collect();
        if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
        let minutes: i32 = digits[2..].parse().map_err(|_| invalid())?;
        if minutes >= 60 {
            return Err(invalid());
        }

        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(Zone::Fixed)
            .ok_or_else(invalid)
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zone::Local => f.write_str("local"),
            Zone::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_zones() {
        assert_eq!("local".parse::<Zone>(), Ok(Zone::Local));
        assert_eq!("UTC".parse::<Zone>(), Ok(Zone::utc()));
        assert_eq!("+08:00".parse::<Zone>(), Ok(Zone::Fixed(FixedOffset::east_opt(8 * 3600).unwrap())));
        assert_eq!("-0530".parse::<Zone>(), Ok(Zone::Fixed(FixedOffset::west_opt(5 * 3600 + 30 * 60).unwrap())));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("tokyo".parse::<Zone>().is_err());
        assert!("+8".parse::<Zone>().is_err());
        assert!("+08:75".parse::<Zone>().is_err());
        assert!("+99:00".parse::<Zone>().is_err());
    }

    #[test]
    fn test_format_in_fixed_offset() {
        let zone: Zone = "+08:00".parse().unwrap();
        let instant = from_epoch_millis(1672531200000).unwrap();

        assert_eq!(zone.format(instant), "2023-01-01 08:00:00");
        assert_eq!(Zone::utc().format(instant), "2023-01-01 00:00:00");
    }

    #[test]
    fn test_zero_millis_is_absent() {
        assert_eq!(from_epoch_millis(0), None);
        assert_eq!(from_epoch_millis(i64::MAX), None);
    }
}
