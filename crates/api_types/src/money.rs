use std::{
    fmt,
    iter::Sum,
    ops::Add,
    str::FromStr,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// Signed money amount represented as **integer cents**.
///
/// Balances travel as decimals with two places, so every amount the client
/// handles (account balances, totals, form input) is kept in cents to avoid
/// floating-point drift.
///
/// # Examples
///
/// ```rust
/// use api_types::MoneyCents;
///
/// let amount = MoneyCents::new(100_50);
/// assert_eq!(amount.cents(), 10050);
/// assert_eq!(amount.to_string(), "$100.50");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator; rejects >
/// 2 decimals):
///
/// ```rust
/// use api_types::MoneyCents;
///
/// assert_eq!("10".parse::<MoneyCents>().unwrap().cents(), 1000);
/// assert_eq!("10,5".parse::<MoneyCents>().unwrap().cents(), 1050);
/// assert!("12.345".parse::<MoneyCents>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct MoneyCents(i64);

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    #[error("empty amount")]
    Empty,
    #[error("invalid amount")]
    Invalid,
    #[error("too many decimals")]
    TooManyDecimals,
    #[error("amount too large")]
    TooLarge,
}

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Converts a JSON number in major units, rounding to the nearest cent.
    ///
    /// Returns `None` for NaN, infinities and values outside the `i64` cent
    /// range.
    #[must_use]
    pub fn from_major_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let cents = (value * 100.0).round();
        if cents < i64::MIN as f64 || cents > i64::MAX as f64 {
            return None;
        }
        Some(Self(cents as i64))
    }

    /// Plain decimal rendering with two places and no currency symbol,
    /// e.g. `250.00` or `-5.10`. This is the wire format for balances.
    #[must_use]
    pub fn to_decimal_string(self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl fmt::Display for MoneyCents {
    /// Dollar rendering used across the UI. The sign follows the symbol
    /// (`$-5.00`), the way the web tracker printed negative balances.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.to_decimal_string())
    }
}

impl Add for MoneyCents {
    type Output = MoneyCents;

    fn add(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0.saturating_add(rhs.0))
    }
}

impl Sum for MoneyCents {
    fn sum<I: Iterator<Item = MoneyCents>>(iter: I) -> Self {
        iter.fold(MoneyCents::ZERO, Add::add)
    }
}

impl FromStr for MoneyCents {
    type Err = MoneyError;

    /// Parses a decimal string into cents.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
    ///
    /// Validation rules:
    /// - max 2 fractional digits (rejects `12.345`)
    /// - rejects empty/invalid strings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(MoneyError::Empty);
        }

        let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (true, stripped)
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (false, stripped)
        } else {
            (false, trimmed)
        };

        let rest = rest.trim();
        if rest.is_empty() {
            return Err(MoneyError::Empty);
        }

        let rest = rest.replace(',', ".");
        let mut parts = rest.split('.');
        let units_str = parts.next().ok_or(MoneyError::Invalid)?;
        let cents_str = parts.next();

        if parts.next().is_some() {
            return Err(MoneyError::Invalid);
        }

        // ".5" is accepted as 0.50, "5." as 5.00
        let units: i64 = if units_str.is_empty() {
            if cents_str.is_none_or(str::is_empty) {
                return Err(MoneyError::Invalid);
            }
            0
        } else {
            if !units_str.chars().all(|c| c.is_ascii_digit()) {
                return Err(MoneyError::Invalid);
            }
            units_str.parse().map_err(|_| MoneyError::TooLarge)?
        };

        let cents: i64 = match cents_str {
            None | Some("") => 0,
            Some(frac) => {
                if !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(MoneyError::Invalid);
                }
                match frac.len() {
                    1 => frac.parse::<i64>().map_err(|_| MoneyError::Invalid)? * 10,
                    2 => frac.parse::<i64>().map_err(|_| MoneyError::Invalid)?,
                    _ => return Err(MoneyError::TooManyDecimals),
                }
            }
        };

        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or(MoneyError::TooLarge)?;

        Ok(MoneyCents(if negative { -total } else { total }))
    }
}

/// Balance as received from the server.
///
/// The server may render balances as JSON numbers (`100.5`), decimal strings
/// (`"100.50"`), `null`, or omit them. Anything that is not a number is kept
/// as `None` instead of failing the whole response.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Balance(Option<MoneyCents>);

impl Balance {
    #[must_use]
    pub const fn missing() -> Self {
        Self(None)
    }

    #[must_use]
    pub const fn cents(self) -> Option<MoneyCents> {
        self.0
    }

    /// Amount used for display and totals, with missing values counted as 0.
    #[must_use]
    pub fn or_zero(self) -> MoneyCents {
        self.0.unwrap_or(MoneyCents::ZERO)
    }
}

impl From<MoneyCents> for Balance {
    fn from(value: MoneyCents) -> Self {
        Self(Some(value))
    }
}

impl Serialize for Balance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Some(cents) => serializer.serialize_str(&cents.to_decimal_string()),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Balance {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(BalanceVisitor)
    }
}

struct BalanceVisitor;

impl<'de> de::Visitor<'de> for BalanceVisitor {
    type Value = Balance;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a balance as number, decimal string or null")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Balance, E> {
        Ok(Balance(v.checked_mul(100).map(MoneyCents)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Balance, E> {
        Ok(Balance(
            i64::try_from(v)
                .ok()
                .and_then(|v| v.checked_mul(100))
                .map(MoneyCents),
        ))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Balance, E> {
        Ok(Balance(MoneyCents::from_major_f64(v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Balance, E> {
        let parsed = v.parse::<MoneyCents>().ok().or_else(|| {
            v.trim()
                .parse::<f64>()
                .ok()
                .and_then(MoneyCents::from_major_f64)
        });
        Ok(Balance(parsed))
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<Balance, E> {
        Ok(Balance(None))
    }

    fn visit_none<E: de::Error>(self) -> Result<Balance, E> {
        Ok(Balance(None))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Balance, E> {
        Ok(Balance(None))
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Balance, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Balance, A::Error> {
        while seq.next_element::<de::IgnoredAny>()?.is_some() {}
        Ok(Balance(None))
    }

    fn visit_map<A: de::MapAccess<'de>>(self, mut map: A) -> Result<Balance, A::Error> {
        while map
            .next_entry::<de::IgnoredAny, de::IgnoredAny>()?
            .is_some()
        {}
        Ok(Balance(None))
    }
}

/// Serializes a [`MoneyCents`] as a two-place decimal string.
pub mod decimal {
    use serde::Serializer;

    use super::MoneyCents;

    pub fn serialize<S: Serializer>(value: &MoneyCents, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_decimal_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_dollars() {
        assert_eq!(MoneyCents::new(0).to_string(), "$0.00");
        assert_eq!(MoneyCents::new(1).to_string(), "$0.01");
        assert_eq!(MoneyCents::new(10050).to_string(), "$100.50");
        assert_eq!(MoneyCents::new(-500).to_string(), "$-5.00");
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!("10".parse::<MoneyCents>().unwrap().cents(), 1000);
        assert_eq!("10.5".parse::<MoneyCents>().unwrap().cents(), 1050);
        assert_eq!("10,50".parse::<MoneyCents>().unwrap().cents(), 1050);
        assert_eq!("-0.01".parse::<MoneyCents>().unwrap().cents(), -1);
        assert_eq!("+1.00".parse::<MoneyCents>().unwrap().cents(), 100);
        assert_eq!(".5".parse::<MoneyCents>().unwrap().cents(), 50);
        assert_eq!("  2.30 ".parse::<MoneyCents>().unwrap().cents(), 230);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!("".parse::<MoneyCents>(), Err(MoneyError::Empty));
        assert_eq!("-".parse::<MoneyCents>(), Err(MoneyError::Empty));
        assert_eq!("abc".parse::<MoneyCents>(), Err(MoneyError::Invalid));
        assert_eq!("1.2.3".parse::<MoneyCents>(), Err(MoneyError::Invalid));
        assert_eq!("12.345".parse::<MoneyCents>(), Err(MoneyError::TooManyDecimals));
        assert_eq!(".".parse::<MoneyCents>(), Err(MoneyError::Invalid));
    }

    #[test]
    fn balance_accepts_numbers_and_decimal_strings() {
        let from_number: Balance = serde_json::from_str("100.5").unwrap();
        assert_eq!(from_number.cents(), Some(MoneyCents::new(10050)));

        let from_int: Balance = serde_json::from_str("250").unwrap();
        assert_eq!(from_int.cents(), Some(MoneyCents::new(25000)));

        let from_string: Balance = serde_json::from_str("\"-12.30\"").unwrap();
        assert_eq!(from_string.cents(), Some(MoneyCents::new(-1230)));
    }

    #[test]
    fn balance_keeps_non_numeric_values_as_missing() {
        let text: Balance = serde_json::from_str("\"n/a\"").unwrap();
        assert_eq!(text.cents(), None);
        assert_eq!(text.or_zero(), MoneyCents::ZERO);

        let null: Balance = serde_json::from_str("null").unwrap();
        assert_eq!(null.cents(), None);

        let object: Balance = serde_json::from_str("{\"amount\": 3}").unwrap();
        assert_eq!(object.cents(), None);
    }

    #[test]
    fn sum_adds_cents() {
        let total: MoneyCents = [MoneyCents::new(150), MoneyCents::new(-50)]
            .into_iter()
            .sum();
        assert_eq!(total, MoneyCents::new(100));
    }
}
