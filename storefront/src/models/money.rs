// harvest_store/src/models/money.rs

//! Monetary amounts in integer cents.
//!
//! On the wire an amount is a plain decimal number (`4.5`), which is what the
//! storefront frontend sends and expects. Numeric strings (`"4.50"`) are also
//! accepted because form inputs often arrive that way.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, sqlx::Type)]
#[sqlx(transparent)]
pub struct Money(i64);

impl Money {
  pub const ZERO: Money = Money(0);

  /// `None` for negative amounts.
  pub fn from_cents(cents: i64) -> Option<Self> {
    (cents >= 0).then_some(Money(cents))
  }

  /// Rounds to the nearest cent. Rejects negative, NaN and infinite values.
  pub fn from_decimal(amount: f64) -> Result<Self, String> {
    if !amount.is_finite() {
      return Err(format!("amount must be a finite number, got {}", amount));
    }
    if amount < 0.0 {
      return Err(format!("amount must not be negative, got {}", amount));
    }
    let cents = (amount * 100.0).round();
    if cents > i64::MAX as f64 {
      return Err(format!("amount {} is too large", amount));
    }
    Ok(Money(cents as i64))
  }

  pub fn cents(self) -> i64 {
    self.0
  }

  pub fn as_decimal(self) -> f64 {
    self.0 as f64 / 100.0
  }

  pub fn checked_add(self, other: Money) -> Option<Money> {
    self.0.checked_add(other.0).map(Money)
  }

  /// `self * quantity`; `None` on overflow or a negative quantity.
  pub fn checked_mul(self, quantity: i64) -> Option<Money> {
    if quantity < 0 {
      return None;
    }
    self.0.checked_mul(quantity).map(Money)
  }
}

impl fmt::Display for Money {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
  }
}

impl Serialize for Money {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(self.as_decimal())
  }
}

struct MoneyVisitor;

impl<'de> Visitor<'de> for MoneyVisitor {
  type Value = Money;

  fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("a non-negative decimal amount or numeric string")
  }

  fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
    i64::try_from(v)
      .ok()
      .and_then(|whole| whole.checked_mul(100))
      .map(Money)
      .ok_or_else(|| E::custom(format!("amount {} is too large", v)))
  }

  fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
    if v < 0 {
      return Err(E::custom(format!("amount must not be negative, got {}", v)));
    }
    self.visit_u64(v as u64)
  }

  fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
    Money::from_decimal(v).map_err(E::custom)
  }

  fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
    let parsed: f64 = v
      .trim()
      .parse()
      .map_err(|_| E::custom(format!("'{}' is not a valid amount", v)))?;
    self.visit_f64(parsed)
  }
}

impl<'de> Deserialize<'de> for Money {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    deserializer.deserialize_any(MoneyVisitor)
  }
}
