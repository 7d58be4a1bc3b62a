// harvest_store/src/models/serde_util.rs

//! Deserialization helpers for request payloads.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;

/// For `Option<Option<T>>` fields combined with `#[serde(default)]`:
/// absent → `None`, `null` → `Some(None)`, value → `Some(Some(v))`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
  T: Deserialize<'de>,
  D: Deserializer<'de>,
{
  Option::<T>::deserialize(deserializer).map(Some)
}

struct LenientIntVisitor;

impl<'de> Visitor<'de> for LenientIntVisitor {
  type Value = Option<i64>;

  fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("an integer or a numeric string")
  }

  fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
    Ok(None)
  }

  fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
    Ok(None)
  }

  fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
    deserializer.deserialize_any(self)
  }

  fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
    Ok(Some(v))
  }

  fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
    i64::try_from(v)
      .map(Some)
      .map_err(|_| E::custom(format!("{} is out of range", v)))
  }

  fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
      Ok(Some(v as i64))
    } else {
      Err(E::custom(format!("{} is not a whole number", v)))
    }
  }

  fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
    let trimmed = v.trim();
    if trimmed.is_empty() {
      return Ok(None);
    }
    if let Ok(whole) = trimmed.parse::<i64>() {
      return Ok(Some(whole));
    }
    match trimmed.parse::<f64>() {
      Ok(float) => self.visit_f64(float),
      Err(_) => Err(E::custom(format!("'{}' is not a number", v))),
    }
  }
}

/// `Option<i64>` that also accepts numeric strings (`"12"`) and whole floats (`12.0`).
/// An empty string counts as absent.
pub fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
  D: Deserializer<'de>,
{
  deserializer.deserialize_option(LenientIntVisitor)
}
