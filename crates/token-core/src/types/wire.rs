//! Serde helpers for backend JSON shapes.
//!
//! Amounts travel as decimal text. Repositories cast `numeric` columns with
//! `::text`, but bare JSON numbers are still accepted while they are exact:
//! integers up to `u64::MAX`, and floats below 2^53. A float at or above
//! 2^53 has already been rounded by the JSON parser and is rejected. A
//! `null` or missing amount is read as zero.

use alloy_primitives::U256;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use crate::amount::{parse_base_units, DEFAULT_DECIMALS};

/// 2^53, the first integer an f64 cannot tell from its neighbour
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

struct BaseUnitsVisitor;

impl<'de> Visitor<'de> for BaseUnitsVisitor {
    type Value = U256;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a non-negative integer amount as a string or number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<U256, E> {
        parse_base_units(v).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<U256, E> {
        Ok(U256::from(v))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<U256, E> {
        Ok(U256::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<U256, E> {
        u64::try_from(v)
            .map(U256::from)
            .map_err(|_| E::custom(format!("negative amount: {v}")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<U256, E> {
        if !v.is_finite() || v < 0.0 || v.fract() != 0.0 {
            return Err(E::custom(format!("not a base-unit integer: {v}")));
        }
        if v >= MAX_EXACT_FLOAT {
            return Err(E::custom(format!(
                "amount {v} is not exact as a JSON number, select it as text"
            )));
        }
        parse_base_units(&format!("{v:.0}")).map_err(E::custom)
    }

    fn visit_unit<E: de::Error>(self) -> Result<U256, E> {
        Ok(U256::ZERO)
    }

    fn visit_none<E: de::Error>(self) -> Result<U256, E> {
        Ok(U256::ZERO)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<U256, D::Error> {
        deserializer.deserialize_any(self)
    }
}

/// `#[serde(with = "base_units")]` for U256 amount fields
pub mod base_units {
    use super::*;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        deserializer.deserialize_any(BaseUnitsVisitor)
    }

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }
}

/// A bare base-unit scalar, as returned by the supply and balance procedures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct WireAmount(#[serde(with = "base_units")] pub U256);

/// Contract decimals, with `null` read as the default of 18
pub fn decimals_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    Ok(Option::<u8>::deserialize(deserializer)?.unwrap_or(DEFAULT_DECIMALS))
}

pub fn default_decimals() -> u8 {
    DEFAULT_DECIMALS
}
