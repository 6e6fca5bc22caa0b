//! Backend timestamps are `LocalDateTime` strings without offset,
//! e.g. `2025-11-20T10:15:30.123456`.

use serde::{Deserialize, Deserializer, Serializer};
use time::macros::format_description;
use time::PrimitiveDateTime;

pub fn parse(s: &str) -> Result<PrimitiveDateTime, time::error::Parse> {
    PrimitiveDateTime::parse(
        s,
        format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"
        ),
    )
}

pub fn format(dt: &PrimitiveDateTime) -> Result<String, time::error::Format> {
    dt.format(format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second]"
    ))
}

/// Short date for listings, `dd-mm-yyyy`.
pub fn fecha_corta(dt: &PrimitiveDateTime) -> String {
    dt.format(format_description!("[day]-[month]-[year]"))
        .unwrap_or_default()
}

/// `#[serde(with = "crate::fecha::opcional")]` for `Option<PrimitiveDateTime>`.
pub mod opcional {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<PrimitiveDateTime>,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => {
                let text = super::format(dt).map_err(serde::ser::Error::custom)?;
                s.serialize_some(&text)
            }
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<PrimitiveDateTime>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(text) => super::parse(&text)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}
