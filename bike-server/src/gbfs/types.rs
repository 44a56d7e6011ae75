//! GBFS wire types.
//!
//! These mirror the `station_status.json` and `station_information.json`
//! entries closely and are converted into domain types in `convert`.
//! Publishers disagree on a few encodings (numeric ids, `0`/`1` booleans
//! from GBFS 1.x, RFC 3339 timestamps from GBFS 3.x), so those fields accept
//! every form seen in the wild.

use serde::{Deserialize, Deserializer};

/// One entry of `station_status.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct StationStatusDto {
    #[serde(deserialize_with = "string_or_number")]
    pub station_id: String,

    #[serde(deserialize_with = "bool_or_int")]
    pub is_installed: bool,

    #[serde(deserialize_with = "bool_or_int")]
    pub is_renting: bool,

    #[serde(deserialize_with = "bool_or_int")]
    pub is_returning: bool,

    pub num_bikes_available: u32,

    /// Only required for docked systems.
    #[serde(default)]
    pub num_docks_available: u32,

    pub last_reported: LastReported,
}

/// `last_reported` as POSIX seconds (GBFS 1.x/2.x) or RFC 3339 (GBFS 3.x).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LastReported {
    Posix(i64),
    Rfc3339(String),
}

/// One entry of `station_information.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct StationInformationDto {
    #[serde(deserialize_with = "string_or_number")]
    pub station_id: String,

    pub name: String,

    pub lat: f64,

    pub lon: f64,

    /// Optional in GBFS; absent means unknown, treated as zero.
    #[serde(default)]
    pub capacity: u32,

    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub region_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

impl From<StringOrNumber> for String {
    fn from(v: StringOrNumber) -> Self {
        match v {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    StringOrNumber::deserialize(d).map(String::from)
}

fn opt_string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Option::<StringOrNumber>::deserialize(d).map(|v| v.map(String::from))
}

fn bool_or_int<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrInt {
        Bool(bool),
        Int(u8),
    }

    match BoolOrInt::deserialize(d)? {
        BoolOrInt::Bool(b) => Ok(b),
        BoolOrInt::Int(0) => Ok(false),
        BoolOrInt::Int(1) => Ok(true),
        BoolOrInt::Int(n) => Err(serde::de::Error::custom(format!(
            "expected boolean or 0/1, got {n}"
        ))),
    }
}
