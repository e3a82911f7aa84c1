//! Catalog items, their identifiers and field values.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::CatalogError;

/// Length of a hex encoded item identifier.
pub const ITEM_ID_LEN: usize = 24;

/// Opaque 24-character lowercase hex identifier.
///
/// Layout follows the document-store convention: four bytes of big-endian
/// unix seconds followed by eight random bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(String);

impl ItemId {
    /// Generates a fresh identifier stamped with the current time.
    pub fn generate() -> Self {
        let seconds = Utc::now().timestamp().clamp(0, i64::from(u32::MAX)) as u32;
        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        rand::rng().fill(&mut bytes[4..]);
        Self(hex::encode(bytes))
    }

    /// Builds an identifier from raw bytes.
    pub fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(hex::encode(bytes))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Sentinel that orders before every valid identifier.
    pub(crate) fn floor() -> Self {
        Self(String::new())
    }
}

impl FromStr for ItemId {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ITEM_ID_LEN {
            return Err(CatalogError::invalid(
                "id",
                format!("expected {ITEM_ID_LEN} hex characters, got {}", s.len()),
            ));
        }
        if !s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(CatalogError::invalid(
                "id",
                "identifier must be lowercase hexadecimal",
            ));
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for ItemId {
    type Error = CatalogError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Scalar value stored in an item field.
///
/// Deserialization tries variants in declaration order, so RFC 3339 strings
/// become timestamps and every other string stays text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Timestamp(Timestamp),
    Text(String),
}

/// RFC 3339 instant that remembers the text it was read from.
///
/// Ordering uses the instant; serialization and text search use the
/// original text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp {
    instant: DateTime<Utc>,
    raw: String,
}

impl Timestamp {
    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl TryFrom<String> for Timestamp {
    type Error = chrono::ParseError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        let instant = DateTime::parse_from_rfc3339(&raw)?.with_timezone(&Utc);
        Ok(Self { instant, raw })
    }
}

impl From<Timestamp> for String {
    fn from(timestamp: Timestamp) -> Self {
        timestamp.raw
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(instant: DateTime<Utc>) -> Self {
        Self {
            instant,
            raw: instant.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        }
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.instant
            .cmp(&other.instant)
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FieldValue {
    /// Returns the text content of text fields, and the original text of
    /// timestamps.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Timestamp(t) => Some(t.as_str()),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            FieldValue::Bool(_) => 0,
            FieldValue::Integer(_) | FieldValue::Float(_) => 1,
            FieldValue::Timestamp(_) => 2,
            FieldValue::Text(_) => 3,
        }
    }
}

/// Exact comparison of an integer with a float.
///
/// NaN sorts like `f64::total_cmp` does: positive NaN above every number,
/// negative NaN below.
fn cmp_int_float(int: i64, float: f64) -> Ordering {
    const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;

    if float.is_nan() {
        return if float.is_sign_negative() {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }
    if float >= TWO_POW_63 {
        return Ordering::Less;
    }
    if float < -TWO_POW_63 {
        return Ordering::Greater;
    }

    let whole = float.trunc();
    // In range, so the cast is exact.
    match int.cmp(&(whole as i64)) {
        Ordering::Equal if float > whole => Ordering::Less,
        Ordering::Equal if float < whole => Ordering::Greater,
        ordering => ordering,
    }
}

/// Float comparison where `-0.0 == 0.0`, keeping equality consistent with
/// integer zero.
fn cmp_floats(a: f64, b: f64) -> Ordering {
    if a == b {
        Ordering::Equal
    } else {
        a.total_cmp(&b)
    }
}

impl Ord for FieldValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a.cmp(b),
            (FieldValue::Integer(a), FieldValue::Integer(b)) => a.cmp(b),
            (FieldValue::Float(a), FieldValue::Float(b)) => cmp_floats(*a, *b),
            (FieldValue::Integer(a), FieldValue::Float(b)) => cmp_int_float(*a, *b),
            (FieldValue::Float(a), FieldValue::Integer(b)) => cmp_int_float(*b, *a).reverse(),
            (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => a.cmp(b),
            (FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for FieldValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FieldValue {}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Integer(i64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(value.into())
    }
}

/// Orders optional field values, placing missing values first.
pub fn compare_fields(a: Option<&FieldValue>, b: Option<&FieldValue>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.cmp(b),
    }
}

/// A catalog record as seen by the read path.
///
/// `shuffle_key` is the persistent random sort key assigned when the item is
/// written. It drives sampling and is never exposed to API clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    #[serde(skip)]
    pub shuffle_key: u64,
    #[serde(flatten)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl Item {
    /// Creates an empty item with a freshly drawn shuffle key.
    pub fn new(id: ItemId) -> Self {
        Self {
            id,
            shuffle_key: rand::rng().random(),
            fields: BTreeMap::new(),
        }
    }

    /// Replaces the shuffle key.
    pub fn with_shuffle_key(mut self, shuffle_key: u64) -> Self {
        self.shuffle_key = shuffle_key;
        self
    }

    /// Sets a field value.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_item_id_validation() {
        assert!("65a1f0c2e4b0a1b2c3d4e5f6".parse::<ItemId>().is_ok());
        assert!("65A1F0C2E4B0A1B2C3D4E5F6".parse::<ItemId>().is_err());
        assert!("65a1f0c2e4b0".parse::<ItemId>().is_err());
        assert!("zza1f0c2e4b0a1b2c3d4e5f6".parse::<ItemId>().is_err());
    }

    #[test]
    fn test_generated_ids_are_valid_and_distinct() {
        let a = ItemId::generate();
        let b = ItemId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().parse::<ItemId>().is_ok());
        assert!(ItemId::floor() < a);
    }

    #[test]
    fn test_field_value_ordering() {
        assert!(FieldValue::Integer(2) < FieldValue::Float(2.5));
        assert!(FieldValue::Float(1.5) < FieldValue::Integer(2));
        assert!(FieldValue::Bool(true) < FieldValue::Integer(-10));
        assert!(FieldValue::from("apple") < FieldValue::from("banana"));
        let early = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(FieldValue::from(early) < FieldValue::from(late));
        assert_eq!(
            compare_fields(None, Some(&FieldValue::Integer(0))),
            Ordering::Less
        );
    }

    #[test]
    fn test_item_json_shape() {
        let id: ItemId = "65a1f0c2e4b0a1b2c3d4e5f6".parse().unwrap();
        let item = Item::new(id)
            .with_field("title", "Ocean Deep")
            .with_field("episodeNumber", 3i64);
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(json["id"], "65a1f0c2e4b0a1b2c3d4e5f6");
        assert_eq!(json["title"], "Ocean Deep");
        assert_eq!(json["episodeNumber"], 3);
        assert!(json.get("shuffle_key").is_none());
    }

    #[test]
    fn test_field_value_deserialization() {
        let ts: FieldValue = serde_json::from_str("\"2024-03-01T12:00:00Z\"").unwrap();
        assert!(matches!(ts, FieldValue::Timestamp(_)));
        let text: FieldValue = serde_json::from_str("\"not a date\"").unwrap();
        assert_eq!(text.as_text(), Some("not a date"));
        let float: FieldValue = serde_json::from_str("12.5").unwrap();
        assert!(matches!(float, FieldValue::Float(_)));
    }

    #[test]
    fn test_large_integers_compare_exactly_with_floats() {
        let edge = 1i64 << 53;
        let float = FieldValue::Float(edge as f64);
        let above = FieldValue::Integer(edge + 1);

        assert_eq!(FieldValue::Integer(edge), float);
        assert!(float < above);
        assert!(FieldValue::Integer(edge) < above);
        assert!(FieldValue::Integer(i64::MAX) < FieldValue::Float(9.3e18));
        assert!(FieldValue::Integer(i64::MIN) > FieldValue::Float(-9.3e18));
        assert!(FieldValue::Integer(-3) < FieldValue::Float(-2.5));
        assert!(FieldValue::Integer(-2) > FieldValue::Float(-2.5));
        assert!(FieldValue::Integer(0) < FieldValue::Float(f64::NAN));
        assert_eq!(FieldValue::Float(-0.0), FieldValue::Integer(0));
        assert_eq!(FieldValue::Float(-0.0), FieldValue::Float(0.0));
    }

    #[test]
    fn test_mixed_numbers_sort_consistently() {
        let edge = 1i64 << 53;
        let mut values = vec![
            FieldValue::Integer(edge + 1),
            FieldValue::Float(edge as f64),
            FieldValue::Integer(edge - 1),
            FieldValue::Float(0.5),
            FieldValue::Integer(edge),
        ];
        values.sort();
        for pair in values.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
        assert_eq!(values[0], FieldValue::Float(0.5));
        assert_eq!(values[4], FieldValue::Integer(edge + 1));
    }

    #[test]
    fn test_timestamps_keep_their_original_text() {
        let raw = "2024-05-01T10:00:00+02:00";
        let value: FieldValue = serde_json::from_str(&format!("\"{raw}\"")).unwrap();

        assert!(matches!(value, FieldValue::Timestamp(_)));
        assert_eq!(value.as_text(), Some(raw));
        assert_eq!(serde_json::to_value(&value).unwrap(), raw);

        let same_instant: FieldValue = serde_json::from_str("\"2024-05-01T08:00:00Z\"").unwrap();
        let later: FieldValue = serde_json::from_str("\"2024-05-01T09:00:00Z\"").unwrap();
        assert!(value < later);
        assert!(same_instant < later);
        assert_ne!(value, same_instant);
    }
}
