//! Data points and their InfluxDB line protocol encoding.
use std::{collections::BTreeMap, fmt::Write};

use chrono::{DateTime, Utc};

/// A field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// 64-bit float.
    Float(f64),
    /// Signed integer.
    Int(i64),
    /// Boolean.
    Bool(bool),
    /// String.
    Str(String),
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

/// One measurement sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    /// Measurement name.
    pub measurement: String,
    /// Indexed tags.
    pub tags: BTreeMap<String, String>,
    /// Field values. A point without fields is dropped by the writer.
    pub fields: BTreeMap<String, FieldValue>,
    /// Sample time.
    pub timestamp: DateTime<Utc>,
}

impl Point {
    /// Create a point with no tags or fields.
    pub fn new(measurement: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            measurement: measurement.into(),
            tags: BTreeMap::new(),
            fields: BTreeMap::new(),
            timestamp,
        }
    }

    /// Add a tag.
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Add a field.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Add a field when a value is present.
    pub fn field_opt<V: Into<FieldValue>>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.field(key, v),
            None => self,
        }
    }

    /// Encode as a single line of InfluxDB line protocol, nanosecond precision.
    pub fn to_line(&self) -> String {
        let mut line = escape(&self.measurement, &[',', ' ']);
        for (k, v) in &self.tags {
            if v.is_empty() {
                continue;
            }
            let _ = write!(line, ",{}={}", escape(k, &[',', '=', ' ']), escape(v, &[',', '=', ' ']));
        }

        let fields: Vec<String> = self
            .fields
            .iter()
            .map(|(k, v)| {
                let value = match v {
                    FieldValue::Float(f) => format!("{f}"),
                    FieldValue::Int(i) => format!("{i}i"),
                    FieldValue::Bool(b) => b.to_string(),
                    FieldValue::Str(s) => format!("\"{}\"", escape(s, &['"'])),
                };
                format!("{}={}", escape(k, &[',', '=', ' ']), value)
            })
            .collect();
        line.push(' ');
        line.push_str(&fields.join(","));

        if let Some(ns) = self.timestamp.timestamp_nanos_opt() {
            let _ = write!(line, " {ns}");
        }
        line
    }
}

fn escape(s: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == '\\' || special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn encodes_all_field_kinds() {
        let line = Point::new("node_status", ts())
            .tag("validator", "val one")
            .field("height", 42i64)
            .field("catching_up", false)
            .field("voting_power", 1.5)
            .field("moniker", "say \"hi\"")
            .to_line();

        assert_eq!(
            line,
            r#"node_status,validator=val\ one catching_up=false,height=42i,moniker="say \"hi\"",voting_power=1.5 1704067200000000000"#
        );
    }

    #[test]
    fn optional_fields() {
        let p = Point::new("m", ts()).field_opt("a", Some(1i64)).field_opt::<i64>("b", None);
        assert_eq!(p.fields.len(), 1);
        assert_eq!(p.to_line(), "m a=1i 1704067200000000000");
    }

    #[test]
    fn skips_empty_tags_and_escapes_names() {
        let line = Point::new("peer,count", ts()).tag("chain", "").field("n", 3i64).to_line();
        assert_eq!(line, r"peer\,count n=3i 1704067200000000000");
    }
}
