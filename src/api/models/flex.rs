//! Lenient number decoding. Older deployments of the API sent values as
//! fixed-point strings (`"4.0"`) and occasionally `null`; both decode to
//! `f64`, with anything unparseable treated as 0.

use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
    Null(()),
}

impl NumberOrString {
    fn into_f64(self) -> f64 {
        match self {
            NumberOrString::Number(n) => n,
            NumberOrString::Text(s) => s.trim().parse().unwrap_or(0.0),
            NumberOrString::Null(()) => 0.0,
        }
    }
}

pub fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(NumberOrString::deserialize(deserializer)?.into_f64())
}

pub fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<NumberOrString>::deserialize(deserializer)?.map(NumberOrString::into_f64))
}

pub fn number_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, NumberOrString>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(|(k, v)| (k, v.into_f64())).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Sample {
        #[serde(deserialize_with = "number")]
        value: f64,
        #[serde(default, deserialize_with = "number_map")]
        map: BTreeMap<String, f64>,
    }

    #[test]
    fn test_numbers_strings_and_null() {
        let p: Sample = serde_json::from_value(json!({"value": "4.5"})).unwrap();
        assert_eq!(p.value, 4.5);
        let p: Sample = serde_json::from_value(json!({"value": 2})).unwrap();
        assert_eq!(p.value, 2.0);
        let p: Sample = serde_json::from_value(json!({"value": null})).unwrap();
        assert_eq!(p.value, 0.0);
        let p: Sample = serde_json::from_value(json!({"value": "n/a"})).unwrap();
        assert_eq!(p.value, 0.0);
    }

    #[test]
    fn test_mixed_map_values() {
        let p: Sample = serde_json::from_value(json!({
            "value": 0,
            "map": {"2025-04-01 08:00:00": "4.0", "2025-04-01 09:00:00": 1.0}
        }))
        .unwrap();
        assert_eq!(p.map["2025-04-01 08:00:00"], 4.0);
        assert_eq!(p.map["2025-04-01 09:00:00"], 1.0);
    }
}
