//! Lenient field deserializers for request bodies.
//!
//! Admin screens post numbers both as JSON numbers and as strings taken
//! straight from form inputs. These helpers accept either, and treat `null`
//! or a blank string as an absent field so presence checks see one shape.
use serde::de::Error;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub(crate) fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(other) => Err(D::Error::custom(format!("expected a string, got {other}"))),
    }
}

pub(crate) fn opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => number
            .as_i64()
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected an integer, got {number}"))),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
        Some(Value::String(text)) => text
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("expected an integer, got {text:?}"))),
        Some(other) => Err(D::Error::custom(format!("expected an integer, got {other}"))),
    }
}

pub(crate) fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => number
            .as_f64()
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected a number, got {number}"))),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
        Some(Value::String(text)) => text
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("expected a number, got {text:?}"))),
        Some(other) => Err(D::Error::custom(format!("expected a number, got {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "opt_i64")]
        id: Option<i64>,
        #[serde(default, deserialize_with = "opt_f64")]
        weight: Option<f64>,
        #[serde(default, deserialize_with = "opt_string")]
        name: Option<String>,
    }

    fn sample(json: &str) -> Sample {
        serde_json::from_str(json).expect("sample")
    }

    #[test]
    fn numbers_and_numeric_strings_are_accepted() {
        let p = sample(r#"{"id": "42", "weight": 1.5, "name": "Endcap"}"#);
        assert_eq!(p.id, Some(42));
        assert_eq!(p.weight, Some(1.5));
        assert_eq!(p.name.as_deref(), Some("Endcap"));

        let p = sample(r#"{"id": 7, "weight": "2.25"}"#);
        assert_eq!(p.id, Some(7));
        assert_eq!(p.weight, Some(2.25));
    }

    #[test]
    fn blank_and_missing_fields_are_absent() {
        let p = sample(r#"{"id": "", "weight": null, "name": "   "}"#);
        assert!(p.id.is_none());
        assert!(p.weight.is_none());
        assert!(p.name.is_none());
        assert!(sample("{}").id.is_none());
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        assert!(serde_json::from_str::<Sample>(r#"{"id": "abc"}"#).is_err());
        assert!(serde_json::from_str::<Sample>(r#"{"id": 1.5}"#).is_err());
        assert!(serde_json::from_str::<Sample>(r#"{"name": [1]}"#).is_err());
    }
}
