use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::PredictError;

/// A single inference request.
///
/// Exactly two shapes are accepted. Dynamic input (JSON) that matches
/// neither is rejected by [`Observation::from_json`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// Symptom code to presence flag. Codes left out count as absent.
    Keyed(BTreeMap<String, bool>),
    /// One flag per catalog entry, in catalog order.
    Sequence(Vec<bool>),
}

impl Observation {
    pub fn keyed<I, K>(flags: I) -> Self
    where
        I: IntoIterator<Item = (K, bool)>,
        K: Into<String>,
    {
        Observation::Keyed(flags.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn sequence(flags: impl Into<Vec<bool>>) -> Self {
        Observation::Sequence(flags.into())
    }

    /// A mapping in which every listed code is present.
    pub fn from_present<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::keyed(codes.into_iter().map(|c| (c, true)))
    }

    /// Builds a sequence from numeric 0/1 flags.
    pub fn from_flags(flags: &[u8]) -> Result<Self, PredictError> {
        flags
            .iter()
            .enumerate()
            .map(|(i, &flag)| match flag {
                0 => Ok(false),
                1 => Ok(true),
                other => Err(PredictError::InvalidFlag {
                    symptom: position_name(i),
                    value: other.to_string(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Observation::Sequence)
    }

    /// Interprets a JSON object as a mapping and a JSON array as a sequence.
    ///
    /// Flags may be `true`/`false` or `0`/`1`.
    pub fn from_json(value: &Value) -> Result<Self, PredictError> {
        match value {
            Value::Object(map) => map
                .iter()
                .map(|(code, v)| json_flag(v, || code.clone()).map(|f| (code.clone(), f)))
                .collect::<Result<BTreeMap<_, _>, _>>()
                .map(Observation::Keyed),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| json_flag(v, || position_name(i)))
                .collect::<Result<Vec<_>, _>>()
                .map(Observation::Sequence),
            other => Err(PredictError::UnsupportedInputType {
                found: json_kind(other),
            }),
        }
    }

    /// Number of flags set.
    pub fn present_count(&self) -> usize {
        match self {
            Observation::Keyed(map) => map.values().filter(|&&f| f).count(),
            Observation::Sequence(flags) => flags.iter().filter(|&&f| f).count(),
        }
    }
}

impl TryFrom<&Value> for Observation {
    type Error = PredictError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Observation::from_json(value)
    }
}

impl From<Vec<bool>> for Observation {
    fn from(flags: Vec<bool>) -> Self {
        Observation::Sequence(flags)
    }
}

impl From<BTreeMap<String, bool>> for Observation {
    fn from(flags: BTreeMap<String, bool>) -> Self {
        Observation::Keyed(flags)
    }
}

fn position_name(i: usize) -> String {
    format!("at position {}", i + 1)
}

fn json_flag(value: &Value, symptom: impl FnOnce() -> String) -> Result<bool, PredictError> {
    match value {
        Value::Bool(b) => return Ok(*b),
        Value::Number(n) => match n.as_f64() {
            Some(x) if x == 0.0 => return Ok(false),
            Some(x) if x == 1.0 => return Ok(true),
            _ => {}
        },
        _ => {}
    }
    Err(PredictError::InvalidFlag {
        symptom: symptom(),
        value: value.to_string(),
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_object() {
        let obs = Observation::from_json(&json!({ "G6": 1, "G19": true, "G2": 0 })).unwrap();
        assert_eq!(
            obs,
            Observation::keyed([("G6", true), ("G19", true), ("G2", false)])
        );
        assert_eq!(obs.present_count(), 2);
    }

    #[test]
    fn test_from_json_array() {
        let obs = Observation::from_json(&json!([0, 1, false, 1.0])).unwrap();
        assert_eq!(obs, Observation::sequence(vec![false, true, false, true]));
    }

    #[test]
    fn test_from_json_scalar_is_unsupported() {
        for value in [json!(3), json!("G6"), json!(null), json!(true)] {
            let err = Observation::from_json(&value).unwrap_err();
            assert!(matches!(err, PredictError::UnsupportedInputType { .. }), "{value}");
        }
    }

    #[test]
    fn test_from_json_rejects_non_binary_flags() {
        let err = Observation::from_json(&json!({ "G6": 2 })).unwrap_err();
        assert!(
            matches!(err, PredictError::InvalidFlag { ref symptom, ref value } if symptom == "G6" && value == "2")
        );
        let err = Observation::from_json(&json!([0, "yes"])).unwrap_err();
        assert!(matches!(err, PredictError::InvalidFlag { ref symptom, .. } if symptom == "at position 2"));
    }

    #[test]
    fn test_from_flags() {
        assert_eq!(
            Observation::from_flags(&[1, 0, 1]).unwrap(),
            Observation::Sequence(vec![true, false, true])
        );
        assert!(matches!(
            Observation::from_flags(&[0, 7]),
            Err(PredictError::InvalidFlag { .. })
        ));
    }

    #[test]
    fn test_from_present() {
        let obs = Observation::from_present(["G6", "G19"]);
        assert_eq!(obs, Observation::keyed([("G19", true), ("G6", true)]));
    }
}
