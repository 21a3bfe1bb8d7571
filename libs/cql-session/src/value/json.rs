use serde_json::{Map, Number, Value, json};

use super::GenericValue;

impl GenericValue {
    /// JSON projection used by API front ends.
    ///
    /// 64-bit integers and decimals are emitted as strings so JavaScript
    /// clients do not lose precision; bytes become lowercase hex; maps become
    /// arrays of `{"key", "value"}` objects since keys need not be strings.
    pub fn to_json(&self) -> Value {
        match self {
            GenericValue::Null => Value::Null,
            GenericValue::Boolean(b) => Value::Bool(*b),
            GenericValue::Int8(v) => Value::from(*v),
            GenericValue::Int16(v) => Value::from(*v),
            GenericValue::Int32(v) => Value::from(*v),
            GenericValue::Int64(v) => Value::String(v.to_string()),
            GenericValue::Float32(v) => float_to_json(f64::from(*v)),
            GenericValue::Float64(v) => float_to_json(*v),
            GenericValue::Decimal(d) => Value::String(d.to_string()),
            GenericValue::Text(s) => Value::String(s.clone()),
            GenericValue::Bytes(bytes) => {
                Value::String(bytes.iter().map(|b| format!("{b:02x}")).collect())
            }
            GenericValue::List(items) | GenericValue::Set(items) => {
                Value::Array(items.iter().map(GenericValue::to_json).collect())
            }
            GenericValue::Map(entries) => Value::Array(
                entries
                    .iter()
                    .map(|(k, v)| json!({ "key": k.to_json(), "value": v.to_json() }))
                    .collect(),
            ),
        }
    }
}

// NaN and infinities have no JSON number form
fn float_to_json(v: f64) -> Value {
    Number::from_f64(v).map_or_else(|| Value::String(v.to_string()), Value::Number)
}

/// Project a decoded row into a JSON object keyed by column name
pub fn row_to_json<'a>(columns: impl IntoIterator<Item = (&'a str, &'a GenericValue)>) -> Value {
    Value::Object(
        columns
            .into_iter()
            .map(|(name, value)| (name.to_string(), value.to_json()))
            .collect::<Map<String, Value>>(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Decimal;

    #[test]
    fn test_scalars() {
        assert_eq!(GenericValue::Null.to_json(), Value::Null);
        assert_eq!(GenericValue::Int8(1).to_json(), json!(1));
        assert_eq!(GenericValue::Int64(1).to_json(), json!("1"));
        assert_eq!(GenericValue::Decimal(Decimal::new(125, 2)).to_json(), json!("1.25"));
        assert_eq!(GenericValue::Bytes(vec![0xca, 0xfe]).to_json(), json!("cafe"));
        assert_eq!(GenericValue::Float64(f64::NAN).to_json(), json!("NaN"));
    }

    #[test]
    fn test_extreme_decimal_scale_stays_compact() {
        let huge = GenericValue::Decimal(Decimal::new(1, -200_000_000)).to_json();
        assert_eq!(huge, json!("1E+200000000"));

        let tiny = GenericValue::Decimal(Decimal::new(-5, 200_000_000)).to_json();
        assert_eq!(tiny, json!("-5E-200000000"));
    }

    #[test]
    fn test_map_as_key_value_pairs() {
        let entry = (GenericValue::Int32(1), GenericValue::Text("a".into()));
        let value = GenericValue::Map(vec![entry]);
        assert_eq!(value.to_json(), json!([{ "key": 1, "value": "a" }]));
    }

    #[test]
    fn test_row_to_json() {
        let id = GenericValue::Int32(7);
        let name = GenericValue::Null;
        let row = row_to_json([("id", &id), ("name", &name)]);
        assert_eq!(row, json!({ "id": 7, "name": null }));
    }
}
