//! Conversion between driver values and [`GenericValue`]
//!
//! Decoding is strict: the raw value must match the declared column type.
//! Encoding accepts a value when it converts to the declared type without
//! loss (an `Int8` fits any integer column, a `Float32` fits a double column,
//! text parses into uuid/inet columns), and otherwise fails with
//! [`SessionError::TypeMismatch`].

use std::net::IpAddr;

use scylla::value::{Counter, CqlDecimal, CqlTimestamp, CqlTimeuuid, CqlValue, CqlVarint};
use uuid::Uuid;

use super::{CqlType, Decimal, GenericValue};
use crate::common::{SessionError, SessionResult};

/// Decode a raw driver value read from `column`.
///
/// A missing value decodes to [`GenericValue::Null`] whatever the declared
/// type, so an unset `tinyint` reads back as `Null`, never `0`.
pub fn decode(
    column: &str,
    declared: &CqlType,
    raw: Option<CqlValue>,
) -> SessionResult<GenericValue> {
    match raw {
        None | Some(CqlValue::Empty) => Ok(GenericValue::Null),
        Some(value) => decode_present(column, declared, value),
    }
}

fn decode_present(
    column: &str,
    declared: &CqlType,
    value: CqlValue,
) -> SessionResult<GenericValue> {
    let decoded = match (declared, value) {
        (CqlType::Boolean, CqlValue::Boolean(v)) => GenericValue::Boolean(v),
        (CqlType::TinyInt, CqlValue::TinyInt(v)) => GenericValue::Int8(v),
        (CqlType::SmallInt, CqlValue::SmallInt(v)) => GenericValue::Int16(v),
        (CqlType::Int, CqlValue::Int(v)) => GenericValue::Int32(v),
        (CqlType::BigInt, CqlValue::BigInt(v)) => GenericValue::Int64(v),
        (CqlType::Counter, CqlValue::Counter(Counter(v))) => GenericValue::Int64(v),
        (CqlType::Timestamp, CqlValue::Timestamp(CqlTimestamp(millis))) => {
            GenericValue::Int64(millis)
        }
        (CqlType::Float, CqlValue::Float(v)) => GenericValue::Float32(v),
        (CqlType::Double, CqlValue::Double(v)) => GenericValue::Float64(v),
        (CqlType::Decimal, CqlValue::Decimal(d)) => {
            let (unscaled, scale) = d.as_signed_be_bytes_slice_and_exponent();
            GenericValue::Decimal(Decimal::from_signed_be_bytes(unscaled.to_vec(), scale))
        }
        (CqlType::Varint, CqlValue::Varint(v)) => {
            let unscaled = v.as_signed_bytes_be_slice().to_vec();
            GenericValue::Decimal(Decimal::from_signed_be_bytes(unscaled, 0))
        }
        (CqlType::Ascii | CqlType::Text, CqlValue::Ascii(s) | CqlValue::Text(s)) => {
            GenericValue::Text(s)
        }
        (CqlType::Blob, CqlValue::Blob(bytes)) => GenericValue::Bytes(bytes),
        (CqlType::Uuid, CqlValue::Uuid(id)) => GenericValue::Text(id.to_string()),
        (CqlType::Timeuuid, CqlValue::Timeuuid(id)) => {
            GenericValue::Text(Uuid::from(id).to_string())
        }
        (CqlType::Inet, CqlValue::Inet(addr)) => GenericValue::Text(addr.to_string()),
        (CqlType::List(element), CqlValue::List(items)) => {
            GenericValue::List(decode_elements(column, element, items)?)
        }
        (CqlType::Set(element), CqlValue::Set(items)) => {
            GenericValue::Set(decode_elements(column, element, items)?)
        }
        (CqlType::Map(key_type, value_type), CqlValue::Map(entries)) => GenericValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| {
                    Ok::<_, SessionError>((
                        decode(column, key_type, Some(k))?,
                        decode(column, value_type, Some(v))?,
                    ))
                })
                .collect::<SessionResult<_>>()?,
        ),
        (declared, other) => {
            return Err(SessionError::type_mismatch(column, declared, raw_kind(&other)));
        }
    };
    Ok(decoded)
}

fn decode_elements(
    column: &str,
    element: &CqlType,
    items: Vec<CqlValue>,
) -> SessionResult<Vec<GenericValue>> {
    items
        .into_iter()
        .map(|item| decode(column, element, Some(item)))
        .collect()
}

/// Encode `value` for binding to `column`.
///
/// `Null` encodes to `None`, the driver's null marker, for every declared
/// type.
pub fn encode(
    column: &str,
    declared: &CqlType,
    value: &GenericValue,
) -> SessionResult<Option<CqlValue>> {
    match value {
        GenericValue::Null => Ok(None),
        value => encode_present(column, declared, value).map(Some),
    }
}

fn encode_present(
    column: &str,
    declared: &CqlType,
    value: &GenericValue,
) -> SessionResult<CqlValue> {
    let mismatch = || SessionError::type_mismatch(column, declared, value.variant_name());
    let integer = || value.as_i64().ok_or_else(mismatch);

    let encoded = match (declared, value) {
        (CqlType::Boolean, GenericValue::Boolean(b)) => CqlValue::Boolean(*b),
        (CqlType::TinyInt, _) => {
            CqlValue::TinyInt(i8::try_from(integer()?).map_err(|_| mismatch())?)
        }
        (CqlType::SmallInt, _) => {
            CqlValue::SmallInt(i16::try_from(integer()?).map_err(|_| mismatch())?)
        }
        (CqlType::Int, _) => CqlValue::Int(i32::try_from(integer()?).map_err(|_| mismatch())?),
        (CqlType::BigInt, _) => CqlValue::BigInt(integer()?),
        (CqlType::Counter, _) => CqlValue::Counter(Counter(integer()?)),
        (CqlType::Timestamp, _) => CqlValue::Timestamp(CqlTimestamp(integer()?)),
        (CqlType::Float, GenericValue::Float32(f)) => CqlValue::Float(*f),
        (CqlType::Double, GenericValue::Float32(f)) => CqlValue::Double(f64::from(*f)),
        (CqlType::Double, GenericValue::Float64(f)) => CqlValue::Double(*f),
        (CqlType::Decimal, GenericValue::Decimal(d)) => {
            let unscaled = d.unscaled_be_bytes().to_vec();
            CqlValue::Decimal(CqlDecimal::from_signed_be_bytes_and_exponent(unscaled, d.scale()))
        }
        (CqlType::Decimal, _) => {
            let d = Decimal::new(integer()?.into(), 0);
            CqlValue::Decimal(CqlDecimal::from_signed_be_bytes_and_exponent(
                d.unscaled_be_bytes().to_vec(),
                0,
            ))
        }
        (CqlType::Varint, GenericValue::Decimal(d)) if d.scale() == 0 => {
            CqlValue::Varint(CqlVarint::from_signed_bytes_be(d.unscaled_be_bytes().to_vec()))
        }
        (CqlType::Varint, _) => {
            let d = Decimal::new(integer()?.into(), 0);
            CqlValue::Varint(CqlVarint::from_signed_bytes_be(d.unscaled_be_bytes().to_vec()))
        }
        (CqlType::Ascii, GenericValue::Text(s)) if s.is_ascii() => CqlValue::Ascii(s.clone()),
        (CqlType::Text, GenericValue::Text(s)) => CqlValue::Text(s.clone()),
        (CqlType::Blob, GenericValue::Bytes(bytes)) => CqlValue::Blob(bytes.clone()),
        (CqlType::Uuid, GenericValue::Text(s)) => {
            CqlValue::Uuid(Uuid::parse_str(s).map_err(|_| mismatch())?)
        }
        (CqlType::Timeuuid, GenericValue::Text(s)) => {
            let id = Uuid::parse_str(s).map_err(|_| mismatch())?;
            CqlValue::Timeuuid(CqlTimeuuid::from(id))
        }
        (CqlType::Inet, GenericValue::Text(s)) => {
            CqlValue::Inet(s.parse::<IpAddr>().map_err(|_| mismatch())?)
        }
        (CqlType::List(element), GenericValue::List(items)) => {
            CqlValue::List(encode_elements(column, element, items)?)
        }
        // Front ends usually deliver sets as plain lists
        (CqlType::Set(element), GenericValue::Set(items) | GenericValue::List(items)) => {
            CqlValue::Set(encode_elements(column, element, items)?)
        }
        (CqlType::Map(key_type, value_type), GenericValue::Map(entries)) => CqlValue::Map(
            entries
                .iter()
                .map(|(k, v)| {
                    Ok::<_, SessionError>((
                        encode_present(column, key_type, k)?,
                        encode_present(column, value_type, v)?,
                    ))
                })
                .collect::<SessionResult<_>>()?,
        ),
        _ => return Err(mismatch()),
    };
    Ok(encoded)
}

// Collection elements cannot be null in CQL, so Null is a mismatch here
fn encode_elements(
    column: &str,
    element: &CqlType,
    items: &[GenericValue],
) -> SessionResult<Vec<CqlValue>> {
    items
        .iter()
        .map(|item| encode_present(column, element, item))
        .collect()
}

fn raw_kind(value: &CqlValue) -> &'static str {
    match value {
        CqlValue::Ascii(_) => "ascii",
        CqlValue::Boolean(_) => "boolean",
        CqlValue::Blob(_) => "blob",
        CqlValue::Counter(_) => "counter",
        CqlValue::Decimal(_) => "decimal",
        CqlValue::Date(_) => "date",
        CqlValue::Double(_) => "double",
        CqlValue::Duration(_) => "duration",
        CqlValue::Empty => "empty",
        CqlValue::Float(_) => "float",
        CqlValue::Int(_) => "int",
        CqlValue::BigInt(_) => "bigint",
        CqlValue::Text(_) => "text",
        CqlValue::Timestamp(_) => "timestamp",
        CqlValue::Inet(_) => "inet",
        CqlValue::List(_) => "list",
        CqlValue::Map(_) => "map",
        CqlValue::Set(_) => "set",
        CqlValue::SmallInt(_) => "smallint",
        CqlValue::TinyInt(_) => "tinyint",
        CqlValue::Time(_) => "time",
        CqlValue::Timeuuid(_) => "timeuuid",
        CqlValue::Tuple(_) => "tuple",
        CqlValue::Uuid(_) => "uuid",
        CqlValue::Varint(_) => "varint",
        _ => "unsupported value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(declared: &CqlType, value: GenericValue) -> GenericValue {
        let raw = encode("col", declared, &value).unwrap();
        decode("col", declared, raw).unwrap()
    }

    #[test]
    fn test_integer_round_trip_keeps_width() {
        for v in [i8::MIN, -1, 0, 1, i8::MAX] {
            assert_eq!(round_trip(&CqlType::TinyInt, GenericValue::Int8(v)), GenericValue::Int8(v));
        }
        for v in [i16::MIN, 0, i16::MAX] {
            let value = GenericValue::Int16(v);
            assert_eq!(round_trip(&CqlType::SmallInt, value.clone()), value);
        }
        for v in [i32::MIN, 0, i32::MAX] {
            assert_eq!(round_trip(&CqlType::Int, GenericValue::Int32(v)), GenericValue::Int32(v));
        }
        for v in [i64::MIN, 0, i64::MAX] {
            let value = GenericValue::Int64(v);
            assert_eq!(round_trip(&CqlType::BigInt, value.clone()), value);
        }
    }

    #[test]
    fn test_decode_does_not_widen() {
        let value = decode("v", &CqlType::SmallInt, Some(CqlValue::SmallInt(1))).unwrap();
        assert_eq!(value, GenericValue::Int16(1));
        assert_eq!(value.integer_width(), Some(16));
    }

    #[test]
    fn test_decimal_round_trip_is_exact() {
        let cases = [
            Decimal::new(125, 2),
            Decimal::new(-1, 0),
            Decimal::new(i128::MAX, 38),
            Decimal::new(7, -3),
        ];
        for d in cases {
            assert_eq!(
                round_trip(&CqlType::Decimal, GenericValue::Decimal(d.clone())),
                GenericValue::Decimal(d)
            );
        }
    }

    #[test]
    fn test_decode_decimal_as_stored() {
        let raw = CqlValue::Decimal(CqlDecimal::from_signed_be_bytes_and_exponent(vec![125], 2));
        let value = decode("price", &CqlType::Decimal, Some(raw)).unwrap();
        match value {
            GenericValue::Decimal(d) => {
                assert_eq!(d.unscaled_i128(), Some(125));
                assert_eq!(d.scale(), 2);
            }
            other => panic!("expected decimal, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_value_is_null_for_every_type() {
        let types = [
            CqlType::TinyInt,
            CqlType::SmallInt,
            CqlType::Int,
            CqlType::BigInt,
            CqlType::Float,
            CqlType::Double,
            CqlType::Decimal,
            CqlType::Text,
            CqlType::Blob,
            CqlType::Boolean,
            CqlType::list(CqlType::Int),
            CqlType::map(CqlType::Text, CqlType::Int),
        ];
        for declared in &types {
            assert_eq!(decode("c", declared, None).unwrap(), GenericValue::Null);
            assert_eq!(encode("c", declared, &GenericValue::Null).unwrap(), None);
        }
    }

    #[test]
    fn test_empty_collection_is_not_null() {
        let declared = CqlType::list(CqlType::Int);
        let encoded = encode("tags", &declared, &GenericValue::List(vec![])).unwrap();
        assert_eq!(encoded, Some(CqlValue::List(vec![])));
        assert_eq!(
            decode("tags", &declared, encoded).unwrap(),
            GenericValue::List(vec![])
        );
    }

    #[test]
    fn test_type_mismatch_identifies_column() {
        let err = encode("age", &CqlType::TinyInt, &GenericValue::Text("old".into())).unwrap_err();
        match err {
            SessionError::TypeMismatch { column, declared, offered } => {
                assert_eq!(column, "age");
                assert_eq!(declared, "tinyint");
                assert_eq!(offered, "Text");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_out_of_range_integer_is_mismatch() {
        let err = encode("age", &CqlType::TinyInt, &GenericValue::Int32(300)).unwrap_err();
        assert!(matches!(err, SessionError::TypeMismatch { .. }));
        assert_eq!(
            encode("age", &CqlType::TinyInt, &GenericValue::Int32(12)).unwrap(),
            Some(CqlValue::TinyInt(12))
        );
    }

    #[test]
    fn test_float_widening_only() {
        assert_eq!(
            encode("d", &CqlType::Double, &GenericValue::Float32(1.5)).unwrap(),
            Some(CqlValue::Double(1.5))
        );
        assert!(encode("f", &CqlType::Float, &GenericValue::Float64(1.5)).is_err());
    }

    #[test]
    fn test_decode_mismatch_reports_raw_kind() {
        let err = decode("id", &CqlType::Int, Some(CqlValue::Text("x".into()))).unwrap_err();
        match err {
            SessionError::TypeMismatch { declared, offered, .. } => {
                assert_eq!(declared, "int");
                assert_eq!(offered, "text");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_nested_collections() {
        let declared = CqlType::map(CqlType::Text, CqlType::list(CqlType::SmallInt));
        let value = GenericValue::Map(vec![(
            GenericValue::Text("a".into()),
            GenericValue::List(vec![GenericValue::Int16(1), GenericValue::Int16(2)]),
        )]);
        assert_eq!(round_trip(&declared, value.clone()), value);
    }

    #[test]
    fn test_null_collection_element_is_rejected() {
        let declared = CqlType::list(CqlType::Int);
        let value = GenericValue::List(vec![GenericValue::Int32(1), GenericValue::Null]);
        assert!(matches!(
            encode("xs", &declared, &value),
            Err(SessionError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_set_accepts_list_input() {
        let declared = CqlType::set(CqlType::Text);
        let encoded = encode("s", &declared, &GenericValue::List(vec!["a".into()])).unwrap();
        assert_eq!(encoded, Some(CqlValue::Set(vec![CqlValue::Text("a".into())])));
    }

    #[test]
    fn test_uuid_and_inet_travel_as_text() {
        let id = "0b9a2f3c-1d4e-4f5a-9b6c-7d8e9f0a1b2c";
        assert_eq!(
            round_trip(&CqlType::Uuid, GenericValue::Text(id.into())),
            GenericValue::Text(id.into())
        );
        assert_eq!(
            round_trip(&CqlType::Inet, GenericValue::Text("10.0.0.1".into())),
            GenericValue::Text("10.0.0.1".into())
        );
        assert!(encode("u", &CqlType::Uuid, &GenericValue::Text("nope".into())).is_err());
    }

    #[test]
    fn test_varint_requires_integral_decimal() {
        assert!(encode("v", &CqlType::Varint, &GenericValue::Decimal(Decimal::new(1, 1))).is_err());
        assert_eq!(
            round_trip(&CqlType::Varint, GenericValue::Decimal(Decimal::new(-300, 0))),
            GenericValue::Decimal(Decimal::new(-300, 0))
        );
    }

    #[test]
    fn test_empty_raw_value_is_null() {
        assert_eq!(
            decode("n", &CqlType::Int, Some(CqlValue::Empty)).unwrap(),
            GenericValue::Null
        );
    }
}
