use std::fmt;
use std::str::FromStr;

use crate::common::SessionError;

/// Declared CQL column type.
///
/// Mirrors the driver's column type closely enough to drive the codec and to
/// render DDL. Types the codec has no generic mapping for (durations, UDTs,
/// tuples, vectors, dates) are carried as `Unsupported` with their CQL name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CqlType {
    Ascii,
    Boolean,
    Blob,
    Counter,
    Decimal,
    Double,
    Float,
    Int,
    BigInt,
    Text,
    Timestamp,
    Inet,
    SmallInt,
    TinyInt,
    Timeuuid,
    Uuid,
    Varint,
    List(Box<CqlType>),
    Set(Box<CqlType>),
    Map(Box<CqlType>, Box<CqlType>),
    Unsupported(String),
}

impl CqlType {
    pub fn list(element: CqlType) -> Self {
        CqlType::List(Box::new(element))
    }

    pub fn set(element: CqlType) -> Self {
        CqlType::Set(Box::new(element))
    }

    pub fn map(key: CqlType, value: CqlType) -> Self {
        CqlType::Map(Box::new(key), Box::new(value))
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, CqlType::List(_) | CqlType::Set(_) | CqlType::Map(_, _))
    }

    fn native_name(&self) -> Option<&'static str> {
        let name = match self {
            CqlType::Ascii => "ascii",
            CqlType::Boolean => "boolean",
            CqlType::Blob => "blob",
            CqlType::Counter => "counter",
            CqlType::Decimal => "decimal",
            CqlType::Double => "double",
            CqlType::Float => "float",
            CqlType::Int => "int",
            CqlType::BigInt => "bigint",
            CqlType::Text => "text",
            CqlType::Timestamp => "timestamp",
            CqlType::Inet => "inet",
            CqlType::SmallInt => "smallint",
            CqlType::TinyInt => "tinyint",
            CqlType::Timeuuid => "timeuuid",
            CqlType::Uuid => "uuid",
            CqlType::Varint => "varint",
            _ => return None,
        };
        Some(name)
    }

    fn from_native_name(name: &str) -> Option<Self> {
        let typ = match name {
            "ascii" => CqlType::Ascii,
            "boolean" => CqlType::Boolean,
            "blob" => CqlType::Blob,
            "counter" => CqlType::Counter,
            "decimal" => CqlType::Decimal,
            "double" => CqlType::Double,
            "float" => CqlType::Float,
            "int" => CqlType::Int,
            "bigint" => CqlType::BigInt,
            "text" | "varchar" => CqlType::Text,
            "timestamp" => CqlType::Timestamp,
            "inet" => CqlType::Inet,
            "smallint" => CqlType::SmallInt,
            "tinyint" => CqlType::TinyInt,
            "timeuuid" => CqlType::Timeuuid,
            "uuid" => CqlType::Uuid,
            "varint" => CqlType::Varint,
            _ => return None,
        };
        Some(typ)
    }

    // Collections nested in collections must be frozen in DDL
    fn fmt_element(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_collection() {
            write!(f, "frozen<{self}>")
        } else {
            write!(f, "{self}")
        }
    }
}

impl fmt::Display for CqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CqlType::List(element) => {
                f.write_str("list<")?;
                element.fmt_element(f)?;
                f.write_str(">")
            }
            CqlType::Set(element) => {
                f.write_str("set<")?;
                element.fmt_element(f)?;
                f.write_str(">")
            }
            CqlType::Map(key, value) => {
                f.write_str("map<")?;
                key.fmt_element(f)?;
                f.write_str(", ")?;
                value.fmt_element(f)?;
                f.write_str(">")
            }
            CqlType::Unsupported(name) => f.write_str(name),
            native => f.write_str(native.native_name().unwrap_or_default()),
        }
    }
}

impl FromStr for CqlType {
    type Err = SessionError;

    /// Parses CQL type names such as `int`, `map<text, frozen<list<int>>>`.
    /// `frozen<...>` is accepted and unwrapped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_type(s)
            .ok_or_else(|| SessionError::InvalidDefinition(format!("unknown CQL type '{s}'")))
    }
}

fn parse_type(input: &str) -> Option<CqlType> {
    let input = input.trim();
    let Some(open) = input.find('<') else {
        return CqlType::from_native_name(&input.to_ascii_lowercase());
    };
    let inner = input[open + 1..].strip_suffix('>')?;
    let name = input[..open].trim().to_ascii_lowercase();
    let args = split_top_level(inner)?;

    match (name.as_str(), args.as_slice()) {
        ("frozen", [element]) => parse_type(element),
        ("list", [element]) => Some(CqlType::list(parse_type(element)?)),
        ("set", [element]) => Some(CqlType::set(parse_type(element)?)),
        ("map", [key, value]) => Some(CqlType::map(parse_type(key)?, parse_type(value)?)),
        _ => None,
    }
}

fn split_top_level(input: &str) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                parts.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    parts.push(&input[start..]);
    Some(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_native_and_collections() {
        assert_eq!(CqlType::TinyInt.to_string(), "tinyint");
        assert_eq!(CqlType::list(CqlType::Int).to_string(), "list<int>");
        assert_eq!(
            CqlType::map(CqlType::Text, CqlType::set(CqlType::Uuid)).to_string(),
            "map<text, frozen<set<uuid>>>"
        );
    }

    #[test]
    fn test_parse_round_trips_display() {
        let names = ["int", "bigint", "list<text>", "map<text, frozen<list<int>>>", "set<decimal>"];
        for name in names {
            let parsed: CqlType = name.parse().unwrap();
            assert_eq!(parsed.to_string(), name);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive_and_accepts_varchar() {
        assert_eq!("VARCHAR".parse::<CqlType>().unwrap(), CqlType::Text);
        assert_eq!(
            "Map< Text , Int >".parse::<CqlType>().unwrap(),
            CqlType::map(CqlType::Text, CqlType::Int)
        );
    }

    #[test]
    fn test_parse_rejects_unknown_and_malformed() {
        assert!("duration".parse::<CqlType>().is_err());
        assert!("list<int".parse::<CqlType>().is_err());
        assert!("map<int>".parse::<CqlType>().is_err());
        assert!("list<int>>".parse::<CqlType>().is_err());
    }
}
