//! Structural validation of raw country records.
//!
//! The upstream schema varies between records, so validation is a
//! per-record accept/reject decision: [`validate_record`] either yields a
//! fully typed [`Country`] or the first [`ValidationError`] that disqualified
//! it. Rejected records are dropped by the caller, never defaulted.
//!
//! Required shape:
//!
//! | Field | Requirement |
//! |-------|-------------|
//! | `name` | object with string `common` and `official` |
//! | `flags` | object with string `png` |
//! | `region` | string |
//! | `latlng` | array of exactly two numbers |
//! | `population` | non-negative integer |
//! | `timezones` | array |
//! | `currencies` | object |
//! | `capital` | array |
//!
//! Inside accepted records, malformed optional parts (native-name entries,
//! currency entries, non-string list elements) are skipped.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::{Coordinates, Country, CountryName, Currency, Flags, NativeName, ValidationError};

/// Validates one candidate record.
pub fn validate_record(value: &Value) -> Result<Country, ValidationError> {
    let record = value.as_object().ok_or(ValidationError::RecordNotObject)?;

    let name = required_object(record, "name")?;
    let common = required_str(name, "name.common")?;
    let official = required_str(name, "name.official")?;
    let native_name = name
        .get("nativeName")
        .and_then(Value::as_object)
        .map(parse_native_names)
        .unwrap_or_default();

    let flags = required_object(record, "flags")?;
    let png = required_str(flags, "flags.png")?;

    let region = required_str(record, "region")?;
    let coordinates = parse_coordinates(record)?;
    let population = parse_population(record)?;
    let timezones = required_array(record, "timezones")?;
    let currencies = required_object(record, "currencies")?;
    let capital = required_array(record, "capital")?;

    Ok(Country {
        name: CountryName {
            common: common.to_owned(),
            official: official.to_owned(),
            native_name,
        },
        flags: Flags {
            png: png.to_owned(),
            svg: optional_string(flags, "svg"),
            alt: optional_string(flags, "alt"),
        },
        region: region.to_owned(),
        coordinates,
        population,
        timezones: strings(timezones),
        currencies: parse_currencies(currencies),
        capital: strings(capital),
    })
}

fn field<'a>(object: &'a Map<String, Value>, path: &'static str) -> Result<&'a Value, ValidationError> {
    let key = path.rsplit('.').next().unwrap_or(path);
    object
        .get(key)
        .filter(|value| !value.is_null())
        .ok_or(ValidationError::MissingField { field: path })
}

fn required_object<'a>(
    object: &'a Map<String, Value>,
    path: &'static str,
) -> Result<&'a Map<String, Value>, ValidationError> {
    field(object, path)?
        .as_object()
        .ok_or(ValidationError::WrongType {
            field: path,
            expected: "an object",
        })
}

fn required_str<'a>(object: &'a Map<String, Value>, path: &'static str) -> Result<&'a str, ValidationError> {
    field(object, path)?.as_str().ok_or(ValidationError::WrongType {
        field: path,
        expected: "a string",
    })
}

fn required_array<'a>(
    object: &'a Map<String, Value>,
    path: &'static str,
) -> Result<&'a Vec<Value>, ValidationError> {
    field(object, path)?
        .as_array()
        .ok_or(ValidationError::WrongType {
            field: path,
            expected: "an array",
        })
}

fn optional_string(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_owned)
}

fn strings(values: &[Value]) -> Vec<String> {
    values
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_owned)
        .collect()
}

fn parse_coordinates(record: &Map<String, Value>) -> Result<Coordinates, ValidationError> {
    let values = required_array(record, "latlng")?;
    if values.len() != 2 {
        return Err(ValidationError::InvalidCoordinates { len: values.len() });
    }

    let numbers = values
        .iter()
        .map(Value::as_f64)
        .collect::<Option<Vec<_>>>()
        .ok_or(ValidationError::WrongType {
            field: "latlng",
            expected: "an array of numbers",
        })?;

    Ok(Coordinates::new(numbers[0], numbers[1]))
}

fn parse_population(record: &Map<String, Value>) -> Result<u64, ValidationError> {
    let value = field(record, "population")?;
    let number = value.as_number().ok_or(ValidationError::WrongType {
        field: "population",
        expected: "a number",
    })?;

    if let Some(population) = number.as_u64() {
        return Ok(population);
    }

    // Integral floats such as `1.4e9` are still valid headcounts.
    match number.as_f64() {
        Some(float) if float.is_finite() && float >= 0.0 && float.fract() == 0.0 && float <= u64::MAX as f64 => {
            Ok(float as u64)
        }
        _ => Err(ValidationError::InvalidPopulation {
            value: number.to_string(),
        }),
    }
}

fn parse_native_names(object: &Map<String, Value>) -> IndexMap<String, NativeName> {
    object
        .iter()
        .filter_map(|(language, entry)| {
            let entry = entry.as_object()?;
            Some((
                language.clone(),
                NativeName {
                    official: entry.get("official")?.as_str()?.to_owned(),
                    common: entry.get("common")?.as_str()?.to_owned(),
                },
            ))
        })
        .collect()
}

fn parse_currencies(object: &Map<String, Value>) -> IndexMap<String, Currency> {
    object
        .iter()
        .filter_map(|(code, entry)| {
            let entry = entry.as_object()?;
            Some((
                code.clone(),
                Currency {
                    name: entry.get("name")?.as_str()?.to_owned(),
                    symbol: optional_string(entry, "symbol"),
                },
            ))
        })
        .collect()
}
