use std::fmt::{Display, Formatter};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Native-language name pair keyed by language code in [`CountryName`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeName {
    pub official: String,
    pub common: String,
}

/// Display names of a country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryName {
    /// Common display name, also the identity key within one fetched set.
    pub common: String,
    pub official: String,
    /// Language code to native name, in upstream order.
    #[serde(default)]
    pub native_name: IndexMap<String, NativeName>,
}

/// Flag image references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flags {
    pub png: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

/// Latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl Display for Coordinates {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

/// Currency name and symbol keyed by ISO code in [`Country::currencies`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

impl Display for Currency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.symbol {
            Some(symbol) => write!(f, "{} {symbol}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// One nation as returned by the countries endpoint.
///
/// Records are built once by [`crate::validate::validate_record`] and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub name: CountryName,
    pub flags: Flags,
    pub region: String,
    pub coordinates: Coordinates,
    pub population: u64,
    #[serde(default)]
    pub timezones: Vec<String>,
    #[serde(default)]
    pub currencies: IndexMap<String, Currency>,
    #[serde(default)]
    pub capital: Vec<String>,
}

impl Country {
    /// Identity key used by list rendering and selection.
    pub fn key(&self) -> &str {
        &self.name.common
    }

    /// Common name in the first listed native language, falling back to
    /// the English common name.
    pub fn native_name(&self) -> &str {
        self.name
            .native_name
            .values()
            .next()
            .map(|native| native.common.as_str())
            .filter(|common| !common.is_empty())
            .unwrap_or(&self.name.common)
    }

    /// First listed currency with its code.
    pub fn primary_currency(&self) -> Option<(&str, &Currency)> {
        self.currencies
            .iter()
            .next()
            .map(|(code, currency)| (code.as_str(), currency))
    }

    pub fn primary_capital(&self) -> Option<&str> {
        self.capital.first().map(String::as_str)
    }

    /// Alt text for the flag image, or a generated description.
    pub fn flag_alt(&self) -> String {
        match self.flags.alt.as_deref() {
            Some(alt) if !alt.trim().is_empty() => alt.to_owned(),
            _ => format!("Flag of {}", self.name.common),
        }
    }

    pub fn formatted_population(&self) -> String {
        format_grouped(self.population)
    }
}

/// Formats an integer with en-US thousands separators.
pub fn format_grouped(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Country {
        let mut native_name = IndexMap::new();
        native_name.insert(
            String::from("fra"),
            NativeName {
                official: String::from("République du Tchad"),
                common: String::from("Tchad"),
            },
        );
        native_name.insert(
            String::from("ara"),
            NativeName {
                official: String::from("جمهورية تشاد"),
                common: String::from("تشاد"),
            },
        );
        let mut currencies = IndexMap::new();
        currencies.insert(
            String::from("XAF"),
            Currency {
                name: String::from("Central African CFA franc"),
                symbol: Some(String::from("Fr")),
            },
        );

        Country {
            name: CountryName {
                common: String::from("Chad"),
                official: String::from("Republic of Chad"),
                native_name,
            },
            flags: Flags {
                png: String::from("https://flagcdn.com/w320/td.png"),
                svg: None,
                alt: None,
            },
            region: String::from("Africa"),
            coordinates: Coordinates::new(15.0, 19.0),
            population: 16_425_859,
            timezones: vec![String::from("UTC+01:00")],
            currencies,
            capital: vec![String::from("N'Djamena")],
        }
    }

    #[test]
    fn native_name_uses_first_entry_in_upstream_order() {
        assert_eq!(sample().native_name(), "Tchad");
    }

    #[test]
    fn native_name_falls_back_to_common_name() {
        let mut country = sample();
        country.name.native_name.clear();
        assert_eq!(country.native_name(), "Chad");
    }

    #[test]
    fn primary_currency_returns_first_entry() {
        let country = sample();
        let (code, currency) = country.primary_currency().expect("has currency");
        assert_eq!(code, "XAF");
        assert_eq!(currency.to_string(), "Central African CFA franc Fr");
    }

    #[test]
    fn missing_capital_and_currency_are_none() {
        let mut country = sample();
        country.capital.clear();
        country.currencies.clear();
        assert!(country.primary_capital().is_none());
        assert!(country.primary_currency().is_none());
    }

    #[test]
    fn flag_alt_falls_back_to_generated_text() {
        assert_eq!(sample().flag_alt(), "Flag of Chad");
    }

    #[test]
    fn population_is_grouped_en_us() {
        assert_eq!(format_grouped(0), "0");
        assert_eq!(format_grouped(999), "999");
        assert_eq!(format_grouped(1_000), "1,000");
        assert_eq!(format_grouped(1_400_000_000), "1,400,000,000");
        assert_eq!(sample().formatted_population(), "16,425,859");
    }

    #[test]
    fn coordinates_display_as_pair() {
        assert_eq!(Coordinates::new(15.0, 19.5).to_string(), "15, 19.5");
    }
}
