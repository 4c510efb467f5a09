use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Country, ValidationError};

/// Key a country list is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Name,
    Population,
}

impl SortField {
    pub const ALL: [Self; 2] = [Self::Name, Self::Population];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Population => "population",
        }
    }
}

impl Display for SortField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "population" => Ok(Self::Population),
            other => Err(ValidationError::InvalidSortField {
                value: other.to_owned(),
            }),
        }
    }
}

/// Direction of a sort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortOrder {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }

    pub const fn reversed(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

impl Display for SortOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            other => Err(ValidationError::InvalidSortOrder {
                value: other.to_owned(),
            }),
        }
    }
}

/// Ephemeral user-facing query state: search box, sort controls and the
/// currently open detail view.
///
/// The selection stores only the identity key of a record; it never owns
/// or borrows the record itself, so replacing the record set cannot leave
/// a dangling selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplorerState {
    search_term: String,
    sort_field: SortField,
    sort_order: SortOrder,
    selected: Option<String>,
}

impl ExplorerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub const fn sort_field(&self) -> SortField {
        self.sort_field
    }

    pub const fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    pub fn selected_key(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn set_sort_field(&mut self, field: SortField) {
        self.sort_field = field;
    }

    pub fn set_sort_order(&mut self, order: SortOrder) {
        self.sort_order = order;
    }

    pub fn select(&mut self, country: &Country) {
        self.selected = Some(country.key().to_owned());
    }

    pub fn close_detail(&mut self) {
        self.selected = None;
    }

    /// Resolves the selection against the current record set.
    pub fn selected_in<'a>(&self, records: &'a [Country]) -> Option<&'a Country> {
        let key = self.selected.as_deref()?;
        records.iter().find(|country| country.key() == key)
    }
}
