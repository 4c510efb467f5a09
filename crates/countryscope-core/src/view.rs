//! Filter/sort engine for the country list.
//!
//! [`view`] is a pure function of the record set and the query state. It
//! keeps records whose common name contains the search term
//! (case-insensitively) and orders them with a stable sort whose comparator
//! returns `Equal` for equal keys in both directions, so ties keep their
//! input order whether ascending or descending.

use std::cmp::Ordering;
use std::sync::Arc;

use serde::Serialize;

use crate::cache::{CountrySet, QuerySnapshot};
use crate::{Country, ExplorerState, FetchError, SortField, SortOrder};

/// Returns the filtered, ordered view of `records`.
pub fn view<'a>(
    records: &'a [Country],
    search_term: &str,
    sort_field: SortField,
    sort_order: SortOrder,
) -> Vec<&'a Country> {
    ordered_indices(records, search_term, sort_field, sort_order)
        .into_iter()
        .map(|index| &records[index])
        .collect()
}

/// Ordering used by [`view`] for one pair of records.
pub fn compare(a: &Country, b: &Country, sort_field: SortField, sort_order: SortOrder) -> Ordering {
    let a_name = a.name.common.to_lowercase();
    let b_name = b.name.common.to_lowercase();
    keyed_ordering(
        SortKey::new(&a_name, a),
        SortKey::new(&b_name, b),
        sort_field,
        sort_order,
    )
}

/// A record's lowercased name next to its population.
#[derive(Clone, Copy)]
struct SortKey<'a> {
    name: &'a str,
    population: u64,
}

impl<'a> SortKey<'a> {
    fn new(lowercase_name: &'a str, country: &Country) -> Self {
        Self {
            name: lowercase_name,
            population: country.population,
        }
    }
}

fn keyed_ordering(
    a: SortKey<'_>,
    b: SortKey<'_>,
    sort_field: SortField,
    sort_order: SortOrder,
) -> Ordering {
    let ordering = match sort_field {
        SortField::Name => a.name.cmp(b.name),
        SortField::Population => a.population.cmp(&b.population),
    };
    match sort_order {
        SortOrder::Ascending => ordering,
        SortOrder::Descending => ordering.reverse(),
    }
}

fn ordered_indices(
    records: &[Country],
    search_term: &str,
    sort_field: SortField,
    sort_order: SortOrder,
) -> Vec<usize> {
    let needle = search_term.to_lowercase();

    // Lowercased names are computed once per record, not per comparison.
    let mut keyed = records
        .iter()
        .enumerate()
        .filter_map(|(index, country)| {
            let name = country.name.common.to_lowercase();
            name.contains(&needle).then_some((name, index))
        })
        .collect::<Vec<_>>();

    keyed.sort_by(|(a_name, a), (b_name, b)| {
        keyed_ordering(
            SortKey::new(a_name, &records[*a]),
            SortKey::new(b_name, &records[*b]),
            sort_field,
            sort_order,
        )
    });

    keyed.into_iter().map(|(_, index)| index).collect()
}

/// The inputs of [`view`] besides the record set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ViewQuery {
    pub search_term: String,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
}

impl ViewQuery {
    pub fn new(search_term: impl Into<String>, sort_field: SortField, sort_order: SortOrder) -> Self {
        Self {
            search_term: search_term.into(),
            sort_field,
            sort_order,
        }
    }

    pub fn apply<'a>(&self, records: &'a [Country]) -> Vec<&'a Country> {
        view(records, &self.search_term, self.sort_field, self.sort_order)
    }
}

impl From<&ExplorerState> for ViewQuery {
    fn from(state: &ExplorerState) -> Self {
        Self::new(state.search_term(), state.sort_field(), state.sort_order())
    }
}

/// Caches the last computed view, keyed on the record-set identity and the
/// query. Re-rendering with unchanged inputs does no filtering or sorting.
#[derive(Debug, Default)]
pub struct MemoizedView {
    last: Option<(CountrySet, ViewQuery, Vec<usize>)>,
    recomputations: usize,
}

impl MemoizedView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the view for `records` and `query`, recomputing only when
    /// either changed since the previous call.
    pub fn get<'a>(&mut self, records: &'a CountrySet, query: &ViewQuery) -> Vec<&'a Country> {
        let hit = self
            .last
            .as_ref()
            .is_some_and(|(set, last_query, _)| Arc::ptr_eq(set, records) && last_query == query);

        if !hit {
            let indices = ordered_indices(records, &query.search_term, query.sort_field, query.sort_order);
            self.last = Some((Arc::clone(records), query.clone(), indices));
            self.recomputations += 1;
        }

        self.last
            .as_ref()
            .map(|(_, _, indices)| indices.iter().map(|&index| &records[index]).collect())
            .unwrap_or_default()
    }

    /// Number of times the view was actually recomputed.
    pub const fn recomputations(&self) -> usize {
        self.recomputations
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Which of the mutually exclusive list states to present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ListStatus {
    /// The most recent fetch failed.
    Failed { error: FetchError },
    /// First fetch still outstanding.
    Loading,
    /// Fetch succeeded (or never ran) and produced no records.
    NoData,
    /// Records exist but none match the search term.
    NoMatches { search_term: String, total: usize },
    Showing { shown: usize, total: usize },
}

impl ListStatus {
    /// Classifies the state of the list; errors take precedence over data.
    pub fn classify(snapshot: &QuerySnapshot, shown: usize, search_term: &str) -> Self {
        if let Some(error) = &snapshot.error {
            return Self::Failed {
                error: error.clone(),
            };
        }
        if snapshot.is_loading {
            return Self::Loading;
        }

        let total = snapshot.records().len();
        if total == 0 {
            return Self::NoData;
        }
        if shown == 0 {
            return Self::NoMatches {
                search_term: search_term.to_owned(),
                total,
            };
        }
        Self::Showing { shown, total }
    }

    /// User-facing text for the state.
    pub fn message(&self) -> String {
        match self {
            Self::Failed { error } => error.user_message(),
            Self::Loading => String::from("Loading countries..."),
            Self::NoData => String::from("No countries data available. Please try refreshing."),
            Self::NoMatches { search_term, .. } if search_term.is_empty() => {
                String::from("No countries found")
            }
            Self::NoMatches { search_term, .. } => {
                format!("No countries found matching \"{search_term}\"")
            }
            Self::Showing { shown, total } => format!("Showing {shown} of {total} countries"),
        }
    }
}
