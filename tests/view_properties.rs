//! Property-style tests for the filter/sort engine.
//!
//! Each property is checked over a handful of record sets and every
//! combination of search term, sort key and direction.

mod support;

use std::sync::Arc;

use countryscope_core::{
    view, Country, CountrySet, ListStatus, MemoizedView, QuerySnapshot, SortField, SortOrder,
    ViewQuery,
};

use support::{chad_and_china, country};

const TERMS: [&str; 6] = ["", "ch", "CH", "a", "land", "xyz"];
const ORDERS: [SortOrder; 2] = [SortOrder::Ascending, SortOrder::Descending];

fn record_sets() -> Vec<Vec<Country>> {
    vec![
        Vec::new(),
        chad_and_china(),
        vec![
            country("Iceland", 370_000),
            country("Finland", 5_500_000),
            country("Chad", 17_000_000),
            country("Poland", 37_000_000),
            country("Ireland", 5_000_000),
            country("chile", 19_000_000),
            country("Chad", 1),
            country("Andorra", 370_000),
        ],
    ]
}

fn combinations() -> impl Iterator<Item = (&'static str, SortField, SortOrder)> {
    TERMS.into_iter().flat_map(|term| {
        SortField::ALL
            .into_iter()
            .flat_map(move |field| ORDERS.into_iter().map(move |order| (term, field, order)))
    })
}

fn key(country: &Country, field: SortField) -> (String, u64) {
    match field {
        SortField::Name => (country.name.common.to_lowercase(), 0),
        SortField::Population => (String::new(), country.population),
    }
}

fn position(records: &[Country], item: &Country) -> usize {
    records
        .iter()
        .position(|candidate| std::ptr::eq(candidate, item))
        .expect("view only returns input records")
}

fn names(rows: &[&Country]) -> Vec<String> {
    rows.iter().map(|country| country.name.common.clone()).collect()
}

// =============================================================================
// Filter/Sort Engine: Properties
// =============================================================================

#[test]
fn view_is_exactly_the_matching_subset() {
    for records in record_sets() {
        for (term, field, order) in combinations() {
            // Given / When
            let rows = view(&records, term, field, order);

            // Then: every match appears once, nothing else appears
            let needle = term.to_lowercase();
            let expected = records
                .iter()
                .filter(|country| country.name.common.to_lowercase().contains(&needle))
                .count();
            assert_eq!(rows.len(), expected, "term {term:?}");
            for row in &rows {
                assert!(row.name.common.to_lowercase().contains(&needle));
            }
            let mut positions = rows.iter().map(|row| position(&records, row)).collect::<Vec<_>>();
            positions.sort_unstable();
            positions.dedup();
            assert_eq!(positions.len(), rows.len());
        }
    }
}

#[test]
fn adjacent_rows_respect_the_sort_direction() {
    for records in record_sets() {
        for (term, field, order) in combinations() {
            let rows = view(&records, term, field, order);

            for pair in rows.windows(2) {
                let (a, b) = (key(pair[0], field), key(pair[1], field));
                match order {
                    SortOrder::Ascending => assert!(a <= b, "{a:?} > {b:?}"),
                    SortOrder::Descending => assert!(a >= b, "{a:?} < {b:?}"),
                }
            }
        }
    }
}

#[test]
fn equal_keys_keep_input_order_in_both_directions() {
    for records in record_sets() {
        for (term, field, order) in combinations() {
            let rows = view(&records, term, field, order);

            for pair in rows.windows(2) {
                if key(pair[0], field) == key(pair[1], field) {
                    assert!(
                        position(&records, pair[0]) < position(&records, pair[1]),
                        "tie reordered for {field} {order:?}"
                    );
                }
            }
        }
    }
}

#[test]
fn view_is_idempotent_and_does_not_touch_input() {
    for records in record_sets() {
        let before = records.clone();
        for (term, field, order) in combinations() {
            let first = names(&view(&records, term, field, order));
            let second = names(&view(&records, term, field, order));
            assert_eq!(first, second);
        }
        assert_eq!(records, before);
    }
}

// =============================================================================
// Filter/Sort Engine: Worked Scenarios
// =============================================================================

#[test]
fn scenario_search_ch_by_name_ascending() {
    // Given: Chad and China
    let records = chad_and_china();

    // When: Searching "ch" sorted by name ascending
    let rows = view(&records, "ch", SortField::Name, SortOrder::Ascending);

    // Then: Both are returned alphabetically
    assert_eq!(names(&rows), vec!["Chad", "China"]);
}

#[test]
fn scenario_population_descending() {
    // Given: Chad and China
    let records = chad_and_china();

    // When: Sorted by population descending
    let rows = view(&records, "ch", SortField::Population, SortOrder::Descending);

    // Then: The larger population comes first
    assert_eq!(names(&rows), vec!["China", "Chad"]);
}

#[test]
fn scenario_no_match_is_not_no_data() {
    // Given: A non-empty record set in the cache
    let records: CountrySet = Arc::from(chad_and_china());
    let snapshot = QuerySnapshot {
        data: Some(Arc::clone(&records)),
        ..QuerySnapshot::default()
    };

    // When: Searching for something absent
    let rows = view(&records, "xyz", SortField::Name, SortOrder::Ascending);
    let status = ListStatus::classify(&snapshot, rows.len(), "xyz");

    // Then: The view is empty but the state says "no matches"
    assert!(rows.is_empty());
    assert_eq!(
        status,
        ListStatus::NoMatches {
            search_term: String::from("xyz"),
            total: 2
        }
    );
    assert_ne!(status, ListStatus::classify(&QuerySnapshot::default(), 0, "xyz"));
}

// =============================================================================
// Filter/Sort Engine: Memoization
// =============================================================================

#[test]
fn memoized_view_agrees_with_view_and_skips_unchanged_redraws() {
    let records: CountrySet = Arc::from(record_sets().remove(2));
    let mut memo = MemoizedView::new();

    for (term, field, order) in combinations() {
        let query = ViewQuery::new(term, field, order);
        let expected = names(&view(&records, term, field, order));

        assert_eq!(names(&memo.get(&records, &query)), expected);
        let recomputations = memo.recomputations();
        assert_eq!(names(&memo.get(&records, &query)), expected);
        assert_eq!(memo.recomputations(), recomputations);
    }
}
