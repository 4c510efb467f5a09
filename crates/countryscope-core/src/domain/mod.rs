//! # Domain Models
//!
//! Country records and the query state that drives the list view.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Country`] | One validated country record |
//! | [`CountryName`] | Common, official and native names |
//! | [`Flags`] | Flag image URLs and alt text |
//! | [`Currency`] | Currency name and symbol |
//! | [`Coordinates`] | Latitude/longitude pair |
//! | [`SortField`] | `name` or `population` |
//! | [`SortOrder`] | `asc` or `desc` |
//! | [`ExplorerState`] | Search term, sort controls and selection |
//!
//! Records are immutable after validation. A fetched set is shared as
//! `Arc<[Country]>` and replaced wholesale on refetch.

mod country;
mod query;

pub use country::{
    format_grouped, Coordinates, Country, CountryName, Currency, Flags, NativeName,
};
pub use query::{ExplorerState, SortField, SortOrder};
