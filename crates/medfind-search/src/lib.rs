//! Hospital search: location resolution, catalog join, and ranking.
//!
//! [`SearchService`] is the entry point. It resolves the caller's location
//! through a fixed fallback chain ([`LocationResolver`]), keeps only hospitals
//! offering the requested service ([`join_offerings`]), and orders the rows
//! deterministically ([`rank`]).

pub mod error;
pub mod join;
pub mod memory;
pub mod rank;
pub mod resolver;
pub mod service;

pub use error::SearchError;
pub use join::{effective_rating, join_offerings};
pub use memory::{FixtureError, MemoryStore, Review, StoreFixture};
pub use rank::{rank, rank_without_distance};
pub use resolver::{area_queries, Candidate, LocationQuery, LocationResolver, Resolution};
pub use service::{SearchOutcome, SearchRequest, SearchService};
