//! `stockmatch-matcher`: buyer/supplier stock matching engine.
//!
//! Pure engine crate: receives pre-loaded tables, returns ranked recommendations.
//! No CLI or file IO dependencies.

pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod model;
pub mod normalize;
pub mod ranker;
pub mod scorer;
pub mod summary;
pub mod table;
pub mod vocabulary;

pub use config::MatchConfig;
pub use engine::{explain_pair, run, MatchInput};
pub use error::MatchError;
pub use model::{
    BuyerPreference, MatchResult, RankedRecommendation, Recommendation, SupplierItem,
};
pub use table::RawTable;
