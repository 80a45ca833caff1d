//! Presentation logic for the marketplace pages: filtering, bidding rules,
//! delivery progress, distances and rupee formatting.

pub mod bidding;
pub mod catalog;
pub mod currency;
pub mod geo;
pub mod logistics;

pub use bidding::{BidBoard, BidDraft, BiddingError};
pub use catalog::CatalogQuery;
