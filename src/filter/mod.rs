pub mod error;
pub mod filter;
pub mod filter_order;
pub mod filter_where;
pub mod types;

pub use error::FilterError;
pub use filter::{Listing, ListingSource, PROPERTY_LISTING, SHAREHOLDER_LISTING};
pub use types::*;
