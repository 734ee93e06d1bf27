//! Record normalization — raw graph nodes to typed items.

pub mod key;
pub mod record;
pub mod table;

pub use key::split_composite_key;
pub use record::normalize;
pub use table::TypeTable;
