//! Positional table comparison.
//!
//! Row N of one table is compared with row N of the other over the columns
//! both tables share, after normalizing every cell to its comparison text.

pub mod comparator;
pub mod normalize;
pub mod types;

pub use comparator::{compare, compare_columns, compare_with};
pub use normalize::{canonical_number, normalize};
pub use types::*;
