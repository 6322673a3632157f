//! Value objects - immutable records without identity of their own

mod history;

pub use history::History;
