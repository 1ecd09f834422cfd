//! Word → line postings
//!
//! - [`inverted`]: the [`InvertedIndex`](inverted::InvertedIndex) built from a line store

pub mod inverted;

pub use inverted::InvertedIndex;
