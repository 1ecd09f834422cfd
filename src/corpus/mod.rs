//! Corpus storage
//!
//! - [`store`]: the immutable [`LineStore`](store::LineStore)
//! - [`prepared`]: the serializable [`PreparedCorpus`](prepared::PreparedCorpus)
//!   that caches a reduction between runs

pub mod prepared;
pub mod store;

pub use prepared::{PreparedCorpus, PreparedLine};
pub use store::{Line, LineStore};
