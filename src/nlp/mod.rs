//! Text normalization
//!
//! - [`tokenizer`]: the [`Tokenize`](tokenizer::Tokenize) seam and the
//!   default Unicode-aware [`Tokenizer`](tokenizer::Tokenizer)

pub mod tokenizer;
