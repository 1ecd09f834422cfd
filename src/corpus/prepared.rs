//! Prepared corpus snapshots
//!
//! A [`PreparedCorpus`] is the reduced corpus in a serializable form: the
//! surviving lines as word lists, the duplicates found during reduction, and
//! the tokenizer and reduction parameters it was built with. Runs configured with
//! [`DataSource::Cached`](crate::types::DataSource::Cached) reuse it instead
//! of tokenizing and reducing again.

use crate::corpus::store::LineStore;
use crate::errors::{ParadelleError, Result};
use crate::nlp::tokenizer::Tokenize;
use crate::reduce::{DuplicatesMap, Reduction};
use crate::search::context::SearchContext;
use crate::types::{LineId, OddballPolicy, SearchConfig};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// A reduced line with its words in canonical order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedLine {
    pub id: LineId,
    pub words: Vec<String>,
}

/// Serializable result of tokenizing and reducing a corpus
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PreparedCorpus {
    /// [`Tokenize::signature`] of the tokenizer that produced the words
    #[serde(default)]
    pub tokenizer: String,
    pub min_tokens: usize,
    pub oddball_policy: OddballPolicy,
    /// Records before reduction
    pub input_lines: usize,
    pub lines: Vec<PreparedLine>,
    pub duplicates: DuplicatesMap,
}

impl PreparedCorpus {
    /// Snapshot a reduction of lines split by `tokenizer` under `config`
    pub fn from_reduction<T: Tokenize + ?Sized>(
        reduction: &Reduction,
        config: &SearchConfig,
        tokenizer: &T,
    ) -> Self {
        let pool = reduction.store.pool();
        let lines = reduction
            .store
            .iter()
            .map(|line| PreparedLine {
                id: line.id,
                words: line
                    .words
                    .as_slice()
                    .iter()
                    .filter_map(|&w| pool.get(w))
                    .map(str::to_string)
                    .collect(),
            })
            .collect();

        Self {
            tokenizer: tokenizer.signature(),
            min_tokens: config.min_tokens,
            oddball_policy: config.oddball_policy,
            input_lines: reduction.report.input_lines,
            lines,
            duplicates: reduction.duplicates.clone(),
        }
    }

    /// Fail with [`ParadelleError::StaleCache`] when this snapshot was
    /// tokenized or reduced differently from `tokenizer` and `config`
    pub fn check_compatible<T: Tokenize + ?Sized>(
        &self,
        config: &SearchConfig,
        tokenizer: &T,
    ) -> Result<()> {
        let signature = tokenizer.signature();
        if self.tokenizer != signature {
            return Err(ParadelleError::stale_cache(format!(
                "prepared with tokenizer {:?}, configured {:?}",
                self.tokenizer, signature
            )));
        }
        if self.min_tokens != config.min_tokens {
            return Err(ParadelleError::stale_cache(format!(
                "prepared with min_tokens {}, configured {}",
                self.min_tokens, config.min_tokens
            )));
        }
        if self.oddball_policy != config.oddball_policy {
            return Err(ParadelleError::stale_cache(format!(
                "prepared with {:?} oddball policy, configured {:?}",
                self.oddball_policy, config.oddball_policy
            )));
        }
        Ok(())
    }

    /// Rebuild the line store
    pub fn to_store(&self) -> Result<LineStore> {
        LineStore::from_tokenized(self.lines.iter().map(|line| {
            (
                line.id,
                line.words.iter().map(String::as_str).collect::<Vec<_>>(),
            )
        }))
    }

    /// Rebuild the line store and index it
    pub fn to_context(&self) -> Result<SearchContext> {
        Ok(SearchContext::new(self.to_store()?))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_writer(&self, writer: impl Write) -> Result<()> {
        Ok(serde_json::to_writer(writer, self)?)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::tokenizer::Tokenizer;
    use crate::reduce::CorpusReducer;

    fn reduced(config: &SearchConfig) -> Reduction {
        let store = LineStore::from_tokenized(vec![
            (1, vec!["a", "b", "c"]),
            (2, vec!["a", "b", "c"]),
            (3, vec!["c", "b", "a"]),
            (4, vec!["a", "b", "c", "c"]),
            (5, vec!["a", "b", "c", "a"]),
            (6, vec!["x", "y"]),
        ])
        .unwrap();
        CorpusReducer::from_config(config).reduce(store)
    }

    #[test]
    fn test_snapshot_keeps_lines_and_duplicates() {
        let config = SearchConfig::default();
        let prepared = PreparedCorpus::from_reduction(&reduced(&config), &config, &Tokenizer::new());

        assert_eq!(prepared.input_lines, 6);
        let ids: Vec<_> = prepared.lines.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 4, 5]);
        assert_eq!(prepared.duplicates.get(&1), Some(&vec![2, 3]));
    }

    #[test]
    fn test_context_rebuilt_from_snapshot() {
        let config = SearchConfig::default();
        let reduction = reduced(&config);
        let prepared = PreparedCorpus::from_reduction(&reduction, &config, &Tokenizer::new());
        let ctx = prepared.to_context().unwrap();

        assert_eq!(ctx.len(), reduction.store.len());
        let c = ctx.store().pool().lookup("c").unwrap();
        assert_eq!(ctx.bag(4).unwrap().count(c), 2);
        assert!(ctx.index().is_consistent_with(ctx.store()));
    }

    #[test]
    fn test_json_round_trip() {
        let config = SearchConfig::default();
        let prepared = PreparedCorpus::from_reduction(&reduced(&config), &config, &Tokenizer::new());

        let json = prepared.to_json().unwrap();
        assert_eq!(PreparedCorpus::from_json(&json).unwrap(), prepared);

        let mut buf = Vec::new();
        prepared.to_writer(&mut buf).unwrap();
        assert_eq!(PreparedCorpus::from_reader(buf.as_slice()).unwrap(), prepared);
    }

    #[test]
    fn test_stale_parameters_rejected() {
        let config = SearchConfig::default();
        let prepared = PreparedCorpus::from_reduction(&reduced(&config), &config, &Tokenizer::new());

        let tokenizer = Tokenizer::new();

        assert!(prepared.check_compatible(&config, &tokenizer).is_ok());
        assert!(matches!(
            prepared.check_compatible(&config.clone().with_min_tokens(4), &tokenizer),
            Err(ParadelleError::StaleCache { .. })
        ));
        assert!(matches!(
            prepared.check_compatible(
                &config.clone().with_oddball_policy(OddballPolicy::Strict),
                &tokenizer
            ),
            Err(ParadelleError::StaleCache { .. })
        ));
        assert!(matches!(
            prepared.check_compatible(&config, &tokenizer.with_keep_emoji(true)),
            Err(ParadelleError::StaleCache { .. })
        ));
    }
}
