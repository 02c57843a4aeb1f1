//! Read back one instrument's rows from a saved run.
//!
//! Works on the `signals` and `alpha_scores` tables written by
//! [`write_artifacts`](crate::export::write_artifacts), filtered by instrument
//! and an optional inclusive date range.

use chrono::NaiveDate;
use hybridalpha_core::domain::{AlphaScoreRow, AlphaSignalRow};

use crate::export::{ALPHA_SCORES_TABLE, SIGNALS_TABLE};
use crate::store::{StoreError, TableStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectQuery {
    pub instrument: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl InspectQuery {
    pub fn new(instrument: impl Into<String>) -> Self {
        Self {
            instrument: instrument.into(),
            start: None,
            end: None,
        }
    }

    pub fn between(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn matches(&self, instrument: &str, date: NaiveDate) -> bool {
        instrument == self.instrument
            && self.start.map_or(true, |s| date >= s)
            && self.end.map_or(true, |e| date <= e)
    }
}

pub fn inspect_signals<S: TableStore>(
    store: &S,
    query: &InspectQuery,
) -> Result<Vec<AlphaSignalRow>, StoreError> {
    let rows: Vec<AlphaSignalRow> = store.read_table(SIGNALS_TABLE)?;
    Ok(rows
        .into_iter()
        .filter(|r| query.matches(&r.instrument, r.date))
        .collect())
}

pub fn inspect_alpha_scores<S: TableStore>(
    store: &S,
    query: &InspectQuery,
) -> Result<Vec<AlphaScoreRow>, StoreError> {
    let rows: Vec<AlphaScoreRow> = store.read_table(ALPHA_SCORES_TABLE)?;
    Ok(rows
        .into_iter()
        .filter(|r| query.matches(&r.instrument, r.date))
        .collect())
}
