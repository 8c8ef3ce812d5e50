//! Drift notices
//!
//! Columns scoring above the threshold are reported to a `NoticeSink` instead of
//! being printed, so callers decide whether to log, collect or ignore them.
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A column whose score exceeded the threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftNotice {
    pub column: String,
    pub score: f64,
    pub threshold: f64,
}

impl fmt::Display for DriftNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Drifted: {} (KL={})", self.column, self.score)
    }
}

/// Receiver of drift notices.
pub trait NoticeSink {
    fn notify(&mut self, notice: DriftNotice);
}

/// Logs every notice at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl NoticeSink for LogSink {
    fn notify(&mut self, notice: DriftNotice) {
        info!("{}", notice);
    }
}

/// Drops every notice.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl NoticeSink for NullSink {
    fn notify(&mut self, _notice: DriftNotice) {}
}

impl NoticeSink for Vec<DriftNotice> {
    fn notify(&mut self, notice: DriftNotice) {
        self.push(notice);
    }
}
