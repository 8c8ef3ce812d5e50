use crate::config::GraderConfig;
use crate::constants::{KL_EPSILON, N_BINS};
use crate::grader::candidate::{run_bounded, BuiltinSource, CandidateSource};
use crate::grader::reference::reference_scores;
use crate::grader::report::GradeReport;
use crate::grader::synthetic::{expected_columns, synthesize, DRIFT_COLUMNS, STABLE_COLUMN};
use crate::utils::fmt_name_set;
use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Grade the crate's own estimator on the dataset pair generated from `seed`.
pub fn grade(seed: u64) -> GradeReport {
    grade_with(&BuiltinSource, &GraderConfig::with_seed(seed))
}

/// Grade the candidate exported by `source`.
///
/// Checks run in order and the first failing one decides the report, except the final drift
/// classification, which reports a false positive and missed drift together.
/// Nothing the candidate does escapes as an error or a panic.
pub fn grade_with(source: &dyn CandidateSource, cfg: &GraderConfig) -> GradeReport {
    let report = run_checks(source, cfg);
    if report.passed {
        info!("Grade passed (seed {}).", cfg.seed);
    } else {
        warn!("Grade failed (seed {}): {}", cfg.seed, report.reasons.join("; "));
    }
    report
}

fn run_checks(source: &dyn CandidateSource, cfg: &GraderConfig) -> GradeReport {
    if let Err(e) = cfg.validate() {
        return GradeReport::fail(format!("invalid grader configuration: {}", e));
    }
    let timeout = match cfg.timeout() {
        Ok(t) => t,
        Err(e) => return GradeReport::fail(format!("invalid grader configuration: {}", e)),
    };
    let pair = match synthesize(cfg.seed, cfg.n_rows) {
        Ok(p) => p,
        Err(e) => return GradeReport::fail(format!("unable to generate data: {}", e)),
    };
    let old = Arc::new(pair.old);
    let new = Arc::new(pair.new);

    let module = match source.load() {
        Ok(m) => m,
        Err(e) => return GradeReport::fail(format!("import/exec failed: {}", e)),
    };

    let candidate = match module.get(&cfg.symbol) {
        Some(c) => c,
        None => return GradeReport::fail(format!("{}() not found", cfg.symbol)),
    };

    let invocation = match run_bounded(
        candidate,
        Arc::clone(&old),
        Arc::clone(&new),
        cfg.threshold,
        timeout,
    ) {
        Ok(i) => i,
        Err(e) => return GradeReport::fail(format!("{} crashed: {}", cfg.symbol, e)),
    };
    for notice in &invocation.notices {
        debug!("Candidate notice: {}", notice);
    }

    let mapping = match invocation.payload.as_object() {
        Some(m) => m,
        None => return GradeReport::fail("Return must be a mapping {column: score}"),
    };

    let expected: BTreeSet<&str> = expected_columns().into_iter().collect();
    let keys: BTreeSet<&str> = mapping.keys().map(String::as_str).collect();
    if keys != expected {
        return GradeReport::fail(format!("Wrong keys: {}", fmt_name_set(keys)));
    }

    let mut scores = Vec::with_capacity(expected.len());
    for col in &expected {
        match mapping[*col].as_f64() {
            Some(v) if v.is_finite() => scores.push((*col, v)),
            _ => return GradeReport::fail(format!("Non-finite KL for {}", col)),
        }
    }

    let columns: Vec<&str> = expected.iter().copied().collect();
    let refs = reference_scores(&old, &new, &columns, N_BINS, KL_EPSILON);
    let mismatch = scores.iter().any(|(col, v)| match refs.get(*col) {
        Some(r) => (v - r).abs() > cfg.tolerance,
        None => true,
    });
    if mismatch {
        return GradeReport::fail(format!("KL mismatch (>{:e})", cfg.tolerance));
    }

    let drifted: BTreeSet<&str> = scores
        .iter()
        .filter(|(_, v)| *v > cfg.threshold)
        .map(|(col, _)| *col)
        .collect();
    let mut reasons = Vec::new();
    if drifted.contains(STABLE_COLUMN) {
        reasons.push(format!("False positive: {} drifted", STABLE_COLUMN));
    }
    if !DRIFT_COLUMNS.iter().all(|c| drifted.contains(c)) {
        reasons.push(format!("Missed drift in {}", DRIFT_COLUMNS.join("/")));
    }
    if !reasons.is_empty() {
        return GradeReport::fail_many(reasons);
    }

    GradeReport::pass()
}
