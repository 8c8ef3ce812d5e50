//! Grader
//!
//! Checks a candidate drift estimator on a seeded synthetic dataset pair with two drifting
//! columns and one stable column. The candidate's scores must have the right keys, be finite,
//! agree with an independent reference, and classify drift correctly.
//!
//! # Submodules
//!
//! * `synthetic`: The seeded dataset pair.
//! * `reference`: The grader's own reference scores.
//! * `candidate`: Candidate interface, sources and the bounded worker.
//! * `report`: The pass/fail report.
//! * `checks`: The validation sequence.

pub mod candidate;
pub mod checks;
pub mod reference;
pub mod report;
pub mod synthetic;

pub use candidate::{
    BuiltinSource, Candidate, CandidateModule, CandidateSource, EstimatorCandidate, FnCandidate, ModuleSource,
    ProcessCandidate, ProcessSource,
};
pub use checks::{grade, grade_with};
pub use report::GradeReport;
