//! Candidates
//!
//! The boundary between the grader and the implementation under test. A `CandidateSource`
//! loads a `CandidateModule`, a table of named `Candidate`s. Candidates return an untyped
//! JSON payload, which the grader checks for shape before it checks any numbers.
use crate::constants::CANDIDATE_SYMBOL;
use crate::data::Dataset;
use crate::drift::{DriftEstimator, DriftNotice, HistogramKl, NoticeSink};
use crate::errors::DriftError;
use hashbrown::HashMap;
use serde::Serialize;
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

/// An implementation of the drift estimator contract under test.
pub trait Candidate: Send + Sync {
    /// Score every column of `old` against `new`, returning the raw mapping payload.
    fn invoke(
        &self,
        old: &Dataset,
        new: &Dataset,
        threshold: f64,
        sink: &mut dyn NoticeSink,
    ) -> Result<Value, DriftError>;
}

/// Adapts a typed `DriftEstimator` into a candidate.
#[derive(Debug, Clone, Default)]
pub struct EstimatorCandidate<E>(pub E);

impl<E> Candidate for EstimatorCandidate<E>
where
    E: DriftEstimator + Send + Sync,
{
    fn invoke(
        &self,
        old: &Dataset,
        new: &Dataset,
        threshold: f64,
        sink: &mut dyn NoticeSink,
    ) -> Result<Value, DriftError> {
        let scores = self.0.estimate(old, new, threshold, sink)?;
        serde_json::to_value(scores).map_err(|e| DriftError::CandidateFailed(e.to_string()))
    }
}

/// A candidate backed by a closure.
pub struct FnCandidate<F> {
    f: F,
}

impl<F> FnCandidate<F>
where
    F: Fn(&Dataset, &Dataset, f64) -> Result<Value, DriftError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        FnCandidate { f }
    }
}

impl<F> Candidate for FnCandidate<F>
where
    F: Fn(&Dataset, &Dataset, f64) -> Result<Value, DriftError> + Send + Sync,
{
    fn invoke(
        &self,
        old: &Dataset,
        new: &Dataset,
        threshold: f64,
        _sink: &mut dyn NoticeSink,
    ) -> Result<Value, DriftError> {
        (self.f)(old, new, threshold)
    }
}

#[derive(Serialize)]
struct CandidateRequest<'a> {
    old: &'a Dataset,
    new: &'a Dataset,
    threshold: f64,
}

/// A candidate running as an external program.
///
/// The request `{"old": .., "new": .., "threshold": ..}` is written to the program's stdin
/// as JSON, and its stdout is parsed as the JSON payload.
#[derive(Debug, Clone)]
pub struct ProcessCandidate {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl ProcessCandidate {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        ProcessCandidate {
            program: program.into(),
            args,
        }
    }
}

impl Candidate for ProcessCandidate {
    fn invoke(
        &self,
        old: &Dataset,
        new: &Dataset,
        threshold: f64,
        _sink: &mut dyn NoticeSink,
    ) -> Result<Value, DriftError> {
        let request = serde_json::to_vec(&CandidateRequest { old, new, threshold })
            .map_err(|e| DriftError::UnableToWrite(e.to_string()))?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                DriftError::CandidateFailed(format!("unable to start {}: {}", self.program.display(), e))
            })?;

        // Written from its own thread, the child may fill its stdout before reading all of stdin.
        let writer = child.stdin.take().map(|mut stdin| {
            thread::spawn(move || {
                // A child exiting without reading closes the pipe early.
                let _ = stdin.write_all(&request);
            })
        });
        let output = child
            .wait_with_output()
            .map_err(|e| DriftError::UnableToRead(e.to_string()))?;
        if let Some(w) = writer {
            let _ = w.join();
        }

        if !output.status.success() {
            return Err(DriftError::CandidateFailed(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        serde_json::from_slice(&output.stdout)
            .map_err(|e| DriftError::CandidateFailed(format!("unreadable output: {}", e)))
    }
}

/// Named candidates exported by a loaded source.
#[derive(Clone, Default)]
pub struct CandidateModule {
    symbols: HashMap<String, Arc<dyn Candidate>>,
}

impl CandidateModule {
    pub fn new() -> Self {
        CandidateModule::default()
    }

    pub fn with(mut self, name: impl Into<String>, candidate: impl Candidate + 'static) -> Self {
        self.insert(name, candidate);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, candidate: impl Candidate + 'static) {
        self.symbols.insert(name.into(), Arc::new(candidate));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Candidate>> {
        self.symbols.get(name).cloned()
    }

    /// Sorted exported names.
    pub fn symbols(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.symbols.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for CandidateModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CandidateModule").field("symbols", &self.symbols()).finish()
    }
}

/// Somewhere a candidate module can be loaded from.
pub trait CandidateSource {
    fn load(&self) -> Result<CandidateModule, DriftError>;
}

impl<F> CandidateSource for F
where
    F: Fn() -> Result<CandidateModule, DriftError>,
{
    fn load(&self) -> Result<CandidateModule, DriftError> {
        self()
    }
}

/// Exports the crate's own estimator as `detect_drift`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinSource;

impl CandidateSource for BuiltinSource {
    fn load(&self) -> Result<CandidateModule, DriftError> {
        Ok(CandidateModule::new().with(CANDIDATE_SYMBOL, EstimatorCandidate(HistogramKl::default())))
    }
}

/// A module prepared ahead of time.
#[derive(Clone, Default)]
pub struct ModuleSource(pub CandidateModule);

impl CandidateSource for ModuleSource {
    fn load(&self) -> Result<CandidateModule, DriftError> {
        Ok(self.0.clone())
    }
}

/// Exports an external program under `symbol`.
///
/// Bare program names are resolved through `PATH` when invoked, explicit paths must exist at load.
#[derive(Debug, Clone)]
pub struct ProcessSource {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub symbol: String,
}

impl ProcessSource {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        ProcessSource {
            program: program.into(),
            args,
            symbol: CANDIDATE_SYMBOL.to_string(),
        }
    }
}

impl CandidateSource for ProcessSource {
    fn load(&self) -> Result<CandidateModule, DriftError> {
        if self.program.components().count() > 1 && !self.program.exists() {
            return Err(DriftError::CandidateLoad(format!(
                "{} does not exist",
                self.program.display()
            )));
        }
        Ok(CandidateModule::new().with(
            self.symbol.clone(),
            ProcessCandidate::new(self.program.clone(), self.args.clone()),
        ))
    }
}

/// What a finished candidate produced.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub payload: Value,
    pub notices: Vec<DriftNotice>,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}

/// Run a candidate on a worker thread, waiting at most `timeout`.
///
/// Panics are caught and returned as errors. A worker still running at the deadline is
/// abandoned, it cannot be stopped from here.
pub fn run_bounded(
    candidate: Arc<dyn Candidate>,
    old: Arc<Dataset>,
    new: Arc<Dataset>,
    threshold: f64,
    timeout: Duration,
) -> Result<Invocation, DriftError> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("drift-candidate".to_string())
        .spawn(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                let mut notices: Vec<DriftNotice> = Vec::new();
                candidate
                    .invoke(&old, &new, threshold, &mut notices)
                    .map(|payload| Invocation { payload, notices })
            }));
            // The grader may have stopped waiting.
            let _ = tx.send(result);
        })
        .map_err(|e| DriftError::CandidateFailed(format!("unable to start worker: {}", e)))?;

    match rx.recv_timeout(timeout) {
        Ok(Ok(result)) => result,
        Ok(Err(payload)) => Err(DriftError::CandidateFailed(panic_message(payload.as_ref()))),
        Err(mpsc::RecvTimeoutError::Timeout) => Err(DriftError::CandidateFailed(format!(
            "timed out after {}s",
            timeout.as_secs_f64()
        ))),
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Err(DriftError::CandidateFailed("worker exited without a result".to_string()))
        }
    }
}
