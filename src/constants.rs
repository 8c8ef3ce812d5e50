pub const N_BINS: usize = 20;
pub const KL_EPSILON: f64 = 1e-10;
pub const DEFAULT_THRESHOLD: f64 = 0.1;
pub const DEFAULT_SEED: u64 = 42;
pub const N_SYNTHETIC_ROWS: usize = 2000;
pub const SCORE_TOLERANCE: f64 = 1e-2;
pub const CANDIDATE_TIMEOUT_SECS: f64 = 30.0;
pub const CANDIDATE_SYMBOL: &str = "detect_drift";
