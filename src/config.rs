#[allow(dead_code)]
pub(crate) const DEFAULT_MAX_ITERATIONS :usize = 100;

#[allow(dead_code)]
pub(crate) const DEFAULT_MUTATION_PROB :f64 = 0.0;

#[allow(dead_code)]
pub(crate) const MERGE_LOG_INTERVAL :usize = 1000;
