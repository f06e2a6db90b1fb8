#![warn(missing_docs)]
#![doc(test(no_crate_inject))]
#![doc(test(attr(deny(unused, future_incompatible))))]

//! This crate selects the best "minimally complex model" for a dataset of categorical
//! observations: a partition of the variables into disjoint components, where variables inside a
//! component may depend on each other arbitrarily and variables in different components are
//! independent.
//!
//! Each partition is scored by its Bayesian log-evidence, the log of the marginal likelihood of
//! the data under a Dirichlet-multinomial model with a Jeffreys prior on every component. The
//! evidence of a partition is a sum over its components, so the searches in this crate spend
//! almost all of their time asking for the evidence of individual components and remembering the
//! answers.
//!
//! There are Bell(n) partitions of n variables, which is too many to try once n gets past about
//! fifteen. So besides [`PartitionSearch::exhaustive`], which is guaranteed to find the optimum,
//! there are three heuristics that trade completeness for speed:
//!
//! - [`PartitionSearch::greedy_merge`] starts from independent variables and repeatedly merges
//!   the pair of components that improves the evidence the most;
//! - [`PartitionSearch::greedy_split`] starts from one big component and recursively splits it;
//! - [`PartitionSearch::simulated_annealing`] random-walks through merges, splits and single
//!   variable moves, then polishes its best partition with greedy merging.
//!
//! ```
//! use mincomp::{Dataset, PartitionSearch};
//!
//! let mut data = Dataset::new(3, 3)?;
//! for (state, count) in [("200", 1), ("210", 2), ("120", 1), ("211", 1), ("111", 1), ("012", 1)] {
//!     let values: Vec<u8> = state.bytes().map(|b| b - b'0').collect();
//!     data.add_observation(&values, count)?;
//! }
//!
//! let mut search = PartitionSearch::with_seed(0);
//! let best = search.exhaustive(&data)?;
//! assert_eq!(best.component_count(), 1);
//! assert!((best.best_log_evidence()? + 23.3248).abs() < 1e-3);
//! # Ok::<(), mincomp::Error>(())
//! ```

mod annealing;
mod component;
mod data;
mod enumerate;
mod evidence;
mod model;
mod observer;
mod partition;
mod search;

pub use annealing::AnnealingSettings;
pub use component::{Component, MAX_VARIABLES};
pub use data::{Dataset, State};
pub use enumerate::{bell_number, SetPartitions};
pub use evidence::EvidenceCache;
pub use model::{Model, Template};
pub use observer::{LogFile, SearchObserver};
pub use partition::Partition;
pub use search::{Algorithm, PartitionSearch, MAX_EXHAUSTIVE_VARIABLES};

/// Everything that can go wrong in this crate.
///
/// All of these are detected before anything is modified, so an operation that returns an error
/// leaves its inputs exactly as they were.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A system needs between one and [`MAX_VARIABLES`] variables.
    #[error("the number of variables should be between 1 and {max}, got {0}", max = MAX_VARIABLES)]
    VariableCount(usize),

    /// Every variable needs between 2 and 256 states.
    #[error("the number of states per variable should be between 2 and 256, got {0}")]
    StateCount(u32),

    /// A variable index was not below the number of variables.
    #[error("the variable index should be between 0 and {}, got {index}", .n.saturating_sub(1))]
    VariableIndex {
        /// The offending index.
        index: usize,
        /// The number of variables.
        n: usize,
    },

    /// The given components don't form a valid partition.
    #[error("invalid partition: {0}")]
    InvalidPartition(String),

    /// Only "independent", "complete" and "random" name partition templates.
    #[error("invalid partition template {0:?}, options are \"independent\", \"complete\" or \"random\"")]
    UnknownTemplate(String),

    /// A single-variable move was asked to add a variable the partition already covers.
    #[error("variable {0} is already present in the partition")]
    VariablePresent(usize),

    /// A single-variable move was asked to remove a variable the partition doesn't cover.
    #[error("variable {0} is not present in the partition")]
    VariableAbsent(usize),

    /// A seed model and a dataset disagree about how many variables there are.
    #[error("the number of variables in the data ({data}) doesn't match the number of variables in the given model ({model})")]
    VariableMismatch {
        /// Variables in the dataset.
        data: usize,
        /// Variables in the model.
        model: usize,
    },

    /// Search results were requested from a model that no search has optimized.
    #[error("no search has been run on this model yet")]
    NotOptimized,

    /// Results were requested from a search engine that hasn't run any search.
    #[error("no search has been run yet")]
    NoSearch,

    /// Exhaustive search has no starting point to report.
    #[error("exhaustive search does not have an initial model")]
    NoInitialModel,

    /// Exhaustive search needs a table entry for every possible component.
    #[error("exhaustive search supports at most {max} variables, got {0}", max = search::MAX_EXHAUSTIVE_VARIABLES)]
    TooManyForExhaustive(usize),

    /// A component has too many joint states for its complexity terms to fit in an `f64`.
    #[error("the complexity of a component with {0} variables is too large to compute")]
    ComplexityOverflow(usize),

    /// A search setting was out of range.
    #[error("{0}")]
    InvalidSetting(&'static str),

    /// An observation didn't fit the dataset's shape.
    #[error("invalid observation: {0}")]
    InvalidObservation(String),

    /// The text input could not be parsed.
    #[error("line {line}: {reason}")]
    Parse {
        /// One-based line number of the bad record.
        line: u64,
        /// What was wrong with it.
        reason: String,
    },

    /// Reading input or writing a log file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Shorthand for results carrying this crate's [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Checks that `n` is a usable number of variables.
pub(crate) fn check_variable_count(n: usize) -> Result<()> {
    if (1..=MAX_VARIABLES).contains(&n) {
        Ok(())
    } else {
        Err(Error::VariableCount(n))
    }
}
