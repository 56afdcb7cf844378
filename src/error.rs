//! Error types for evo-testgen
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Error type for gene and individual sampling
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SamplingError {
    /// The semantic type has no primitive encoding and no action produces it
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// Every producer of the type eventually needs the type itself
    #[error("No finite construction for type: {0}")]
    Unconstructible(String),

    /// A semantic type name could not be parsed
    #[error("Malformed type `{name}`: {reason}")]
    MalformedType { name: String, reason: String },
}

/// Error type for operator failures
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OperatorError {
    /// An operator was configured or invoked with an invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Error type for fitness computation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FitnessError {
    /// The control-flow graph or its path table lacks an entry that must exist
    #[error("Broken invariant: {0}")]
    BrokenInvariant(String),

    /// A datapoint carried an opcode the branch-distance table does not know
    #[error("Unknown opcode: {0}")]
    UnknownOpcode(String),
}

/// Top-level error type for search operations
#[derive(Debug, Error)]
pub enum EvolutionError {
    /// Sampling error
    #[error("Sampling error: {0}")]
    Sampling(#[from] SamplingError),

    /// Operator error
    #[error("Operator error: {0}")]
    Operator(#[from] OperatorError),

    /// Fitness error
    #[error("Fitness error: {0}")]
    Fitness(#[from] FitnessError),

    /// The runner failed to execute a candidate
    #[error("Fitness evaluation failed: {0}")]
    FitnessEvaluation(String),

    /// Unrecognised algorithm name
    #[error("Unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Configuration text could not be parsed
    #[error("Configuration parse error: {0}")]
    ConfigurationParse(#[from] serde_json::Error),

    /// Internal consistency check failed
    #[error("Internal invariant violated: {0}")]
    InternalInvariant(String),

    /// Operation requires a non-empty population
    #[error("Empty population")]
    EmptyPopulation,

    /// Operation is not valid in the current search phase
    #[error("Invalid search phase: expected {expected}, found {found}")]
    InvalidPhase {
        expected: &'static str,
        found: &'static str,
    },
}

/// Result type alias for search operations
pub type EvoResult<T> = Result<T, EvolutionError>;
