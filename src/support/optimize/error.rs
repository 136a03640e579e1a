use thiserror::Error;

/// Errors that can occur while configuring or running an optimizer.
#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error("invalid bound: lower={lower}, upper={upper}")]
    InvalidBound { lower: f64, upper: f64 },

    #[error("population size must be at least 4, got {size}")]
    PopulationTooSmall { size: usize },

    #[error("worker count must be at least 1")]
    NoWorkers,

    #[error("mutation force must be within [0, 2], got {value}")]
    Mutation { value: f64 },

    #[error("crossover probability must be within [0, 1], got {value}")]
    Crossover { value: f64 },

    #[error("failed to build worker pool")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}
