use std::{
    num::NonZero,
    thread,
    time::{Duration, Instant},
};

use rand::{Rng, SeedableRng, rngs::StdRng};
use rayon::{ThreadPool, ThreadPoolBuilder, prelude::*};
use tracing::{debug, trace};

use super::{Bound, Goal, OptimizeError, Optimizer, Optimum, Status};

/// Stagnation-streak termination policy.
///
/// The run stops once the best score has changed by no more than `threshold`
/// for `generations` consecutive generations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stagnation {
    pub generations: usize,
    pub threshold: f64,
}

/// Settings for [`DifferentialEvolution`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifferentialEvolutionConfig {
    /// Number of candidate vectors per generation. At least 4.
    pub population_size: usize,

    /// Number of worker threads that evaluate the objective.
    pub workers: usize,

    /// Differential weight applied to the difference vector, within `[0, 2]`.
    pub mutation: f64,

    /// Probability of taking each coordinate from the mutant, within `[0, 1]`.
    pub crossover: f64,

    /// Hard cap on the number of generations.
    pub max_generations: usize,

    pub stagnation: Stagnation,

    /// Wall-clock budget, checked between generations.
    pub timeout: Option<Duration>,

    /// Seed for the candidate generator.
    ///
    /// Candidates are generated on the calling thread, so a given seed yields
    /// the same result for any worker count.
    pub seed: u64,
}

impl Default for DifferentialEvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            workers: thread::available_parallelism().map_or(1, NonZero::get),
            mutation: 0.7,
            crossover: 0.9,
            max_generations: 1000,
            stagnation: Stagnation {
                generations: 100,
                threshold: 1e-9,
            },
            timeout: None,
            seed: 0x5eed,
        }
    }
}

/// Differential evolution (`DE/rand/1/bin`) over a box.
///
/// Each generation builds one trial vector per population member from three
/// other members, evaluates all trials in parallel, and keeps a trial when it
/// scores no worse than the member it challenges. Trial coordinates that leave
/// the box are bounced back between the violated limit and the parent value,
/// so every candidate stays feasible with respect to the bounds.
#[derive(Debug)]
pub struct DifferentialEvolution {
    config: DifferentialEvolutionConfig,
    pool: ThreadPool,
}

impl DifferentialEvolution {
    /// Validates the configuration and starts the worker pool.
    ///
    /// # Errors
    ///
    /// Returns an [`OptimizeError`] if a setting is out of range or the pool
    /// can't be created.
    pub fn new(config: DifferentialEvolutionConfig) -> Result<Self, OptimizeError> {
        if config.population_size < 4 {
            return Err(OptimizeError::PopulationTooSmall {
                size: config.population_size,
            });
        }
        if config.workers == 0 {
            return Err(OptimizeError::NoWorkers);
        }
        if !(0.0..=2.0).contains(&config.mutation) {
            return Err(OptimizeError::Mutation {
                value: config.mutation,
            });
        }
        if !(0.0..=1.0).contains(&config.crossover) {
            return Err(OptimizeError::Crossover {
                value: config.crossover,
            });
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|i| format!("de-worker-{i}"))
            .build()?;

        Ok(Self { config, pool })
    }

    #[must_use]
    pub fn config(&self) -> &DifferentialEvolutionConfig {
        &self.config
    }

    fn evaluate<S>(&self, candidates: &[Vec<f64>], score: &S) -> Vec<f64>
    where
        S: Fn(&[f64]) -> f64 + Sync,
    {
        self.pool
            .install(|| candidates.par_iter().map(|x| score(x.as_slice())).collect())
    }

    fn trial(
        &self,
        target: usize,
        population: &[Vec<f64>],
        bounds: &[Bound],
        rng: &mut StdRng,
    ) -> Vec<f64> {
        let [r1, r2, r3] = distinct_donors(target, population.len(), rng);
        let forced = rng.random_range(0..bounds.len());
        let parent = &population[target];

        bounds
            .iter()
            .enumerate()
            .map(|(j, bound)| {
                if j != forced && rng.random::<f64>() >= self.config.crossover {
                    return parent[j];
                }
                let mutant = population[r1][j]
                    + self.config.mutation * (population[r2][j] - population[r3][j]);
                bound.bounce(mutant, parent[j], rng.random::<f64>())
            })
            .collect()
    }
}

impl Optimizer for DifferentialEvolution {
    fn optimize<F>(&self, objective: F, bounds: &[Bound], goal: Goal) -> Result<Optimum, OptimizeError>
    where
        F: Fn(&[f64]) -> f64 + Sync,
    {
        if bounds.is_empty() {
            return Ok(Optimum {
                x: Vec::new(),
                value: objective(&[]),
                generations: 0,
                status: Status::Converged,
            });
        }

        let started = Instant::now();
        let config = &self.config;

        // NaN never wins a comparison, so rank it as the worst possible score.
        let score = |x: &[f64]| {
            let s = goal.score(objective(x));
            if s.is_nan() { f64::INFINITY } else { s }
        };

        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut population: Vec<Vec<f64>> = (0..config.population_size)
            .map(|_| {
                bounds
                    .iter()
                    .map(|bound| bound.sample(rng.random::<f64>()))
                    .collect()
            })
            .collect();
        let mut scores = self.evaluate(&population, &score);

        let mut best = best_index(&scores);
        let mut last_best = scores[best];
        let mut streak = 0;
        let mut generations = 0;
        let mut status = Status::MaxGenerations;

        while generations < config.max_generations {
            if config.timeout.is_some_and(|t| started.elapsed() >= t) {
                status = Status::TimedOut;
                break;
            }

            let trials: Vec<Vec<f64>> = (0..population.len())
                .map(|i| self.trial(i, &population, bounds, &mut rng))
                .collect();
            let trial_scores = self.evaluate(&trials, &score);

            for (i, (trial, trial_score)) in trials.into_iter().zip(trial_scores).enumerate() {
                if trial_score <= scores[i] {
                    population[i] = trial;
                    scores[i] = trial_score;
                }
            }

            generations += 1;
            best = best_index(&scores);
            trace!(generation = generations, best = scores[best], "de generation");

            if (scores[best] - last_best).abs() > config.stagnation.threshold {
                last_best = scores[best];
                streak = 0;
            } else {
                streak += 1;
            }
            if streak >= config.stagnation.generations {
                status = Status::Converged;
                break;
            }
        }

        let value = goal.score(scores[best]);
        debug!(
            generations,
            ?status,
            value,
            elapsed = ?started.elapsed(),
            "differential evolution finished"
        );

        Ok(Optimum {
            x: population.swap_remove(best),
            value,
            generations,
            status,
        })
    }
}

fn best_index(scores: &[f64]) -> usize {
    scores
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map_or(0, |(i, _)| i)
}

/// Picks three distinct population indices, none equal to `target`.
fn distinct_donors(target: usize, size: usize, rng: &mut StdRng) -> [usize; 3] {
    let mut picked = [target; 3];
    for slot in 0..3 {
        loop {
            let candidate = rng.random_range(0..size);
            if candidate != target && !picked[..slot].contains(&candidate) {
                picked[slot] = candidate;
                break;
            }
        }
    }
    picked
}
