//! Line searches whose trial points stay within a fixed move of `ln θ`.
//!
//! Quasi-Newton directions in `φ = ln θ` change length by orders of magnitude
//! between a distant start and the optimum, so a fixed step-length interval
//! either stalls near the optimum or jumps far outside the region where the
//! objective is finite. `StepCapped` re-derives the wrapped search's step
//! bounds from the length of every new direction: no trial point moves `φ` by
//! more than `max_move`. A search that has not finished within
//! `LINE_SEARCH_MAX_ITER` iterations fails instead of looping.

use argmin::core::{Error, IterState, KV, Problem, Solver, TerminationStatus};
use argmin::solver::linesearch::LineSearch;

use crate::error::{Component, EstimationError};
use crate::optim::options::{Cost, Grad, HagerZhangLS, MoreThuenteLS, Theta};

/// Largest change of `ln θ` one line search may make.
pub const MAX_LN_THETA_MOVE: f64 = 20.0;
/// Iteration budget of a single line search.
pub const LINE_SEARCH_MAX_ITER: u64 = 50;

type SearchState = IterState<Theta, Grad, (), (), (), Cost>;

/// A line search that accepts an upper bound on its step length `α`.
pub trait StepLimit: Sized {
    fn with_step_limit(self, max_step: f64) -> Result<Self, Error>;
}

impl StepLimit for MoreThuenteLS {
    fn with_step_limit(self, max_step: f64) -> Result<Self, Error> {
        self.with_bounds(max_step * f64::EPSILON, max_step)
    }
}

impl StepLimit for HagerZhangLS {
    /// The bracket is `[ε·max, max]`; the first interior trial is the unit
    /// step unless that lies past the middle of the bracket.
    fn with_step_limit(self, max_step: f64) -> Result<Self, Error> {
        let mut ls = self.with_bounds(max_step * f64::EPSILON, max_step)?;
        ls.initial_step_length(max_step.min(2.0) / 2.0)?;
        Ok(ls)
    }
}

#[derive(Clone)]
pub struct StepCapped<L> {
    inner: L,
    max_move: f64,
    /// Set when the last direction could not be bounded; reported by `init`.
    rejected: Option<String>,
    iters: u64,
}

impl<L> StepCapped<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            max_move: MAX_LN_THETA_MOVE,
            rejected: None,
            iters: 0,
        }
    }
}

impl<L> LineSearch<Theta, Cost> for StepCapped<L>
where
    L: LineSearch<Theta, Cost> + StepLimit + Clone,
{
    fn search_direction(&mut self, direction: Theta) {
        let len = direction.dot(&direction).sqrt();
        let limit = self.max_move / len;
        self.rejected = if !(len > 0.0 && limit.is_finite() && limit > 0.0) {
            Some(format!("search direction of length {len} cannot be bounded"))
        } else {
            match self.inner.clone().with_step_limit(limit) {
                Ok(ls) => {
                    self.inner = ls;
                    None
                }
                Err(e) => Some(e.to_string()),
            }
        };
        self.inner.search_direction(direction);
    }

    fn initial_step_length(&mut self, step_length: Cost) -> Result<(), Error> {
        self.inner.initial_step_length(step_length)
    }
}

impl<O, L> Solver<O, SearchState> for StepCapped<L>
where
    L: Solver<O, SearchState>,
{
    const NAME: &'static str = "step-capped line search";

    fn init(&mut self, problem: &mut Problem<O>, state: SearchState) -> Result<(SearchState, Option<KV>), Error> {
        if let Some(reason) = self.rejected.take() {
            return Err(EstimationError::optimization(Component::Optimizer, 0, reason).into());
        }
        self.iters = 0;
        self.inner.init(problem, state)
    }

    fn next_iter(&mut self, problem: &mut Problem<O>, state: SearchState) -> Result<(SearchState, Option<KV>), Error> {
        self.iters += 1;
        if self.iters > LINE_SEARCH_MAX_ITER {
            return Err(EstimationError::optimization(
                Component::Optimizer,
                0,
                format!("line search did not finish within {LINE_SEARCH_MAX_ITER} iterations"),
            )
            .into());
        }
        self.inner.next_iter(problem, state)
    }

    fn terminate(&mut self, state: &SearchState) -> TerminationStatus {
        self.inner.terminate(state)
    }
}
