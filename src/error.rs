//! Error types.
//!
//! - `EstimationError` is the library-level failure surface. Every estimator,
//!   the likelihood, the optimizer, and the surface generator report one of
//!   three kinds (invalid domain, degenerate sample, optimization failure),
//!   tagged with the component that failed.
//! - `AppError` is what the binary prints; it carries a process exit code.

use std::fmt;

use thiserror::Error;

/// Which part of the estimation engine produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Sampler,
    MethodOfMoments,
    ClosedFormMle,
    LogLikelihood,
    Optimizer,
    LikelihoodSurface,
}

impl Component {
    pub fn display_name(self) -> &'static str {
        match self {
            Component::Sampler => "sampler",
            Component::MethodOfMoments => "method of moments",
            Component::ClosedFormMle => "closed-form MLE",
            Component::LogLikelihood => "log-likelihood",
            Component::Optimizer => "numerical MLE optimizer",
            Component::LikelihoodSurface => "likelihood surface",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Failure of a single estimation call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimationError {
    /// A parameter (θ, an initial guess, a grid bound, a shape) is outside
    /// its valid domain.
    #[error("{component}: invalid {what} = {value} ({reason})")]
    InvalidDomain {
        component: Component,
        what: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// The sample cannot support the estimate (empty, boundary values,
    /// zero denominators).
    #[error("{component}: degenerate sample: {reason}")]
    DegenerateSample { component: Component, reason: String },

    /// The numerical optimizer did not produce a converged, finite minimizer.
    #[error("{component}: optimization failed after {iterations} iterations: {reason}")]
    OptimizationFailure {
        component: Component,
        iterations: u64,
        reason: String,
    },
}

pub type EstResult<T> = Result<T, EstimationError>;

impl EstimationError {
    pub fn invalid_domain(
        component: Component,
        what: &'static str,
        value: f64,
        reason: &'static str,
    ) -> Self {
        EstimationError::InvalidDomain {
            component,
            what,
            value,
            reason,
        }
    }

    pub fn degenerate(component: Component, reason: impl Into<String>) -> Self {
        EstimationError::DegenerateSample {
            component,
            reason: reason.into(),
        }
    }

    pub fn optimization(component: Component, iterations: u64, reason: impl Into<String>) -> Self {
        EstimationError::OptimizationFailure {
            component,
            iterations,
            reason: reason.into(),
        }
    }

    /// The component that reported the failure.
    pub fn component(&self) -> Component {
        match self {
            EstimationError::InvalidDomain { component, .. }
            | EstimationError::DegenerateSample { component, .. }
            | EstimationError::OptimizationFailure { component, .. } => *component,
        }
    }

    /// Process exit code used by the binary for this failure kind.
    pub fn exit_code(&self) -> u8 {
        match self {
            EstimationError::InvalidDomain { .. } => 2,
            EstimationError::DegenerateSample { .. } => 3,
            EstimationError::OptimizationFailure { .. } => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<EstimationError> for AppError {
    fn from(err: EstimationError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
