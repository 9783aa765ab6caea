//! Sequential and concurrent step composition.
//!
//! [`Chain`] runs steps one after another, threading the context forward
//! and stopping at the first failure. [`Concurrent`] runs steps against the
//! same context at once and merges what they added in declaration order.
//! Both are steps themselves, so they nest freely.
//!
//! Neither combinator catches errors: an `Err` from any step is returned to
//! the caller untouched.

use crate::context::Context;
use crate::step::{BoxStep, Outcome, Step, StepName, StepResult};
use async_trait::async_trait;
use futures::future::join_all;
use std::fmt;
use tracing::debug;

/// Runs steps in order.
///
/// Each step receives the context produced by its predecessor. A `Fail`,
/// a `Complete` or an error stops the chain and becomes its result; later
/// steps are not run. When every step proceeds, the chain proceeds with the
/// last context, which lets a chain sit in the middle of another one.
pub struct Chain<D> {
    steps: Vec<BoxStep<D>>,
}

impl<D: Send + Sync> Chain<D> {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Appends a step.
    pub fn then<S: Step<D> + 'static>(mut self, step: S) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Returns the number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` if the chain has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl<D: Send + Sync> Default for Chain<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> fmt::Debug for Chain<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("steps", &self.steps.iter().map(|s| s.name()).collect::<Vec<_>>())
            .finish()
    }
}

#[async_trait]
impl<D: Send + Sync> Step<D> for Chain<D> {
    async fn run(&self, deps: &D, ctx: Context) -> StepResult {
        let mut ctx = ctx;
        for step in &self.steps {
            match step.run(deps, ctx).await? {
                Outcome::Proceed(next) => {
                    debug!("Step '{}' proceeded", step.name());
                    ctx = next;
                }
                terminal => {
                    debug!("Step '{}' ended the chain", step.name());
                    return Ok(terminal);
                }
            }
        }
        Ok(Outcome::Proceed(ctx))
    }

    fn name(&self) -> StepName {
        let names = self
            .steps
            .iter()
            .map(|s| s.name().to_string())
            .collect::<Vec<_>>();
        StepName::new(format!("chain({})", names.join(" -> ")))
    }
}

/// Composes boxed steps into a [`Chain`].
pub fn chain<D: Send + Sync>(steps: Vec<BoxStep<D>>) -> Chain<D> {
    Chain { steps }
}

/// Runs steps at the same time against the same context.
///
/// Every branch gets its own copy of the input context. Once all branches
/// have settled:
///
/// - if any branch raised an error, the first error in declaration order
///   is returned;
/// - otherwise, if any branch ended with `Fail` or `Complete`, the first
///   such outcome in declaration order is returned;
/// - otherwise the fields each branch added are merged into a fresh copy of
///   the input context in declaration order, so a later branch wins on a
///   key collision regardless of which branch finished first.
pub struct Concurrent<D> {
    steps: Vec<BoxStep<D>>,
}

impl<D: Send + Sync> Concurrent<D> {
    /// Creates an empty concurrent group.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Adds a branch.
    pub fn with<S: Step<D> + 'static>(mut self, step: S) -> Self {
        self.steps.push(Box::new(step));
        self
    }
}

impl<D: Send + Sync> Default for Concurrent<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> fmt::Debug for Concurrent<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Concurrent")
            .field("steps", &self.steps.iter().map(|s| s.name()).collect::<Vec<_>>())
            .finish()
    }
}

#[async_trait]
impl<D: Send + Sync> Step<D> for Concurrent<D> {
    async fn run(&self, deps: &D, ctx: Context) -> StepResult {
        let branches = self.steps.iter().map(|step| step.run(deps, ctx.clone()));
        let settled = join_all(branches).await;
        debug!("{} concurrent branches settled", settled.len());

        let mut contexts = Vec::with_capacity(settled.len());
        for result in settled {
            contexts.push(result?);
        }

        let mut produced = Vec::with_capacity(contexts.len());
        for outcome in contexts {
            match outcome {
                Outcome::Proceed(branch) => produced.push(branch),
                terminal => return Ok(terminal),
            }
        }

        let mut merged = ctx.clone();
        for branch in produced {
            merged.merge(branch.changes_since(&ctx));
        }
        Ok(Outcome::Proceed(merged))
    }

    fn name(&self) -> StepName {
        let names = self
            .steps
            .iter()
            .map(|s| s.name().to_string())
            .collect::<Vec<_>>();
        StepName::new(format!("concurrent({})", names.join(", ")))
    }
}

/// Composes boxed steps into a [`Concurrent`] group.
pub fn concurrent<D: Send + Sync>(steps: Vec<BoxStep<D>>) -> Concurrent<D> {
    Concurrent { steps }
}
