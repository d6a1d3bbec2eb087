//! Execution engine for Specrun suites
//!
//! Walks a built tree depth-first in declaration order: before-hooks, then
//! children, then after-hooks, per group. Every hook, dispatch, and recursion
//! is awaited before the next step, so ordering is total and deterministic.
//! Failures are contained per group: a broken group skips the rest of its own
//! level but never its siblings or ancestors.

use anyhow::Result;
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use specrun_tree::{
    Case, Group, Node, RunReport, Stage, StageFailure, Suite, full_name,
};

/// Destination for leaf cases.
///
/// The engine calls [`LeafSink::register_leaf`] exactly once per case per
/// run, in depth-first declaration order. What happens to the body is the
/// sink's business: a host-framework adapter would register it for later
/// execution, [`EagerSink`] runs it on the spot. The engine only interprets
/// the returned error, which it contains as a dispatch failure at the
/// enclosing group's level.
pub trait LeafSink {
    fn register_leaf<'a>(
        &'a mut self,
        full_name: String,
        case: &'a Case,
    ) -> LocalBoxFuture<'a, Result<()>>;
}

/// Walks a suite against a leaf sink.
pub struct Runner<'s> {
    sink: &'s mut dyn LeafSink,
}

impl<'s> Runner<'s> {
    #[must_use]
    pub fn new(sink: &'s mut dyn LeafSink) -> Self {
        Self { sink }
    }

    /// Execute the whole tree once.
    ///
    /// Never fails: contained failures are logged and collected into the
    /// report, and only the sink's own notion of pass/fail is user-visible as
    /// a test outcome. The tree is read-only during the walk, so calling
    /// `run` again re-executes it identically.
    pub async fn run(&mut self, suite: &Suite) -> RunReport {
        let contained = self.walk(suite.root(), Vec::new()).await;
        RunReport::new(contained)
    }

    fn walk<'a>(
        &'a mut self,
        group: &'a Group,
        path: Vec<String>,
    ) -> LocalBoxFuture<'a, Vec<StageFailure>> {
        async move {
            let mut contained = Vec::new();

            if let Err(failure) = self.run_body_region(group, &path, &mut contained).await {
                tracing::error!(%failure, "contained failure");
                contained.push(failure);
            }

            // Cleanup is attempted even when the body region failed; a
            // failing after-hook aborts the remaining after-hooks at this
            // level only.
            for hook in group.after_hooks() {
                if let Err(error) = hook.call().await {
                    let failure = StageFailure::new(&path, Stage::After, error);
                    tracing::error!(%failure, "contained failure");
                    contained.push(failure);
                    break;
                }
            }

            contained
        }
        .boxed_local()
    }

    /// Before-hooks, then children, in order. The first failing hook or
    /// dispatch aborts the remainder of this region; failures inside a child
    /// group are contained at the child's level and extend `contained`
    /// without aborting anything here.
    async fn run_body_region(
        &mut self,
        group: &Group,
        path: &[String],
        contained: &mut Vec<StageFailure>,
    ) -> Result<(), StageFailure> {
        for hook in group.before_hooks() {
            hook.call()
                .await
                .map_err(|error| StageFailure::new(path, Stage::Before, error))?;
        }

        for child in group.children() {
            match child {
                Node::Group(sub) => {
                    let mut child_path = path.to_vec();
                    child_path.push(sub.name().to_string());
                    let nested = self.walk(sub, child_path).await;
                    contained.extend(nested);
                }
                Node::Case(case) => {
                    let name = full_name(path, case.name());
                    self.sink
                        .register_leaf(name.clone(), case)
                        .await
                        .map_err(|error| StageFailure::new(&[name], Stage::Dispatch, error))?;
                }
            }
        }

        Ok(())
    }
}

/// Drive a full run to completion on the current thread.
pub fn run_blocking(suite: &Suite, sink: &mut dyn LeafSink) -> RunReport {
    let mut runner = Runner::new(sink);
    futures::executor::block_on(runner.run(suite))
}

/// Sink that records fully qualified names and never touches the bodies.
#[derive(Debug, Default)]
pub struct RecordingSink {
    registered: Vec<String>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn registered(&self) -> &[String] {
        &self.registered
    }
}

impl LeafSink for RecordingSink {
    fn register_leaf<'a>(
        &'a mut self,
        full_name: String,
        _case: &'a Case,
    ) -> LocalBoxFuture<'a, Result<()>> {
        self.registered.push(full_name);
        futures::future::ready(Ok(())).boxed_local()
    }
}

/// Sink that executes each body as soon as it is delivered, surfacing the
/// body's error as a dispatch failure.
#[derive(Debug, Default)]
pub struct EagerSink {
    executed: Vec<String>,
}

impl EagerSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn executed(&self) -> &[String] {
        &self.executed
    }
}

impl LeafSink for EagerSink {
    fn register_leaf<'a>(
        &'a mut self,
        full_name: String,
        case: &'a Case,
    ) -> LocalBoxFuture<'a, Result<()>> {
        async move {
            self.executed.push(full_name);
            case.body().call().await
        }
        .boxed_local()
    }
}
