//! Suite tree definitions for Specrun
//!
//! Pure data: groups, cases, the runnable operations they carry, and the
//! outcome types a run reports with. Construction lives in `specrun-builder`,
//! execution in `specrun-runner`.

use std::fmt;
use std::future::Future;

use anyhow::Result;
use futures::FutureExt;
use futures::future::LocalBoxFuture;

/// Name of the implicit root group. The root never contributes a path
/// segment; the name only shows up when reporting root-level hook failures.
pub const ROOT_NAME: &str = "suite";

/// Separator between group names in a fully qualified case name.
pub const PATH_SEPARATOR: &str = " > ";

/// A zero-argument effectful operation: a hook or a case body.
///
/// The operation may complete synchronously or suspend; the runner awaits it
/// either way before taking the next step. It is reinvocable (`Fn`, not
/// `FnOnce`) so the same tree can be run more than once.
pub struct Runnable {
    op: Box<dyn Fn() -> LocalBoxFuture<'static, Result<()>>>,
}

impl Runnable {
    /// Wrap an asynchronously completing operation.
    pub fn new<F, Fut>(op: F) -> Self
    where
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = Result<()>> + 'static,
    {
        Self {
            op: Box::new(move || op().boxed_local()),
        }
    }

    /// Wrap a synchronous operation.
    pub fn from_fn<F>(op: F) -> Self
    where
        F: Fn() -> Result<()> + 'static,
    {
        Self {
            op: Box::new(move || futures::future::ready(op()).boxed_local()),
        }
    }

    /// Invoke the operation and await its completion.
    ///
    /// # Errors
    ///
    /// Returns whatever error the wrapped operation produced.
    pub async fn call(&self) -> Result<()> {
        (self.op)().await
    }
}

impl fmt::Debug for Runnable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Runnable")
    }
}

/// Leaf node: a named test body.
#[derive(Debug)]
pub struct Case {
    name: String,
    body: Runnable,
}

impl Case {
    #[must_use]
    pub fn new(name: impl Into<String>, body: Runnable) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn body(&self) -> &Runnable {
        &self.body
    }
}

/// A child of a group, in declaration order.
#[derive(Debug)]
pub enum Node {
    Group(Group),
    Case(Case),
}

/// Internal node: a named container of hooks and children.
///
/// Names are not validated; empty or duplicate names are allowed and simply
/// produce duplicate path segments at execution time.
#[derive(Debug)]
pub struct Group {
    name: String,
    before: Vec<Runnable>,
    after: Vec<Runnable>,
    children: Vec<Node>,
}

impl Group {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            before: Vec::new(),
            after: Vec::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn before_hooks(&self) -> &[Runnable] {
        &self.before
    }

    #[must_use]
    pub fn after_hooks(&self) -> &[Runnable] {
        &self.after
    }

    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn push_before(&mut self, hook: Runnable) {
        self.before.push(hook);
    }

    pub fn push_after(&mut self, hook: Runnable) {
        self.after.push(hook);
    }

    pub fn push_child(&mut self, child: Node) {
        self.children.push(child);
    }
}

/// The whole tree, owned by its implicit root group.
///
/// Immutable once built: the runner only reads it.
#[derive(Debug)]
pub struct Suite {
    root: Group,
}

impl Suite {
    #[must_use]
    pub fn new(root: Group) -> Self {
        Self { root }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::new(Group::new(ROOT_NAME))
    }

    #[must_use]
    pub fn root(&self) -> &Group {
        &self.root
    }
}

impl Default for Suite {
    fn default() -> Self {
        Self::empty()
    }
}

/// Compose the fully qualified name of a node from its enclosing group path
/// (root excluded) and its own name.
#[must_use]
pub fn full_name(path: &[String], name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        let mut out = path.join(PATH_SEPARATOR);
        out.push_str(PATH_SEPARATOR);
        out.push_str(name);
        out
    }
}

/// Which step of a group's walk a contained failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// A before-hook of the group failed.
    Before,
    /// Delivering a case to the leaf sink failed.
    Dispatch,
    /// An after-hook of the group failed.
    After,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Before => f.write_str("before hook"),
            Self::Dispatch => f.write_str("leaf dispatch"),
            Self::After => f.write_str("after hook"),
        }
    }
}

/// A failure caught and contained at one group's level during a run.
#[derive(Debug, thiserror::Error)]
#[error("{location}: {stage} failed: {error}")]
pub struct StageFailure {
    location: String,
    stage: Stage,
    error: anyhow::Error,
}

impl StageFailure {
    #[must_use]
    pub fn new(path: &[String], stage: Stage, error: anyhow::Error) -> Self {
        let location = if path.is_empty() {
            ROOT_NAME.to_string()
        } else {
            path.join(PATH_SEPARATOR)
        };
        Self {
            location,
            stage,
            error,
        }
    }

    /// Joined group path of the level that contained the failure; for
    /// dispatch failures this includes the case's own name.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    #[must_use]
    pub fn error(&self) -> &anyhow::Error {
        &self.error
    }
}

/// Aggregated outcome of one run: every failure that was contained at some
/// group level, in the order it occurred.
///
/// Containment means the run itself never fails; callers inspect the report
/// to decide whether contained failures should fail the overall run.
#[derive(Debug, Default)]
pub struct RunReport {
    contained: Vec<StageFailure>,
}

impl RunReport {
    #[must_use]
    pub fn new(contained: Vec<StageFailure>) -> Self {
        Self { contained }
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.contained.is_empty()
    }

    #[must_use]
    pub fn failures(&self) -> &[StageFailure] {
        &self.contained
    }

    #[must_use]
    pub fn into_failures(self) -> Vec<StageFailure> {
        self.contained
    }
}
