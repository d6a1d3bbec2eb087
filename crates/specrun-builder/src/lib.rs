//! Registration API for Specrun suites
//!
//! Declarative tree construction. Instead of an ambient "currently open
//! group" cursor, every nested `group` call hands its builder closure an
//! explicit handle to the group being built; the borrow checker guarantees
//! that registrations made inside the closure land on that group and that no
//! two builders mutate the tree at once.

use anyhow::Result;
use specrun_tree::{Case, Group, Node, ROOT_NAME, Runnable, Suite};

/// Mutable handle to the group currently accepting registrations.
///
/// Obtained from [`SuiteBuilder`] for the root, or inside the closure passed
/// to [`GroupBuilder::group`] for a nested group.
pub struct GroupBuilder<'a> {
    group: &'a mut Group,
}

impl GroupBuilder<'_> {
    /// Register a nested group as the next child of this group and populate
    /// it by running `build` against a handle to it.
    ///
    /// The new group is attached to the tree even when `build` fails, so the
    /// tree observed by a later run reflects everything registered before the
    /// failure.
    ///
    /// # Errors
    ///
    /// Propagates any error returned by `build`; registration of a malformed
    /// tree should abort rather than silently proceed.
    pub fn group<F>(&mut self, name: impl Into<String>, build: F) -> Result<()>
    where
        F: FnOnce(&mut GroupBuilder<'_>) -> Result<()>,
    {
        let mut child = Group::new(name);
        let outcome = build(&mut GroupBuilder { group: &mut child });
        self.group.push_child(Node::Group(child));
        outcome
    }

    /// Register a leaf case as the next child of this group.
    pub fn case(&mut self, name: impl Into<String>, body: Runnable) {
        self.group.push_child(Node::Case(Case::new(name, body)));
    }

    /// Alias for [`GroupBuilder::case`].
    pub fn it(&mut self, name: impl Into<String>, body: Runnable) {
        self.case(name, body);
    }

    /// Append a hook that runs before any child of this group.
    pub fn before(&mut self, hook: Runnable) {
        self.group.push_before(hook);
    }

    /// Append a hook that runs after all children of this group.
    pub fn after(&mut self, hook: Runnable) {
        self.group.push_after(hook);
    }
}

/// Owns the root group for the duration of the registration phase.
pub struct SuiteBuilder {
    root: Group,
}

impl SuiteBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Group::new(ROOT_NAME),
        }
    }

    fn root_builder(&mut self) -> GroupBuilder<'_> {
        GroupBuilder {
            group: &mut self.root,
        }
    }

    /// Register a top-level group. See [`GroupBuilder::group`].
    ///
    /// # Errors
    ///
    /// Propagates any error returned by `build`.
    pub fn group<F>(&mut self, name: impl Into<String>, build: F) -> Result<()>
    where
        F: FnOnce(&mut GroupBuilder<'_>) -> Result<()>,
    {
        self.root_builder().group(name, build)
    }

    /// Register a top-level case.
    pub fn case(&mut self, name: impl Into<String>, body: Runnable) {
        self.root_builder().case(name, body);
    }

    /// Alias for [`SuiteBuilder::case`].
    pub fn it(&mut self, name: impl Into<String>, body: Runnable) {
        self.case(name, body);
    }

    /// Append a before-hook at the root level.
    pub fn before(&mut self, hook: Runnable) {
        self.root_builder().before(hook);
    }

    /// Append an after-hook at the root level.
    pub fn after(&mut self, hook: Runnable) {
        self.root_builder().after(hook);
    }

    /// End the registration phase and yield the immutable tree.
    #[must_use]
    pub fn finish(self) -> Suite {
        Suite::new(self.root)
    }
}

impl Default for SuiteBuilder {
    fn default() -> Self {
        Self::new()
    }
}
