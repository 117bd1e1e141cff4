//! Reactive host capabilities.
//!
//! A host is whatever drives a component's render/effect cycle. The bindings
//! only need two primitives from it: memoization keyed on dependency
//! identities, and effects whose cleanup runs before the next run and on
//! teardown.

use std::convert::Infallible;

use crate::error::BusResult;
use crate::identity::Identity;

/// Teardown returned by an effect.
pub type Cleanup = Box<dyn FnOnce() + Send>;

/// Effect body. Returns an optional cleanup, or an error for the host's
/// error boundary.
pub type EffectFn = Box<dyn FnOnce() -> BusResult<Option<Cleanup>> + Send>;

/// Ordered dependency identities of a memo or effect.
///
/// Two lists are equal when they hold the same identities in the same order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Deps(Vec<Identity>);

impl Deps {
    /// An empty dependency list (the value never recomputes).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a dependency.
    #[must_use]
    pub fn with(mut self, id: Identity) -> Self {
        self.0.push(id);
        self
    }

    /// The identities, in order.
    #[must_use]
    pub fn as_slice(&self) -> &[Identity] {
        &self.0
    }

    /// Number of dependencies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no dependencies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Identity> for Deps {
    fn from_iter<I: IntoIterator<Item = Identity>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[Identity; N]> for Deps {
    fn from(ids: [Identity; N]) -> Self {
        Self(ids.to_vec())
    }
}

/// Memoization and effect primitives supplied by a UI framework adapter.
///
/// Calls are positional within one render, the way component hooks are:
/// the n-th memo or effect call of a render refers to the same slot as the
/// n-th call of the previous render.
pub trait ReactiveHost {
    /// Return the value memoized in this slot if `deps` equal the previous
    /// render's, otherwise run `compute` and memoize its `Ok` value.
    ///
    /// Errors are returned and not memoized, so the next render computes
    /// again.
    ///
    /// # Errors
    ///
    /// Returns whatever `compute` returns.
    fn try_memo<T, E, F>(&mut self, deps: &Deps, compute: F) -> Result<T, E>
    where
        T: Clone + Send + 'static,
        F: FnOnce() -> Result<T, E>;

    /// Infallible form of [`ReactiveHost::try_memo`].
    fn memo<T, F>(&mut self, deps: &Deps, compute: F) -> T
    where
        T: Clone + Send + 'static,
        F: FnOnce() -> T,
    {
        match self.try_memo(deps, || Ok::<T, Infallible>(compute())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Run `effect` on first render and whenever `deps` change.
    ///
    /// Before a re-run, and when the component is torn down, the host runs
    /// the cleanup the previous run returned. Hosts that defer effects past
    /// the render return `Ok(())` and route effect errors to their own error
    /// boundary.
    ///
    /// # Errors
    ///
    /// Returns the effect's error when the host runs it synchronously.
    fn effect(&mut self, deps: &Deps, effect: EffectFn) -> BusResult<()>;
}
