use alloc::string::String;

use crate::{
    error::{InsertError, MatchError, MergeError},
    escape::UnescapedRoute,
    params::Params,
    tree::{self, Node},
    Vec,
};

/// A successful match against a [`Router`]: the registered value and the
/// parameters bound while reaching it.
#[derive(Debug)]
pub struct Match<'m, V> {
    pub value: V,
    pub params: Params<'m>,
}

/// A compressed-prefix-tree (radix tree) URL route recognizer.
///
/// See the [crate-level documentation](crate) for the route syntax.
#[derive(Clone, Debug)]
pub struct Router<T> {
    root: Node<T>,
}

impl<T> Router<T> {
    /// Creates an empty router.
    pub fn new() -> Self {
        Self { root: Node::new() }
    }

    /// Registers `value` under `route`.
    ///
    /// # Errors
    ///
    /// Returns [`InsertError`] if `route` conflicts with a previously registered
    /// route, or contains a malformed parameter.
    pub fn insert(&mut self, route: impl Into<String>, value: T) -> Result<(), InsertError> {
        let full = UnescapedRoute::new(route.into().into_bytes());
        self.root.insert(full, value)
    }

    /// Matches `path` against the registered routes.
    ///
    /// Ties between routes that could both match (a static segment versus a
    /// parameter, for instance) are broken in favor of the route registered with
    /// more values beneath it; see the crate-level docs for the full ordering.
    pub fn at<'r, 'p>(&'r self, path: &'p str) -> Result<Match<'p, &'r T>, MatchError> {
        let (value, params, _) = self.root.locate(path)?;
        Ok(Match { value, params })
    }

    /// Like [`at`](Self::at), but returns a mutable reference to the matched value.
    pub fn at_mut<'r, 'p>(&'r mut self, path: &'p str) -> Result<Match<'p, &'r mut T>, MatchError> {
        let (_, params, steps) = self.root.locate(path)?;
        let value = tree::follow_mut(&mut self.root, &steps);
        Ok(Match { value, params })
    }

    /// Removes `route`, returning its value if it was registered.
    ///
    /// `route` is matched as a literal pattern, the same text that was passed to
    /// [`insert`](Self::insert) — not a concrete path.
    pub fn remove(&mut self, route: impl Into<String>) -> Option<T> {
        let full = UnescapedRoute::new(route.into().into_bytes());
        self.root.remove(full)
    }

    /// Moves every route out of `other` and inserts it into `self`.
    ///
    /// Routes that conflict with one already in `self` are skipped and reported
    /// in the returned [`MergeError`]; every non-conflicting route is still
    /// inserted.
    pub fn merge(&mut self, mut other: Self) -> Result<(), MergeError> {
        let mut errors = Vec::new();

        other.root.drain_into(UnescapedRoute::default(), &mut |pattern, value| {
            if let Err(err) = self.insert(pattern, value) {
                errors.push(err);
            }
        });

        if errors.is_empty() {
            Ok(())
        } else {
            Err(MergeError(errors))
        }
    }

    /// Verifies that every node's stored priority matches its subtree's actual
    /// value count. Used by the test suite to check the tree stays consistent
    /// across inserts, removes, and merges.
    #[doc(hidden)]
    pub fn check_priorities(&self) -> Result<u32, (u32, u32)> {
        self.root.check_priorities()
    }
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}
