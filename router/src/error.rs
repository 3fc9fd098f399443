use core::{error, fmt, ops::Deref};

use crate::{
    escape::{UnescapedRef, UnescapedRoute},
    tree::Node,
    String, Vec,
};

/// Errors that can occur when inserting a route.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum InsertError {
    /// The route conflicts with an existing one.
    Conflict {
        /// The existing route it conflicts with, reconstructed with its original escaping.
        with: String,
    },
    /// Only one parameter is allowed per path segment: `/foo-{bar}` is fine,
    /// `/{foo}-{bar}` is not.
    InvalidParamSegment,
    /// A parameter must have a non-empty name and balanced braces. Use `{{`/`}}`
    /// to write a literal brace.
    InvalidParam,
    /// A catch-all parameter (`{*name}`) is only allowed as the final segment.
    InvalidCatchAll,
}

impl fmt::Display for InsertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conflict { with } => {
                write!(f, "insertion conflicts with previously registered route: {with}")
            }
            Self::InvalidParamSegment => f.write_str("only one parameter is allowed per path segment"),
            Self::InvalidParam => f.write_str("parameters must be registered with a valid, non-empty name"),
            Self::InvalidCatchAll => f.write_str("catch-all parameters are only allowed at the end of a route"),
        }
    }
}

impl error::Error for InsertError {}

impl InsertError {
    /// Builds a [`Conflict`](Self::Conflict) by walking from the point of divergence
    /// down to the first value-bearing node, re-escaping the reconstructed pattern.
    pub(crate) fn conflict<T>(route: &UnescapedRoute, remaining: UnescapedRef<'_>, current: &Node<T>) -> Self {
        let mut conflicting = route.clone();

        if remaining.unescaped() == current.prefix.unescaped() {
            return Self::Conflict {
                with: conflicting.to_pattern_string(),
            };
        }

        conflicting.truncate(conflicting.len() - remaining.len());
        if !conflicting.ends_with(&*current.prefix) {
            conflicting.append(&current.prefix);
        }

        let mut child = current.first_child();
        while let Some(node) = child {
            conflicting.append(&node.prefix);
            child = node.first_child();
        }

        Self::Conflict {
            with: conflicting.to_pattern_string(),
        }
    }
}

/// The errors produced by a partially-successful [`Router::merge`](crate::Router::merge).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MergeError(pub(crate) Vec<InsertError>);

impl MergeError {
    /// Returns every [`InsertError`] that occurred while merging, in route order.
    pub fn into_errors(self) -> Vec<InsertError> {
        self.0
    }
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for error in &self.0 {
            writeln!(f, "{error}")?;
        }
        Ok(())
    }
}

impl error::Error for MergeError {}

impl Deref for MergeError {
    type Target = Vec<InsertError>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A failed match attempt.
///
/// ```
/// use radix_router::{MatchError, Router};
/// # fn main() -> Result<(), Box<dyn core::error::Error>> {
/// let mut router = Router::new();
/// router.insert("/home", "Welcome!")?;
///
/// assert_eq!(router.at("/blog"), Err(MatchError));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct MatchError;

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("no route matches this path")
    }
}

impl error::Error for MatchError {}
