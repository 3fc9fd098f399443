use core::{fmt, ops::{Deref, Range}};

use crate::Vec;

/// An unescaped route, paired with the positions of every brace that started out
/// doubled (`{{` or `}}`) in the original pattern.
///
/// Dereferences to `&[u8]` of the *unescaped* bytes: `{{` and `}}` have already been
/// collapsed to a single `{` / `}`. The escape list lets callers tell such a literal
/// brace apart from the brace of a real `{name}` wildcard without re-scanning the
/// original pattern.
#[derive(Clone, Default)]
pub(crate) struct UnescapedRoute {
    inner: Vec<u8>,
    escaped: Vec<usize>,
}

impl UnescapedRoute {
    pub(crate) const fn empty() -> UnescapedRoute {
        UnescapedRoute {
            inner: Vec::new(),
            escaped: Vec::new(),
        }
    }

    pub(crate) fn new(mut inner: Vec<u8>) -> UnescapedRoute {
        let mut escaped = Vec::new();
        let mut i = 0;

        while let Some(&c) = inner.get(i) {
            let doubled = (c == b'{' && inner.get(i + 1) == Some(&b'{')) || (c == b'}' && inner.get(i + 1) == Some(&b'}'));
            if doubled {
                inner.remove(i);
                escaped.push(i);
            }
            i += 1;
        }

        UnescapedRoute { inner, escaped }
    }

    pub(crate) fn is_escaped(&self, i: usize) -> bool {
        self.escaped.contains(&i)
    }

    /// Replaces the bytes in `range` with `replace`. Escape marks inside `range` are
    /// dropped; marks at or after `range.end` shift by `replace.len() - range.len()`.
    pub(crate) fn splice<'r>(&'r mut self, range: Range<usize>, replace: &'r [u8]) -> impl Iterator<Item = u8> + 'r {
        self.escaped.retain(|i| !range.contains(i));

        let offset = replace.len() as isize - range.len() as isize;
        for i in &mut self.escaped {
            if *i > range.end {
                *i = i.checked_add_signed(offset).expect("escape index stays non-negative");
            }
        }

        self.inner.splice(range, replace.iter().copied())
    }

    pub(crate) fn append(&mut self, other: &UnescapedRoute) {
        let base = self.inner.len();
        self.escaped.extend(other.escaped.iter().map(|i| base + i));
        self.inner.extend_from_slice(&other.inner);
    }

    pub(crate) fn truncate(&mut self, to: usize) {
        self.escaped.retain(|&x| x < to);
        self.inner.truncate(to);
    }

    pub(crate) fn as_ref(&self) -> UnescapedRef<'_> {
        UnescapedRef {
            inner: &self.inner,
            escaped: &self.escaped,
            offset: 0,
        }
    }

    pub(crate) fn unescaped(&self) -> &[u8] {
        &self.inner
    }

    /// Reconstructs the original, escaped pattern text a user would type: every
    /// brace marked as doubled gets re-doubled.
    pub(crate) fn to_pattern_string(&self) -> crate::String {
        let mut out = Vec::with_capacity(self.inner.len());
        for (i, &b) in self.inner.iter().enumerate() {
            if self.is_escaped(i) && matches!(b, b'{' | b'}') {
                out.push(b);
            }
            out.push(b);
        }
        crate::String::from_utf8(out).unwrap_or_default()
    }
}

impl Deref for UnescapedRoute {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl fmt::Debug for UnescapedRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&alloc::string::String::from_utf8_lossy(&self.inner), f)
    }
}

/// A borrowed, possibly-sliced view into an [`UnescapedRoute`].
///
/// `offset` lets `is_escaped` translate a position in the *view* back to a position
/// in the original owning route's escape list, so slicing never has to copy or
/// re-derive escape marks.
#[derive(Copy, Clone)]
pub(crate) struct UnescapedRef<'a> {
    inner: &'a [u8],
    escaped: &'a [usize],
    offset: isize,
}

impl<'a> UnescapedRef<'a> {
    pub(crate) fn to_owned(self) -> UnescapedRoute {
        let mut escaped = Vec::new();
        for &i in self.escaped {
            if let Some(i) = i.checked_add_signed(self.offset) {
                if i < self.inner.len() {
                    escaped.push(i);
                }
            }
        }

        UnescapedRoute {
            inner: self.inner.into(),
            escaped,
        }
    }

    pub(crate) fn is_escaped(&self, i: usize) -> bool {
        match i.checked_add_signed(-self.offset) {
            Some(i) => self.escaped.contains(&i),
            None => false,
        }
    }

    pub(crate) fn slice_off(&self, start: usize) -> UnescapedRef<'a> {
        UnescapedRef {
            inner: &self.inner[start..],
            escaped: self.escaped,
            offset: self.offset - start as isize,
        }
    }

    pub(crate) fn slice_until(&self, end: usize) -> UnescapedRef<'a> {
        UnescapedRef {
            inner: &self.inner[..end],
            escaped: self.escaped,
            offset: self.offset,
        }
    }

    pub(crate) fn unescaped(&self) -> &[u8] {
        self.inner
    }
}

impl<'a> Deref for UnescapedRef<'a> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.inner
    }
}

impl fmt::Debug for UnescapedRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnescapedRef")
            .field("inner", &alloc::string::String::from_utf8_lossy(self.inner))
            .field("escaped", &self.escaped)
            .field("offset", &self.offset)
            .finish()
    }
}
