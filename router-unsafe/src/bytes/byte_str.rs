use core::{fmt, ops::Deref, str::Utf8Error};

use bytes::Bytes;

/// Reference-counted string, cheap to clone and to slice.
///
/// Route parameter names are sliced out of a node's prefix once, at insert time,
/// and then cloned into every parameter list a match produces; `BytesStr` makes
/// that clone a refcount bump instead of a fresh allocation.
#[derive(Clone, Default, Eq, PartialEq)]
pub struct BytesStr(Bytes);

impl BytesStr {
    #[inline]
    pub const fn from_static(value: &'static str) -> Self {
        BytesStr(Bytes::from_static(value.as_bytes()))
    }

    #[inline]
    pub fn slice(&self, range: impl core::ops::RangeBounds<usize>) -> Self {
        Self(self.0.slice(range))
    }

    #[inline]
    pub fn into_inner(self) -> Bytes {
        self.0
    }

    #[inline]
    fn as_str(&self) -> &str {
        // SAFETY: every constructor validates UTF-8 before building a BytesStr.
        unsafe { core::str::from_utf8_unchecked(self.0.as_ref()) }
    }
}

impl From<&str> for BytesStr {
    fn from(value: &str) -> Self {
        BytesStr(Bytes::copy_from_slice(value.as_bytes()))
    }
}

impl TryFrom<Bytes> for BytesStr {
    type Error = Utf8Error;

    fn try_from(value: Bytes) -> Result<Self, Self::Error> {
        core::str::from_utf8(value.as_ref())?;
        Ok(BytesStr(value))
    }
}

impl TryFrom<&[u8]> for BytesStr {
    type Error = Utf8Error;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        core::str::from_utf8(value)?;
        Ok(BytesStr(Bytes::copy_from_slice(value)))
    }
}

impl Deref for BytesStr {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<[u8]> for BytesStr {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl AsRef<str> for BytesStr {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Debug for BytesStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for BytesStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_str(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_share_storage() {
        let s = BytesStr::from("/users/42");
        let id = s.slice(7..9);
        assert_eq!(&*id, "42");
    }

    #[test]
    fn rejects_invalid_utf8() {
        let bytes = Bytes::from_static(&[0xff, 0xfe]);
        assert!(BytesStr::try_from(bytes).is_err());
    }
}
