//! A cheaply-cloneable, reference-counted string type for route parameter keys.

mod byte_str;

pub use byte_str::BytesStr;
