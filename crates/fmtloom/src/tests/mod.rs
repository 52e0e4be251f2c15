//! Crate-level test support and behaviour tests.

pub(crate) mod support;
