//! Source composition for `CidnavConfig`.

pub mod policy;
pub mod service;
