//! Types shared between the conference client and anything speaking its REST dialect.

pub mod domain;
pub mod error;
pub mod protocol;
