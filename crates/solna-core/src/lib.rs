#![forbid(unsafe_code)]

//! Core types shared by every Solna crate: the error enum, XML namespace
//! constants and algorithm URIs.

pub mod algorithm;
pub mod error;
pub mod ns;

pub use error::{ConditionViolation, Error, Result};
