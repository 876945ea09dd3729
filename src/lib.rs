//! Typed criteria query paths for Sombra.
//!
//! Build attribute-navigation paths and expressions over a metamodel, render
//! them into query fragments and collect their bind parameters.

#![warn(missing_docs)]

pub mod criteria;
pub mod types;
