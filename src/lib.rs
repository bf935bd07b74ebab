//! Recovery of high-level control constructs (loops, two-way conditionals and
//! n-way switches) from arbitrary control flow graphs, using the interval
//! method.
//!
//! The entry point is [analysis::analyze], which takes a [analysis::Cfg] and
//! returns the set of [analysis::Primitives] recovered from it.

pub mod analysis;
