//! # BL abstract syntax tree
//!
//! This module defines the tree the parser produces and the code generator
//! consumes: a `Program` owns a name, a context of user-defined
//! instructions and a main body. Bodies are `Statement` trees.
//!
//! The tree walkers in `pretty` and `transform` are read-only or take the
//! tree by value and hand back a new one; nothing is mutated in place.

pub mod condition;
pub mod pretty;
pub mod program;
pub mod statement;
pub mod transform;
