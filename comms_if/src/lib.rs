//! # Communications interface crate.
//!
//! Provides all common communications interfaces for the software.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Single character command protocol
pub mod tc;

/// Identifiers for equipment (like the arm motors)
pub mod eqpt;
