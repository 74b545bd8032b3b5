//! # Equipment Interface
//!
//! This module defines the identifiers shared between the command protocol and the arm equipment.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod mech;
