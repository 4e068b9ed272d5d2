//! Row structs for the travel advice tables.
//!
//! Each row converts into its core domain type; conversions that parse
//! stored enum strings are fallible.

pub mod action;
pub mod country;
pub mod edition;
