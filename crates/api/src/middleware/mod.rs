//! Request extractors.
//!
//! - [`editor::Editor`] -- the editor named in the `X-Editor-Name` header.

pub mod editor;
