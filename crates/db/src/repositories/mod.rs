//! Repository layer.
//!
//! Each repository is a zero-sized struct. Single-statement reads accept
//! any executor so they can run on the pool or inside a transaction;
//! multi-statement writes take a `&mut PgConnection`.

pub mod action_repo;
pub mod country_repo;
pub mod edition_repo;
pub mod part_repo;

pub use action_repo::ActionRepo;
pub use country_repo::CountryRepo;
pub use edition_repo::EditionRepo;
pub use part_repo::PartRepo;
