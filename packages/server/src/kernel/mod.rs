//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod pg;
pub mod provider;
pub mod test_dependencies;
pub mod traits;

pub use deps::ServerDeps;
pub use pg::{PgProfileStore, PgSessionStore, PgUserStore};
pub use test_dependencies::{MockTelegram, TestDependencies, TestStores};
pub use traits::*;
