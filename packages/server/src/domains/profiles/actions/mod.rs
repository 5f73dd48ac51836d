pub mod queries;
pub mod start_auth;
pub mod verify_code;
pub mod verify_password;

pub use queries::{list_profiles, ProfileSummary};
pub use start_auth::{start_auth, StartAuthOutcome};
pub use verify_code::{verify_code, Verified};
pub use verify_password::verify_password;
