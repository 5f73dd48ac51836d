// Telegram profile hub - service core
//
// Lets an application user attach Telegram accounts ("profiles") by phone
// number, walk the phone -> code -> optional 2FA password login ceremony, and
// reuse the persisted session to read and send messages on the profile's
// behalf. The provider wire protocol lives behind the traits in the
// `telegram` crate; this crate owns the auth state machine, the session
// lifecycle and the HTTP surface.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
