pub mod fetch_unread;
pub mod list_dialogs;
pub mod send_message;

pub use fetch_unread::fetch_unread;
pub use list_dialogs::list_dialogs;
pub use send_message::send_message;
