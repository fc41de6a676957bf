pub mod accounts;
pub mod events;

pub use accounts::{AccountService, Session};
pub use events::EventService;
