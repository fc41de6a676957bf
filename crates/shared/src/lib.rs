pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod domain {
    pub mod event;
    pub mod payload;
    pub mod rsvp;
    pub mod user;
}
pub mod identity;
pub mod policy;
pub mod repo;
pub mod seed;
pub mod service;

pub use config::AppConfig;
pub use error::{ApiError, Result};
pub use identity::{AuthUser, Identity};
