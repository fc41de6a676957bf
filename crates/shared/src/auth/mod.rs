pub mod password;
pub mod token;

pub use token::{Claims, TokenIssuer};
