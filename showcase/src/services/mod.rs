//! Services behind the HTTP handlers.
//!
//! - [`cats::Cats`]: cat greetings
//! - [`users::Users`]: the typical answer given to users

pub mod cats;
pub mod users;

pub use cats::Cats;
pub use users::Users;
