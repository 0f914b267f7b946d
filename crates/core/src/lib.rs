pub mod config;
pub mod domain;
pub mod errors;

pub use domain::customer::{Customer, CustomerId};
pub use domain::Entity;
pub use errors::{ApplicationError, DomainError, InterfaceError, Violation};
