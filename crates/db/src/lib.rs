pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;

pub use connection::{connect, connect_with_settings, DbPool};
pub use fixtures::{DemoCustomers, SeedResult};
pub use repositories::{
    CustomerRepository, InMemoryCustomerRepository, Repository, RepositoryError,
    SqlCustomerRepository,
};
