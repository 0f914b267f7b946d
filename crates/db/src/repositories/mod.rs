use async_trait::async_trait;
use thiserror::Error;

use roster_core::domain::customer::{Customer, CustomerId};
use roster_core::domain::Entity;
use roster_core::errors::{ApplicationError, DomainError};

pub mod customer;
pub mod memory;

pub use customer::SqlCustomerRepository;
pub use memory::InMemoryCustomerRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Domain(error) => Self::Domain(error),
            other => Self::Persistence(other.to_string()),
        }
    }
}

/// Storage primitives shared by every entity kind. Implementations do not
/// check for existence; that belongs to the entity-specific layer.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    async fn list(&self) -> Result<Vec<E>, RepositoryError>;

    async fn find_by_id(&self, id: &E::Id) -> Result<Option<E>, RepositoryError>;

    async fn insert(&self, entity: E) -> Result<E, RepositoryError>;

    async fn replace(&self, entity: E) -> Result<E, RepositoryError>;

    async fn remove(&self, id: &E::Id) -> Result<Option<E>, RepositoryError>;

    async fn exists(&self, id: &E::Id) -> Result<bool, RepositoryError> {
        Ok(self.find_by_id(id).await?.is_some())
    }
}

#[async_trait]
pub trait CustomerRepository: Repository<Customer> {
    /// Customers whose first or last name contains `text`, ignoring case.
    async fn get_by_name(&self, text: &str) -> Result<Vec<Customer>, RepositoryError>;

    async fn get_all(&self) -> Result<Vec<Customer>, RepositoryError> {
        self.list().await
    }

    async fn add(&self, customer: Customer) -> Result<Customer, RepositoryError> {
        if self.exists(&customer.id).await? {
            return Err(already_exists(&customer.id).into());
        }
        self.insert(customer).await
    }

    async fn update(&self, customer: Customer) -> Result<Customer, RepositoryError> {
        if !self.exists(&customer.id).await? {
            return Err(does_not_exist(&customer.id).into());
        }
        self.replace(customer).await
    }

    async fn delete(&self, id: &CustomerId) -> Result<Customer, RepositoryError> {
        if !self.exists(id).await? {
            return Err(does_not_exist(id).into());
        }
        self.remove(id).await?.ok_or_else(|| does_not_exist(id).into())
    }
}

fn already_exists(id: &CustomerId) -> DomainError {
    DomainError::AlreadyExists { kind: Customer::KIND, id: id.to_string() }
}

fn does_not_exist(id: &CustomerId) -> DomainError {
    DomainError::DoesNotExist { kind: Customer::KIND, id: id.to_string() }
}
