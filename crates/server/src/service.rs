use async_trait::async_trait;
use roster_core::domain::customer::{Customer, CustomerId};
use roster_core::errors::ApplicationError;
use roster_db::repositories::CustomerRepository;

/// Business operations the HTTP layer depends on.
#[async_trait]
pub trait CustomerService: Send + Sync {
    async fn get_all_customers(&self) -> Result<Vec<Customer>, ApplicationError>;

    async fn get_customers_by_name(&self, name: &str) -> Result<Vec<Customer>, ApplicationError>;

    async fn add_customer(&self, customer: Customer) -> Result<Customer, ApplicationError>;

    async fn update_customer(&self, customer: Customer) -> Result<Customer, ApplicationError>;

    async fn delete_customer(&self, id: &CustomerId) -> Result<Customer, ApplicationError>;
}

pub struct RepositoryCustomerService<R> {
    repository: R,
}

impl<R> RepositoryCustomerService<R>
where
    R: CustomerRepository,
{
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R> CustomerService for RepositoryCustomerService<R>
where
    R: CustomerRepository,
{
    async fn get_all_customers(&self) -> Result<Vec<Customer>, ApplicationError> {
        Ok(self.repository.get_all().await?)
    }

    async fn get_customers_by_name(&self, name: &str) -> Result<Vec<Customer>, ApplicationError> {
        Ok(self.repository.get_by_name(name).await?)
    }

    async fn add_customer(&self, customer: Customer) -> Result<Customer, ApplicationError> {
        Ok(self.repository.add(customer).await?)
    }

    async fn update_customer(&self, customer: Customer) -> Result<Customer, ApplicationError> {
        Ok(self.repository.update(customer).await?)
    }

    async fn delete_customer(&self, id: &CustomerId) -> Result<Customer, ApplicationError> {
        Ok(self.repository.delete(id).await?)
    }
}
