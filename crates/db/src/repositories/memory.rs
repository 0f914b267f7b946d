use tokio::sync::RwLock;

use roster_core::domain::customer::{Customer, CustomerId};

use super::{CustomerRepository, Repository, RepositoryError};

/// Process-local store. Records keep insertion order.
#[derive(Default)]
pub struct InMemoryCustomerRepository {
    customers: RwLock<Vec<Customer>>,
}

impl InMemoryCustomerRepository {
    pub fn with_customers(customers: impl IntoIterator<Item = Customer>) -> Self {
        Self { customers: RwLock::new(customers.into_iter().collect()) }
    }
}

#[async_trait::async_trait]
impl Repository<Customer> for InMemoryCustomerRepository {
    async fn list(&self) -> Result<Vec<Customer>, RepositoryError> {
        let customers = self.customers.read().await;
        Ok(customers.clone())
    }

    async fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let customers = self.customers.read().await;
        Ok(customers.iter().find(|customer| customer.id == *id).cloned())
    }

    async fn insert(&self, customer: Customer) -> Result<Customer, RepositoryError> {
        let mut customers = self.customers.write().await;
        customers.push(customer.clone());
        Ok(customer)
    }

    async fn replace(&self, customer: Customer) -> Result<Customer, RepositoryError> {
        let mut customers = self.customers.write().await;
        match customers.iter_mut().find(|stored| stored.id == customer.id) {
            Some(stored) => *stored = customer.clone(),
            None => customers.push(customer.clone()),
        }
        Ok(customer)
    }

    async fn remove(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let mut customers = self.customers.write().await;
        let position = customers.iter().position(|customer| customer.id == *id);
        Ok(position.map(|index| customers.remove(index)))
    }
}

#[async_trait::async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn get_by_name(&self, text: &str) -> Result<Vec<Customer>, RepositoryError> {
        let customers = self.customers.read().await;
        Ok(customers.iter().filter(|customer| customer.name_contains(text)).cloned().collect())
    }
}
