//! Deterministic demo dataset: four customers sharing the last name `Alinta`.

use chrono::NaiveDate;
use uuid::Uuid;

use roster_core::domain::customer::{Customer, CustomerId};

use crate::repositories::{CustomerRepository, Repository, RepositoryError};

const DEMO_ROWS: &[(&str, &str, &str)] = &[
    ("ef743a6d-e780-4406-9fd7-6e398db82adc", "Mallik", "Alinta"),
    ("6db0cc43-70ef-44d5-ac56-39970a036b3d", "Udaya", "Alinta"),
    ("753aca39-53f3-426c-b15e-c5385c38d3e4", "Daksha", "Alinta"),
    ("49ff6071-49bc-4372-9c8d-26d190fa9485", "MyLittle", "Alinta"),
];

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SeedResult {
    pub inserted: usize,
    pub skipped: usize,
}

pub struct DemoCustomers;

impl DemoCustomers {
    pub fn customers() -> Vec<Customer> {
        let date_of_birth = NaiveDate::from_ymd_opt(2000, 4, 6).unwrap_or_default();
        DEMO_ROWS
            .iter()
            .filter_map(|(id, first_name, last_name)| {
                let id = Uuid::parse_str(id).ok()?;
                Some(Customer {
                    id: CustomerId(id),
                    first_name: (*first_name).to_string(),
                    last_name: (*last_name).to_string(),
                    date_of_birth,
                })
            })
            .collect()
    }

    /// Inserts every demo customer whose id is not already stored.
    pub async fn load<R>(repository: &R) -> Result<SeedResult, RepositoryError>
    where
        R: CustomerRepository + ?Sized,
    {
        let mut result = SeedResult::default();
        for customer in Self::customers() {
            if repository.exists(&customer.id).await? {
                result.skipped += 1;
                continue;
            }
            repository.insert(customer).await?;
            result.inserted += 1;
        }

        tracing::info!(
            event_name = "db.seed.demo_customers",
            correlation_id = "seed",
            inserted = result.inserted,
            skipped = result.skipped,
            "demo customers loaded"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::{DemoCustomers, SeedResult};
    use crate::repositories::{CustomerRepository, InMemoryCustomerRepository};

    #[test]
    fn demo_set_is_four_valid_alinta_customers() {
        let customers = DemoCustomers::customers();

        assert_eq!(customers.len(), 4);
        assert!(customers.iter().all(|customer| customer.last_name == "Alinta"));
        assert!(customers.iter().all(|customer| customer.ensure_valid().is_ok()));
    }

    #[tokio::test]
    async fn loading_twice_skips_existing_ids() {
        let repo = InMemoryCustomerRepository::default();

        let first = DemoCustomers::load(&repo).await.expect("first load");
        let second = DemoCustomers::load(&repo).await.expect("second load");

        assert_eq!(first, SeedResult { inserted: 4, skipped: 0 });
        assert_eq!(second, SeedResult { inserted: 0, skipped: 4 });
        assert_eq!(repo.get_all().await.expect("get all").len(), 4);
    }
}
