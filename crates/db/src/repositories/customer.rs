use chrono::NaiveDate;
use sqlx::Row;

use roster_core::domain::customer::{Customer, CustomerId};

use super::{CustomerRepository, Repository, RepositoryError};
use crate::DbPool;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct SqlCustomerRepository {
    pool: DbPool,
}

impl SqlCustomerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_customer(row: &sqlx::sqlite::SqliteRow) -> Result<Customer, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let first_name: String =
        row.try_get("first_name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let last_name: String =
        row.try_get("last_name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let date_of_birth: String =
        row.try_get("date_of_birth").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let id = id
        .parse::<CustomerId>()
        .map_err(|e| RepositoryError::Decode(format!("customer id `{id}`: {e}")))?;
    let date_of_birth = NaiveDate::parse_from_str(&date_of_birth, DATE_FORMAT).map_err(|e| {
        RepositoryError::Decode(format!("customer {id} date_of_birth `{date_of_birth}`: {e}"))
    })?;

    Ok(Customer { id, first_name, last_name, date_of_birth })
}

#[async_trait::async_trait]
impl Repository<Customer> for SqlCustomerRepository {
    async fn list(&self) -> Result<Vec<Customer>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, first_name, last_name, date_of_birth
             FROM customer ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_customer).collect()
    }

    async fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, first_name, last_name, date_of_birth
             FROM customer WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_customer(r)?)),
            None => Ok(None),
        }
    }

    async fn insert(&self, customer: Customer) -> Result<Customer, RepositoryError> {
        sqlx::query(
            "INSERT INTO customer (id, first_name, last_name, date_of_birth)
             VALUES (?, ?, ?, ?)",
        )
        .bind(customer.id.to_string())
        .bind(&customer.first_name)
        .bind(&customer.last_name)
        .bind(customer.date_of_birth.format(DATE_FORMAT).to_string())
        .execute(&self.pool)
        .await?;

        Ok(customer)
    }

    async fn replace(&self, customer: Customer) -> Result<Customer, RepositoryError> {
        sqlx::query(
            "UPDATE customer
             SET first_name = ?, last_name = ?, date_of_birth = ?
             WHERE id = ?",
        )
        .bind(&customer.first_name)
        .bind(&customer.last_name)
        .bind(customer.date_of_birth.format(DATE_FORMAT).to_string())
        .bind(customer.id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(customer)
    }

    async fn remove(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let Some(existing) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM customer WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(Some(existing))
    }
}

#[async_trait::async_trait]
impl CustomerRepository for SqlCustomerRepository {
    async fn get_by_name(&self, text: &str) -> Result<Vec<Customer>, RepositoryError> {
        // instr() with an empty needle returns 1, so "" matches every row.
        let rows = sqlx::query(
            "SELECT id, first_name, last_name, date_of_birth
             FROM customer
             WHERE instr(upper(first_name), upper(?)) > 0
                OR instr(upper(last_name), upper(?)) > 0
             ORDER BY rowid",
        )
        .bind(text)
        .bind(text)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_customer).collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use uuid::Uuid;

    use roster_core::domain::customer::{Customer, CustomerId};
    use roster_core::errors::DomainError;

    use super::SqlCustomerRepository;
    use crate::repositories::{CustomerRepository, Repository, RepositoryError};
    use crate::{connect_with_settings, migrations, DbPool};

    async fn setup() -> (DbPool, SqlCustomerRepository) {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        (pool.clone(), SqlCustomerRepository::new(pool))
    }

    fn customer(first_name: &str, last_name: &str) -> Customer {
        Customer {
            id: CustomerId(Uuid::new_v4()),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(2000, 4, 6).expect("valid date"),
        }
    }

    #[tokio::test]
    async fn add_persists_row_with_text_columns() {
        let (pool, repo) = setup().await;
        let record = customer("Mallik", "Alinta");

        repo.add(record.clone()).await.expect("add");

        let (id, dob): (String, String) =
            sqlx::query_as("SELECT id, date_of_birth FROM customer WHERE first_name = 'Mallik'")
                .fetch_one(&pool)
                .await
                .expect("fetch row");
        assert_eq!(id, record.id.to_string());
        assert_eq!(dob, "2000-04-06");
        assert_eq!(repo.find_by_id(&record.id).await.expect("find"), Some(record));
    }

    #[tokio::test]
    async fn duplicate_add_surfaces_domain_error_not_constraint_violation() {
        let (_pool, repo) = setup().await;
        let record = customer("Mallik", "Alinta");
        repo.add(record.clone()).await.expect("first add");

        let error = repo.add(record).await.expect_err("second add must fail");

        assert!(matches!(error, RepositoryError::Domain(DomainError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn update_rewrites_fields_and_keeps_order() {
        let (_pool, repo) = setup().await;
        let first = customer("Mallik", "Alinta");
        let second = customer("Udaya", "Alinta");
        repo.add(first.clone()).await.expect("add first");
        repo.add(second.clone()).await.expect("add second");

        let renamed = Customer {
            first_name: "MallikUpdated".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(2001, 5, 7).expect("valid date"),
            ..first
        };
        repo.update(renamed.clone()).await.expect("update");

        assert_eq!(repo.get_all().await.expect("get all"), vec![renamed, second]);
    }

    #[tokio::test]
    async fn missing_ids_are_rejected_for_update_and_delete() {
        let (_pool, repo) = setup().await;
        let stranger = customer("Daksha", "Alinta");

        let update = repo.update(stranger.clone()).await.expect_err("update must fail");
        let delete = repo.delete(&stranger.id).await.expect_err("delete must fail");

        assert!(matches!(update, RepositoryError::Domain(DomainError::DoesNotExist { .. })));
        assert!(matches!(delete, RepositoryError::Domain(DomainError::DoesNotExist { .. })));
    }

    #[tokio::test]
    async fn delete_returns_removed_record() {
        let (_pool, repo) = setup().await;
        let keep = customer("Mallik", "Alinta");
        let gone = customer("Udaya", "Alinta");
        repo.add(keep.clone()).await.expect("add keep");
        repo.add(gone.clone()).await.expect("add gone");

        let removed = repo.delete(&gone.id).await.expect("delete");

        assert_eq!(removed, gone);
        assert_eq!(repo.get_all().await.expect("get all"), vec![keep]);
    }

    #[tokio::test]
    async fn name_search_is_case_insensitive_substring_over_both_names() {
        let (_pool, repo) = setup().await;
        let records =
            [customer("Mallik", "Alinta"), customer("Alice", "Smith"), customer("Bob", "Jones")];
        for record in records {
            repo.add(record).await.expect("add");
        }

        let matches = repo.get_by_name("ALI").await.expect("search");
        let none = repo.get_by_name("zed").await.expect("search");
        let everyone = repo.get_by_name("").await.expect("empty search");

        let names: Vec<&str> = matches.iter().map(|c| c.first_name.as_str()).collect();
        assert_eq!(names, vec!["Mallik", "Alice"]);
        assert!(none.is_empty());
        assert_eq!(everyone.len(), 3);
    }

    #[tokio::test]
    async fn corrupt_row_is_reported_as_decode_error() {
        let (pool, repo) = setup().await;
        sqlx::query(
            "INSERT INTO customer (id, first_name, last_name, date_of_birth)
             VALUES ('not-a-uuid', 'Mallik', 'Alinta', '2000-04-06')",
        )
        .execute(&pool)
        .await
        .expect("insert corrupt row");

        let error = repo.get_all().await.expect_err("decode must fail");

        assert!(matches!(
            error,
            RepositoryError::Decode(ref message) if message.contains("not-a-uuid")
        ));
    }
}
