use crate::commands::{prepare, CommandResult};
use roster_core::config::StorageBackend;
use roster_db::{connection::connect_to, migrations, DemoCustomers, SeedResult, SqlCustomerRepository};

pub fn run() -> CommandResult {
    let (config, runtime) = match prepare("seed") {
        Ok(prepared) => prepared,
        Err(result) => return result,
    };

    if config.database.backend == StorageBackend::Memory {
        return CommandResult::success(
            "seed",
            "memory backend has nothing to seed; its store lives inside the server process",
        );
    }

    let result = runtime.block_on(async {
        let pool = connect_to(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let repository = SqlCustomerRepository::new(pool.clone());
        let seeded = DemoCustomers::load(&repository)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8));

        pool.close().await;
        seeded
    });

    match result {
        Ok(seeded) => CommandResult::success("seed", summary(&seeded)),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

fn summary(seeded: &SeedResult) -> String {
    let names = DemoCustomers::customers()
        .iter()
        .map(|customer| format!("{} {}", customer.first_name, customer.last_name))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "demo customers loaded (inserted {}, already present {}): {names}",
        seeded.inserted, seeded.skipped
    )
}

#[cfg(test)]
mod tests {
    use roster_db::SeedResult;

    use super::summary;

    #[test]
    fn summary_lists_counts_and_names() {
        let message = summary(&SeedResult { inserted: 3, skipped: 1 });

        assert!(message.starts_with("demo customers loaded (inserted 3, already present 1): "));
        assert!(message.ends_with("Mallik Alinta, Udaya Alinta, Daksha Alinta, MyLittle Alinta"));
    }
}
