use crate::commands::{prepare, CommandResult};
use roster_core::config::StorageBackend;
use roster_db::{connection::connect_to, migrations};

pub fn run() -> CommandResult {
    let (config, runtime) = match prepare("migrate") {
        Ok(prepared) => prepared,
        Err(result) => return result,
    };

    if config.database.backend == StorageBackend::Memory {
        return CommandResult::success("migrate", "memory backend has no schema to migrate");
    }

    let result = runtime.block_on(async {
        let pool = connect_to(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;
        pool.close().await;
        Ok::<(), (&'static str, String, u8)>(())
    });

    match result {
        Ok(()) => CommandResult::success("migrate", "applied pending migrations"),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("migrate", error_class, message, exit_code)
        }
    }
}
