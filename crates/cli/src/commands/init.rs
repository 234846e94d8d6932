use crate::commands::{prepare, CommandResult};
use lexbook_db::{connect_with_config, initialize};

pub fn run() -> CommandResult {
    let (config, runtime) = match prepare("init") {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = connect_with_config(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
        let report = initialize(&pool)
            .await
            .map_err(|error| ("initialization", error.to_string(), 5u8));
        pool.close().await;
        report
    });

    match result {
        Ok(report) => CommandResult::success(
            "init",
            format!(
                "database ready: {} lawyers added, {} lawyers on file, {} appointments",
                report.lawyers_added, report.lawyer_count, report.appointment_count
            ),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("init", error_class, message, exit_code)
        }
    }
}
