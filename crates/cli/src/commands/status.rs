use crate::commands::{prepare, CommandResult};
use lexbook_db::{connect_with_config, status_report, StatusReport};

pub fn run() -> CommandResult {
    let (config, runtime) = match prepare("status") {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = connect_with_config(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
        let report =
            status_report(&pool).await.map_err(|error| ("status_query", error.to_string(), 5u8));
        pool.close().await;
        report
    });

    match result {
        Ok(report) => CommandResult::success("status", render(&report)),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("status", error_class, message, exit_code)
        }
    }
}

fn render(report: &StatusReport) -> String {
    let tables = if report.tables.is_empty() {
        "none (run `lexbook init`)".to_string()
    } else {
        report.tables.join(", ")
    };

    let mut lines = vec![
        format!("tables: {tables}"),
        format!(
            "records: {} lawyers, {} appointments, {} clients",
            report.lawyer_count, report.appointment_count, report.client_count
        ),
    ];
    lines.extend(report.lawyers.iter().map(|lawyer| {
        format!(
            "  - {}: {} [{}] ${}/h",
            lawyer.id, lawyer.name, lawyer.practice_areas, lawyer.hourly_rate
        )
    }));

    lines.join("\n")
}
