use lexbook_core::config::{AppConfig, AvailabilityProviderKind, LoadOptions};
use lexbook_db::{connect_with_config, status_report};
use serde::Serialize;

const REQUIRED_TABLES: [&str; 3] = ["appointments", "clients", "lawyers"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_llm(&config));
            checks.push(check_availability(&config));
            checks.push(check_database(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["llm_readiness", "availability_provider", "database_readiness"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_llm(config: &AppConfig) -> DoctorCheck {
    let credential =
        if config.llm.api_key.is_some() { "api key configured" } else { "no api key" };
    DoctorCheck {
        name: "llm_readiness",
        status: CheckStatus::Pass,
        details: format!(
            "{} model `{}` at {}, {credential}",
            config.llm.provider.as_str(),
            config.llm.model,
            config.llm.effective_base_url()
        ),
    }
}

fn check_availability(config: &AppConfig) -> DoctorCheck {
    let details = match (config.availability.provider, &config.availability.calendar_base_url) {
        (AvailabilityProviderKind::Calendar, Some(url)) => {
            format!("calendar service at {url}")
        }
        (kind, _) => format!("{} schedule", kind.as_str()),
    };
    DoctorCheck { name: "availability_provider", status: CheckStatus::Pass, details }
}

fn check_database(config: &AppConfig) -> DoctorCheck {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return DoctorCheck {
                name: "database_readiness",
                status: CheckStatus::Fail,
                details: format!("failed to initialize async runtime: {error}"),
            };
        }
    };

    let result = runtime.block_on(async {
        let pool = connect_with_config(&config.database)
            .await
            .map_err(|error| format!("failed to connect to database: {error}"))?;
        let report = status_report(&pool)
            .await
            .map_err(|error| format!("failed to inspect database: {error}"));
        pool.close().await;
        report
    });

    match result {
        Ok(report) => {
            let missing: Vec<&str> = REQUIRED_TABLES
                .into_iter()
                .filter(|table| !report.tables.iter().any(|present| present == table))
                .collect();
            if missing.is_empty() {
                DoctorCheck {
                    name: "database_readiness",
                    status: CheckStatus::Pass,
                    details: format!(
                        "connected using `{}`, {} lawyers on file",
                        config.database.url, report.lawyer_count
                    ),
                }
            } else {
                DoctorCheck {
                    name: "database_readiness",
                    status: CheckStatus::Fail,
                    details: format!(
                        "missing tables: {} (run `lexbook init`)",
                        missing.join(", ")
                    ),
                }
            }
        }
        Err(error) => {
            DoctorCheck { name: "database_readiness", status: CheckStatus::Fail, details: error }
        }
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
