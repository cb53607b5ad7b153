//! Conversion of Locust stats CSV output into Allure result records.
//!
//! The load generator writes one CSV row per logical operation; the
//! reporting tool consumes a directory of JSON result records. Each row
//! becomes one record, marked passed or failed by comparing its failure
//! rate against a configured threshold. The input is parsed completely
//! before anything is written, so malformed input never leaves partial
//! output behind.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Error type for the conversion pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("stats file not found: {0}")]
    MissingInput(PathBuf),
    #[error("malformed stats row: {0}")]
    Csv(#[from] csv::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("result serialization: {0}")]
    Json(#[from] serde_json::Error),
}

/// One row of the Locust stats CSV. Percentile columns are optional since
/// older Locust versions emit fewer of them.
#[derive(Clone, Debug, Deserialize)]
pub struct StatsRow {
    #[serde(rename = "Type", default)]
    pub method: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Request Count")]
    pub request_count: u64,
    #[serde(rename = "Failure Count")]
    pub failure_count: u64,
    #[serde(rename = "Average Response Time", default)]
    pub average_response_time: f64,
    #[serde(rename = "Min Response Time", default)]
    pub min_response_time: f64,
    #[serde(rename = "Max Response Time", default)]
    pub max_response_time: f64,
    #[serde(rename = "Requests/s", default)]
    pub requests_per_second: f64,
    #[serde(rename = "50%", default)]
    pub p50: Option<f64>,
    #[serde(rename = "95%", default)]
    pub p95: Option<f64>,
    #[serde(rename = "99%", default)]
    pub p99: Option<f64>,
}

impl StatsRow {
    /// Failures as a fraction of requests; zero-request rows count as clean.
    pub fn failure_rate(&self) -> f64 {
        if self.request_count == 0 {
            0.0
        } else {
            self.failure_count as f64 / self.request_count as f64
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Passed,
    Failed,
}

#[derive(Clone, Debug, Serialize)]
pub struct Label {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct Parameter {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct StepResult {
    pub name: String,
    pub status: Status,
    pub start: u64,
    pub stop: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct StatusDetails {
    pub message: String,
    pub trace: String,
}

/// One Allure result record, written as `<output>/<uuid>/result.json`.
#[derive(Clone, Debug, Serialize)]
pub struct AllureResult {
    pub name: String,
    pub status: Status,
    pub start: u64,
    pub stop: u64,
    pub uuid: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub labels: Vec<Label>,
    pub steps: Vec<StepResult>,
    pub parameters: Vec<Parameter>,
    #[serde(rename = "statusDetails", skip_serializing_if = "Option::is_none")]
    pub status_details: Option<StatusDetails>,
}

/// Conversion settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConvertOptions {
    /// Failure rate at or above which an operation is marked failed.
    pub failure_threshold: f64,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            failure_threshold: 0.1,
        }
    }
}

/// Reads the stats CSV at `input` and writes one result record per logical
/// operation under `output_dir`. Returns the number of records written.
///
/// The whole file is parsed before the first write; a missing or malformed
/// input produces an error and no output.
pub fn convert_stats(
    input: &Path,
    output_dir: &Path,
    options: &ConvertOptions,
) -> Result<usize, ReportError> {
    if !input.is_file() {
        return Err(ReportError::MissingInput(input.to_path_buf()));
    }

    let mut reader = csv::Reader::from_path(input)?;
    let mut rows = Vec::new();
    for row in reader.deserialize::<StatsRow>() {
        rows.push(row?);
    }

    let started = unix_millis();
    let records: Vec<AllureResult> = rows
        .iter()
        .filter(|row| !row.name.is_empty() && row.name != "Aggregated")
        .map(|row| build_record(row, started, options))
        .collect();

    for record in &records {
        let record_dir = output_dir.join(&record.uuid);
        fs::create_dir_all(&record_dir)?;
        let file = fs::File::create(record_dir.join("result.json"))?;
        serde_json::to_writer_pretty(file, record)?;
    }

    tracing::info!(
        records = records.len(),
        output = %output_dir.display(),
        "wrote result records"
    );
    Ok(records.len())
}

fn build_record(row: &StatsRow, started: u64, options: &ConvertOptions) -> AllureResult {
    let failure_rate = row.failure_rate();
    let status = if failure_rate < options.failure_threshold {
        Status::Passed
    } else {
        Status::Failed
    };
    let stop = started + 1_000;
    let uuid = slug(&row.name);

    let mut parameters = vec![
        Parameter {
            name: "Request Count".to_owned(),
            value: row.request_count.to_string(),
        },
        Parameter {
            name: "Failure Count".to_owned(),
            value: row.failure_count.to_string(),
        },
        Parameter {
            name: "Average Response Time".to_owned(),
            value: format!("{}ms", row.average_response_time),
        },
        Parameter {
            name: "Min Response Time".to_owned(),
            value: format!("{}ms", row.min_response_time),
        },
        Parameter {
            name: "Max Response Time".to_owned(),
            value: format!("{}ms", row.max_response_time),
        },
        Parameter {
            name: "Requests/s".to_owned(),
            value: row.requests_per_second.to_string(),
        },
    ];
    for (name, value) in [("p50", row.p50), ("p95", row.p95), ("p99", row.p99)] {
        if let Some(value) = value {
            parameters.push(Parameter {
                name: name.to_owned(),
                value: format!("{value}ms"),
            });
        }
    }

    let status_details = (status == Status::Failed).then(|| StatusDetails {
        message: format!(
            "Load test failed with {:.2}% failure rate",
            failure_rate * 100.0
        ),
        trace: format!(
            "Request Count: {}, Failure Count: {}, Average Response Time: {}ms",
            row.request_count, row.failure_count, row.average_response_time
        ),
    });

    AllureResult {
        name: row.name.clone(),
        status,
        start: started,
        stop,
        uuid,
        full_name: format!("Locust: {}", row.name),
        labels: vec![
            Label {
                name: "suite".to_owned(),
                value: "Performance Tests".to_owned(),
            },
            Label {
                name: "testClass".to_owned(),
                value: "LocustLoadTest".to_owned(),
            },
            Label {
                name: "method".to_owned(),
                value: row.name.clone(),
            },
            Label {
                name: "package".to_owned(),
                value: "performance.locust".to_owned(),
            },
        ],
        steps: vec![StepResult {
            name: format!("Load Test: {}", row.name),
            status,
            start: started,
            stop,
        }],
        parameters,
        status_details,
    }
}

/// Stable directory name derived from the operation name.
fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 7);
    out.push_str("locust-");
    let mut last_dash = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            out.extend(ch.to_lowercase());
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }
    out.trim_end_matches('-').to_owned()
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
