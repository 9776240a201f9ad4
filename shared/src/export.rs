use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{CaseRecord, FieldWorker};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("csv buffer flush failed: {0}")]
    Flush(String),

    #[error("export is not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// A generated file handed to the shell for download.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ExportedFile {
    pub file_name: String,
    pub mime_type: String,
    pub contents: String,
}

pub const CASE_HEADER: [&str; 6] = [
    "Case ID",
    "Patient Name",
    "District",
    "Severity",
    "Status",
    "Reported At",
];

pub const ROSTER_HEADER: [&str; 4] = ["Name", "Role", "Location", "Status"];

pub fn export_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{prefix}-{}.csv", date.format("%Y-%m-%d"))
}

fn write_rows<I, R>(header: &[&str], rows: I) -> Result<String, ExportError>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator,
    R::Item: AsRef<[u8]>,
{
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Flush(e.error().to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Fields containing commas, quotes or newlines are quoted.
pub fn cases_csv<'a, I>(cases: I, date: NaiveDate) -> Result<ExportedFile, ExportError>
where
    I: IntoIterator<Item = &'a CaseRecord>,
{
    let contents = write_rows(
        &CASE_HEADER,
        cases.into_iter().map(|c| {
            [
                c.id.to_string(),
                c.patient.name.clone(),
                c.location.district.clone(),
                c.severity.to_string(),
                c.status.to_string(),
                c.reported_at_label(),
            ]
        }),
    )?;

    Ok(ExportedFile {
        file_name: export_file_name("case-reports", date),
        mime_type: "text/csv".into(),
        contents,
    })
}

pub fn roster_csv(team: &[FieldWorker], date: NaiveDate) -> Result<ExportedFile, ExportError> {
    let contents = write_rows(
        &ROSTER_HEADER,
        team.iter()
            .map(|w| [w.name.as_str(), w.role.as_str(), w.location.as_str(), w.status.as_str()]),
    )?;

    Ok(ExportedFile {
        file_name: export_file_name("field-team", date),
        mime_type: "text/csv".into(),
        contents,
    })
}
