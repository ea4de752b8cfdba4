//! CSV backlog import.
//!
//! Operations keeps a spreadsheet of submitted-but-unmigrated license
//! requests; this module hydrates the store from such an export so demos and
//! rehearsals start from a realistic register. Attachments are not part of
//! the export; records load with empty document slots.

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use super::domain::{ApplicantSnapshot, AttachmentSet, LicenseDetails, LicenseKind};
use super::submission::SubmissionForm;

/// One backlog row, ready to hand to the submission collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct BacklogEntry {
    pub form: SubmissionForm,
    pub submitted_on: NaiveDate,
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("row {row}: cannot parse '{value}' as a YYYY-MM-DD date for {field}")]
    InvalidDate {
        row: usize,
        field: &'static str,
        value: String,
    },
    #[error("row {row}: unknown license type '{value}' (expected new or extension)")]
    UnknownLicenseKind { row: usize, value: String },
}

pub fn backlog_from_path(path: impl AsRef<Path>) -> Result<Vec<BacklogEntry>, SeedError> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;
    collect_entries(reader)
}

pub fn backlog_from_reader<R: Read>(reader: R) -> Result<Vec<BacklogEntry>, SeedError> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    collect_entries(reader)
}

fn collect_entries<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<BacklogEntry>, SeedError> {
    let mut entries = Vec::new();
    for (index, record) in reader.deserialize::<BacklogRow>().enumerate() {
        let row = record?;
        entries.push(row.into_entry(index + 1)?);
    }
    Ok(entries)
}

#[derive(Debug, Deserialize)]
struct BacklogRow {
    #[serde(rename = "Submitted On")]
    submitted_on: String,
    #[serde(rename = "Applicant")]
    applicant: String,
    #[serde(rename = "Staff Number")]
    staff_number: String,
    #[serde(rename = "Department")]
    department: String,
    #[serde(rename = "Designation", default)]
    designation: String,
    #[serde(rename = "Contact Number", default)]
    contact_number: String,
    #[serde(rename = "National ID", default)]
    national_id: String,
    #[serde(rename = "License Type")]
    license_type: String,
    #[serde(rename = "Current Permit No", default, deserialize_with = "empty_string_as_none")]
    current_permit_no: Option<String>,
    #[serde(rename = "First Issued On", default, deserialize_with = "empty_string_as_none")]
    first_issued_on: Option<String>,
    #[serde(rename = "Airside Pass No")]
    airside_pass_no: String,
    #[serde(rename = "Airside Pass Expires")]
    airside_pass_expires_on: String,
    #[serde(rename = "State License No")]
    state_license_no: String,
    #[serde(rename = "State License Issued")]
    state_license_issued_on: String,
    #[serde(rename = "State License Expires")]
    state_license_expires_on: String,
    /// Pipe-separated catalog keys, e.g. `car|van|pickUp`.
    #[serde(rename = "Categories")]
    categories: String,
    #[serde(rename = "Sectional Manager")]
    sectional_manager: String,
}

impl BacklogRow {
    fn into_entry(self, row: usize) -> Result<BacklogEntry, SeedError> {
        let submitted_on = parse_date(row, "Submitted On", &self.submitted_on)?;

        let kind = match self.license_type.to_ascii_lowercase().as_str() {
            "new" => LicenseKind::New,
            "extension" => LicenseKind::Extension,
            other => {
                return Err(SeedError::UnknownLicenseKind {
                    row,
                    value: other.to_string(),
                })
            }
        };

        let first_issued_on = self
            .first_issued_on
            .as_deref()
            .map(|value| parse_date(row, "First Issued On", value))
            .transpose()?;

        let form = SubmissionForm {
            applicant: ApplicantSnapshot {
                name: self.applicant,
                staff_number: self.staff_number,
                department: self.department,
                designation: self.designation,
                contact_number: self.contact_number,
                national_id: self.national_id,
            },
            license: LicenseDetails {
                kind,
                current_permit_no: self.current_permit_no,
                first_issued_on,
                airside_pass_no: self.airside_pass_no,
                airside_pass_expires_on: parse_date(
                    row,
                    "Airside Pass Expires",
                    &self.airside_pass_expires_on,
                )?,
                state_license_no: self.state_license_no,
                state_license_issued_on: parse_date(
                    row,
                    "State License Issued",
                    &self.state_license_issued_on,
                )?,
                state_license_expires_on: parse_date(
                    row,
                    "State License Expires",
                    &self.state_license_expires_on,
                )?,
            },
            selected_categories: self
                .categories
                .split('|')
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .map(str::to_string)
                .collect(),
            attachments: AttachmentSet::default(),
            sectional_manager: self.sectional_manager,
        };

        Ok(BacklogEntry { form, submitted_on })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_date(row: usize, field: &'static str, value: &str) -> Result<NaiveDate, SeedError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| SeedError::InvalidDate {
        row,
        field,
        value: value.to_string(),
    })
}
