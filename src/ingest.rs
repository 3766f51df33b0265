use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, warn};

use crate::{
    error::{GymError, Result},
    storage::models::{Member, Payment, Plan, RawId, RawMember, RawPayment, RawPlan},
};

/// Records read from a backend export carry the backend's id
pub trait ExportedRecord {
    fn record_id(&self) -> Option<&RawId>;
}

impl ExportedRecord for RawMember {
    fn record_id(&self) -> Option<&RawId> {
        self.id.as_ref()
    }
}

impl ExportedRecord for RawPayment {
    fn record_id(&self) -> Option<&RawId> {
        self.id.as_ref()
    }
}

impl ExportedRecord for RawPlan {
    fn record_id(&self) -> Option<&RawId> {
        self.id.as_ref()
    }
}

/// Imported records must keep their id, so that importing the same file twice
/// updates rows instead of adding new ones.
fn check_id<R: ExportedRecord>(raw: &R) -> Result<()> {
    match raw.record_id() {
        Some(id) if !id.to_string().trim().is_empty() => Ok(()),
        _ => Err(GymError::InvalidRecord("record has no id".to_string())),
    }
}

/// Records that passed validation, plus the ones that did not and why
#[derive(Debug)]
pub struct ImportOutcome<T> {
    pub accepted: Vec<T>,
    pub rejected: Vec<(usize, GymError)>,
}

/// Validate each raw record independently.
///
/// A bad record is logged and skipped; it never fails the whole batch.
pub fn validate_all<R, T>(kind: &str, raws: Vec<R>) -> ImportOutcome<T>
where
    R: ExportedRecord,
    T: TryFrom<R, Error = GymError>,
{
    let mut outcome = ImportOutcome {
        accepted: Vec::with_capacity(raws.len()),
        rejected: Vec::new(),
    };

    for (index, raw) in raws.into_iter().enumerate() {
        match check_id(&raw).and_then(|_| T::try_from(raw)) {
            Ok(record) => outcome.accepted.push(record),
            Err(e) => {
                warn!("Skipping {} record #{}: {}", kind, index + 1, e);
                outcome.rejected.push((index, e));
            }
        }
    }

    debug!(
        "Validated {} {} records ({} rejected)",
        outcome.accepted.len(),
        kind,
        outcome.rejected.len()
    );

    outcome
}

fn read_json_array<R: DeserializeOwned>(path: &Path) -> Result<Vec<R>> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

pub fn members_from_json(json: &str) -> Result<ImportOutcome<Member>> {
    let raws: Vec<RawMember> = serde_json::from_str(json)?;
    let outcome: ImportOutcome<Member> = validate_all("member", raws);

    for member in outcome.accepted.iter().filter(|m| !m.has_consistent_expiry()) {
        warn!(
            "Member {} has expiry {} which does not match joining date {} + {} months",
            member.name, member.expiry_date, member.joining_date, member.plan_duration
        );
    }

    Ok(outcome)
}

pub fn load_members(path: &Path) -> Result<ImportOutcome<Member>> {
    let contents = std::fs::read_to_string(path)?;
    members_from_json(&contents)
}

pub fn load_payments(path: &Path) -> Result<ImportOutcome<Payment>> {
    let raws: Vec<RawPayment> = read_json_array(path)?;
    Ok(validate_all("payment", raws))
}

pub fn load_plans(path: &Path) -> Result<ImportOutcome<Plan>> {
    let raws: Vec<RawPlan> = read_json_array(path)?;
    Ok(validate_all("plan", raws))
}
