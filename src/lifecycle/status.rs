use chrono::{DateTime, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{
    error::{GymError, Result},
    storage::models::Member,
};

/// Members with this many days left or fewer (and not yet past expiry) are expiring.
pub const EXPIRING_WINDOW_DAYS: i64 = 7;

/// Membership status, always derived from the expiry date and a reference day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Active,
    Expiring,
    Expired,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Active => "active",
            MemberStatus::Expiring => "expiring",
            MemberStatus::Expired => "expired",
        }
    }
}

impl std::fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MemberStatus {
    type Err = GymError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(MemberStatus::Active),
            "expiring" => Ok(MemberStatus::Expiring),
            "expired" => Ok(MemberStatus::Expired),
            other => Err(GymError::InvalidRecord(format!("unknown status '{}'", other))),
        }
    }
}

/// Whole calendar days from `today` until `expiry`. Negative once the expiry has passed.
pub fn days_left(expiry: NaiveDate, today: NaiveDate) -> i64 {
    (expiry - today).num_days()
}

/// Classify a membership against `today`
///
/// - fewer than 0 days left: expired
/// - 0 to 7 days left (expiring today included): expiring
/// - more than 7 days left: active
pub fn classify(expiry: NaiveDate, today: NaiveDate) -> MemberStatus {
    let days = days_left(expiry, today);

    if days < 0 {
        MemberStatus::Expired
    } else if days <= EXPIRING_WINDOW_DAYS {
        MemberStatus::Expiring
    } else {
        MemberStatus::Active
    }
}

/// Parse a calendar date, accepting `YYYY-MM-DD` or an RFC 3339 timestamp.
///
/// Timestamps keep only their date part, so comparisons are per calendar day.
pub fn parse_calendar_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(GymError::InvalidDate("missing date".to_string()));
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }

    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.date_naive())
        .map_err(|_| GymError::InvalidDate(trimmed.to_string()))
}

/// Expiry date for a plan of `plan_duration` months starting on `joining_date`.
///
/// A day that does not exist in the target month clamps to its last day
/// (Jan 31 + 1 month = Feb 28/29).
pub fn expiry_for(joining_date: NaiveDate, plan_duration: i64) -> Result<NaiveDate> {
    if plan_duration <= 0 {
        return Err(GymError::InvalidDuration(plan_duration));
    }

    let months = u32::try_from(plan_duration).map_err(|_| GymError::InvalidDuration(plan_duration))?;

    joining_date
        .checked_add_months(Months::new(months))
        .ok_or_else(|| GymError::InvalidDate(format!("{} + {} months", joining_date, months)))
}

/// Restart a membership on `today` for another `plan_duration` months.
pub fn renew(member: &Member, today: NaiveDate) -> Result<Member> {
    let expiry_date = expiry_for(today, i64::from(member.plan_duration))?;

    Ok(Member {
        joining_date: today,
        expiry_date,
        ..member.clone()
    })
}
