use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    error::{GymError, Result},
    lifecycle::status::{expiry_for, parse_calendar_date},
};

/// Validated member record. Status is not part of it; see `lifecycle::classify`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Plan length in whole months, always > 0
    pub plan_duration: u32,
    pub joining_date: NaiveDate,
    pub expiry_date: NaiveDate,
}

impl Member {
    /// Create a member whose expiry is computed from the joining date and plan length
    pub fn new(
        name: &str,
        email: &str,
        phone: &str,
        plan_duration: i64,
        joining_date: NaiveDate,
    ) -> Result<Self> {
        let expiry_date = expiry_for(joining_date, plan_duration)?;

        Ok(Self {
            id: new_id(),
            name: required("name", Some(name.to_string()))?,
            email: required("email", Some(email.to_string()))?,
            phone: required("phone", Some(phone.to_string()))?,
            plan_duration: plan_duration as u32,
            joining_date,
            expiry_date,
        })
    }

    pub fn expected_expiry(&self) -> Result<NaiveDate> {
        expiry_for(self.joining_date, i64::from(self.plan_duration))
    }

    /// Whether the stored expiry agrees with joining date + plan length
    pub fn has_consistent_expiry(&self) -> bool {
        self.expected_expiry()
            .map(|expected| expected == self.expiry_date)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Completed,
    #[default]
    Pending,
    Failed,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Completed => write!(f, "completed"),
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = GymError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "completed" => Ok(PaymentStatus::Completed),
            "pending" => Ok(PaymentStatus::Pending),
            "failed" => Ok(PaymentStatus::Failed),
            other => Err(GymError::InvalidRecord(format!("unknown payment status '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub member_id: String,
    pub member_name: String,
    pub amount: f64,
    pub payment_date: Option<NaiveDate>,
    pub payment_method: String,
    pub status: PaymentStatus,
    pub plan_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub duration_days: u32,
    pub features: Vec<String>,
}

/// Record ids coming from the backend are usually strings, sometimes numbers
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Number(i64),
}

impl std::fmt::Display for RawId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawId::Text(s) => f.write_str(s),
            RawId::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Member as exported by the backend. Any stored `status` is read and discarded.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMember {
    pub id: Option<RawId>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub plan_duration: Option<i64>,
    pub joining_date: Option<String>,
    pub expiry_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl TryFrom<RawMember> for Member {
    type Error = GymError;

    fn try_from(raw: RawMember) -> Result<Self> {
        let plan_duration = raw.plan_duration.unwrap_or(0);
        if plan_duration <= 0 || plan_duration > i64::from(u32::MAX) {
            return Err(GymError::InvalidDuration(plan_duration));
        }

        Ok(Self {
            id: raw_id(raw.id),
            name: required("name", raw.name)?,
            email: required("email", raw.email)?,
            phone: required("phone", raw.phone)?,
            plan_duration: plan_duration as u32,
            joining_date: required_date("joining_date", raw.joining_date)?,
            expiry_date: required_date("expiry_date", raw.expiry_date)?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPayment {
    pub id: Option<RawId>,
    pub member_id: Option<RawId>,
    pub member_name: Option<String>,
    pub amount: Option<f64>,
    pub payment_date: Option<String>,
    pub created_at: Option<String>,
    pub payment_method: Option<String>,
    #[serde(default)]
    pub status: PaymentStatus,
    pub plan_name: Option<String>,
}

impl TryFrom<RawPayment> for Payment {
    type Error = GymError;

    fn try_from(raw: RawPayment) -> Result<Self> {
        let amount = raw
            .amount
            .ok_or_else(|| GymError::InvalidRecord("payment amount is missing".to_string()))?;
        if !amount.is_finite() || amount < 0.0 {
            return Err(GymError::InvalidRecord(format!("invalid payment amount {}", amount)));
        }

        // the backend falls back to the creation timestamp when no payment date was entered
        let present = |s: &String| !s.trim().is_empty();
        let payment_date = match raw.payment_date.filter(present).or(raw.created_at.filter(present)) {
            Some(s) => Some(parse_calendar_date(&s)?),
            None => None,
        };

        let member_id = raw
            .member_id
            .map(|id| id.to_string())
            .ok_or_else(|| GymError::InvalidRecord("payment member_id is missing".to_string()))?;

        Ok(Self {
            id: raw_id(raw.id),
            member_id,
            member_name: raw.member_name.unwrap_or_default(),
            amount,
            payment_date,
            payment_method: raw.payment_method.unwrap_or_else(|| "cash".to_string()),
            status: raw.status,
            plan_name: raw.plan_name,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPlan {
    pub id: Option<RawId>,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub duration: Option<i64>,
    #[serde(default)]
    pub features: Vec<String>,
}

impl TryFrom<RawPlan> for Plan {
    type Error = GymError;

    fn try_from(raw: RawPlan) -> Result<Self> {
        let duration = raw.duration.unwrap_or(0);
        if duration <= 0 || duration > i64::from(u32::MAX) {
            return Err(GymError::InvalidDuration(duration));
        }

        let price = raw.price.unwrap_or(0.0);
        if !price.is_finite() || price < 0.0 {
            return Err(GymError::InvalidRecord(format!("invalid plan price {}", price)));
        }

        Ok(Self {
            id: raw_id(raw.id),
            name: required("name", raw.name)?,
            price,
            duration_days: duration as u32,
            features: clean_features(raw.features),
        })
    }
}

/// Trim features and drop empty entries
pub fn clean_features<I, S>(features: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    features
        .into_iter()
        .map(|f| f.as_ref().trim().to_string())
        .filter(|f| !f.is_empty())
        .collect()
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn raw_id(id: Option<RawId>) -> String {
    id.map(|id| id.to_string())
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(new_id)
}

fn required(field: &str, value: Option<String>) -> Result<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(GymError::InvalidRecord(format!("{} is required", field))),
    }
}

fn required_date(field: &str, value: Option<String>) -> Result<NaiveDate> {
    match value {
        Some(v) => parse_calendar_date(&v),
        None => Err(GymError::InvalidDate(format!("{} is missing", field))),
    }
}
