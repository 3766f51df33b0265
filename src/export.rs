use chrono::NaiveDate;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::{
    error::{GymError, Result},
    lifecycle::{classify, revenue_by_month},
    storage::models::{Member, Payment, Plan},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    Members,
    Payments,
    Plans,
    Revenue,
}

impl Dataset {
    pub const ALL: [Dataset; 4] = [
        Dataset::Members,
        Dataset::Payments,
        Dataset::Plans,
        Dataset::Revenue,
    ];

    pub fn file_stem(&self) -> &'static str {
        match self {
            Dataset::Members => "members",
            Dataset::Payments => "payments",
            Dataset::Plans => "plans",
            Dataset::Revenue => "monthly_revenue",
        }
    }
}

/// Render rows as CSV: plain header line, every cell JSON-encoded
fn to_csv(dataset: Dataset, headers: &[&str], rows: Vec<Vec<Value>>) -> Result<String> {
    if rows.is_empty() {
        return Err(GymError::NothingToExport(dataset.file_stem().to_string()));
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(headers.join(","));

    for row in rows {
        let cells = row
            .iter()
            .map(serde_json::to_string)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        lines.push(cells.join(","));
    }

    Ok(lines.join("\n"))
}

/// Members with their status recomputed for `today`
pub fn members_csv(members: &[Member], today: NaiveDate) -> Result<String> {
    let rows = members
        .iter()
        .map(|m| {
            vec![
                json!(m.name),
                json!(m.email),
                json!(m.phone),
                json!(format!("{} months", m.plan_duration)),
                json!(classify(m.expiry_date, today).as_str()),
                json!(m.joining_date.to_string()),
                json!(m.expiry_date.to_string()),
            ]
        })
        .collect();

    to_csv(
        Dataset::Members,
        &["Name", "Email", "Phone", "Duration", "Status", "JoinDate", "ExpiryDate"],
        rows,
    )
}

pub fn payments_csv(payments: &[Payment]) -> Result<String> {
    let rows = payments
        .iter()
        .map(|p| {
            vec![
                json!(p.member_name),
                json!(p.amount),
                json!(p.payment_date.map(|d| d.to_string()).unwrap_or_default()),
                json!(p.payment_method),
                json!(p.status.to_string()),
            ]
        })
        .collect();

    to_csv(
        Dataset::Payments,
        &["MemberName", "Amount", "Date", "Mode", "Status"],
        rows,
    )
}

pub fn plans_csv(plans: &[Plan]) -> Result<String> {
    let rows = plans
        .iter()
        .map(|p| {
            vec![
                json!(p.name),
                json!(p.price),
                json!(format!("{} days", p.duration_days)),
                json!(p.features.join("; ")),
            ]
        })
        .collect();

    to_csv(Dataset::Plans, &["Name", "Price", "Duration", "Features"], rows)
}

pub fn revenue_csv(payments: &[Payment]) -> Result<String> {
    let rows = revenue_by_month(payments)
        .into_iter()
        .map(|(month, revenue)| vec![json!(month), json!(revenue)])
        .collect();

    to_csv(Dataset::Revenue, &["Month", "Revenue"], rows)
}

pub fn export_file_name(dataset: Dataset, today: NaiveDate) -> String {
    format!("{}_{}.csv", dataset.file_stem(), today.format("%Y-%m-%d"))
}

/// Write an already rendered export into `dir`, creating it if needed
pub fn write_export(dir: &Path, dataset: Dataset, contents: &str, today: NaiveDate) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(dataset, today));
    std::fs::write(&path, contents)?;

    info!("Exported {} to {}", dataset.file_stem(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::models::PaymentStatus;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_members_csv_recomputes_status() {
        let members = vec![Member {
            id: "m1".to_string(),
            name: "Asha \"Ace\" Rao".to_string(),
            email: "asha@example.com".to_string(),
            phone: "9876543210".to_string(),
            plan_duration: 1,
            joining_date: date("2024-01-01"),
            expiry_date: date("2024-02-01"),
        }];

        let csv = members_csv(&members, date("2024-01-28")).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines[0], "Name,Email,Phone,Duration,Status,JoinDate,ExpiryDate");
        assert_eq!(
            lines[1],
            r#""Asha \"Ace\" Rao","asha@example.com","9876543210","1 months","expiring","2024-01-01","2024-02-01""#
        );
    }

    #[test]
    fn test_payments_and_revenue_csv() {
        let payments = vec![
            Payment {
                id: "p1".to_string(),
                member_id: "m1".to_string(),
                member_name: "Asha".to_string(),
                amount: 1200.0,
                payment_date: Some(date("2024-03-04")),
                payment_method: "upi".to_string(),
                status: PaymentStatus::Completed,
                plan_name: None,
            },
            Payment {
                id: "p2".to_string(),
                member_id: "m2".to_string(),
                member_name: "Ravi".to_string(),
                amount: 500.5,
                payment_date: None,
                payment_method: "cash".to_string(),
                status: PaymentStatus::Pending,
                plan_name: None,
            },
        ];

        let csv = payments_csv(&payments).unwrap();
        assert_eq!(
            csv,
            "MemberName,Amount,Date,Mode,Status\n\
             \"Asha\",1200.0,\"2024-03-04\",\"upi\",\"completed\"\n\
             \"Ravi\",500.5,\"\",\"cash\",\"pending\""
        );

        assert_eq!(revenue_csv(&payments).unwrap(), "Month,Revenue\n\"2024-03\",1200.0");
    }

    #[test]
    fn test_plans_csv_joins_features() {
        let plans = vec![Plan {
            id: "pl1".to_string(),
            name: "Standard".to_string(),
            price: 999.0,
            duration_days: 30,
            features: vec!["Gym floor".to_string(), "Lockers".to_string()],
        }];

        let csv = plans_csv(&plans).unwrap();
        assert!(csv.ends_with("\"Standard\",999.0,\"30 days\",\"Gym floor; Lockers\""));
    }

    #[test]
    fn test_empty_dataset_is_an_error() {
        assert!(matches!(plans_csv(&[]), Err(GymError::NothingToExport(_))));
        assert!(matches!(revenue_csv(&[]), Err(GymError::NothingToExport(_))));
    }

    #[test]
    fn test_write_export_names_file_by_day() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("exports");

        let path = write_export(&out, Dataset::Revenue, "Month,Revenue", date("2024-07-09")).unwrap();
        assert_eq!(path, out.join("monthly_revenue_2024-07-09.csv"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "Month,Revenue");
    }
}
