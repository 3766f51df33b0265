use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::{
    lifecycle::status::{classify, MemberStatus},
    storage::models::{Member, Payment, PaymentStatus},
};

/// Bucket used for completed payments that carry no date
pub const UNDATED_MONTH: &str = "1970-01";

/// Member counts per status. Every member lands in exactly one bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MembershipSummary {
    pub total: usize,
    pub active: usize,
    pub expiring: usize,
    pub expired: usize,
}

impl MembershipSummary {
    fn record(&mut self, status: MemberStatus) {
        self.total += 1;
        match status {
            MemberStatus::Active => self.active += 1,
            MemberStatus::Expiring => self.expiring += 1,
            MemberStatus::Expired => self.expired += 1,
        }
    }
}

pub fn summarize(members: &[Member], today: NaiveDate) -> MembershipSummary {
    let mut summary = MembershipSummary::default();
    for member in members {
        summary.record(classify(member.expiry_date, today));
    }
    summary
}

/// Revenue figure shown as "Monthly Revenue" on the dashboard.
///
/// Sums every completed payment regardless of date, i.e. lifetime-to-date.
/// Use [`revenue_in_month`] for the current calendar month.
pub fn monthly_revenue(payments: &[Payment]) -> f64 {
    payments
        .iter()
        .filter(|p| p.status == PaymentStatus::Completed)
        .map(|p| p.amount)
        .sum()
}

/// Completed revenue whose payment date falls in the same calendar month as `today`
pub fn revenue_in_month(payments: &[Payment], today: NaiveDate) -> f64 {
    payments
        .iter()
        .filter(|p| p.status == PaymentStatus::Completed)
        .filter(|p| {
            p.payment_date
                .map(|d| d.year() == today.year() && d.month() == today.month())
                .unwrap_or(false)
        })
        .map(|p| p.amount)
        .sum()
}

/// Completed revenue keyed by `YYYY-MM`, in month order
pub fn revenue_by_month(payments: &[Payment]) -> BTreeMap<String, f64> {
    let mut months = BTreeMap::new();

    for payment in payments.iter().filter(|p| p.status == PaymentStatus::Completed) {
        let month = payment
            .payment_date
            .map(|d| d.format("%Y-%m").to_string())
            .unwrap_or_else(|| UNDATED_MONTH.to_string());
        *months.entry(month).or_insert(0.0) += payment.amount;
    }

    months
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PaymentTotals {
    pub completed: f64,
    pub pending: f64,
}

pub fn payment_totals(payments: &[Payment]) -> PaymentTotals {
    payments.iter().fold(PaymentTotals::default(), |mut totals, p| {
        match p.status {
            PaymentStatus::Completed => totals.completed += p.amount,
            PaymentStatus::Pending => totals.pending += p.amount,
            PaymentStatus::Failed => {}
        }
        totals
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::reminders::derive_reminders;
    use chrono::Duration;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn member(id: &str, expiry: NaiveDate) -> Member {
        Member {
            id: id.to_string(),
            name: id.to_string(),
            email: format!("{}@example.com", id),
            phone: "9000000000".to_string(),
            plan_duration: 1,
            joining_date: expiry - Duration::days(31),
            expiry_date: expiry,
        }
    }

    fn payment(amount: f64, status: PaymentStatus, payment_date: Option<&str>) -> Payment {
        Payment {
            id: format!("p-{}", amount),
            member_id: "m-1".to_string(),
            member_name: "Asha".to_string(),
            amount,
            payment_date: payment_date.map(date),
            payment_method: "upi".to_string(),
            status,
            plan_name: None,
        }
    }

    #[test]
    fn test_partition_covers_every_member() {
        let today = date("2024-06-15");
        let members: Vec<Member> = (-20..=20)
            .map(|offset| member(&format!("m{}", offset), today + Duration::days(offset)))
            .collect();

        let summary = summarize(&members, today);
        assert_eq!(summary.total, members.len());
        assert_eq!(summary.active + summary.expiring + summary.expired, members.len());
        assert_eq!(summary.expired, 20);
        assert_eq!(summary.expiring, 8);
        assert_eq!(summary.active, 13);
    }

    #[test]
    fn test_empty_roster() {
        assert_eq!(summarize(&[], date("2024-06-15")), MembershipSummary::default());
    }

    #[test]
    fn test_due_today_counted_as_expiring_but_not_reminded() {
        let today = date("2024-06-15");
        let members = vec![member("today", today)];

        assert_eq!(summarize(&members, today).expiring, 1);
        assert!(derive_reminders(&members, today).is_empty());
    }

    #[test]
    fn test_monthly_revenue_ignores_pending() {
        let payments = vec![
            payment(100.0, PaymentStatus::Completed, Some("2024-06-01")),
            payment(50.0, PaymentStatus::Pending, Some("2024-06-02")),
        ];
        assert_eq!(monthly_revenue(&payments), 100.0);
    }

    #[test]
    fn test_monthly_revenue_is_lifetime() {
        let payments = vec![
            payment(100.0, PaymentStatus::Completed, Some("2022-01-01")),
            payment(200.0, PaymentStatus::Completed, Some("2024-06-01")),
            payment(300.0, PaymentStatus::Completed, None),
            payment(400.0, PaymentStatus::Failed, Some("2024-06-01")),
        ];
        assert_eq!(monthly_revenue(&payments), 600.0);
        assert_eq!(revenue_in_month(&payments, date("2024-06-30")), 200.0);
    }

    #[test]
    fn test_revenue_by_month_groups_completed() {
        let payments = vec![
            payment(100.0, PaymentStatus::Completed, Some("2024-05-31")),
            payment(250.0, PaymentStatus::Completed, Some("2024-05-01")),
            payment(80.0, PaymentStatus::Completed, Some("2024-06-01")),
            payment(999.0, PaymentStatus::Pending, Some("2024-06-01")),
            payment(40.0, PaymentStatus::Completed, None),
        ];

        let months: Vec<_> = revenue_by_month(&payments).into_iter().collect();
        assert_eq!(
            months,
            vec![
                (UNDATED_MONTH.to_string(), 40.0),
                ("2024-05".to_string(), 350.0),
                ("2024-06".to_string(), 80.0),
            ]
        );
    }

    #[test]
    fn test_payment_totals() {
        let payments = vec![
            payment(100.0, PaymentStatus::Completed, None),
            payment(50.0, PaymentStatus::Pending, None),
            payment(25.0, PaymentStatus::Pending, None),
            payment(10.0, PaymentStatus::Failed, None),
        ];
        assert_eq!(
            payment_totals(&payments),
            PaymentTotals {
                completed: 100.0,
                pending: 75.0
            }
        );
    }
}
