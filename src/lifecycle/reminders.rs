use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    lifecycle::status::{days_left, EXPIRING_WINDOW_DAYS},
    storage::models::Member,
};

/// Reminders at or below this many days left are shown as urgent
pub const URGENT_DAYS: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Pending,
    Sent,
    Failed,
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryStatus::Pending => write!(f, "pending"),
            DeliveryStatus::Sent => write!(f, "sent"),
            DeliveryStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Point-in-time renewal notice for one member.
///
/// `days_left` is captured when the list is derived and is not refreshed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub member_id: String,
    pub member_name: String,
    pub days_left: i64,
    pub plan: String,
    pub status: DeliveryStatus,
}

impl Reminder {
    pub fn is_urgent(&self) -> bool {
        self.days_left <= URGENT_DAYS
    }
}

/// Human label for a plan length, e.g. "1 month" or "6 months"
pub fn plan_label(plan_duration: u32) -> String {
    format!(
        "{} month{}",
        plan_duration,
        if plan_duration > 1 { "s" } else { "" }
    )
}

/// Build the reminder worklist for `today`.
///
/// Only members with 1 to 7 days left are included: a membership expiring
/// today is classified as expiring but gets no reminder. The result is sorted
/// by days left; members with the same count keep their input order.
pub fn derive_reminders(members: &[Member], today: NaiveDate) -> Vec<Reminder> {
    let mut reminders: Vec<Reminder> = members
        .iter()
        .filter_map(|member| {
            let days = days_left(member.expiry_date, today);
            if days > 0 && days <= EXPIRING_WINDOW_DAYS {
                Some(Reminder {
                    member_id: member.id.clone(),
                    member_name: member.name.clone(),
                    days_left: days,
                    plan: plan_label(member.plan_duration),
                    status: DeliveryStatus::Pending,
                })
            } else {
                None
            }
        })
        .collect();

    // sort_by_key is stable
    reminders.sort_by_key(|r| r.days_left);

    debug!(
        "Derived {} reminders from {} members for {}",
        reminders.len(),
        members.len(),
        today
    );

    reminders
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::status::{classify, MemberStatus};
    use chrono::Duration;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn member(id: &str, expiry: NaiveDate) -> Member {
        Member {
            id: id.to_string(),
            name: format!("Member {}", id),
            email: format!("{}@example.com", id),
            phone: "9000000000".to_string(),
            plan_duration: 1,
            joining_date: expiry - Duration::days(30),
            expiry_date: expiry,
        }
    }

    #[test]
    fn test_scenario_one_month_plan() {
        let joined = date("2024-01-01");
        let m = Member {
            id: "m-1".to_string(),
            name: "Ravi Kumar".to_string(),
            email: "ravi@example.com".to_string(),
            phone: "9876543210".to_string(),
            plan_duration: 1,
            joining_date: joined,
            expiry_date: crate::lifecycle::status::expiry_for(joined, 1).unwrap(),
        };
        let today = date("2024-01-28");

        assert_eq!(m.expiry_date, date("2024-02-01"));
        assert_eq!(classify(m.expiry_date, today), MemberStatus::Expiring);

        let reminders = derive_reminders(&[m], today);
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].days_left, 4);
        assert_eq!(reminders[0].plan, "1 month");
        assert_eq!(reminders[0].status, DeliveryStatus::Pending);
    }

    #[test]
    fn test_expiring_today_gets_no_reminder() {
        let today = date("2024-03-10");
        let due_today = member("a", today);

        assert_eq!(classify(due_today.expiry_date, today), MemberStatus::Expiring);
        assert!(derive_reminders(&[due_today], today).is_empty());
    }

    #[test]
    fn test_excludes_expired_and_active() {
        let today = date("2024-03-10");
        let members = vec![
            member("expired", today - Duration::days(1)),
            member("active", today + Duration::days(8)),
            member("last", today + Duration::days(7)),
            member("first", today + Duration::days(1)),
        ];

        let ids: Vec<_> = derive_reminders(&members, today)
            .into_iter()
            .map(|r| r.member_id)
            .collect();
        assert_eq!(ids, vec!["first", "last"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let today = date("2024-03-10");
        let members = vec![
            member("three", today + Duration::days(3)),
            member("one-a", today + Duration::days(1)),
            member("one-b", today + Duration::days(1)),
            member("five", today + Duration::days(5)),
        ];

        let reminders = derive_reminders(&members, today);
        let order: Vec<_> = reminders
            .iter()
            .map(|r| (r.member_id.as_str(), r.days_left))
            .collect();
        assert_eq!(
            order,
            vec![("one-a", 1), ("one-b", 1), ("three", 3), ("five", 5)]
        );
    }

    #[test]
    fn test_derivation_is_repeatable() {
        let today = date("2024-03-10");
        let members = vec![
            member("x", today + Duration::days(2)),
            member("y", today + Duration::days(6)),
        ];

        assert_eq!(derive_reminders(&members, today), derive_reminders(&members, today));
    }

    #[test]
    fn test_urgency_and_labels() {
        let today = date("2024-03-10");
        let reminders = derive_reminders(
            &[member("soon", today + Duration::days(2)), member("later", today + Duration::days(3))],
            today,
        );
        assert!(reminders[0].is_urgent());
        assert!(!reminders[1].is_urgent());

        assert_eq!(plan_label(1), "1 month");
        assert_eq!(plan_label(12), "12 months");
    }
}
