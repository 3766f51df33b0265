use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    lifecycle::status::{classify, days_left, MemberStatus},
    storage::models::Member,
};

/// A member together with its status for a given day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedMember {
    #[serde(flatten)]
    pub member: Member,
    pub status: MemberStatus,
    pub days_left: i64,
}

impl ClassifiedMember {
    pub fn new(member: Member, today: NaiveDate) -> Self {
        let status = classify(member.expiry_date, today);
        let days_left = days_left(member.expiry_date, today);
        Self {
            member,
            status,
            days_left,
        }
    }
}

/// Classify each member against `today`, keeping input order
pub fn classify_all(members: &[Member], today: NaiveDate) -> Vec<ClassifiedMember> {
    members
        .iter()
        .cloned()
        .map(|member| ClassifiedMember::new(member, today))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(MemberStatus),
}

impl std::str::FromStr for StatusFilter {
    type Err = crate::error::GymError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(StatusFilter::All)
        } else {
            s.parse().map(StatusFilter::Only)
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemberFilter {
    pub query: Option<String>,
    pub status: StatusFilter,
}

impl MemberFilter {
    /// Name and email match case-insensitively, phone matches verbatim
    pub fn matches(&self, classified: &ClassifiedMember) -> bool {
        let status_ok = match self.status {
            StatusFilter::All => true,
            StatusFilter::Only(status) => classified.status == status,
        };

        status_ok && self.matches_query(&classified.member)
    }

    fn matches_query(&self, member: &Member) -> bool {
        let query = match self.query.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => q,
            _ => return true,
        };

        let needle = query.to_lowercase();
        member.name.to_lowercase().contains(&needle)
            || member.email.to_lowercase().contains(&needle)
            || member.phone.contains(query)
    }

    pub fn apply(&self, members: Vec<ClassifiedMember>) -> Vec<ClassifiedMember> {
        members.into_iter().filter(|m| self.matches(m)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn roster(today: NaiveDate) -> Vec<ClassifiedMember> {
        let members = vec![
            Member {
                id: "1".to_string(),
                name: "Priya Sharma".to_string(),
                email: "priya@fitmail.com".to_string(),
                phone: "98450 11111".to_string(),
                plan_duration: 1,
                joining_date: today - Duration::days(27),
                expiry_date: today + Duration::days(3),
            },
            Member {
                id: "2".to_string(),
                name: "Arjun Mehta".to_string(),
                email: "ARJUN@example.com".to_string(),
                phone: "99000 22222".to_string(),
                plan_duration: 6,
                joining_date: today - Duration::days(10),
                expiry_date: today + Duration::days(170),
            },
            Member {
                id: "3".to_string(),
                name: "Kiran Das".to_string(),
                email: "kiran@example.com".to_string(),
                phone: "97000 33333".to_string(),
                plan_duration: 3,
                joining_date: today - Duration::days(100),
                expiry_date: today - Duration::days(8),
            },
        ];
        classify_all(&members, today)
    }

    #[test]
    fn test_classify_all_keeps_order() {
        let today = date("2024-06-15");
        let classified = roster(today);
        let statuses: Vec<_> = classified.iter().map(|c| c.status).collect();
        assert_eq!(
            statuses,
            vec![MemberStatus::Expiring, MemberStatus::Active, MemberStatus::Expired]
        );
        assert_eq!(classified[2].days_left, -8);
    }

    #[test]
    fn test_filter_by_status() {
        let today = date("2024-06-15");
        let filter = MemberFilter {
            query: None,
            status: StatusFilter::Only(MemberStatus::Expired),
        };
        let found = filter.apply(roster(today));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].member.id, "3");
    }

    #[test]
    fn test_query_matches_name_email_phone() {
        let today = date("2024-06-15");

        let by_email = MemberFilter {
            query: Some("arjun@".to_string()),
            ..Default::default()
        };
        assert_eq!(by_email.apply(roster(today))[0].member.id, "2");

        let by_name = MemberFilter {
            query: Some("kiran".to_string()),
            ..Default::default()
        };
        assert_eq!(by_name.apply(roster(today))[0].member.id, "3");

        let by_phone = MemberFilter {
            query: Some("11111".to_string()),
            ..Default::default()
        };
        assert_eq!(by_phone.apply(roster(today))[0].member.id, "1");

        let blank = MemberFilter {
            query: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(blank.apply(roster(today)).len(), 3);
    }

    #[test]
    fn test_status_filter_parse() {
        assert_eq!("all".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!(
            "expiring".parse::<StatusFilter>().unwrap(),
            StatusFilter::Only(MemberStatus::Expiring)
        );
        assert!("frozen".parse::<StatusFilter>().is_err());
    }
}
