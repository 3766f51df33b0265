use serde::Deserialize;

use crate::{error::GymError, lifecycle::Reminder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageTemplate {
    Renewal,
    Expired,
    Followup,
}

impl MessageTemplate {
    pub fn text(&self) -> &'static str {
        match self {
            MessageTemplate::Renewal => {
                "Hi {name}, Your membership expires in {days} days. Renew now to continue your fitness journey!"
            }
            MessageTemplate::Expired => {
                "Hi {name}, Your membership has expired. Get back on track with a fresh renewal!"
            }
            MessageTemplate::Followup => {
                "Hi {name}, We miss you! Your membership expires soon. Reply to renew."
            }
        }
    }

    /// Fill in the member's first name and the days left
    pub fn render(&self, reminder: &Reminder) -> String {
        let first_name = reminder
            .member_name
            .split_whitespace()
            .next()
            .unwrap_or(&reminder.member_name);

        self.text()
            .replace("{name}", first_name)
            .replace("{days}", &reminder.days_left.to_string())
    }
}

impl std::str::FromStr for MessageTemplate {
    type Err = GymError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "renewal" => Ok(MessageTemplate::Renewal),
            "expired" => Ok(MessageTemplate::Expired),
            "followup" => Ok(MessageTemplate::Followup),
            other => Err(GymError::Config(format!("unknown message template '{}'", other))),
        }
    }
}
