use async_trait::async_trait;
use teloxide::prelude::*;
use tracing::{error, info, warn};

use crate::{
    config::TelegramConfig,
    error::{GymError, Result},
    lifecycle::{DeliveryStatus, Reminder},
    notify::templates::MessageTemplate,
};

/// Somewhere a rendered reminder can be delivered to
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReminderChannel: Send + Sync {
    async fn deliver(&self, reminder: &Reminder, message: &str) -> Result<()>;
}

/// Sends reminders to the gym staff's Telegram chats
pub struct TelegramChannel {
    bot: Bot,
    chat_ids: Vec<i64>,
}

impl TelegramChannel {
    pub fn new(config: &TelegramConfig) -> Option<Self> {
        if !config.notifications_enabled {
            info!("Telegram notifications are disabled in config");
            return None;
        }

        if config.chat_ids.is_empty() {
            info!("No Telegram chats configured for reminders");
            return None;
        }

        info!("Telegram channel initialized for {} chats", config.chat_ids.len());

        Some(Self {
            bot: Bot::new(config.bot_token.clone()),
            chat_ids: config.chat_ids.clone(),
        })
    }
}

#[async_trait]
impl ReminderChannel for TelegramChannel {
    async fn deliver(&self, reminder: &Reminder, message: &str) -> Result<()> {
        let text = format!(
            "🔔 {} ({}, {} day{} left)\n\n{}",
            reminder.member_name,
            reminder.plan,
            reminder.days_left,
            if reminder.days_left != 1 { "s" } else { "" },
            message
        );

        let mut failures = 0;
        for chat_id in &self.chat_ids {
            if let Err(e) = self.bot.send_message(ChatId(*chat_id), text.clone()).await {
                error!("Failed to send reminder to chat {}: {}", chat_id, e);
                failures += 1;
            }
        }

        if failures > 0 {
            return Err(GymError::Notification(format!(
                "{} of {} chats did not receive the reminder for {}",
                failures,
                self.chat_ids.len(),
                reminder.member_name
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct DispatchReport {
    pub sent: usize,
    pub failed: usize,
    pub reminders: Vec<Reminder>,
}

/// Deliver every reminder, marking each as sent or failed.
///
/// A failed delivery is logged and counted; the rest of the batch still goes out.
pub async fn dispatch_reminders(
    channel: &dyn ReminderChannel,
    reminders: Vec<Reminder>,
    template: MessageTemplate,
) -> DispatchReport {
    let mut report = DispatchReport::default();

    for mut reminder in reminders {
        let message = template.render(&reminder);

        match channel.deliver(&reminder, &message).await {
            Ok(()) => {
                reminder.status = DeliveryStatus::Sent;
                report.sent += 1;
            }
            Err(e) => {
                warn!("Reminder for {} not delivered: {}", reminder.member_name, e);
                reminder.status = DeliveryStatus::Failed;
                report.failed += 1;
            }
        }

        report.reminders.push(reminder);
    }

    info!(
        "Reminder dispatch complete: {} sent, {} failed",
        report.sent, report.failed
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reminder(id: &str, name: &str, days_left: i64) -> Reminder {
        Reminder {
            member_id: id.to_string(),
            member_name: name.to_string(),
            days_left,
            plan: "1 month".to_string(),
            status: DeliveryStatus::Pending,
        }
    }

    #[tokio::test]
    async fn test_dispatch_marks_each_reminder() {
        let mut channel = MockReminderChannel::new();
        channel
            .expect_deliver()
            .times(2)
            .returning(|reminder, _| {
                if reminder.member_id == "bad" {
                    Err(GymError::Notification("chat unreachable".to_string()))
                } else {
                    Ok(())
                }
            });

        let report = dispatch_reminders(
            &channel,
            vec![reminder("ok", "Priya Sharma", 1), reminder("bad", "Kiran Das", 4)],
            MessageTemplate::Renewal,
        )
        .await;

        assert_eq!(report.sent, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.reminders[0].status, DeliveryStatus::Sent);
        assert_eq!(report.reminders[1].status, DeliveryStatus::Failed);
    }

    #[tokio::test]
    async fn test_dispatch_renders_template() {
        let mut channel = MockReminderChannel::new();
        channel
            .expect_deliver()
            .withf(|_, message| message.starts_with("Hi Priya, Your membership expires in 2 days"))
            .times(1)
            .returning(|_, _| Ok(()));

        let report = dispatch_reminders(
            &channel,
            vec![reminder("m1", "Priya Sharma", 2)],
            MessageTemplate::Renewal,
        )
        .await;
        assert_eq!(report.sent, 1);
    }

    #[tokio::test]
    async fn test_empty_worklist_sends_nothing() {
        let mut channel = MockReminderChannel::new();
        channel.expect_deliver().never();

        let report = dispatch_reminders(&channel, Vec::new(), MessageTemplate::Followup).await;
        assert_eq!(report.sent + report.failed, 0);
    }

    #[test]
    fn test_disabled_config_yields_no_channel() {
        let config = TelegramConfig {
            bot_token: "123:abc".to_string(),
            chat_ids: vec![1],
            notifications_enabled: false,
        };
        assert!(TelegramChannel::new(&config).is_none());

        let no_chats = TelegramConfig {
            bot_token: "123:abc".to_string(),
            chat_ids: Vec::new(),
            notifications_enabled: true,
        };
        assert!(TelegramChannel::new(&no_chats).is_none());
    }
}
