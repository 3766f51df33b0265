pub mod channel;
pub mod templates;

pub use channel::{dispatch_reminders, DispatchReport, ReminderChannel, TelegramChannel};
pub use templates::MessageTemplate;
