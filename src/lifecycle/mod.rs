pub mod status;
pub mod reminders;
pub mod summary;
pub mod roster;

pub use status::{classify, days_left, expiry_for, parse_calendar_date, renew, MemberStatus};
pub use reminders::{derive_reminders, DeliveryStatus, Reminder};
pub use summary::{
    monthly_revenue, payment_totals, revenue_by_month, revenue_in_month, summarize,
    MembershipSummary, PaymentTotals,
};
pub use roster::{classify_all, ClassifiedMember, MemberFilter, StatusFilter};
