//! Domain records for the quiz application.

pub mod billing;
pub mod content;
pub mod performance;
pub mod quiz;
pub mod spin;
pub mod user;

pub use billing::{BillingApp, Subscriber, SubscriptionStatus};
pub use content::{Faq, Slider};
pub use performance::Performance;
pub use quiz::Quiz;
pub use spin::{Spin, DAILY_SPIN_LIMIT};
pub use user::{Operator, Profile, User};
