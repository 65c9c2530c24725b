mod log;
mod pagerduty;
mod recording;
mod slack;
mod traits;

pub use log::LogAlerter;
pub use pagerduty::{PagerDutyAlerter, PagerDutyEvent, EVENTS_URL};
pub use recording::{AlertRecord, RecordingAlerter};
pub use slack::SlackAlerter;
pub use traits::{friendly_name, AlertError, Alerter};
