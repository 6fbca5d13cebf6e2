pub mod google;
pub mod traits;

pub use google::{AccessToken, GoogleCalendar};
pub use traits::{BusySource, EventDraft, EventSink};
