pub mod clock;
pub mod record;
pub mod recorder;

pub use clock::{Clock, LocalCalendar, ManualClock, SystemClock};
pub use record::{ArrivalFilter, ArrivalKind, ArrivalRecord};
pub use recorder::{AttendanceRecorder, RecordOutcome, Recorded, RecorderError};
