pub mod events;
pub mod mission;
pub mod playthrough;
pub mod rng;
pub mod time;

pub use events::{EngineEvent, EngineEventLog, Notice, NoticeKind};
pub use mission::{is_mission_complete, MissionProgress, MissionTracker};
pub use playthrough::{FinishReason, Phase, PlaythroughState, Progression, Speaker, TranscriptLine};
pub use rng::SimRng;
pub use time::{PendingEvent, PendingEvents, ScheduledEvent, SimClock};
