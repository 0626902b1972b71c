pub mod intake;
pub mod mission;
pub mod progression;
pub mod scheduler;

pub use intake::{clear_intents_system, intake_system};
pub use mission::{MISSION_COMPLETE_LINE, TRANSIT_LINE};
pub use progression::{Engine, FAILURE_LINE, RIGHT_CHOICE_LINE, SELECT_FROM_MAP, WRONG_CHOICE_LINE};
pub use scheduler::scheduler_system;
