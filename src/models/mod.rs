pub mod session;

pub use session::{
    enter_phase, normalize_participant_name, Experiment, Language, Phase, PhaseEntry,
    SessionContext, EXPERIMENTS,
};
