pub mod controller;
pub mod paradigms;
pub mod run;
pub mod state;

pub use controller::{RunController, RunSnapshot};
pub use paradigms::{
    BoubaKikiParadigm, DrmStudyParadigm, DrmTestParadigm, RotationParadigm, ScanningParadigm,
    StroopParadigm,
};
pub use run::{ExperimentRun, Paradigm, RecordMeta};
pub use state::{
    ErrorPolicy, PhaseTiming, ResponseOutcome, RunnerConfig, RunnerPhase, ScoredResponse,
    TimerOutcome, TrialRunner,
};
