//! Training and evaluation pipelines

pub mod evaluator;
pub mod observers;
pub mod trainer;

pub use evaluator::{EvaluationReport, Evaluator, OutcomeRate};
pub use observers::{MetricsObserver, MetricsSummary, ProgressObserver};
pub use trainer::{ExplorationSchedule, Trainer, TrainerConfig, TrainingResult};
