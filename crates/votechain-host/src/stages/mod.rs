//! Built-in admission stages.

pub mod duplicate;
pub mod subject;

pub use duplicate::DuplicateStage;
pub use subject::SubjectStage;
