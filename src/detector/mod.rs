// detector module: per-page issue detection and the import affordance

pub mod document;
mod machine;

pub use document::{AffordanceView, AttachError, Document};
pub use machine::{Detector, DetectorState, ImportAck, PageEvent};
