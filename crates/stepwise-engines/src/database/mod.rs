//! Transaction schedule analysis.

pub mod schedule;

pub use schedule::{parse, Conflict, OpKind, Operation, ReadsFrom, ScheduleAnalyzer, ScheduleResult};
