//! Operating-system scheduling: CPU, disk head, deadlock avoidance and
//! page replacement.

pub mod bankers;
pub mod cpu;
pub mod disk;
pub mod paging;

pub use bankers::{BankerResult, BankerState, Bankers, ResourceRequest};
pub use cpu::{CpuPolicy, CpuResult, CpuScheduler, Process, ProcessTimes, Segment};
pub use disk::{DiskPolicy, DiskQueue, DiskResult, DiskScheduler};
pub use paging::{PagePolicy, PageReplacement, PagingProblem, PagingResult};
