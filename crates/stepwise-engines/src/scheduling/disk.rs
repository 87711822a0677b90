//! Disk head scheduling: FCFS, SSTF, SCAN and C-SCAN.

use serde::{Deserialize, Serialize};
use stepwise_core::{Complexity, Conclusion, Engine, ParamError, Recorder};
use stepwise_stats::format::fixed;

/// Head scheduling discipline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiskPolicy {
    /// Serve requests in arrival order.
    #[default]
    Fcfs,
    /// Shortest seek time first; ties by request order.
    Sstf,
    /// Elevator: sweep up to the last cylinder, then back down.
    Scan,
    /// Circular: sweep up to the last cylinder, jump to 0, sweep up.
    CScan,
}

/// Head position, disk size and pending requests.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskQueue {
    /// Starting cylinder.
    pub head: u64,
    /// Number of cylinders; valid positions are `0..cylinders`.
    pub cylinders: u64,
    /// Requested cylinders in arrival order.
    pub requests: Vec<u64>,
}

impl DiskQueue {
    /// Build a queue.
    pub fn new(head: u64, cylinders: u64, requests: &[u64]) -> Self {
        Self {
            head,
            cylinders,
            requests: requests.to_vec(),
        }
    }
}

/// Disk scheduler.
///
/// SCAN and C-SCAN start sweeping toward higher cylinders. They travel
/// to the last cylinder only when requests remain below the head; the
/// C-SCAN return seek to cylinder 0 counts as head movement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DiskScheduler {
    /// Discipline.
    pub policy: DiskPolicy,
}

impl DiskScheduler {
    /// Scheduler for `policy`.
    pub fn new(policy: DiskPolicy) -> Self {
        Self { policy }
    }
}

/// Service order and cost.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskResult {
    /// Requests in the order served.
    pub order: Vec<u64>,
    /// Every head position, start and edge visits included.
    pub path: Vec<u64>,
    /// Cylinders travelled.
    pub total_movement: u64,
    /// `total_movement / requests`.
    pub average_seek: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DiskSnapshot<'a> {
    head: u64,
    pending: Vec<u64>,
    served: &'a [u64],
    path: &'a [u64],
    movement: u64,
}

struct Head {
    pending: Vec<u64>,
    served: Vec<u64>,
    path: Vec<u64>,
    movement: u64,
}

impl Head {
    fn position(&self) -> u64 {
        self.path.last().copied().unwrap_or(0)
    }

    fn snapshot(&self) -> DiskSnapshot<'_> {
        DiskSnapshot {
            head: self.position(),
            pending: self.pending.clone(),
            served: &self.served,
            path: &self.path,
            movement: self.movement,
        }
    }

    fn travel(&mut self, to: u64) -> u64 {
        let seek = self.position().abs_diff(to);
        self.movement += seek;
        self.path.push(to);
        seek
    }

    fn serve(&mut self, pos: usize, rec: &mut Recorder) {
        let from = self.position();
        let cylinder = self.pending.remove(pos);
        let seek = self.travel(cylinder);
        self.served.push(cylinder);
        rec.record(
            format!("Move {from} -> {cylinder}: seek {seek}, total {}", self.movement),
            &self.snapshot(),
        )
        .metric("seek", seek)
        .metric("movement", self.movement);
    }

    fn sweep_to(&mut self, edge: u64, why: &str, rec: &mut Recorder) {
        let from = self.position();
        let seek = self.travel(edge);
        rec.record(
            format!("Move {from} -> {edge} ({why}): seek {seek}, total {}", self.movement),
            &self.snapshot(),
        )
        .metric("seek", seek)
        .metric("movement", self.movement);
    }

    /// Position in `pending` of the next request at or above the head.
    fn next_up(&self) -> Option<usize> {
        let head = self.position();
        (0..self.pending.len())
            .filter(|&i| self.pending[i] >= head)
            .min_by_key(|&i| (self.pending[i], i))
    }

    fn next_down(&self) -> Option<usize> {
        let head = self.position();
        (0..self.pending.len())
            .filter(|&i| self.pending[i] <= head)
            .min_by_key(|&i| (head - self.pending[i], i))
    }
}

impl Engine for DiskScheduler {
    type Problem = DiskQueue;

    fn name(&self) -> &str {
        match self.policy {
            DiskPolicy::Fcfs => "disk-fcfs",
            DiskPolicy::Sstf => "disk-sstf",
            DiskPolicy::Scan => "disk-scan",
            DiskPolicy::CScan => "disk-cscan",
        }
    }

    fn complexity(&self) -> Complexity {
        match self.policy {
            DiskPolicy::Fcfs => Complexity::new("O(n)", "O(n)"),
            _ => Complexity::new("O(n²)", "O(n)"),
        }
    }

    fn validate(&self, q: &DiskQueue) -> Result<(), ParamError> {
        if q.cylinders == 0 {
            return Err(ParamError::out_of_range("cylinders", 0, ">= 1"));
        }
        if q.requests.is_empty() {
            return Err(ParamError::Empty { name: "requests" });
        }
        let bound = format!("0..{}", q.cylinders);
        if q.head >= q.cylinders {
            return Err(ParamError::out_of_range("head", q.head, bound));
        }
        if let Some(&r) = q.requests.iter().find(|&&r| r >= q.cylinders) {
            return Err(ParamError::out_of_range("requests", r, bound));
        }
        Ok(())
    }

    fn run(&self, q: &DiskQueue, rec: &mut Recorder) -> Conclusion {
        let mut head = Head {
            pending: q.requests.clone(),
            served: Vec::new(),
            path: vec![q.head],
            movement: 0,
        };
        let last = q.cylinders - 1;
        rec.record(
            format!(
                "Head at {} with {} pending request(s) on cylinders 0..={last}",
                q.head,
                q.requests.len()
            ),
            &head.snapshot(),
        )
        .note(match self.policy {
            DiskPolicy::Fcfs => "FCFS serves requests strictly in arrival order",
            DiskPolicy::Sstf => "SSTF always moves to the closest pending request",
            DiskPolicy::Scan => "SCAN sweeps upward to the edge, then reverses like an elevator",
            DiskPolicy::CScan => {
                "C-SCAN only serves while moving upward and returns to cylinder 0 after the edge"
            }
        });

        match self.policy {
            DiskPolicy::Fcfs => {
                while !head.pending.is_empty() {
                    head.serve(0, rec);
                }
            }
            DiskPolicy::Sstf => {
                while !head.pending.is_empty() {
                    let at = head.position();
                    let pos = (0..head.pending.len())
                        .min_by_key(|&i| (head.pending[i].abs_diff(at), i))
                        .unwrap_or(0);
                    head.serve(pos, rec);
                }
            }
            DiskPolicy::Scan => {
                while let Some(pos) = head.next_up() {
                    head.serve(pos, rec);
                }
                if !head.pending.is_empty() {
                    if head.position() != last {
                        head.sweep_to(last, "edge, reverse direction", rec);
                    }
                    while let Some(pos) = head.next_down() {
                        head.serve(pos, rec);
                    }
                }
            }
            DiskPolicy::CScan => {
                while let Some(pos) = head.next_up() {
                    head.serve(pos, rec);
                }
                if !head.pending.is_empty() {
                    if head.position() != last {
                        head.sweep_to(last, "edge", rec);
                    }
                    head.sweep_to(0, "return seek", rec);
                    while let Some(pos) = head.next_up() {
                        head.serve(pos, rec);
                    }
                }
            }
        }

        let result = DiskResult {
            average_seek: head.movement as f64 / q.requests.len() as f64,
            order: head.served,
            path: head.path,
            total_movement: head.movement,
        };
        rec.record(
            format!(
                "All requests served: total head movement {}, average seek {}",
                result.total_movement,
                fixed(result.average_seek, 2)
            ),
            &result,
        )
        .metric("totalMovement", result.total_movement);
        Conclusion::solved(&result)
    }
}
