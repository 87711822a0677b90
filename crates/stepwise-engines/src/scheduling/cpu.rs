//! CPU scheduling: FCFS, SJF, Priority and Round Robin.

use std::collections::VecDeque;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use stepwise_core::{Complexity, Conclusion, Engine, Limits, Outcome, ParamError, Recorder};
use stepwise_stats::format::fixed;

/// A process to schedule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    /// Unique name.
    pub name: String,
    /// Arrival time.
    pub arrival: u64,
    /// CPU time required, > 0.
    pub burst: u64,
    /// Lower number means higher priority.
    pub priority: u32,
}

impl Process {
    /// A process with priority 0.
    pub fn new(name: &str, arrival: u64, burst: u64) -> Self {
        Self {
            name: name.to_owned(),
            arrival,
            burst,
            priority: 0,
        }
    }

    /// Set the priority.
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }
}

/// Scheduling discipline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "policy")]
pub enum CpuPolicy {
    /// First come, first served.
    Fcfs,
    /// Shortest job first, non-preemptive.
    Sjf,
    /// Lowest priority number first, non-preemptive.
    Priority,
    /// Time slices of `quantum` in a FIFO ready queue.
    RoundRobin {
        /// Slice length, > 0.
        quantum: u64,
    },
}

/// CPU scheduler engine.
///
/// Ties go to the earlier arrival, then the earlier position in the
/// input. When nothing is ready the CPU idles until the next arrival and
/// the gap appears in the Gantt chart. In Round Robin, processes arriving
/// during a slice join the queue ahead of the preempted process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CpuScheduler {
    /// Discipline.
    pub policy: CpuPolicy,
    /// Cap on Round Robin slices.
    pub max_slices: u64,
}

impl CpuScheduler {
    fn with_policy(policy: CpuPolicy) -> Self {
        Self {
            policy,
            max_slices: Limits::default().max_steps,
        }
    }

    /// First come, first served.
    pub fn fcfs() -> Self {
        Self::with_policy(CpuPolicy::Fcfs)
    }

    /// Shortest job first.
    pub fn sjf() -> Self {
        Self::with_policy(CpuPolicy::Sjf)
    }

    /// Non-preemptive priority.
    pub fn priority() -> Self {
        Self::with_policy(CpuPolicy::Priority)
    }

    /// Round Robin with the given quantum.
    pub fn round_robin(quantum: u64) -> Self {
        Self::with_policy(CpuPolicy::RoundRobin { quantum })
    }
}

impl Default for CpuScheduler {
    fn default() -> Self {
        Self::fcfs()
    }
}

/// One bar of the Gantt chart.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Running process; `None` while idle.
    pub process: Option<String>,
    /// Start time.
    pub start: u64,
    /// End time.
    pub end: u64,
}

/// Per-process timings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessTimes {
    /// Process name.
    pub name: String,
    /// First time on the CPU.
    pub first_run: u64,
    /// Completion time.
    pub completion: u64,
    /// `completion - arrival`.
    pub turnaround: u64,
    /// `turnaround - burst`.
    pub waiting: u64,
    /// `first_run - arrival`.
    pub response: u64,
}

/// Schedule and its averages.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuResult {
    /// Gantt chart, idle gaps included.
    pub gantt: Vec<Segment>,
    /// Timings in input order.
    pub processes: Vec<ProcessTimes>,
    /// Mean waiting time.
    pub average_waiting: f64,
    /// Mean turnaround time.
    pub average_turnaround: f64,
    /// Mean response time.
    pub average_response: f64,
    /// Total idle time.
    pub idle_time: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CpuSnapshot<'a> {
    time: u64,
    running: Option<&'a str>,
    ready_queue: Vec<&'a str>,
    remaining: IndexMap<&'a str, u64>,
    gantt: &'a [Segment],
}

struct Machine<'a> {
    procs: &'a [Process],
    remaining: Vec<u64>,
    first_run: Vec<Option<u64>>,
    completion: Vec<Option<u64>>,
    gantt: Vec<Segment>,
    time: u64,
}

impl<'a> Machine<'a> {
    fn new(procs: &'a [Process]) -> Self {
        Self {
            procs,
            remaining: procs.iter().map(|p| p.burst).collect(),
            first_run: vec![None; procs.len()],
            completion: vec![None; procs.len()],
            gantt: Vec::new(),
            time: 0,
        }
    }

    fn snapshot(&self, running: Option<usize>, ready: &[usize]) -> CpuSnapshot<'_> {
        CpuSnapshot {
            time: self.time,
            running: running.map(|i| self.procs[i].name.as_str()),
            ready_queue: ready.iter().map(|&i| self.procs[i].name.as_str()).collect(),
            remaining: self
                .procs
                .iter()
                .zip(&self.remaining)
                .map(|(p, &r)| (p.name.as_str(), r))
                .collect(),
            gantt: &self.gantt,
        }
    }

    fn next_arrival(&self) -> Option<u64> {
        self.procs
            .iter()
            .zip(&self.completion)
            .filter(|(_, c)| c.is_none())
            .map(|(p, _)| p.arrival)
            .filter(|&a| a > self.time)
            .min()
    }

    fn idle_until(&mut self, until: u64, rec: &mut Recorder) {
        let from = self.time;
        self.gantt.push(Segment {
            process: None,
            start: from,
            end: until,
        });
        self.time = until;
        rec.record(
            format!("t={from}: nothing is ready, CPU idles until t={until}"),
            &self.snapshot(None, &[]),
        )
        .metric("time", until)
        .metric("idle", until - from);
    }

    fn run_slice(&mut self, i: usize, length: u64) {
        let start = self.time;
        self.first_run[i].get_or_insert(start);
        self.remaining[i] -= length;
        self.time += length;
        self.gantt.push(Segment {
            process: Some(self.procs[i].name.clone()),
            start,
            end: self.time,
        });
        if self.remaining[i] == 0 {
            self.completion[i] = Some(self.time);
        }
    }

    fn result(self) -> CpuResult {
        let processes: Vec<ProcessTimes> = self
            .procs
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let completion = self.completion[i].unwrap_or(self.time);
                let first_run = self.first_run[i].unwrap_or(completion);
                let turnaround = completion.saturating_sub(p.arrival);
                ProcessTimes {
                    name: p.name.clone(),
                    first_run,
                    completion,
                    turnaround,
                    waiting: turnaround.saturating_sub(p.burst),
                    response: first_run.saturating_sub(p.arrival),
                }
            })
            .collect();
        let n = processes.len() as f64;
        let avg = |f: fn(&ProcessTimes) -> u64| processes.iter().map(f).sum::<u64>() as f64 / n;
        CpuResult {
            average_waiting: avg(|t| t.waiting),
            average_turnaround: avg(|t| t.turnaround),
            average_response: avg(|t| t.response),
            idle_time: self
                .gantt
                .iter()
                .filter(|s| s.process.is_none())
                .map(|s| s.end - s.start)
                .sum(),
            gantt: self.gantt,
            processes,
        }
    }
}

impl CpuScheduler {
    fn run_to_completion<'a>(&self, procs: &'a [Process], rec: &mut Recorder) -> Machine<'a> {
        let mut m = Machine::new(procs);
        while m.completion.iter().any(Option::is_none) {
            let ready: Vec<usize> = (0..procs.len())
                .filter(|&i| m.completion[i].is_none() && procs[i].arrival <= m.time)
                .collect();
            let pick = ready.iter().copied().min_by_key(|&i| {
                let p = &procs[i];
                let primary = match self.policy {
                    CpuPolicy::Sjf => p.burst,
                    CpuPolicy::Priority => u64::from(p.priority),
                    _ => 0,
                };
                (primary, p.arrival, i)
            });
            let Some(i) = pick else {
                if let Some(next) = m.next_arrival() {
                    m.idle_until(next, rec);
                }
                continue;
            };
            let others: Vec<usize> = ready.iter().copied().filter(|&j| j != i).collect();
            let start = m.time;
            let burst = m.remaining[i];
            m.run_slice(i, burst);
            let p = &procs[i];
            let why = match self.policy {
                CpuPolicy::Sjf => format!("shortest burst {}", p.burst),
                CpuPolicy::Priority => format!("priority {}", p.priority),
                _ => format!("arrived at t={}", p.arrival),
            };
            rec.record(
                format!(
                    "t={start}: run {} ({why}) to completion at t={}",
                    p.name, m.time
                ),
                &m.snapshot(Some(i), &others),
            )
            .metric("time", m.time)
            .metric("waiting", start - p.arrival);
        }
        m
    }

    fn round_robin_run<'a>(
        &self,
        procs: &'a [Process],
        quantum: u64,
        rec: &mut Recorder,
    ) -> Result<Machine<'a>, Machine<'a>> {
        let mut m = Machine::new(procs);
        let mut by_arrival: Vec<usize> = (0..procs.len()).collect();
        by_arrival.sort_by_key(|&i| (procs[i].arrival, i));
        let mut pending: VecDeque<usize> = by_arrival.into();
        let mut queue: VecDeque<usize> = VecDeque::new();
        let mut slices = 0u64;

        let admit = |m: &Machine<'_>, pending: &mut VecDeque<usize>, queue: &mut VecDeque<usize>| {
            while let Some(&i) = pending.front() {
                if procs[i].arrival > m.time {
                    break;
                }
                queue.push_back(i);
                pending.pop_front();
            }
        };

        admit(&m, &mut pending, &mut queue);
        loop {
            let Some(i) = queue.pop_front() else {
                match pending.front() {
                    Some(&next) => {
                        m.idle_until(procs[next].arrival, rec);
                        admit(&m, &mut pending, &mut queue);
                        continue;
                    }
                    None => break,
                }
            };
            if slices >= self.max_slices {
                return Err(m);
            }
            slices += 1;
            let start = m.time;
            let length = quantum.min(m.remaining[i]);
            m.run_slice(i, length);
            admit(&m, &mut pending, &mut queue);
            let finished = m.remaining[i] == 0;
            if !finished {
                queue.push_back(i);
            }
            let ready: Vec<usize> = queue.iter().copied().collect();
            let p = &procs[i];
            let description = if finished {
                format!("t={start}: {} runs {length} and finishes at t={}", p.name, m.time)
            } else {
                format!(
                    "t={start}: {} runs {length}, {} left; back of the queue",
                    p.name, m.remaining[i]
                )
            };
            rec.record(description, &m.snapshot(Some(i), &ready))
                .metric("time", m.time)
                .metric("queueLength", ready.len());
        }
        Ok(m)
    }
}

impl Engine for CpuScheduler {
    type Problem = [Process];

    fn name(&self) -> &str {
        match self.policy {
            CpuPolicy::Fcfs => "cpu-fcfs",
            CpuPolicy::Sjf => "cpu-sjf",
            CpuPolicy::Priority => "cpu-priority",
            CpuPolicy::RoundRobin { .. } => "cpu-round-robin",
        }
    }

    fn complexity(&self) -> Complexity {
        match self.policy {
            CpuPolicy::RoundRobin { .. } => Complexity::new("O(Σ burst / quantum)", "O(n)"),
            _ => Complexity::new("O(n²)", "O(n)"),
        }
    }

    fn validate(&self, procs: &[Process]) -> Result<(), ParamError> {
        if procs.is_empty() {
            return Err(ParamError::Empty { name: "processes" });
        }
        if let CpuPolicy::RoundRobin { quantum: 0 } = self.policy {
            return Err(ParamError::out_of_range("quantum", 0, ">= 1"));
        }
        for (i, p) in procs.iter().enumerate() {
            if p.burst == 0 {
                return Err(ParamError::out_of_range("burst", format!("0 for {}", p.name), ">= 1"));
            }
            if procs[..i].iter().any(|q| q.name == p.name) {
                return Err(ParamError::inconsistent(format!(
                    "process name {} is used twice",
                    p.name
                )));
            }
        }
        Ok(())
    }

    fn run(&self, procs: &[Process], rec: &mut Recorder) -> Conclusion {
        tracing::debug!(processes = procs.len(), policy = ?self.policy, "cpu scheduling started");
        rec.record(
            format!("{} process(es) submitted", procs.len()),
            &Machine::new(procs).snapshot(None, &[]),
        )
        .note(match self.policy {
            CpuPolicy::Fcfs => "FCFS runs processes in arrival order without preemption".to_owned(),
            CpuPolicy::Sjf => {
                "SJF picks the ready process with the shortest burst and runs it to completion"
                    .to_owned()
            }
            CpuPolicy::Priority => {
                "The ready process with the lowest priority number runs to completion".to_owned()
            }
            CpuPolicy::RoundRobin { quantum } => {
                format!("Each process runs for at most {quantum} time unit(s) before yielding")
            }
        });

        let machine = match self.policy {
            CpuPolicy::RoundRobin { quantum } => match self.round_robin_run(procs, quantum, rec) {
                Ok(m) => m,
                Err(m) => {
                    rec.record(
                        format!("Stopped after {} slices", self.max_slices),
                        &m.snapshot(None, &[]),
                    );
                    let partial = m.result();
                    return Conclusion::new(
                        Outcome::bounded("max_slices", self.max_slices),
                        &partial,
                    );
                }
            },
            _ => self.run_to_completion(procs, rec),
        };
        let result = machine.result();
        rec.record(
            format!(
                "All processes done: average waiting {}, average turnaround {}",
                fixed(result.average_waiting, 2),
                fixed(result.average_turnaround, 2)
            ),
            &result,
        )
        .metric("averageWaiting", result.average_waiting)
        .metric("averageTurnaround", result.average_turnaround)
        .metric("idleTime", result.idle_time);
        Conclusion::solved(&result)
    }
}
