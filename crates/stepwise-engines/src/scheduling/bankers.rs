//! Banker's algorithm: deadlock avoidance by safety checking.

use serde::{Deserialize, Serialize};
use stepwise_core::{Complexity, Conclusion, Engine, Outcome, ParamError, Recorder};

/// A process asking for more resources.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRequest {
    /// Requesting process index.
    pub process: usize,
    /// Units requested per resource type.
    pub amounts: Vec<u64>,
}

/// System state: free units, maximum claims and current allocations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankerState {
    /// Free units per resource type.
    pub available: Vec<u64>,
    /// Maximum claim per process and resource type.
    pub max: Vec<Vec<u64>>,
    /// Current allocation per process and resource type.
    pub allocation: Vec<Vec<u64>>,
    /// Optional request to evaluate before the safety check.
    pub request: Option<ResourceRequest>,
}

impl BankerState {
    /// State without a pending request.
    pub fn new(available: Vec<u64>, max: Vec<Vec<u64>>, allocation: Vec<Vec<u64>>) -> Self {
        Self {
            available,
            max,
            allocation,
            request: None,
        }
    }

    /// Attach a request by `process` for `amounts`.
    pub fn with_request(mut self, process: usize, amounts: Vec<u64>) -> Self {
        self.request = Some(ResourceRequest { process, amounts });
        self
    }
}

/// Banker's algorithm.
///
/// Each round picks the lowest-index unfinished process whose remaining
/// need fits in the work vector, lets it finish and reclaims its
/// allocation. A request is granted only if it stays within the
/// process's claim, fits in what is available, and leaves a safe state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bankers;

/// Verdict of the safety check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankerResult {
    /// Whether every process can finish.
    pub safe: bool,
    /// Completion order found, as `P<i>`.
    pub sequence: Vec<String>,
    /// Remaining need per process.
    pub need: Vec<Vec<u64>>,
    /// Work vector when the check stopped.
    pub work: Vec<u64>,
    /// `Some(granted)` when a request was evaluated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_granted: Option<bool>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Check {
    process: String,
    need: Vec<u64>,
    fits: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SafetySnapshot<'a> {
    work: &'a [u64],
    finished: &'a [bool],
    sequence: &'a [String],
    checks: Vec<Check>,
}

fn fits(need: &[u64], work: &[u64]) -> bool {
    need.iter().zip(work).all(|(n, w)| n <= w)
}

fn pname(i: usize) -> String {
    format!("P{i}")
}

impl Engine for Bankers {
    type Problem = BankerState;

    fn name(&self) -> &str {
        "bankers"
    }

    fn complexity(&self) -> Complexity {
        Complexity::new("O(n² m)", "O(n m)")
    }

    fn validate(&self, s: &BankerState) -> Result<(), ParamError> {
        let m = s.available.len();
        if m == 0 {
            return Err(ParamError::Empty { name: "available" });
        }
        if s.max.is_empty() {
            return Err(ParamError::Empty { name: "max" });
        }
        if s.allocation.len() != s.max.len() {
            return Err(ParamError::inconsistent(format!(
                "{} allocation row(s) for {} process(es)",
                s.allocation.len(),
                s.max.len()
            )));
        }
        for (i, (max, alloc)) in s.max.iter().zip(&s.allocation).enumerate() {
            if max.len() != m || alloc.len() != m {
                return Err(ParamError::inconsistent(format!(
                    "P{i} rows must have {m} resource column(s)"
                )));
            }
            if !fits(alloc, max) {
                return Err(ParamError::inconsistent(format!(
                    "P{i} holds more than its maximum claim"
                )));
            }
        }
        if let Some(req) = &s.request {
            if req.process >= s.max.len() {
                return Err(ParamError::out_of_range(
                    "request.process",
                    req.process,
                    format!("0..{}", s.max.len()),
                ));
            }
            if req.amounts.len() != m {
                return Err(ParamError::inconsistent(format!(
                    "request has {} amount(s) for {m} resource type(s)",
                    req.amounts.len()
                )));
            }
        }
        Ok(())
    }

    fn run(&self, s: &BankerState, rec: &mut Recorder) -> Conclusion {
        let n = s.max.len();
        let mut available = s.available.clone();
        let mut allocation = s.allocation.clone();
        let mut need: Vec<Vec<u64>> = s
            .max
            .iter()
            .zip(&allocation)
            .map(|(mx, al)| mx.iter().zip(al).map(|(a, b)| a - b).collect())
            .collect();
        rec.record(
            format!("Need = Max - Allocation for {n} process(es)"),
            &serde_json::json!({
                "available": available,
                "max": s.max,
                "allocation": allocation,
                "need": need,
            }),
        )
        .note("A state is safe if some order lets every process obtain its full claim and finish");

        let mut granted = None;
        if let Some(req) = &s.request {
            let p = req.process;
            let refuse = if !fits(&req.amounts, &need[p]) {
                Some(format!("P{p} asks for more than its remaining claim"))
            } else if !fits(&req.amounts, &available) {
                Some(format!("P{p} must wait: not enough resources available"))
            } else {
                None
            };
            if let Some(reason) = refuse {
                rec.record(
                    format!("Request {:?} from P{p} denied: {reason}", req.amounts),
                    &serde_json::json!({ "request": req, "available": available, "need": need[p] }),
                );
                let result = BankerResult {
                    safe: false,
                    sequence: Vec::new(),
                    need,
                    work: available,
                    request_granted: Some(false),
                };
                return Conclusion::new(Outcome::no_solution(reason), &result);
            }
            for (k, &a) in req.amounts.iter().enumerate() {
                available[k] -= a;
                allocation[p][k] += a;
                need[p][k] -= a;
            }
            rec.record(
                format!(
                    "Pretend to grant {:?} to P{p}; check whether the new state is safe",
                    req.amounts
                ),
                &serde_json::json!({
                    "request": req,
                    "available": available,
                    "allocation": allocation,
                    "need": need,
                }),
            )
            .note("The request is granted for real only if the resulting state is safe");
            granted = Some(true);
        }

        let mut work = available.clone();
        let mut finished = vec![false; n];
        let mut sequence: Vec<String> = Vec::new();
        while sequence.len() < n {
            let mut checks = Vec::new();
            let mut chosen = None;
            for i in (0..n).filter(|&i| !finished[i]) {
                let ok = fits(&need[i], &work);
                checks.push(Check {
                    process: pname(i),
                    need: need[i].clone(),
                    fits: ok,
                });
                if ok {
                    chosen = Some(i);
                    break;
                }
            }
            let Some(i) = chosen else {
                rec.record(
                    format!(
                        "No unfinished process fits in work {work:?}: the state is unsafe"
                    ),
                    &SafetySnapshot {
                        work: &work,
                        finished: &finished,
                        sequence: &sequence,
                        checks,
                    },
                )
                .metric("finished", sequence.len());
                let result = BankerResult {
                    safe: false,
                    sequence,
                    need,
                    work,
                    request_granted: granted.map(|_| false),
                };
                return Conclusion::new(
                    Outcome::no_solution("unsafe state: some processes can never finish"),
                    &result,
                );
            };
            for (w, a) in work.iter_mut().zip(&allocation[i]) {
                *w += a;
            }
            finished[i] = true;
            sequence.push(pname(i));
            rec.record(
                format!(
                    "P{i}: need {:?} fits, it finishes and releases {:?}; work is now {work:?}",
                    need[i], allocation[i]
                ),
                &SafetySnapshot {
                    work: &work,
                    finished: &finished,
                    sequence: &sequence,
                    checks,
                },
            )
            .metric("finished", sequence.len());
        }

        let result = BankerResult {
            safe: true,
            sequence,
            need,
            work,
            request_granted: granted,
        };
        rec.record(
            format!("Safe sequence: {}", result.sequence.join(" -> ")),
            &result,
        );
        Conclusion::solved(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn textbook() -> BankerState {
        BankerState::new(
            vec![3, 3, 2],
            vec![
                vec![7, 5, 3],
                vec![3, 2, 2],
                vec![9, 0, 2],
                vec![2, 2, 2],
                vec![4, 3, 3],
            ],
            vec![
                vec![0, 1, 0],
                vec![2, 0, 0],
                vec![3, 0, 2],
                vec![2, 1, 1],
                vec![0, 0, 2],
            ],
        )
    }

    fn verdict(state: &BankerState) -> (stepwise_core::Simulation, BankerResult) {
        let sim = Bankers.simulate(state);
        let r = serde_json::from_value(sim.result.clone()).unwrap();
        (sim, r)
    }

    #[test]
    fn safe_sequence_lowest_index_first() {
        let (sim, r) = verdict(&textbook());
        assert!(sim.success);
        assert_eq!(r.sequence, vec!["P1", "P3", "P0", "P2", "P4"]);
        assert_eq!(r.work, vec![10, 5, 7]);
        assert_eq!(r.need[0], vec![7, 4, 3]);
    }

    #[test]
    fn grantable_request() {
        let (sim, r) = verdict(&textbook().with_request(1, vec![1, 0, 2]));
        assert!(sim.success);
        assert_eq!(r.request_granted, Some(true));
        assert_eq!(r.need[1], vec![0, 2, 0]);
    }

    #[test]
    fn request_over_claim_denied() {
        let (sim, r) = verdict(&textbook().with_request(3, vec![1, 2, 0]));
        assert!(matches!(sim.outcome, Outcome::NoSolution { .. }));
        assert_eq!(r.request_granted, Some(false));
        assert!(sim.last_step().unwrap().description.contains("remaining claim"));
    }

    #[test]
    fn unsafe_state_is_no_solution() {
        let s = BankerState::new(vec![1], vec![vec![3], vec![3]], vec![vec![1], vec![1]]);
        let (sim, r) = verdict(&s);
        assert!(!r.safe);
        assert!(matches!(sim.outcome, Outcome::NoSolution { .. }));
        assert!(sim.last_step().unwrap().description.contains("unsafe"));
    }

    #[test]
    fn malformed_state_rejected() {
        let mut s = textbook();
        s.allocation[0] = vec![8, 0, 0];
        assert!(Bankers.simulate(&s).steps.is_empty());
        let s = textbook().with_request(9, vec![0, 0, 0]);
        assert!(Bankers.simulate(&s).steps.is_empty());
    }
}
