//! Page replacement: FIFO, LRU and Optimal.

use serde::{Deserialize, Serialize};
use stepwise_core::{Complexity, Conclusion, Engine, ParamError, Recorder};
use stepwise_stats::format::percent;

/// Victim selection rule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PagePolicy {
    /// Evict the page loaded longest ago.
    #[default]
    Fifo,
    /// Evict the page used longest ago.
    Lru,
    /// Evict the page whose next use is farthest away (Belady).
    Optimal,
}

/// Frame count and reference string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingProblem {
    /// Physical frames, >= 1.
    pub frames: usize,
    /// Page numbers in reference order.
    pub references: Vec<u64>,
}

impl PagingProblem {
    /// Build a problem.
    pub fn new(frames: usize, references: &[u64]) -> Self {
        Self {
            frames,
            references: references.to_vec(),
        }
    }
}

/// Page replacement simulator.
///
/// Frames are fixed slots; a fault fills the lowest empty slot first.
/// Ties between eviction candidates go to the lowest slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PageReplacement {
    /// Eviction rule.
    pub policy: PagePolicy,
}

impl PageReplacement {
    /// Simulator for `policy`.
    pub fn new(policy: PagePolicy) -> Self {
        Self { policy }
    }
}

/// Hit and fault accounting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagingResult {
    /// References found in memory.
    pub hits: usize,
    /// References that had to be loaded.
    pub faults: usize,
    /// `hits / references`.
    pub hit_ratio: f64,
    /// Frame contents after each reference.
    pub frames: Vec<Vec<Option<u64>>>,
    /// Whether each reference faulted.
    pub fault_at: Vec<bool>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PagingSnapshot<'a> {
    reference: u64,
    position: usize,
    frames: &'a [Option<u64>],
    hit: bool,
    evicted: Option<u64>,
    hits: usize,
    faults: usize,
}

impl PageReplacement {
    fn victim(&self, slots: &[Option<u64>], stamp: &[usize], refs: &[u64], now: usize) -> usize {
        match self.policy {
            PagePolicy::Fifo | PagePolicy::Lru => (0..slots.len())
                .min_by_key(|&s| (stamp[s], s))
                .unwrap_or(0),
            PagePolicy::Optimal => (0..slots.len())
                .max_by_key(|&s| {
                    let next = slots[s].and_then(|page| {
                        refs[now + 1..].iter().position(|&r| r == page)
                    });
                    // Never used again sorts above any distance; lower slot wins ties.
                    (next.unwrap_or(usize::MAX), std::cmp::Reverse(s))
                })
                .unwrap_or(0),
        }
    }
}

impl Engine for PageReplacement {
    type Problem = PagingProblem;

    fn name(&self) -> &str {
        match self.policy {
            PagePolicy::Fifo => "paging-fifo",
            PagePolicy::Lru => "paging-lru",
            PagePolicy::Optimal => "paging-optimal",
        }
    }

    fn complexity(&self) -> Complexity {
        match self.policy {
            PagePolicy::Optimal => Complexity::new("O(n² f)", "O(f)"),
            _ => Complexity::new("O(n f)", "O(f)"),
        }
    }

    fn validate(&self, p: &PagingProblem) -> Result<(), ParamError> {
        if p.frames == 0 {
            return Err(ParamError::out_of_range("frames", 0, ">= 1"));
        }
        if p.references.is_empty() {
            return Err(ParamError::Empty { name: "references" });
        }
        Ok(())
    }

    fn run(&self, p: &PagingProblem, rec: &mut Recorder) -> Conclusion {
        let mut slots: Vec<Option<u64>> = vec![None; p.frames];
        // FIFO: load time. LRU: last use. Unused by Optimal.
        let mut stamp: Vec<usize> = vec![0; p.frames];
        let (mut hits, mut faults) = (0usize, 0usize);
        let mut history = Vec::with_capacity(p.references.len());
        let mut fault_at = Vec::with_capacity(p.references.len());
        let mut explained = false;

        for (t, &page) in p.references.iter().enumerate() {
            let resident = slots.iter().position(|&s| s == Some(page));
            let (description, evicted) = match resident {
                Some(slot) => {
                    hits += 1;
                    if self.policy == PagePolicy::Lru {
                        stamp[slot] = t;
                    }
                    (format!("Reference {page}: hit in frame {slot}"), None)
                }
                None => {
                    faults += 1;
                    let slot = match slots.iter().position(Option::is_none) {
                        Some(empty) => empty,
                        None => self.victim(&slots, &stamp, &p.references, t),
                    };
                    let evicted = slots[slot].replace(page);
                    stamp[slot] = t;
                    let text = match evicted {
                        Some(old) => format!("Reference {page}: fault, evict {old} from frame {slot}"),
                        None => format!("Reference {page}: fault, load into empty frame {slot}"),
                    };
                    (text, evicted)
                }
            };
            history.push(slots.clone());
            fault_at.push(resident.is_none());
            let step = rec
                .record(
                    description,
                    &PagingSnapshot {
                        reference: page,
                        position: t,
                        frames: &slots,
                        hit: resident.is_some(),
                        evicted,
                        hits,
                        faults,
                    },
                )
                .metric("hits", hits)
                .metric("faults", faults);
            if evicted.is_some() && !explained {
                explained = true;
                step.note(match self.policy {
                    PagePolicy::Fifo => "FIFO evicts the page that was loaded earliest",
                    PagePolicy::Lru => "LRU evicts the page whose last use is oldest",
                    PagePolicy::Optimal => "Optimal evicts the page needed farthest in the future",
                });
            }
        }

        let result = PagingResult {
            hits,
            faults,
            hit_ratio: hits as f64 / p.references.len() as f64,
            frames: history,
            fault_at,
        };
        rec.record(
            format!(
                "{} reference(s): {hits} hit(s), {faults} fault(s), hit ratio {}",
                p.references.len(),
                percent(result.hit_ratio)
            ),
            &result,
        )
        .metric("faults", faults)
        .metric("hitRatio", result.hit_ratio);
        Conclusion::solved(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFS: [u64; 20] = [7, 0, 1, 2, 0, 3, 0, 4, 2, 3, 0, 3, 2, 1, 2, 0, 1, 7, 0, 1];

    fn faults(policy: PagePolicy, frames: usize, refs: &[u64]) -> usize {
        let sim = PageReplacement::new(policy).simulate(&PagingProblem::new(frames, refs));
        assert!(sim.success);
        sim.result["faults"].as_u64().unwrap() as usize
    }

    #[test]
    fn textbook_fault_counts() {
        assert_eq!(faults(PagePolicy::Fifo, 3, &REFS), 15);
        assert_eq!(faults(PagePolicy::Lru, 3, &REFS), 12);
        assert_eq!(faults(PagePolicy::Optimal, 3, &REFS), 9);
    }

    #[test]
    fn belady_anomaly_under_fifo() {
        let refs = [1, 2, 3, 4, 1, 2, 5, 1, 2, 3, 4, 5];
        assert_eq!(faults(PagePolicy::Fifo, 3, &refs), 9);
        assert_eq!(faults(PagePolicy::Fifo, 4, &refs), 10);
    }

    #[test]
    fn optimal_never_worse_than_lru_or_fifo() {
        for frames in 1..5 {
            let opt = faults(PagePolicy::Optimal, frames, &REFS);
            assert!(opt <= faults(PagePolicy::Lru, frames, &REFS));
            assert!(opt <= faults(PagePolicy::Fifo, frames, &REFS));
        }
    }

    #[test]
    fn one_step_per_reference_plus_summary() {
        let sim = PageReplacement::default().simulate(&PagingProblem::new(3, &REFS));
        assert_eq!(sim.steps.len(), REFS.len() + 1);
        assert_eq!(sim.steps[3].state["evicted"], 7);
    }

    #[test]
    fn zero_frames_rejected() {
        let sim = PageReplacement::default().simulate(&PagingProblem::new(0, &REFS));
        assert!(sim.steps.is_empty());
    }
}
