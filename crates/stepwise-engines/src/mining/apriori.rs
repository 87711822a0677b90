//! Apriori frequent itemset mining and association rules.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use stepwise_core::error::require_probability;
use stepwise_core::{Complexity, Conclusion, Engine, Limits, Outcome, ParamError, Recorder};
use stepwise_stats::format::{fixed, set};

/// Level-wise Apriori.
///
/// Items inside an itemset are kept in lexicographic order. Level `k`
/// candidates join two frequent `(k-1)`-itemsets sharing their first
/// `k-2` items, then drop any candidate with an infrequent
/// `(k-1)`-subset before counting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Apriori {
    /// Minimum fraction of transactions containing an itemset, `(0, 1]`.
    /// Default: 0.5.
    pub min_support: f64,
    /// Minimum rule confidence, `[0, 1]`. Default: 0.6.
    pub min_confidence: f64,
    /// Cap on candidates generated at one level.
    pub max_candidates: u64,
}

impl Default for Apriori {
    fn default() -> Self {
        Self {
            min_support: 0.5,
            min_confidence: 0.6,
            max_candidates: Limits::default().max_states,
        }
    }
}

/// A frequent itemset with its support.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Itemset {
    /// Items in lexicographic order.
    pub items: Vec<String>,
    /// Transactions containing every item.
    pub count: usize,
    /// `count / transactions`.
    pub support: f64,
}

/// An association rule `antecedent => consequent`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Left-hand side.
    pub antecedent: Vec<String>,
    /// Right-hand side.
    pub consequent: Vec<String>,
    /// Support of the union.
    pub support: f64,
    /// `support(union) / support(antecedent)`.
    pub confidence: f64,
    /// `confidence / support(consequent)`.
    pub lift: f64,
}

/// Mining output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AprioriResult {
    /// Frequent itemsets by level, then lexicographically.
    pub frequent_itemsets: Vec<Itemset>,
    /// Rules meeting the confidence threshold.
    pub rules: Vec<Rule>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CandidateRow {
    items: Vec<String>,
    count: usize,
    support: f64,
    frequent: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JoinSnapshot {
    level: usize,
    joined: Vec<Vec<String>>,
    pruned: Vec<Vec<String>>,
    candidates: Vec<Vec<String>>,
}

struct Miner {
    transactions: Vec<Vec<String>>,
    min_count: usize,
}

impl Miner {
    fn new(transactions: &[Vec<String>], min_support: f64) -> Self {
        let transactions: Vec<Vec<String>> = transactions
            .iter()
            .map(|t| {
                let mut t = t.clone();
                t.sort();
                t.dedup();
                t
            })
            .collect();
        let n = transactions.len() as f64;
        let min_count = ((min_support * n) - 1e-9).ceil().max(1.0) as usize;
        Self {
            transactions,
            min_count,
        }
    }

    fn count(&self, items: &[String]) -> usize {
        self.transactions
            .iter()
            .filter(|t| items.iter().all(|i| t.binary_search(i).is_ok()))
            .count()
    }

    fn support(&self, count: usize) -> f64 {
        count as f64 / self.transactions.len() as f64
    }

    fn rows(&self, candidates: &[Vec<String>]) -> Vec<CandidateRow> {
        candidates
            .iter()
            .map(|c| {
                let count = self.count(c);
                CandidateRow {
                    items: c.clone(),
                    count,
                    support: self.support(count),
                    frequent: count >= self.min_count,
                }
            })
            .collect()
    }
}

/// Join step plus subset pruning. `frequent` is sorted.
fn generate(frequent: &[Vec<String>]) -> (Vec<Vec<String>>, Vec<Vec<String>>) {
    let mut kept = Vec::new();
    let mut pruned = Vec::new();
    for (i, a) in frequent.iter().enumerate() {
        for b in &frequent[i + 1..] {
            let k = a.len();
            if a[..k - 1] != b[..k - 1] {
                continue;
            }
            let mut candidate = a.clone();
            candidate.push(b[k - 1].clone());
            let all_frequent = (0..candidate.len()).all(|skip| {
                let subset: Vec<String> = candidate
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != skip)
                    .map(|(_, s)| s.clone())
                    .collect();
                frequent.binary_search(&subset).is_ok()
            });
            if all_frequent {
                kept.push(candidate);
            } else {
                pruned.push(candidate);
            }
        }
    }
    (kept, pruned)
}

impl Engine for Apriori {
    type Problem = [Vec<String>];

    fn name(&self) -> &str {
        "apriori"
    }

    fn complexity(&self) -> Complexity {
        Complexity::new("O(2^d · n) worst case", "O(2^d)")
    }

    fn validate(&self, transactions: &[Vec<String>]) -> Result<(), ParamError> {
        if !(self.min_support > 0.0 && self.min_support <= 1.0) {
            return Err(ParamError::out_of_range("min_support", self.min_support, "(0, 1]"));
        }
        require_probability("min_confidence", self.min_confidence)?;
        if self.max_candidates == 0 {
            return Err(ParamError::out_of_range("max_candidates", 0, ">= 1"));
        }
        if transactions.is_empty() {
            return Err(ParamError::Empty {
                name: "transactions",
            });
        }
        Ok(())
    }

    fn run(&self, transactions: &[Vec<String>], rec: &mut Recorder) -> Conclusion {
        let miner = Miner::new(transactions, self.min_support);
        tracing::debug!(
            transactions = miner.transactions.len(),
            min_count = miner.min_count,
            "apriori started"
        );

        let mut items: Vec<String> = miner.transactions.iter().flatten().cloned().collect();
        items.sort();
        items.dedup();
        let singles: Vec<Vec<String>> = items.into_iter().map(|i| vec![i]).collect();
        let rows = miner.rows(&singles);
        let mut level: Vec<Vec<String>> = rows
            .iter()
            .filter(|r| r.frequent)
            .map(|r| r.items.clone())
            .collect();
        rec.record(
            format!(
                "Level 1: {} of {} item(s) reach {} transaction(s)",
                level.len(),
                rows.len(),
                miner.min_count
            ),
            &rows,
        )
        .metric("frequent", level.len())
        .metric("minCount", miner.min_count)
        .note("Any superset of an infrequent itemset is infrequent, so only frequent items move on");

        let mut frequent: Vec<Itemset> = rows
            .iter()
            .filter(|r| r.frequent)
            .map(|r| Itemset {
                items: r.items.clone(),
                count: r.count,
                support: r.support,
            })
            .collect();

        let mut k = 2;
        while !level.is_empty() {
            let (candidates, pruned) = generate(&level);
            let generated = (candidates.len() + pruned.len()) as u64;
            rec.record(
                format!(
                    "Level {k}: join gives {generated} candidate(s), prune removes {}",
                    pruned.len()
                ),
                &JoinSnapshot {
                    level: k,
                    joined: candidates.iter().chain(&pruned).cloned().collect(),
                    pruned: pruned.clone(),
                    candidates: candidates.clone(),
                },
            )
            .metric("candidates", candidates.len())
            .metric("pruned", pruned.len());
            if generated > self.max_candidates {
                rec.record(
                    format!(
                        "Level {k} generated {generated} candidates, above the cap of {}",
                        self.max_candidates
                    ),
                    &frequent,
                );
                return Conclusion::new(
                    Outcome::bounded("max_candidates", self.max_candidates),
                    &AprioriResult {
                        frequent_itemsets: frequent,
                        rules: Vec::new(),
                    },
                );
            }
            if candidates.is_empty() {
                rec.record(format!("No level-{k} candidates remain; stop"), &frequent)
                    .metric("frequentItemsets", frequent.len());
                break;
            }
            let rows = miner.rows(&candidates);
            level = rows
                .iter()
                .filter(|r| r.frequent)
                .map(|r| r.items.clone())
                .collect();
            frequent.extend(rows.iter().filter(|r| r.frequent).map(|r| Itemset {
                items: r.items.clone(),
                count: r.count,
                support: r.support,
            }));
            rec.record(
                format!(
                    "Level {k}: {} of {} candidate(s) are frequent",
                    level.len(),
                    rows.len()
                ),
                &rows,
            )
            .metric("frequent", level.len());
            if level.is_empty() {
                rec.record(format!("No frequent {k}-itemsets; stop"), &frequent)
                    .metric("frequentItemsets", frequent.len());
            }
            k += 1;
        }

        let support_of: IndexMap<&[String], f64> = frequent
            .iter()
            .map(|s| (s.items.as_slice(), s.support))
            .collect();
        let mut rules: Vec<Rule> = Vec::new();
        for itemset in frequent.iter().filter(|s| s.items.len() >= 2) {
            let size = itemset.items.len();
            let mut here: Vec<Rule> = Vec::new();
            let mut rejected = 0usize;
            for mask in 1..(1u64 << size) - 1 {
                let (lhs, rhs): (Vec<_>, Vec<_>) = itemset
                    .items
                    .iter()
                    .enumerate()
                    .partition(|(j, _)| mask & (1 << j) != 0);
                let antecedent: Vec<String> = lhs.into_iter().map(|(_, s)| s.clone()).collect();
                let consequent: Vec<String> = rhs.into_iter().map(|(_, s)| s.clone()).collect();
                // Subsets of a frequent itemset are frequent, so both lookups hit.
                let (Some(&sa), Some(&sc)) = (
                    support_of.get(antecedent.as_slice()),
                    support_of.get(consequent.as_slice()),
                ) else {
                    continue;
                };
                let confidence = itemset.support / sa;
                if confidence + 1e-12 < self.min_confidence {
                    rejected += 1;
                    continue;
                }
                here.push(Rule {
                    antecedent,
                    consequent,
                    support: itemset.support,
                    confidence,
                    lift: confidence / sc,
                });
            }
            rec.record(
                format!(
                    "Rules from {}: {} kept, {rejected} below confidence {}",
                    set(&itemset.items),
                    here.len(),
                    fixed(self.min_confidence, 2)
                ),
                &here,
            )
            .metric("rules", here.len());
            rules.extend(here);
        }

        let result = AprioriResult {
            frequent_itemsets: frequent,
            rules,
        };
        rec.record(
            format!(
                "Found {} frequent itemset(s) and {} rule(s)",
                result.frequent_itemsets.len(),
                result.rules.len()
            ),
            &result,
        )
        .metric("frequentItemsets", result.frequent_itemsets.len())
        .metric("rules", result.rules.len())
        .note("Lift above 1 means the items occur together more often than independence predicts");
        Conclusion::solved(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baskets() -> Vec<Vec<String>> {
        [
            vec!["bread", "milk"],
            vec!["bread", "diaper", "beer", "eggs"],
            vec!["milk", "diaper", "beer", "cola"],
            vec!["bread", "milk", "diaper", "beer"],
            vec!["bread", "milk", "diaper", "cola"],
        ]
        .iter()
        .map(|t| t.iter().map(|s| (*s).to_owned()).collect())
        .collect()
    }

    fn mine(min_support: f64, min_confidence: f64) -> (stepwise_core::Simulation, AprioriResult) {
        let sim = Apriori {
            min_support,
            min_confidence,
            ..Apriori::default()
        }
        .simulate(&baskets());
        let result = serde_json::from_value(sim.result.clone()).unwrap();
        (sim, result)
    }

    #[test]
    fn frequent_itemsets_by_level() {
        let (sim, r) = mine(0.6, 0.7);
        assert!(sim.success);
        let names: Vec<String> = r.frequent_itemsets.iter().map(|s| s.items.join(",")).collect();
        assert_eq!(
            names,
            vec![
                "beer",
                "bread",
                "diaper",
                "milk",
                "beer,diaper",
                "bread,diaper",
                "bread,milk",
                "diaper,milk"
            ]
        );
    }

    #[test]
    fn rules_respect_confidence() {
        let (_, r) = mine(0.6, 0.7);
        assert_eq!(r.rules.len(), 8);
        let (_, strict) = mine(0.6, 0.8);
        assert_eq!(strict.rules.len(), 1);
        let rule = &strict.rules[0];
        assert_eq!(rule.antecedent, vec!["beer"]);
        assert_eq!(rule.consequent, vec!["diaper"]);
        assert!((rule.confidence - 1.0).abs() < 1e-12);
        assert!((rule.lift - 1.25).abs() < 1e-12);
    }

    #[test]
    fn level_three_candidate_is_counted_and_rejected() {
        let (sim, _) = mine(0.6, 0.7);
        let join = sim
            .steps
            .iter()
            .find(|s| s.state["level"] == 3)
            .unwrap();
        assert_eq!(
            join.state["candidates"],
            serde_json::json!([["bread", "diaper", "milk"]])
        );
        assert!(sim.steps.iter().any(|s| s.description == "No frequent 3-itemsets; stop"));
    }

    #[test]
    fn prune_drops_candidates_with_infrequent_subsets() {
        let level: Vec<Vec<String>> = [["a", "b"], ["a", "c"], ["b", "d"]]
            .iter()
            .map(|p| p.iter().map(|s| (*s).to_owned()).collect())
            .collect();
        let (kept, pruned) = generate(&level);
        assert!(kept.is_empty());
        assert_eq!(pruned, vec![vec!["a", "b", "c"]]);
    }

    #[test]
    fn invalid_thresholds_rejected() {
        let a = Apriori {
            min_support: 0.0,
            ..Apriori::default()
        };
        assert!(a.simulate(&baskets()).steps.is_empty());
        assert!(Apriori::default().simulate(&[]).steps.is_empty());
    }
}
