//! Transaction schedule classification.
//!
//! A schedule is written as `;`-separated operations: `R1(A)` and
//! `W1(A)` read or write item `A` in transaction 1, `C1` commits it and
//! `A1` aborts it. The analyzer derives the reads-from relation and
//! decides four properties:
//!
//! - **recoverable**: every transaction that read a value written by a
//!   still-uncommitted transaction ends by committing, after the writer
//!   commits. A reader that aborts, or never finishes, is a violation.
//! - **cascadeless**: reads only see committed writes.
//! - **strict**: no item written by an unfinished transaction is read or
//!   overwritten by another transaction.
//! - **conflict serializable**: the precedence graph over the committed
//!   projection (aborted transactions removed) is acyclic.

use std::fmt;

use serde::{Deserialize, Serialize};
use stepwise_core::{Complexity, Conclusion, Engine, Outcome, ParamError, Recorder};

/// Operation type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OpKind {
    /// `R`
    Read,
    /// `W`
    Write,
    /// `C`
    Commit,
    /// `A`
    Abort,
}

/// One parsed operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// Operation type.
    pub kind: OpKind,
    /// Transaction number.
    pub txn: u32,
    /// Item for reads and writes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self.kind {
            OpKind::Read => 'R',
            OpKind::Write => 'W',
            OpKind::Commit => 'C',
            OpKind::Abort => 'A',
        };
        match &self.item {
            Some(item) => write!(f, "{letter}{}({item})", self.txn),
            None => write!(f, "{letter}{}", self.txn),
        }
    }
}

fn bad_op(text: &str) -> ParamError {
    ParamError::out_of_range("schedule", text, "R<t>(X), W<t>(X), C<t> or A<t>")
}

fn parse_op(text: &str) -> Result<Operation, ParamError> {
    let mut chars = text.chars();
    let kind = match chars.next().map(|c| c.to_ascii_uppercase()) {
        Some('R') => OpKind::Read,
        Some('W') => OpKind::Write,
        Some('C') => OpKind::Commit,
        Some('A') => OpKind::Abort,
        _ => return Err(bad_op(text)),
    };
    let rest = chars.as_str();
    let digits = rest.chars().take_while(char::is_ascii_digit).count();
    let txn: u32 = rest[..digits].parse().map_err(|_| bad_op(text))?;
    let tail = rest[digits..].trim();
    let item = match kind {
        OpKind::Read | OpKind::Write => {
            let inner = tail
                .strip_prefix('(')
                .and_then(|t| t.strip_suffix(')'))
                .map(str::trim)
                .filter(|i| !i.is_empty() && i.chars().all(|c| c.is_alphanumeric() || c == '_'))
                .ok_or_else(|| bad_op(text))?;
            Some(inner.to_owned())
        }
        OpKind::Commit | OpKind::Abort if tail.is_empty() => None,
        _ => return Err(bad_op(text)),
    };
    Ok(Operation { kind, txn, item })
}

/// Parse a schedule string.
///
/// # Errors
///
/// Returns a [`ParamError`] for malformed operations, an empty
/// schedule, or any operation of a transaction after its commit or abort.
pub fn parse(schedule: &str) -> Result<Vec<Operation>, ParamError> {
    let ops: Vec<Operation> = schedule
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_op)
        .collect::<Result<_, _>>()?;
    if ops.is_empty() {
        return Err(ParamError::Empty { name: "schedule" });
    }
    for (p, op) in ops.iter().enumerate() {
        if let Some(end) = ops[..p]
            .iter()
            .find(|o| o.txn == op.txn && matches!(o.kind, OpKind::Commit | OpKind::Abort))
        {
            return Err(ParamError::inconsistent(format!(
                "{op} at position {p} follows {end}"
            )));
        }
    }
    Ok(ops)
}

/// `reader` read `item` at `position` from the write of `writer`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadsFrom {
    /// Reading transaction.
    pub reader: u32,
    /// Writing transaction.
    pub writer: u32,
    /// Item read.
    pub item: String,
    /// Position of the read.
    pub position: usize,
}

/// A precedence graph edge `from -> to`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    /// Earlier transaction.
    pub from: u32,
    /// Later transaction.
    pub to: u32,
    /// Conflicting item.
    pub item: String,
    /// The conflicting pair, e.g. `W1(A) < R2(A)`.
    pub pair: String,
}

/// Classification output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResult {
    /// Operations as parsed.
    pub operations: Vec<String>,
    /// Reads-from relation.
    pub reads_from: Vec<ReadsFrom>,
    /// Recoverability verdict.
    pub recoverable: bool,
    /// Avoids cascading aborts.
    pub cascadeless: bool,
    /// Strictness verdict.
    pub strict: bool,
    /// Conflict serializability of the committed projection.
    pub conflict_serializable: bool,
    /// Precedence graph edges, deduplicated.
    pub precedence: Vec<Conflict>,
    /// A cycle `T_a -> ... -> T_a`, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle: Option<Vec<u32>>,
    /// An equivalent serial order, when serializable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_order: Option<Vec<u32>>,
    /// Human-readable reasons for every failed property.
    pub violations: Vec<String>,
}

/// Schedule classification engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScheduleAnalyzer;

struct Ends {
    commit: Vec<(u32, usize)>,
    abort: Vec<(u32, usize)>,
}

impl Ends {
    fn of(ops: &[Operation]) -> Self {
        let pick = |kind: OpKind| {
            ops.iter()
                .enumerate()
                .filter(|(_, o)| o.kind == kind)
                .map(|(p, o)| (o.txn, p))
                .collect()
        };
        Self {
            commit: pick(OpKind::Commit),
            abort: pick(OpKind::Abort),
        }
    }

    fn commit_of(&self, t: u32) -> Option<usize> {
        self.commit.iter().find(|c| c.0 == t).map(|c| c.1)
    }

    fn abort_of(&self, t: u32) -> Option<usize> {
        self.abort.iter().find(|a| a.0 == t).map(|a| a.1)
    }

    fn finished_before(&self, t: u32, p: usize) -> bool {
        self.commit_of(t).is_some_and(|c| c < p) || self.abort_of(t).is_some_and(|a| a < p)
    }
}

fn txns(ops: &[Operation]) -> Vec<u32> {
    let mut out: Vec<u32> = Vec::new();
    for o in ops {
        if !out.contains(&o.txn) {
            out.push(o.txn);
        }
    }
    out
}

fn reads_from(ops: &[Operation], ends: &Ends) -> Vec<ReadsFrom> {
    let mut out = Vec::new();
    for (p, op) in ops.iter().enumerate() {
        let (OpKind::Read, Some(item)) = (op.kind, &op.item) else {
            continue;
        };
        let source = ops[..p].iter().rev().find(|w| {
            w.kind == OpKind::Write
                && w.item.as_ref() == Some(item)
                && !ends.abort_of(w.txn).is_some_and(|a| a < p)
        });
        if let Some(w) = source {
            if w.txn != op.txn {
                out.push(ReadsFrom {
                    reader: op.txn,
                    writer: w.txn,
                    item: item.clone(),
                    position: p,
                });
            }
        }
    }
    out
}

fn recoverability(rf: &[ReadsFrom], ends: &Ends) -> Vec<String> {
    let mut violations = Vec::new();
    for r in rf {
        let writer_commit = ends.commit_of(r.writer);
        if writer_commit.is_some_and(|c| c < r.position) {
            continue;
        }
        let reader_commit = ends.commit_of(r.reader);
        let ok = matches!((writer_commit, reader_commit), (Some(w), Some(c)) if w < c);
        if ok {
            continue;
        }
        let ending = match (reader_commit, ends.abort_of(r.reader)) {
            (Some(c), _) => format!("T{} committed at position {c}", r.reader),
            (None, Some(a)) => format!("T{} aborted at position {a}", r.reader),
            (None, None) => format!("T{} never finished", r.reader),
        };
        let needed = match writer_commit {
            Some(w) => format!("commit after C{} at position {w}", r.writer),
            None => format!("commit after T{}, which never commits", r.writer),
        };
        violations.push(format!(
            "not recoverable: T{} read {} from uncommitted T{} at position {}; {ending}, but it must {needed}",
            r.reader, r.item, r.writer, r.position
        ));
    }
    violations
}

fn cascading(rf: &[ReadsFrom], ends: &Ends) -> Vec<String> {
    rf.iter()
        .filter(|r| !ends.commit_of(r.writer).is_some_and(|c| c < r.position))
        .map(|r| {
            format!(
                "not cascadeless: T{} read {} at position {} before T{} committed",
                r.reader, r.item, r.position, r.writer
            )
        })
        .collect()
}

fn strictness(ops: &[Operation], ends: &Ends) -> Vec<String> {
    let mut violations = Vec::new();
    for (p, op) in ops.iter().enumerate() {
        let Some(item) = &op.item else { continue };
        let dirty = ops[..p].iter().find(|w| {
            w.kind == OpKind::Write
                && w.txn != op.txn
                && w.item.as_ref() == Some(item)
                && !ends.finished_before(w.txn, p)
        });
        if let Some(w) = dirty {
            violations.push(format!(
                "not strict: {op} at position {p} touches {item} written by unfinished T{} ({w})",
                w.txn
            ));
        }
    }
    violations
}

fn conflicts(ops: &[Operation], ends: &Ends) -> Vec<Conflict> {
    let kept: Vec<&Operation> = ops
        .iter()
        .filter(|o| ends.abort_of(o.txn).is_none())
        .filter(|o| matches!(o.kind, OpKind::Read | OpKind::Write))
        .collect();
    let mut out: Vec<Conflict> = Vec::new();
    for (i, a) in kept.iter().enumerate() {
        for b in &kept[i + 1..] {
            if a.txn == b.txn || a.item != b.item {
                continue;
            }
            if a.kind == OpKind::Read && b.kind == OpKind::Read {
                continue;
            }
            if out.iter().any(|c| c.from == a.txn && c.to == b.txn) {
                continue;
            }
            out.push(Conflict {
                from: a.txn,
                to: b.txn,
                item: a.item.clone().unwrap_or_default(),
                pair: format!("{a} < {b}"),
            });
        }
    }
    out
}

/// First cycle found by depth-first search from nodes in order.
fn find_cycle(nodes: &[u32], edges: &[Conflict]) -> Option<Vec<u32>> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        New,
        Active,
        Done,
    }
    let index = |t: u32| nodes.iter().position(|&n| n == t).unwrap_or(0);
    let succ: Vec<Vec<usize>> = (0..nodes.len())
        .map(|i| {
            edges
                .iter()
                .filter(|e| index(e.from) == i)
                .map(|e| index(e.to))
                .collect()
        })
        .collect();
    let mut mark = vec![Mark::New; nodes.len()];
    for root in 0..nodes.len() {
        if mark[root] != Mark::New {
            continue;
        }
        let mut path: Vec<usize> = vec![root];
        let mut cursor: Vec<usize> = vec![0];
        mark[root] = Mark::Active;
        while let Some(&u) = path.last() {
            let k = cursor.last().copied().unwrap_or(0);
            if let Some(&v) = succ[u].get(k) {
                if let Some(c) = cursor.last_mut() {
                    *c += 1;
                }
                match mark[v] {
                    Mark::Active => {
                        let from = path.iter().position(|&x| x == v).unwrap_or(0);
                        let mut cycle: Vec<u32> = path[from..].iter().map(|&x| nodes[x]).collect();
                        cycle.push(nodes[v]);
                        return Some(cycle);
                    }
                    Mark::New => {
                        mark[v] = Mark::Active;
                        path.push(v);
                        cursor.push(0);
                    }
                    Mark::Done => {}
                }
            } else {
                mark[u] = Mark::Done;
                path.pop();
                cursor.pop();
            }
        }
    }
    None
}

/// Kahn's algorithm, lowest position first among ready nodes.
fn serial_order(nodes: &[u32], edges: &[Conflict]) -> Vec<u32> {
    let mut indegree: Vec<usize> = nodes
        .iter()
        .map(|&t| edges.iter().filter(|e| e.to == t).count())
        .collect();
    let mut done = vec![false; nodes.len()];
    let mut order = Vec::with_capacity(nodes.len());
    while let Some(i) = (0..nodes.len()).find(|&i| !done[i] && indegree[i] == 0) {
        done[i] = true;
        order.push(nodes[i]);
        for e in edges.iter().filter(|e| e.from == nodes[i]) {
            if let Some(j) = nodes.iter().position(|&n| n == e.to) {
                indegree[j] = indegree[j].saturating_sub(1);
            }
        }
    }
    order
}

fn verdict(ok: bool) -> &'static str {
    if ok {
        "yes"
    } else {
        "no"
    }
}

impl Engine for ScheduleAnalyzer {
    type Problem = str;

    fn name(&self) -> &str {
        "schedule"
    }

    fn complexity(&self) -> Complexity {
        Complexity::new("O(n²)", "O(n + t²)")
    }

    fn validate(&self, schedule: &str) -> Result<(), ParamError> {
        parse(schedule).map(|_| ())
    }

    fn run(&self, schedule: &str, rec: &mut Recorder) -> Conclusion {
        let ops = match parse(schedule) {
            Ok(ops) => ops,
            Err(err) => {
                rec.record(format!("Schedule could not be parsed: {err}"), &());
                return Conclusion::new(Outcome::no_solution(err.to_string()), &());
            }
        };
        let operations: Vec<String> = ops.iter().map(ToString::to_string).collect();
        let ends = Ends::of(&ops);
        let all = txns(&ops);
        rec.record(
            format!(
                "Parsed {} operation(s) over {} transaction(s)",
                ops.len(),
                all.len()
            ),
            &ops,
        )
        .metric("operations", ops.len())
        .metric("transactions", all.len());

        let rf = reads_from(&ops, &ends);
        for r in &rf {
            rec.record(
                format!(
                    "R{}({}) at position {} reads from T{}",
                    r.reader, r.item, r.position, r.writer
                ),
                r,
            );
        }
        rec.record(
            format!("Reads-from relation has {} pair(s)", rf.len()),
            &rf,
        )
        .note("Ti reads from Tj when Ti reads the value written by Tj's latest unaborted write");

        let rc = recoverability(&rf, &ends);
        rec.record(format!("Recoverable: {}", verdict(rc.is_empty())), &rc)
            .note("A reader of uncommitted data must commit after its writer commits");
        let aca = cascading(&rf, &ends);
        rec.record(format!("Cascadeless: {}", verdict(aca.is_empty())), &aca)
            .note("Reading only committed data means no abort can cascade");
        let st = strictness(&ops, &ends);
        rec.record(format!("Strict: {}", verdict(st.is_empty())), &st)
            .note("Strict schedules let undo simply restore before-images");

        let committed: Vec<u32> = all
            .iter()
            .copied()
            .filter(|&t| ends.abort_of(t).is_none())
            .collect();
        let precedence = conflicts(&ops, &ends);
        for c in &precedence {
            rec.record(
                format!("Edge T{} -> T{} from conflict {}", c.from, c.to, c.pair),
                c,
            );
        }
        let cycle = find_cycle(&committed, &precedence);
        let serializable = cycle.is_none();
        let order = serializable.then(|| serial_order(&committed, &precedence));
        let description = match (&cycle, &order) {
            (Some(c), _) => format!(
                "Precedence graph has a cycle {}: not conflict serializable",
                c.iter().map(|t| format!("T{t}")).collect::<Vec<_>>().join(" -> ")
            ),
            (None, Some(o)) => format!(
                "Precedence graph is acyclic: equivalent to serial order {}",
                o.iter().map(|t| format!("T{t}")).collect::<Vec<_>>().join(", ")
            ),
            (None, None) => "Precedence graph is acyclic".to_owned(),
        };
        rec.record(
            description,
            &serde_json::json!({
                "nodes": committed,
                "edges": precedence,
                "cycle": cycle,
            }),
        )
        .metric("edges", precedence.len())
        .note("Aborted transactions are dropped before building the graph");

        let mut violations = rc.clone();
        violations.extend(aca.iter().cloned());
        violations.extend(st.iter().cloned());
        if let Some(c) = &cycle {
            violations.push(format!(
                "not conflict serializable: cycle through {}",
                c.iter().map(|t| format!("T{t}")).collect::<Vec<_>>().join(" -> ")
            ));
        }
        let result = ScheduleResult {
            operations,
            reads_from: rf,
            recoverable: rc.is_empty(),
            cascadeless: aca.is_empty(),
            strict: st.is_empty(),
            conflict_serializable: serializable,
            precedence,
            cycle,
            serial_order: order,
            violations,
        };
        rec.record(
            format!(
                "Recoverable {}, cascadeless {}, strict {}, conflict serializable {}",
                verdict(result.recoverable),
                verdict(result.cascadeless),
                verdict(result.strict),
                verdict(result.conflict_serializable)
            ),
            &result,
        )
        .metric("violations", result.violations.len());
        Conclusion::solved(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(schedule: &str) -> ScheduleResult {
        let sim = ScheduleAnalyzer.simulate(schedule);
        assert!(sim.success, "{:?}", sim.outcome);
        serde_json::from_value(sim.result).unwrap()
    }

    #[test]
    fn parses_operations() {
        let ops = parse("W1(A); r2(B) ;C1;A2").unwrap();
        let shown: Vec<String> = ops.iter().map(ToString::to_string).collect();
        assert_eq!(shown, vec!["W1(A)", "R2(B)", "C1", "A2"]);
        assert!(parse("X1(A)").is_err());
        assert!(parse("W(A)").is_err());
        assert!(parse("C1(A)").is_err());
        assert!(parse(" ; ").is_err());
        assert!(parse("W1(A); C1; R1(A)").is_err());
    }

    #[test]
    fn direct_run_on_malformed_schedule_records_a_step() {
        let mut rec = Recorder::new("schedule");
        let end = ScheduleAnalyzer.run("W1(A); X2(B)", &mut rec);
        assert_eq!(rec.steps().len(), 1);
        assert!(rec.steps()[0].description.starts_with("Schedule could not be parsed"));
        assert!(matches!(end.outcome, Outcome::NoSolution { .. }));
    }

    #[test]
    fn reader_aborting_is_not_recoverable() {
        let r = classify("W1(A); R2(A); C1; A2");
        assert!(!r.recoverable);
        assert!(!r.cascadeless);
        assert!(!r.strict);
        assert!(r.conflict_serializable);
        assert_eq!(r.reads_from.len(), 1);
        assert!(r.violations[0].contains("T2 aborted"));
    }

    #[test]
    fn reader_commits_after_writer() {
        let r = classify("W1(A); R2(A); C1; C2");
        assert!(r.recoverable);
        assert!(!r.cascadeless);
    }

    #[test]
    fn reader_commits_first() {
        let r = classify("W1(A); R2(A); C2; C1");
        assert!(!r.recoverable);
    }

    #[test]
    fn serial_schedule_has_every_property() {
        let r = classify("W1(A); C1; R2(A); W2(A); C2");
        assert!(r.recoverable && r.cascadeless && r.strict && r.conflict_serializable);
        assert_eq!(r.serial_order, Some(vec![1, 2]));
        assert!(r.violations.is_empty());
    }

    #[test]
    fn blind_overwrite_is_not_strict() {
        let r = classify("W1(A); W2(A); C1; C2");
        assert!(r.recoverable && r.cascadeless);
        assert!(!r.strict);
    }

    #[test]
    fn lost_update_cycle() {
        let r = classify("R1(A); R2(A); W1(A); W2(A); C1; C2");
        assert!(!r.conflict_serializable);
        assert_eq!(r.cycle, Some(vec![1, 2, 1]));
        assert!(r.serial_order.is_none());
    }

    #[test]
    fn aborted_transaction_leaves_the_graph() {
        let r = classify("R1(A); W2(A); W1(A); C1; A2");
        assert!(r.conflict_serializable);
        assert!(r.precedence.is_empty());
    }

    #[test]
    fn read_skips_aborted_write() {
        let r = classify("W1(A); C1; W2(A); A2; R3(A); C3");
        assert_eq!(r.reads_from[0].writer, 1);
    }

    #[test]
    fn malformed_schedule_rejected() {
        assert!(ScheduleAnalyzer.simulate("W1(A); Q2").steps.is_empty());
    }
}
