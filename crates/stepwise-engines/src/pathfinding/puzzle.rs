//! Sliding-tile puzzle solved by breadth-first search over board states.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use stepwise_core::{Complexity, Conclusion, Engine, Limits, Outcome, ParamError, Recorder};
use stepwise_space::NEIGHBOUR_OFFSETS;

/// Letters for blank moves, aligned with [`NEIGHBOUR_OFFSETS`].
const MOVE_LETTERS: [char; 4] = ['U', 'D', 'L', 'R'];

/// Boards wider than this are rejected; the state space is already
/// astronomically large at 5x5.
pub const MAX_SIDE: usize = 5;

/// An N×N board pair. `0` is the blank.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleProblem {
    /// Initial arrangement, row by row.
    pub start: Vec<Vec<u32>>,
    /// Target arrangement, row by row.
    pub goal: Vec<Vec<u32>>,
}

impl PuzzleProblem {
    /// Solve `start` toward an explicit `goal`.
    pub fn new(start: Vec<Vec<u32>>, goal: Vec<Vec<u32>>) -> Self {
        Self { start, goal }
    }

    /// Solve `start` toward `1, 2, …, N²−1, 0` in row-major order.
    pub fn with_standard_goal(start: Vec<Vec<u32>>) -> Self {
        let n = start.len();
        let cells = (n * n) as u32;
        let goal = (0..n)
            .map(|r| {
                (0..n)
                    .map(|c| {
                        let tile = (r * n + c) as u32 + 1;
                        if tile == cells {
                            0
                        } else {
                            tile
                        }
                    })
                    .collect()
            })
            .collect();
        Self { start, goal }
    }
}

/// Breadth-first sliding-puzzle solver.
///
/// States are expanded one depth level at a time, so a trace records one
/// step per level rather than per board. Moves name the direction the
/// blank travels and are tried Up, Down, Left, Right.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlidingPuzzle {
    /// Deepest level searched before giving up. Default: 31, the
    /// diameter of the 8-puzzle.
    pub max_depth: u64,
    /// Distinct boards held before giving up. Default:
    /// [`Limits::max_states`].
    pub max_states: u64,
}

impl Default for SlidingPuzzle {
    fn default() -> Self {
        Self {
            max_depth: 31,
            max_states: Limits::default().max_states,
        }
    }
}

/// Final answer of a solved puzzle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleResult {
    /// Number of moves in the shortest solution.
    pub solution_depth: u64,
    /// Boards from start to goal inclusive.
    pub path: Vec<Vec<Vec<u32>>>,
    /// Blank moves, one letter per move.
    pub moves: Vec<char>,
    /// Distinct boards generated.
    pub explored: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LevelSnapshot {
    depth: u64,
    frontier_size: usize,
    explored: usize,
    sample: Vec<Vec<Vec<u32>>>,
}

struct Node {
    tiles: Vec<u32>,
    parent: Option<usize>,
    mv: Option<char>,
}

fn flatten(rows: &[Vec<u32>]) -> Vec<u32> {
    rows.iter().flatten().copied().collect()
}

fn to_rows(tiles: &[u32], n: usize) -> Vec<Vec<u32>> {
    tiles.chunks(n.max(1)).map(<[u32]>::to_vec).collect()
}

fn check_board(name: &'static str, rows: &[Vec<u32>], n: usize) -> Result<(), ParamError> {
    if rows.len() != n || rows.iter().any(|r| r.len() != n) {
        return Err(ParamError::inconsistent(format!(
            "{name} must be a {n}x{n} board"
        )));
    }
    let mut seen = vec![false; n * n];
    for &tile in rows.iter().flatten() {
        let idx = tile as usize;
        if idx >= n * n || seen[idx] {
            return Err(ParamError::out_of_range(
                name,
                tile,
                format!("each of 0..{} exactly once", n * n),
            ));
        }
        seen[idx] = true;
    }
    Ok(())
}

/// Number of tile pairs out of order, ignoring the blank.
fn inversions(tiles: &[u32]) -> usize {
    let tiles: Vec<u32> = tiles.iter().copied().filter(|&t| t != 0).collect();
    let mut count = 0;
    for i in 0..tiles.len() {
        for j in i + 1..tiles.len() {
            if tiles[i] > tiles[j] {
                count += 1;
            }
        }
    }
    count
}

/// The quantity whose parity no legal move changes.
fn parity_invariant(tiles: &[u32], n: usize) -> usize {
    let inv = inversions(tiles);
    if n % 2 == 1 {
        inv % 2
    } else {
        let blank_row = tiles.iter().position(|&t| t == 0).unwrap_or(0) / n;
        (inv + blank_row) % 2
    }
}

fn successors(tiles: &[u32], n: usize) -> SmallVec<[(char, Vec<u32>); 4]> {
    let mut out = SmallVec::new();
    let Some(blank) = tiles.iter().position(|&t| t == 0) else {
        return out;
    };
    let (r, c) = ((blank / n) as i32, (blank % n) as i32);
    for (&(dr, dc), &letter) in NEIGHBOUR_OFFSETS.iter().zip(MOVE_LETTERS.iter()) {
        let (nr, nc) = (r + dr, c + dc);
        if nr < 0 || nc < 0 || nr >= n as i32 || nc >= n as i32 {
            continue;
        }
        let target = nr as usize * n + nc as usize;
        let mut next = tiles.to_vec();
        next.swap(blank, target);
        out.push((letter, next));
    }
    out
}

impl Engine for SlidingPuzzle {
    type Problem = PuzzleProblem;

    fn name(&self) -> &str {
        "sliding-puzzle"
    }

    fn complexity(&self) -> Complexity {
        Complexity::new("O(b^d)", "O(b^d)")
    }

    fn validate(&self, problem: &PuzzleProblem) -> Result<(), ParamError> {
        let n = problem.start.len();
        if n < 2 || n > MAX_SIDE {
            return Err(ParamError::out_of_range(
                "start",
                format!("{n} rows"),
                format!("a square board of side 2..={MAX_SIDE}"),
            ));
        }
        check_board("start", &problem.start, n)?;
        check_board("goal", &problem.goal, n)?;
        if self.max_depth == 0 {
            return Err(ParamError::out_of_range("max_depth", 0, ">= 1"));
        }
        if self.max_states == 0 {
            return Err(ParamError::out_of_range("max_states", 0, ">= 1"));
        }
        Ok(())
    }

    fn run(&self, problem: &PuzzleProblem, rec: &mut Recorder) -> Conclusion {
        let n = problem.start.len();
        let start = flatten(&problem.start);
        let goal = flatten(&problem.goal);
        tracing::debug!(side = n, "sliding puzzle search started");

        rec.record(
            format!("Initialize {n}x{n} puzzle"),
            &serde_json::json!({ "board": problem.start, "goal": problem.goal }),
        )
        .note("Each state is a whole board; a move slides a tile into the blank");

        let (start_parity, goal_parity) = (parity_invariant(&start, n), parity_invariant(&goal, n));
        let solvable = start_parity == goal_parity;
        let step = rec
            .record(
                if solvable {
                    "Parity check passed: goal is reachable".to_owned()
                } else {
                    "Parity check failed: goal is unreachable from start".to_owned()
                },
                &serde_json::json!({ "startParity": start_parity, "goalParity": goal_parity }),
            )
            .metric("startInversions", inversions(&start))
            .metric("goalInversions", inversions(&goal));
        if n % 2 == 1 {
            step.note("On odd-width boards every move keeps the inversion count's parity");
        } else {
            step.note("On even-width boards inversions plus the blank's row keep their parity");
        }
        if !solvable {
            return Conclusion::new(
                Outcome::no_solution("start and goal have different permutation parity"),
                &serde_json::json!({ "solutionDepth": null, "path": [], "moves": [], "explored": 0 }),
            );
        }

        let mut arena = vec![Node {
            tiles: start.clone(),
            parent: None,
            mv: None,
        }];
        let mut seen: HashSet<Vec<u32>> = HashSet::new();
        seen.insert(start.clone());
        let mut found = (start == goal).then_some(0);
        let mut frontier = vec![0usize];
        let mut depth = 0u64;

        while found.is_none() {
            if frontier.is_empty() {
                rec.record(
                    "Search space exhausted without reaching the goal",
                    &serde_json::json!({ "explored": arena.len() }),
                );
                return Conclusion::new(
                    Outcome::no_solution("goal not reachable"),
                    &serde_json::json!({ "explored": arena.len() }),
                );
            }
            if depth >= self.max_depth {
                rec.record(
                    format!("Depth limit {} reached", self.max_depth),
                    &serde_json::json!({ "depth": depth, "explored": arena.len() }),
                );
                return Conclusion::new(
                    Outcome::bounded("max_depth", self.max_depth),
                    &serde_json::json!({ "explored": arena.len() }),
                );
            }
            let mut next = Vec::new();
            'level: for &idx in &frontier {
                for (letter, child) in successors(&arena[idx].tiles, n) {
                    if seen.contains(&child) {
                        continue;
                    }
                    if arena.len() as u64 >= self.max_states {
                        rec.record(
                            format!("State cap {} reached at depth {}", self.max_states, depth + 1),
                            &serde_json::json!({ "depth": depth + 1, "explored": arena.len() }),
                        );
                        return Conclusion::new(
                            Outcome::bounded("max_states", self.max_states),
                            &serde_json::json!({ "explored": arena.len() }),
                        );
                    }
                    seen.insert(child.clone());
                    let is_goal = child == goal;
                    arena.push(Node {
                        tiles: child,
                        parent: Some(idx),
                        mv: Some(letter),
                    });
                    if is_goal {
                        found = Some(arena.len() - 1);
                        break 'level;
                    }
                    next.push(arena.len() - 1);
                }
            }
            depth += 1;
            let snapshot = LevelSnapshot {
                depth,
                frontier_size: next.len(),
                explored: arena.len(),
                sample: next.iter().take(3).map(|&i| to_rows(&arena[i].tiles, n)).collect(),
            };
            rec.record(
                format!(
                    "Depth {depth}: {} new board(s), {} explored",
                    next.len(),
                    arena.len()
                ),
                &snapshot,
            )
            .metric("depth", depth)
            .metric("frontierSize", next.len())
            .metric("explored", arena.len());
            frontier = next;
        }

        let Some(goal_idx) = found else {
            return Conclusion::new(Outcome::no_solution("goal not reachable"), &());
        };
        let mut chain = Vec::new();
        let mut cursor = Some(goal_idx);
        while let Some(i) = cursor {
            chain.push(i);
            cursor = arena[i].parent;
        }
        chain.reverse();

        let path: Vec<Vec<Vec<u32>>> = chain.iter().map(|&i| to_rows(&arena[i].tiles, n)).collect();
        let moves: Vec<char> = chain.iter().filter_map(|&i| arena[i].mv).collect();
        for (k, (&i, board)) in chain.iter().zip(&path).enumerate().skip(1) {
            let letter = arena[i].mv.unwrap_or('?');
            rec.record(format!("Move {k}: blank moves {letter}"), board)
                .metric("move", k);
        }

        let result = PuzzleResult {
            solution_depth: moves.len() as u64,
            path,
            moves,
            explored: arena.len() as u64,
        };
        rec.record(
            format!("Solved in {} move(s)", result.solution_depth),
            &problem.goal,
        )
        .metric("solutionDepth", result.solution_depth)
        .metric("explored", result.explored)
        .note("Breadth-first order guarantees the first goal found is a shortest solution");
        Conclusion::solved(&result)
    }
}
