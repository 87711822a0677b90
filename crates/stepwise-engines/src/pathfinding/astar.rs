//! A* search on a 4-connected grid with unit move cost.
//!
//! Node records live in a table indexed by the cell's row-major rank, so
//! parent pointers are plain indices and every snapshot is a flat list.

use serde::{Deserialize, Serialize};
use stepwise_core::{Complexity, Conclusion, Engine, Limits, Outcome, ParamError, Recorder};
use stepwise_space::{Cell, Grid4, Heuristic};
use stepwise_stats::format::fixed;

/// A pathfinding instance: a grid with obstacles, a start and a goal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridProblem {
    /// The grid, including blocked cells.
    pub grid: Grid4,
    /// Where the search starts.
    pub start: Cell,
    /// The cell to reach.
    pub goal: Cell,
}

impl GridProblem {
    /// Bundle a grid with its endpoints.
    pub fn new(grid: Grid4, start: Cell, goal: Cell) -> Self {
        Self { grid, start, goal }
    }

    fn validate_endpoints(&self) -> Result<(), ParamError> {
        for (name, cell) in [("start", self.start), ("goal", self.goal)] {
            if !self.grid.contains(cell) {
                return Err(ParamError::out_of_range(
                    name,
                    cell,
                    format!("a cell inside a {}x{} grid", self.grid.rows(), self.grid.cols()),
                ));
            }
            if self.grid.is_blocked(cell) {
                return Err(ParamError::inconsistent(format!("{name} cell {cell} is blocked")));
            }
        }
        Ok(())
    }
}

/// A* search engine.
///
/// Selection takes the open node with the smallest `f = g + h`; among
/// equal `f` the node that entered the open list first wins. Neighbours
/// are expanded North, South, West, East.
///
/// # Examples
///
/// ```
/// use stepwise_core::Engine;
/// use stepwise_engines::pathfinding::{AStar, GridProblem};
/// use stepwise_space::{Cell, Grid4, Heuristic};
///
/// let grid = Grid4::from_rows(&[
///     "....",
///     ".##.",
///     "....",
/// ]).unwrap();
/// let problem = GridProblem::new(grid, Cell::new(1, 0), Cell::new(1, 3));
/// let astar = AStar::builder().heuristic(Heuristic::Manhattan).build().unwrap();
///
/// let sim = astar.simulate(&problem);
/// assert!(sim.success);
/// assert_eq!(sim.result["cost"], 5);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AStar {
    heuristic: Heuristic,
    max_expansions: u64,
}

impl Default for AStar {
    fn default() -> Self {
        Self {
            heuristic: Heuristic::Manhattan,
            max_expansions: Limits::default().max_states,
        }
    }
}

impl AStar {
    /// Start configuring an A* engine.
    pub fn builder() -> AStarBuilder {
        AStarBuilder {
            heuristic: Heuristic::Manhattan,
            max_expansions: Limits::default().max_states,
        }
    }

    /// The configured heuristic.
    pub fn heuristic(&self) -> Heuristic {
        self.heuristic
    }

    /// Node expansions allowed before the search gives up.
    pub fn max_expansions(&self) -> u64 {
        self.max_expansions
    }
}

/// Builder for [`AStar`].
#[derive(Clone, Debug)]
pub struct AStarBuilder {
    heuristic: Heuristic,
    max_expansions: u64,
}

impl AStarBuilder {
    /// Distance estimate to the goal (default Manhattan).
    pub fn heuristic(mut self, heuristic: Heuristic) -> Self {
        self.heuristic = heuristic;
        self
    }

    /// Expansion cap (default [`Limits::max_states`]). Must be >= 1.
    pub fn max_expansions(mut self, cap: u64) -> Self {
        self.max_expansions = cap;
        self
    }

    /// Take the expansion cap from shared [`Limits`].
    pub fn limits(mut self, limits: &Limits) -> Self {
        self.max_expansions = limits.max_states;
        self
    }

    /// Validate and build.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::OutOfRange`] if `max_expansions` is zero.
    pub fn build(self) -> Result<AStar, ParamError> {
        if self.max_expansions == 0 {
            return Err(ParamError::out_of_range(
                "max_expansions",
                self.max_expansions,
                ">= 1",
            ));
        }
        Ok(AStar {
            heuristic: self.heuristic,
            max_expansions: self.max_expansions,
        })
    }
}

/// Final answer of a successful search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AStarResult {
    /// Cells from start to goal inclusive.
    pub path: Vec<Cell>,
    /// Number of moves along `path`.
    pub cost: u64,
    /// Nodes moved to the closed set.
    pub expanded: u64,
    /// Heuristic the search used.
    pub heuristic: Heuristic,
}

#[derive(Clone, Copy, Debug)]
struct NodeRecord {
    cell: Cell,
    g: f64,
    h: f64,
    parent: Option<usize>,
}

impl NodeRecord {
    fn f(&self) -> f64 {
        self.g + self.h
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NodeView {
    cell: Cell,
    g: f64,
    h: f64,
    f: f64,
    parent: Option<Cell>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchSnapshot {
    current: Option<Cell>,
    open: Vec<NodeView>,
    closed: Vec<Cell>,
    path: Vec<Cell>,
}

struct Search {
    goal: Cell,
    heuristic: Heuristic,
    nodes: Vec<Option<NodeRecord>>,
    open: Vec<usize>,
    closed: Vec<bool>,
    closed_order: Vec<usize>,
}

impl Search {
    fn new(grid: &Grid4, goal: Cell, heuristic: Heuristic) -> Self {
        let n = grid.cell_count();
        Self {
            goal,
            heuristic,
            nodes: vec![None; n],
            open: Vec::new(),
            closed: vec![false; n],
            closed_order: Vec::new(),
        }
    }

    fn view(&self, idx: usize) -> Option<NodeView> {
        let node = self.nodes[idx]?;
        Some(NodeView {
            cell: node.cell,
            g: node.g,
            h: node.h,
            f: node.f(),
            parent: node.parent.and_then(|p| self.nodes[p]).map(|p| p.cell),
        })
    }

    fn snapshot(&self, current: Option<usize>) -> SearchSnapshot {
        SearchSnapshot {
            current: current.and_then(|i| self.nodes[i]).map(|n| n.cell),
            open: self.open.iter().filter_map(|&i| self.view(i)).collect(),
            closed: self
                .closed_order
                .iter()
                .filter_map(|&i| self.nodes[i].map(|n| n.cell))
                .collect(),
            path: current.map(|i| self.path_to(i)).unwrap_or_default(),
        }
    }

    /// Follow back-pointers from `idx` to the start, then reverse.
    fn path_to(&self, idx: usize) -> Vec<Cell> {
        let mut path = Vec::new();
        let mut cursor = Some(idx);
        while let Some(i) = cursor {
            let Some(node) = self.nodes[i] else { break };
            path.push(node.cell);
            cursor = node.parent;
            if path.len() > self.nodes.len() {
                break;
            }
        }
        path.reverse();
        path
    }

    /// Position in `open` of the minimum-f node; first found wins ties.
    fn select(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (pos, &idx) in self.open.iter().enumerate() {
            let Some(node) = self.nodes[idx] else { continue };
            match best {
                Some((_, f)) if node.f() >= f => {}
                _ => best = Some((pos, node.f())),
            }
        }
        best.map(|(pos, _)| pos)
    }

    fn insert(&mut self, idx: usize, cell: Cell, g: f64, parent: Option<usize>) -> NodeRecord {
        let node = NodeRecord {
            cell,
            g,
            h: self.heuristic.estimate(cell, self.goal),
            parent,
        };
        self.nodes[idx] = Some(node);
        if !self.open.contains(&idx) {
            self.open.push(idx);
        }
        node
    }
}

impl Engine for AStar {
    type Problem = GridProblem;

    fn name(&self) -> &str {
        "astar"
    }

    fn complexity(&self) -> Complexity {
        Complexity::new("O(V^2) with a linear open-list scan", "O(V)")
    }

    fn validate(&self, problem: &GridProblem) -> Result<(), ParamError> {
        if self.max_expansions == 0 {
            return Err(ParamError::out_of_range("max_expansions", 0, ">= 1"));
        }
        problem.validate_endpoints()
    }

    fn run(&self, problem: &GridProblem, rec: &mut Recorder) -> Conclusion {
        let grid = &problem.grid;
        let mut search = Search::new(grid, problem.goal, self.heuristic);
        let (Some(start_idx), Some(goal_idx)) = (
            grid.canonical_rank(problem.start),
            grid.canonical_rank(problem.goal),
        ) else {
            rec.record("Start or goal lies outside the grid", &());
            return Conclusion::new(Outcome::no_solution("endpoint outside grid"), &());
        };

        let start = search.insert(start_idx, problem.start, 0.0, None);
        rec.record(
            format!(
                "Initialize: open = {{{}}}, closed = {{}}, h(start) = {}",
                problem.start,
                fixed(start.h, 2)
            ),
            &search.snapshot(None),
        )
        .metric("openSize", 1)
        .metric("closedSize", 0)
        .note(format!(
            "f = g + h, where g is the cost so far and h is the {} estimate to {}",
            self.heuristic, problem.goal
        ))
        .note(if self.heuristic.is_tight_for_4_connected() {
            "Manhattan distance is exact on an empty 4-connected grid, so it never overestimates"
        } else {
            "This heuristic underestimates more than Manhattan on a 4-connected grid, so more nodes get expanded"
        });

        let mut expanded = 0u64;
        loop {
            let Some(pos) = search.select() else {
                rec.record(
                    format!("Open set exhausted: {} is unreachable", problem.goal),
                    &search.snapshot(None),
                )
                .metric("expanded", expanded)
                .note("Every reachable cell was closed without meeting the goal");
                return Conclusion::new(
                    Outcome::no_solution(format!("goal {} is unreachable", problem.goal)),
                    &serde_json::json!({ "path": [], "expanded": expanded }),
                );
            };
            if expanded >= self.max_expansions {
                rec.record(
                    format!("Expansion cap of {} reached", self.max_expansions),
                    &search.snapshot(None),
                )
                .metric("expanded", expanded)
                .metric("openSize", search.open.len());
                return Conclusion::new(
                    Outcome::bounded("max_expansions", self.max_expansions),
                    &serde_json::json!({ "path": [], "expanded": expanded }),
                );
            }

            let current = search.open.remove(pos);
            search.closed[current] = true;
            search.closed_order.push(current);
            expanded += 1;
            let Some(node) = search.nodes[current] else {
                continue;
            };
            rec.record(
                format!(
                    "Select {} with lowest f = {} (g = {}, h = {})",
                    node.cell,
                    fixed(node.f(), 2),
                    fixed(node.g, 2),
                    fixed(node.h, 2)
                ),
                &search.snapshot(Some(current)),
            )
            .metric("f", node.f())
            .metric("g", node.g)
            .metric("h", node.h)
            .metric("openSize", search.open.len())
            .metric("closedSize", search.closed_order.len());

            if current == goal_idx {
                let path = search.path_to(current);
                let result = AStarResult {
                    cost: path.len().saturating_sub(1) as u64,
                    path,
                    expanded,
                    heuristic: self.heuristic,
                };
                rec.record(
                    format!("Goal {} reached with cost {}", node.cell, result.cost),
                    &search.snapshot(Some(current)),
                )
                .metric("cost", result.cost)
                .metric("pathLength", result.path.len())
                .metric("expanded", expanded)
                .note("The path is rebuilt by following parent pointers back to the start");
                tracing::debug!(cost = result.cost, expanded, "astar reached goal");
                return Conclusion::solved(&result);
            }

            let neighbours: Vec<(usize, Cell)> = grid
                .open_neighbours(node.cell)
                .into_iter()
                .filter_map(|c| grid.canonical_rank(c).map(|i| (i, c)))
                .filter(|&(i, _)| !search.closed[i])
                .collect();
            let listed: Vec<Cell> = neighbours.iter().map(|&(_, c)| c).collect();
            rec.record(
                format!(
                    "Expand {}: {} open neighbour(s) not yet closed",
                    node.cell,
                    neighbours.len()
                ),
                &search.snapshot(Some(current)),
            )
            .metric("neighbours", &listed);

            for (idx, cell) in neighbours {
                let tentative = node.g + 1.0;
                match search.nodes[idx] {
                    None => {
                        let added = search.insert(idx, cell, tentative, Some(current));
                        rec.record(
                            format!(
                                "Add {cell} to open: g = {}, h = {}, f = {}",
                                fixed(added.g, 2),
                                fixed(added.h, 2),
                                fixed(added.f(), 2)
                            ),
                            &search.snapshot(Some(current)),
                        )
                        .metric("g", added.g)
                        .metric("h", added.h)
                        .metric("f", added.f());
                    }
                    Some(existing) if tentative < existing.g => {
                        let updated = search.insert(idx, cell, tentative, Some(current));
                        rec.record(
                            format!(
                                "Update {cell}: g improves from {} to {}",
                                fixed(existing.g, 2),
                                fixed(updated.g, 2)
                            ),
                            &search.snapshot(Some(current)),
                        )
                        .metric("g", updated.g)
                        .metric("f", updated.f())
                        .note(format!("{cell} now points back to {}", node.cell));
                    }
                    Some(existing) => {
                        rec.record(
                            format!(
                                "Keep {cell}: tentative g = {} is not better than {}",
                                fixed(tentative, 2),
                                fixed(existing.g, 2)
                            ),
                            &search.snapshot(Some(current)),
                        )
                        .metric("g", existing.g);
                    }
                }
            }
        }
    }
}
