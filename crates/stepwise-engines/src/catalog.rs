//! Enumerates every engine in the crate with its family and cost.

use std::fmt;

use serde::{Deserialize, Serialize};
use stepwise_core::{Complexity, Engine};

use crate::automata::{DfaSimulator, NfaSimulator};
use crate::clustering::{Dbscan, KMeans};
use crate::compression::{Huffman, Lzw, RunLength};
use crate::database::ScheduleAnalyzer;
use crate::evolution::GeneticAlgorithm;
use crate::graph::{BellmanFord, Dijkstra, Kruskal, Prim, Traversal};
use crate::hypothesis::{TTest, ZTest};
use crate::learning::{LinearRegression, NaiveBayes};
use crate::mining::Apriori;
use crate::pathfinding::{AStar, SlidingPuzzle};
use crate::scheduling::{
    Bankers, CpuScheduler, DiskPolicy, DiskScheduler, PagePolicy, PageReplacement,
};

/// Algorithm family, matching the crate's module layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub enum Family {
    Pathfinding,
    Graph,
    Clustering,
    Evolution,
    Learning,
    Mining,
    Scheduling,
    Compression,
    Automata,
    Database,
    Hypothesis,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pathfinding => "pathfinding",
            Self::Graph => "graph",
            Self::Clustering => "clustering",
            Self::Evolution => "evolution",
            Self::Learning => "learning",
            Self::Mining => "mining",
            Self::Scheduling => "scheduling",
            Self::Compression => "compression",
            Self::Automata => "automata",
            Self::Database => "database",
            Self::Hypothesis => "hypothesis",
        };
        f.write_str(name)
    }
}

/// Catalog entry for one engine configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineInfo {
    /// The name written to [`Metadata::engine`](stepwise_core::Metadata::engine).
    pub name: String,
    /// Family the engine belongs to.
    pub family: Family,
    /// Asymptotic cost.
    pub complexity: Complexity,
}

fn info<E: Engine + ?Sized>(family: Family, engine: &E) -> EngineInfo {
    EngineInfo {
        name: engine.name().to_owned(),
        family,
        complexity: engine.complexity(),
    }
}

/// Every engine in its default configuration, grouped by family.
///
/// Engines whose name depends on a policy (CPU, disk, and paging
/// schedulers, BFS and DFS) are listed once per policy.
pub fn catalog() -> Vec<EngineInfo> {
    use Family::*;
    let mut out = vec![
        info(Pathfinding, &AStar::default()),
        info(Pathfinding, &SlidingPuzzle::default()),
        info(Graph, &Dijkstra),
        info(Graph, &BellmanFord),
        info(Graph, &Kruskal),
        info(Graph, &Prim),
        info(Graph, &Traversal::bfs()),
        info(Graph, &Traversal::dfs()),
        info(Clustering, &KMeans::default()),
        info(Clustering, &Dbscan::default()),
        info(Evolution, &GeneticAlgorithm::default()),
        info(Learning, &NaiveBayes::default()),
        info(Learning, &LinearRegression::default()),
        info(Mining, &Apriori::default()),
        info(Scheduling, &CpuScheduler::fcfs()),
        info(Scheduling, &CpuScheduler::sjf()),
        info(Scheduling, &CpuScheduler::priority()),
        info(Scheduling, &CpuScheduler::round_robin(2)),
    ];
    for policy in [DiskPolicy::Fcfs, DiskPolicy::Sstf, DiskPolicy::Scan, DiskPolicy::CScan] {
        out.push(info(Scheduling, &DiskScheduler::new(policy)));
    }
    for policy in [PagePolicy::Fifo, PagePolicy::Lru, PagePolicy::Optimal] {
        out.push(info(Scheduling, &PageReplacement::new(policy)));
    }
    out.extend([
        info(Scheduling, &Bankers),
        info(Compression, &Huffman),
        info(Compression, &RunLength),
        info(Compression, &Lzw::default()),
        info(Automata, &DfaSimulator),
        info(Automata, &NfaSimulator),
        info(Database, &ScheduleAnalyzer),
        info(Hypothesis, &ZTest::default()),
        info(Hypothesis, &TTest::default()),
    ]);
    out
}
