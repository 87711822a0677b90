//! Determinism verification across every engine family.
//!
//! Each test: run an engine → run it again on the same problem → compare
//! trace hashes → round-trip the trace through a sealed envelope → check
//! structural validity. Randomized engines are run with a fixed seed and
//! again with the seed recovered from the first run's metadata.

use stepwise_core::{Engine, Outcome, Simulation};
use stepwise_engines::automata::{Dfa, DfaInput, DfaSimulator, Nfa, NfaInput, NfaSimulator};
use stepwise_engines::clustering::{Dbscan, KMeans, KMeansInit};
use stepwise_engines::compression::{Huffman, Lzw, RunLength};
use stepwise_engines::database::ScheduleAnalyzer;
use stepwise_engines::evolution::GeneticAlgorithm;
use stepwise_engines::graph::{
    BellmanFord, Dijkstra, Kruskal, Prim, RootedGraph, Traversal, TraversalOrder,
};
use stepwise_engines::hypothesis::{TTest, ZTest};
use stepwise_engines::learning::{LinearRegression, NaiveBayes};
use stepwise_engines::mining::Apriori;
use stepwise_engines::pathfinding::{AStar, PuzzleProblem, SlidingPuzzle};
use stepwise_engines::scheduling::{
    Bankers, CpuScheduler, DiskPolicy, DiskScheduler, PagePolicy, PageReplacement, PagingProblem,
};
use stepwise_replay::{
    compare, read_trace, replay_and_compare, trace_hash, validate_trace, write_trace,
    DivergenceKind, Layout,
};
use stepwise_test_utils::{fixtures, TEST_SEED};

// ── Helpers ─────────────────────────────────────────────────────

/// Run `engine` twice and check the two traces agree, survive storage,
/// and are well formed. Returns the first trace.
fn assert_reproducible<E: Engine + ?Sized>(engine: &E, problem: &E::Problem) -> Simulation {
    let first = engine.simulate(problem);
    validate_trace(&first).unwrap_or_else(|e| panic!("{}: {e}", engine.name()));

    let second = engine.simulate(problem);
    assert_eq!(
        trace_hash(&first),
        trace_hash(&second),
        "{} is not deterministic: {:?}",
        engine.name(),
        compare(&first, &second)
    );
    assert!(replay_and_compare(engine, problem, &first).is_none());

    let mut buf = Vec::new();
    let hash = write_trace(&mut buf, &first, Layout::Compact).unwrap();
    let loaded = read_trace(buf.as_slice()).unwrap();
    assert_eq!(trace_hash(&loaded), hash);
    assert_eq!(loaded.steps, first.steps);
    first
}

fn small_dfa(input: &str) -> DfaInput {
    // Accepts binary strings with an even number of 1s.
    let dfa = Dfa::new(&["even", "odd"], "01", "even", &["even"])
        .with_transition("even", '0', "even")
        .with_transition("even", '1', "odd")
        .with_transition("odd", '0', "odd")
        .with_transition("odd", '1', "even");
    DfaInput::new(dfa, input)
}

fn small_nfa(input: &str) -> NfaInput {
    // Accepts strings ending in "01".
    let nfa = Nfa::new(&["q0", "q1", "q2"], "01", "q0", &["q2"])
        .with_transition("q0", '0', "q0")
        .with_transition("q0", '1', "q0")
        .with_transition("q0", '0', "q1")
        .with_transition("q1", '1', "q2");
    NfaInput::new(nfa, input)
}

// ── Deterministic engines ───────────────────────────────────────

#[test]
fn pathfinding_traces_reproduce() {
    let astar = AStar::builder().build().unwrap();
    let sim = assert_reproducible(&astar, &fixtures::maze(&fixtures::DETOUR_MAZE));
    assert!(sim.success);

    let puzzle = PuzzleProblem::with_standard_goal(vec![
        vec![1, 2, 3],
        vec![4, 0, 6],
        vec![7, 5, 8],
    ]);
    assert!(assert_reproducible(&SlidingPuzzle::default(), &puzzle).success);
}

#[test]
fn graph_traces_reproduce() {
    let digraph = fixtures::weighted_digraph();
    assert_reproducible(&Dijkstra, &digraph);
    assert_reproducible(&BellmanFord, &digraph);
    for order in [TraversalOrder::BreadthFirst, TraversalOrder::DepthFirst] {
        let engine = Traversal {
            order,
            ..Traversal::default()
        };
        assert_reproducible(&engine, &digraph);
    }

    let spanning = fixtures::spanning_graph();
    assert_reproducible(&Kruskal, &spanning);
    assert_reproducible(&Prim, &RootedGraph::new(spanning, "A"));
}

#[test]
fn negative_cycle_trace_reproduces() {
    let sim = assert_reproducible(&BellmanFord, &fixtures::negative_cycle_digraph());
    assert!(!sim.success);
}

#[test]
fn scheduling_traces_reproduce() {
    let processes = fixtures::textbook_processes();
    for engine in [
        CpuScheduler::fcfs(),
        CpuScheduler::sjf(),
        CpuScheduler::priority(),
        CpuScheduler::round_robin(2),
    ] {
        assert_reproducible(&engine, processes.as_slice());
    }

    let queue = fixtures::textbook_disk_queue();
    for policy in [
        DiskPolicy::Fcfs,
        DiskPolicy::Sstf,
        DiskPolicy::Scan,
        DiskPolicy::CScan,
    ] {
        assert_reproducible(&DiskScheduler::new(policy), &queue);
    }

    let paging = PagingProblem::new(3, &fixtures::belady_references());
    for policy in [PagePolicy::Fifo, PagePolicy::Lru, PagePolicy::Optimal] {
        assert_reproducible(&PageReplacement::new(policy), &paging);
    }

    assert_reproducible(&Bankers, &fixtures::textbook_banker_state());
}

#[test]
fn learning_and_mining_traces_reproduce() {
    let samples = [(1.0, 3.0), (2.0, 5.0), (3.0, 7.0), (4.0, 9.0)];
    assert_reproducible(&LinearRegression::default(), samples.as_slice());

    let dataset = fixtures::weather_dataset(&["sunny", "no"]);
    assert_reproducible(&NaiveBayes::default(), &dataset);

    let baskets = fixtures::market_baskets();
    assert_reproducible(&Apriori::default(), baskets.as_slice());

    let points = fixtures::two_blobs(12, TEST_SEED);
    let dbscan = Dbscan {
        eps: 2.0,
        min_pts: 3,
    };
    assert_reproducible(&dbscan, points.as_slice());
}

#[test]
fn compression_traces_reproduce() {
    let text = "abracadabra abracadabra";
    assert_reproducible(&Huffman, text);
    assert_reproducible(&Lzw::default(), text.as_bytes());
    assert_reproducible(&RunLength, "aaabccccdd");
}

#[test]
fn lzw_trace_survives_storage() {
    // Compression ratios are non-terminating decimals.
    let sim = Lzw::default().simulate(b"abracadabra abracadabra".as_slice());
    assert!(sim.success);

    let mut buf = Vec::new();
    write_trace(&mut buf, &sim, Layout::Pretty).unwrap();
    let loaded = read_trace(buf.as_slice()).unwrap();
    assert_eq!(loaded, sim);
    assert!(compare(&sim, &loaded).is_none());
}

#[test]
fn automata_traces_reproduce() {
    assert!(assert_reproducible(&DfaSimulator, &small_dfa("1001")).success);
    assert!(assert_reproducible(&NfaSimulator, &small_nfa("1101")).success);
}

#[test]
fn database_and_hypothesis_traces_reproduce() {
    assert_reproducible(&ScheduleAnalyzer, fixtures::DIRTY_READ_ABORT);
    assert_reproducible(&ScheduleAnalyzer, fixtures::LOST_UPDATE);

    let samples = [5.1, 4.9, 5.3, 5.0, 5.2, 4.8];
    assert_reproducible(&ZTest::new(5.0, 0.2), samples.as_slice());
    assert_reproducible(&TTest::new(5.0), samples.as_slice());
}

#[test]
fn rejected_runs_reproduce() {
    let sim = assert_reproducible(&Huffman, "");
    assert!(matches!(sim.outcome, Outcome::InvalidParameter { .. }));
    assert!(sim.steps.is_empty());
}

// ── Randomized engines ──────────────────────────────────────────

fn seeded_ga(seed: u64) -> GeneticAlgorithm {
    GeneticAlgorithm::builder()
        .population_size(8)
        .generations(12)
        .seed(seed)
        .build()
        .unwrap()
}

#[test]
fn genetic_same_seed_same_trace() {
    let sim = assert_reproducible(&seeded_ga(TEST_SEED), &());
    assert_eq!(sim.metadata.seed, Some(TEST_SEED));
}

#[test]
fn genetic_different_seed_diverges() {
    let a = seeded_ga(1).simulate(&());
    let b = seeded_ga(2).simulate(&());
    assert_ne!(trace_hash(&a), trace_hash(&b));

    let report = compare(&a, &b).expect("seeds 1 and 2 should diverge");
    assert!(report.step.is_some());
    assert!(report.kinds.contains(&DivergenceKind::State));
}

#[test]
fn recorded_seed_replays_unseeded_run() {
    let unseeded = GeneticAlgorithm::builder()
        .population_size(8)
        .generations(12)
        .build()
        .unwrap();
    let recorded = unseeded.simulate(&());
    let seed = recorded.metadata.seed.expect("randomized run records its seed");

    assert!(replay_and_compare(&seeded_ga(seed), &(), &recorded).is_none());
}

#[test]
fn kmeans_random_init_reproduces_with_seed() {
    let points = fixtures::two_blobs(10, TEST_SEED);
    let kmeans = KMeans {
        k: 2,
        init: KMeansInit::RandomPoints,
        seed: Some(TEST_SEED),
        ..KMeans::default()
    };
    let sim = assert_reproducible(&kmeans, points.as_slice());
    assert_eq!(sim.metadata.seed, Some(TEST_SEED));
}
