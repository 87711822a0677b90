//! Property tests that hold for every input, not just the fixtures.

use proptest::prelude::*;
use stepwise_core::Engine;
use stepwise_engines::clustering::{Dbscan, DbscanResult, KMeans, KMeansResult};
use stepwise_engines::evolution::GeneticAlgorithm;
use stepwise_engines::learning::{NaiveBayes, NaiveBayesResult};
use stepwise_engines::pathfinding::{AStar, AStarResult, GridProblem};
use stepwise_space::{Cell, Grid4, Heuristic};
use stepwise_test_utils::{assert_trace_well_formed, fixtures, grid_bfs_distance, result_as};

/// A 6×6 grid with the given blocked mask; corners stay open.
fn grid_from_mask(mask: &[bool]) -> GridProblem {
    let start = Cell::new(0, 0);
    let goal = Cell::new(5, 5);
    let obstacles = mask
        .iter()
        .enumerate()
        .filter(|&(_, &blocked)| blocked)
        .map(|(i, _)| Cell::new(i as i32 / 6, i as i32 % 6))
        .filter(|&c| c != start && c != goal);
    let grid = Grid4::with_obstacles(6, 6, obstacles).unwrap();
    GridProblem::new(grid, start, goal)
}

fn point_cloud() -> impl Strategy<Value = Vec<Vec<f64>>> {
    proptest::collection::vec(proptest::collection::vec(-20.0f64..20.0, 2), 1..40)
}

proptest! {
    #[test]
    fn astar_cost_matches_bfs(
        mask in proptest::collection::vec(proptest::bool::weighted(0.3), 36),
        heuristic in prop::sample::select(Heuristic::ALL.to_vec()),
    ) {
        let problem = grid_from_mask(&mask);
        let engine = AStar::builder().heuristic(heuristic).build().unwrap();
        let sim = engine.simulate(&problem);
        assert_trace_well_formed(&sim);

        match grid_bfs_distance(&problem.grid, problem.start, problem.goal) {
            Some(d) => {
                let result: AStarResult = result_as(&sim);
                prop_assert_eq!(result.cost, d);
                prop_assert_eq!(result.path.len() as u64, d + 1);
            }
            None => prop_assert!(!sim.success),
        }
    }

    #[test]
    fn genetic_best_ever_never_drops(seed in any::<u64>()) {
        let ga = GeneticAlgorithm::builder()
            .population_size(6)
            .generations(15)
            .seed(seed)
            .build()
            .unwrap();
        let sim = ga.simulate(&());
        assert_trace_well_formed(&sim);
        let best: Vec<f64> = sim
            .steps
            .iter()
            .filter_map(|s| s.metrics.f64("bestEverFitness"))
            .collect();
        prop_assert!(!best.is_empty());
        prop_assert!(best.windows(2).all(|w| w[0] <= w[1]), "best-ever dropped: {:?}", best);
    }

    #[test]
    fn dbscan_labels_partition_points(
        points in point_cloud(),
        eps in 0.5f64..8.0,
        min_pts in 1usize..5,
    ) {
        let sim = Dbscan { eps, min_pts }.simulate(points.as_slice());
        assert_trace_well_formed(&sim);
        let result: DbscanResult = result_as(&sim);

        prop_assert_eq!(result.labels.len(), points.len());
        let clusters = result.cluster_sizes.len() as i64;
        prop_assert!(result.labels.iter().all(|&l| (-1..clusters).contains(&l)));
        let clustered: usize = result.cluster_sizes.iter().sum();
        prop_assert_eq!(clustered + result.noise_count, points.len());
        prop_assert_eq!(
            result.core_count + result.border_count + result.noise_count,
            points.len()
        );
    }

    #[test]
    fn kmeans_assigns_every_point(points in point_cloud(), k in 1usize..4) {
        prop_assume!(k <= points.len());
        let sim = KMeans { k, ..KMeans::default() }.simulate(points.as_slice());
        assert_trace_well_formed(&sim);
        let result: KMeansResult = result_as(&sim);
        prop_assert_eq!(result.assignments.len(), points.len());
        prop_assert!(result.assignments.iter().all(|&a| a < k));
        prop_assert_eq!(result.centroids.len(), k);
    }

    #[test]
    fn naive_bayes_posteriors_sum_to_one(
        outlook in prop::sample::select(vec!["sunny", "rainy", "overcast", "foggy"]),
        windy in prop::sample::select(vec!["yes", "no"]),
    ) {
        let sim = NaiveBayes::default().simulate(&fixtures::weather_dataset(&[outlook, windy]));
        let result: NaiveBayesResult = result_as(&sim);
        let total: f64 = result.posteriors.values().sum();
        prop_assert!((total - 1.0).abs() < 1e-9);
        prop_assert!(result.posteriors.contains_key(&result.prediction));
    }
}
