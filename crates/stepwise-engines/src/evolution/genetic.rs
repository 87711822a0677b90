//! Generational genetic algorithm over bit-string chromosomes.
//!
//! Each generation runs three phases, each recorded as its own step:
//! selection, single-point crossover, and bit-flip mutation. Fitness is
//! only ever stored for a chromosome after mutation; there is no
//! elitism, so the best fitness of a generation may drop.

use rand::Rng;
use serde::{Deserialize, Serialize};
use stepwise_core::error::require_probability;
use stepwise_core::rng::{pick_index, resolve_seed, seeded};
use stepwise_core::{Complexity, Conclusion, Engine, Limits, ParamError, Recorder, Step};
use stepwise_stats::distance::mean_pairwise_hamming;
use stepwise_stats::format::{bits, fixed, parse_bits};
use stepwise_stats::Summary;

/// Individuals competing in each tournament.
pub const TOURNAMENT_SIZE: usize = 3;

/// How parents are drawn from the population.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Selection {
    /// Fitness-proportionate sampling with replacement.
    #[default]
    Roulette,
    /// Best of [`TOURNAMENT_SIZE`] uniform draws, repeated per slot.
    Tournament,
}

/// What a chromosome encodes and how it is scored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "mode")]
pub enum FitnessMode {
    /// The chromosome is an unsigned integer `x` (most significant bit
    /// first) and fitness is `x²`.
    Quadratic {
        /// Chromosome length, `1..=32`.
        bits: usize,
    },
    /// Fitness is the number of positions that match `target`.
    Target {
        /// The bit string to evolve toward.
        target: Vec<bool>,
    },
}

impl Default for FitnessMode {
    fn default() -> Self {
        Self::Quadratic { bits: 5 }
    }
}

impl FitnessMode {
    /// Chromosome length.
    pub fn length(&self) -> usize {
        match self {
            Self::Quadratic { bits } => *bits,
            Self::Target { target } => target.len(),
        }
    }

    /// Unsigned value of a chromosome, most significant bit first.
    pub fn decode(genes: &[bool]) -> u64 {
        genes.iter().fold(0u64, |acc, &b| (acc << 1) | u64::from(b))
    }

    /// Score a chromosome.
    pub fn evaluate(&self, genes: &[bool]) -> f64 {
        match self {
            Self::Quadratic { .. } => {
                let x = Self::decode(genes) as f64;
                x * x
            }
            Self::Target { target } => {
                genes.iter().zip(target).filter(|(a, b)| a == b).count() as f64
            }
        }
    }

    /// Best achievable score.
    pub fn optimum(&self) -> f64 {
        match self {
            Self::Quadratic { bits } => {
                let max = ((1u128 << bits) - 1) as f64;
                max * max
            }
            Self::Target { target } => target.len() as f64,
        }
    }
}

/// Genetic algorithm engine. Build with [`GeneticAlgorithm::builder`].
///
/// # Examples
///
/// ```
/// use stepwise_core::Engine;
/// use stepwise_engines::evolution::{GeneticAlgorithm, Selection};
///
/// let ga = GeneticAlgorithm::builder()
///     .population_size(8)
///     .generations(5)
///     .selection(Selection::Tournament)
///     .target("101101")
///     .seed(42)
///     .build()
///     .unwrap();
/// let sim = ga.simulate(&());
/// assert!(sim.success);
/// assert_eq!(sim.metadata.seed, Some(42));
/// // initial population + three phases per generation + summary
/// assert_eq!(sim.steps.len(), 1 + 3 * 5 + 1);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct GeneticAlgorithm {
    population_size: usize,
    generations: u64,
    mutation_rate: f64,
    crossover_rate: f64,
    selection: Selection,
    fitness: FitnessMode,
    seed: Option<u64>,
}

/// Builder for [`GeneticAlgorithm`].
#[derive(Clone, Debug)]
pub struct GeneticAlgorithmBuilder {
    population_size: usize,
    generations: u64,
    mutation_rate: f64,
    crossover_rate: f64,
    selection: Selection,
    fitness: FitnessMode,
    target: Option<String>,
    seed: Option<u64>,
}

impl Default for GeneticAlgorithm {
    fn default() -> Self {
        Self {
            population_size: 6,
            generations: 10,
            mutation_rate: 0.05,
            crossover_rate: 0.7,
            selection: Selection::Roulette,
            fitness: FitnessMode::default(),
            seed: None,
        }
    }
}

impl GeneticAlgorithm {
    /// Start from the defaults: 6 individuals, 10 generations, mutation
    /// 0.05, crossover 0.7, roulette selection, maximise x² over 5 bits.
    pub fn builder() -> GeneticAlgorithmBuilder {
        let d = Self::default();
        GeneticAlgorithmBuilder {
            population_size: d.population_size,
            generations: d.generations,
            mutation_rate: d.mutation_rate,
            crossover_rate: d.crossover_rate,
            selection: d.selection,
            fitness: d.fitness,
            target: None,
            seed: None,
        }
    }

    /// Individuals per generation.
    pub fn population_size(&self) -> usize {
        self.population_size
    }

    /// Generations to run.
    pub fn generations(&self) -> u64 {
        self.generations
    }

    /// Fitness mode.
    pub fn fitness(&self) -> &FitnessMode {
        &self.fitness
    }

    fn check(&self) -> Result<(), ParamError> {
        if self.population_size < 2 {
            return Err(ParamError::out_of_range(
                "population_size",
                self.population_size,
                ">= 2",
            ));
        }
        let max_generations = Limits::default().max_iterations;
        if self.generations == 0 || self.generations > max_generations {
            return Err(ParamError::out_of_range(
                "generations",
                self.generations,
                format!("1..={max_generations}"),
            ));
        }
        require_probability("mutation_rate", self.mutation_rate)?;
        require_probability("crossover_rate", self.crossover_rate)?;
        match &self.fitness {
            FitnessMode::Quadratic { bits } if !(1..=32).contains(bits) => Err(
                ParamError::out_of_range("bits", bits, "1..=32"),
            ),
            FitnessMode::Target { target } if target.is_empty() => {
                Err(ParamError::Empty { name: "target" })
            }
            _ => Ok(()),
        }
    }
}

impl GeneticAlgorithmBuilder {
    /// Individuals per generation (default 6). Must be >= 2.
    pub fn population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Generations to run (default 10).
    pub fn generations(mut self, n: u64) -> Self {
        self.generations = n;
        self
    }

    /// Per-bit flip probability (default 0.05).
    pub fn mutation_rate(mut self, p: f64) -> Self {
        self.mutation_rate = p;
        self
    }

    /// Per-pair crossover probability (default 0.7).
    pub fn crossover_rate(mut self, p: f64) -> Self {
        self.crossover_rate = p;
        self
    }

    /// Parent selection method (default roulette).
    pub fn selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    /// Maximise `x²` over `bits`-bit chromosomes.
    pub fn quadratic(mut self, bits: usize) -> Self {
        self.fitness = FitnessMode::Quadratic { bits };
        self.target = None;
        self
    }

    /// Evolve toward a `0`/`1` target string.
    pub fn target(mut self, target: &str) -> Self {
        self.target = Some(target.to_owned());
        self
    }

    /// Fix the random seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate and build.
    ///
    /// # Errors
    ///
    /// Returns a [`ParamError`] if the population is smaller than 2, the
    /// generation count is zero or above [`Limits::max_iterations`], a
    /// rate lies outside `[0, 1]`, or the target is empty or not a bit
    /// string.
    pub fn build(self) -> Result<GeneticAlgorithm, ParamError> {
        let fitness = match self.target {
            Some(t) => FitnessMode::Target {
                target: parse_bits(&t).ok_or_else(|| {
                    ParamError::out_of_range("target", &t, "a string of 0 and 1")
                })?,
            },
            None => self.fitness,
        };
        let ga = GeneticAlgorithm {
            population_size: self.population_size,
            generations: self.generations,
            mutation_rate: self.mutation_rate,
            crossover_rate: self.crossover_rate,
            selection: self.selection,
            fitness,
            seed: self.seed,
        };
        ga.check()?;
        Ok(ga)
    }
}

#[derive(Clone, Debug)]
struct Individual {
    genes: Vec<bool>,
    fitness: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IndividualView {
    chromosome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<u64>,
    fitness: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationSnapshot {
    generation: u64,
    phase: &'static str,
    population: Vec<IndividualView>,
    events: Vec<String>,
}

/// Final answer of a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneticResult {
    /// Fittest chromosome of the final generation.
    pub best_chromosome: String,
    /// Its fitness.
    pub best_fitness: f64,
    /// Fittest chromosome seen in any generation.
    pub best_ever_chromosome: String,
    /// Its fitness.
    pub best_ever_fitness: f64,
    /// Generations run.
    pub generations: u64,
}

#[derive(Clone, Copy, Debug)]
struct PopulationStats {
    best: f64,
    average: f64,
    worst: f64,
    diversity: f64,
}

impl GeneticAlgorithm {
    fn view(&self, genes: &[bool], fitness: f64) -> IndividualView {
        IndividualView {
            chromosome: bits(genes),
            value: matches!(self.fitness, FitnessMode::Quadratic { .. })
                .then(|| FitnessMode::decode(genes)),
            fitness,
        }
    }

    fn stats(genes: &[Vec<bool>], fitness: &[f64]) -> PopulationStats {
        let summary = Summary::of(fitness).unwrap_or(Summary {
            min: 0.0,
            max: 0.0,
            mean: 0.0,
        });
        PopulationStats {
            best: summary.max,
            average: summary.mean,
            worst: summary.min,
            diversity: mean_pairwise_hamming(genes),
        }
    }

    fn record_phase<'r>(
        rec: &'r mut Recorder,
        description: String,
        snapshot: GenerationSnapshot,
        stats: PopulationStats,
        best_ever: f64,
    ) -> &'r mut Step {
        rec.record(description, &snapshot)
            .metric("bestFitness", stats.best)
            .metric("averageFitness", stats.average)
            .metric("worstFitness", stats.worst)
            .metric("diversity", stats.diversity)
            .metric("bestEverFitness", best_ever)
    }

    fn select<R: Rng + ?Sized>(&self, population: &[Individual], rng: &mut R) -> Vec<Individual> {
        let n = population.len();
        let total: f64 = population.iter().map(|i| i.fitness).sum();
        (0..n)
            .map(|_| {
                let idx = match self.selection {
                    Selection::Roulette if total > 0.0 => {
                        let spin = rng.random::<f64>() * total;
                        let mut acc = 0.0;
                        let mut chosen = n - 1;
                        for (i, ind) in population.iter().enumerate() {
                            acc += ind.fitness;
                            if spin < acc {
                                chosen = i;
                                break;
                            }
                        }
                        chosen
                    }
                    Selection::Roulette => pick_index(rng, n),
                    Selection::Tournament => {
                        let mut best = pick_index(rng, n);
                        for _ in 1..TOURNAMENT_SIZE {
                            let rival = pick_index(rng, n);
                            if population[rival].fitness > population[best].fitness {
                                best = rival;
                            }
                        }
                        best
                    }
                };
                population[idx].clone()
            })
            .collect()
    }

    /// Run with an explicit random source.
    pub fn run_with_rng<R: Rng + ?Sized>(&self, rng: &mut R, rec: &mut Recorder) -> Conclusion {
        let size = self.population_size;
        let length = self.fitness.length();
        tracing::debug!(size, length, generations = self.generations, "genetic algorithm started");

        let mut population: Vec<Individual> = (0..size)
            .map(|_| {
                let genes: Vec<bool> = (0..length).map(|_| rng.random_bool(0.5)).collect();
                let fitness = self.fitness.evaluate(&genes);
                Individual { genes, fitness }
            })
            .collect();
        let mut best_ever = population
            .iter()
            .fold(None::<&Individual>, |best, ind| match best {
                Some(b) if b.fitness >= ind.fitness => Some(b),
                _ => Some(ind),
            })
            .cloned()
            .unwrap_or(Individual {
                genes: vec![false; length],
                fitness: 0.0,
            });

        let genes: Vec<Vec<bool>> = population.iter().map(|i| i.genes.clone()).collect();
        let fitness: Vec<f64> = population.iter().map(|i| i.fitness).collect();
        let stats = Self::stats(&genes, &fitness);
        Self::record_phase(
            rec,
            format!("Generation 0: random initial population of {size}"),
            GenerationSnapshot {
                generation: 0,
                phase: "initial",
                population: population.iter().map(|i| self.view(&i.genes, i.fitness)).collect(),
                events: Vec::new(),
            },
            stats,
            best_ever.fitness,
        )
        .note(match &self.fitness {
            FitnessMode::Quadratic { bits } => format!(
                "Each {bits}-bit chromosome encodes x; fitness is x², at most {}",
                self.fitness.optimum()
            ),
            FitnessMode::Target { target } => format!(
                "Fitness counts positions matching the target {}",
                stepwise_stats::format::bits(target)
            ),
        });

        for generation in 1..=self.generations {
            // Selection
            let selected = self.select(&population, rng);
            let genes: Vec<Vec<bool>> = selected.iter().map(|i| i.genes.clone()).collect();
            let fitness: Vec<f64> = selected.iter().map(|i| i.fitness).collect();
            let stats = Self::stats(&genes, &fitness);
            Self::record_phase(
                rec,
                format!(
                    "Generation {generation}: {} selection of {size} parents",
                    match self.selection {
                        Selection::Roulette => "roulette",
                        Selection::Tournament => "tournament",
                    }
                ),
                GenerationSnapshot {
                    generation,
                    phase: "selection",
                    population: selected.iter().map(|i| self.view(&i.genes, i.fitness)).collect(),
                    events: Vec::new(),
                },
                stats,
                best_ever.fitness,
            )
            .note(match self.selection {
                Selection::Roulette if fitness.iter().sum::<f64>() <= 0.0 => {
                    "All fitness values are zero, so parents were drawn uniformly".to_owned()
                }
                Selection::Roulette => {
                    "Each parent is drawn with probability proportional to its fitness".to_owned()
                }
                Selection::Tournament => format!(
                    "Each parent is the fittest of {TOURNAMENT_SIZE} uniformly drawn individuals"
                ),
            });

            // Crossover
            let mut offspring: Vec<Vec<bool>> = Vec::with_capacity(size);
            let mut events = Vec::new();
            for i in (0..size).step_by(2) {
                let first = &selected[i].genes;
                let (second, j) = match selected.get(i + 1) {
                    Some(ind) => (&ind.genes, i + 1),
                    None => (&selected[0].genes, 0),
                };
                let crossed = length >= 2 && rng.random_bool(self.crossover_rate);
                let (a, b) = if crossed {
                    let cut = rng.random_range(1..length);
                    events.push(format!("parents {i} and {j}: cut after bit {cut}"));
                    let mut a = first[..cut].to_vec();
                    a.extend_from_slice(&second[cut..]);
                    let mut b = second[..cut].to_vec();
                    b.extend_from_slice(&first[cut..]);
                    (a, b)
                } else {
                    events.push(format!("parents {i} and {j}: copied unchanged"));
                    (first.clone(), second.clone())
                };
                offspring.push(a);
                if offspring.len() < size {
                    offspring.push(b);
                }
            }
            let preview: Vec<f64> = offspring.iter().map(|g| self.fitness.evaluate(g)).collect();
            let stats = Self::stats(&offspring, &preview);
            Self::record_phase(
                rec,
                format!("Generation {generation}: single-point crossover"),
                GenerationSnapshot {
                    generation,
                    phase: "crossover",
                    population: offspring
                        .iter()
                        .zip(&preview)
                        .map(|(g, &f)| self.view(g, f))
                        .collect(),
                    events,
                },
                stats,
                best_ever.fitness,
            )
            .note("Offspring scores here are a preview; fitness is assigned only after mutation");

            // Mutation
            let mut events = Vec::new();
            let mut flips = 0usize;
            population = offspring
                .into_iter()
                .enumerate()
                .map(|(k, mut genes)| {
                    let mut flipped = Vec::new();
                    for (pos, gene) in genes.iter_mut().enumerate() {
                        if rng.random_bool(self.mutation_rate) {
                            *gene = !*gene;
                            flipped.push(pos);
                        }
                    }
                    if !flipped.is_empty() {
                        flips += flipped.len();
                        events.push(format!("child {k}: flipped bit(s) {flipped:?}"));
                    }
                    let fitness = self.fitness.evaluate(&genes);
                    Individual { genes, fitness }
                })
                .collect();
            for ind in &population {
                if ind.fitness > best_ever.fitness {
                    best_ever = ind.clone();
                }
            }
            let genes: Vec<Vec<bool>> = population.iter().map(|i| i.genes.clone()).collect();
            let fitness: Vec<f64> = population.iter().map(|i| i.fitness).collect();
            let stats = Self::stats(&genes, &fitness);
            Self::record_phase(
                rec,
                format!(
                    "Generation {generation}: mutation flipped {flips} bit(s); best fitness {}",
                    fixed(stats.best, 2)
                ),
                GenerationSnapshot {
                    generation,
                    phase: "mutation",
                    population: population.iter().map(|i| self.view(&i.genes, i.fitness)).collect(),
                    events,
                },
                stats,
                best_ever.fitness,
            )
            .metric("flips", flips);
        }

        let best = population
            .iter()
            .fold(None::<&Individual>, |best, ind| match best {
                Some(b) if b.fitness >= ind.fitness => Some(b),
                _ => Some(ind),
            })
            .cloned()
            .unwrap_or_else(|| best_ever.clone());
        let result = GeneticResult {
            best_chromosome: bits(&best.genes),
            best_fitness: best.fitness,
            best_ever_chromosome: bits(&best_ever.genes),
            best_ever_fitness: best_ever.fitness,
            generations: self.generations,
        };
        let step = rec
            .record(
                format!(
                    "Finished {} generation(s): best {} (fitness {}), best ever {} (fitness {})",
                    self.generations,
                    result.best_chromosome,
                    fixed(result.best_fitness, 2),
                    result.best_ever_chromosome,
                    fixed(result.best_ever_fitness, 2)
                ),
                &result,
            )
            .metric("bestEverFitness", result.best_ever_fitness);
        if result.best_ever_fitness >= self.fitness.optimum() {
            step.note("The optimum was reached");
        }
        Conclusion::solved(&result)
    }
}

impl Engine for GeneticAlgorithm {
    type Problem = ();

    fn name(&self) -> &str {
        "genetic-algorithm"
    }

    fn complexity(&self) -> Complexity {
        Complexity::new("O(g n L)", "O(n L)")
    }

    fn validate(&self, _: &()) -> Result<(), ParamError> {
        self.check()
    }

    fn run(&self, _: &(), rec: &mut Recorder) -> Conclusion {
        let seed = resolve_seed(self.seed);
        self.run_with_rng(&mut seeded(seed), rec).with_seed(seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ga() -> GeneticAlgorithm {
        GeneticAlgorithm::builder().seed(1).build().unwrap()
    }

    #[test]
    fn population_size_is_constant() {
        for size in [2, 3, 7] {
            let sim = GeneticAlgorithm::builder()
                .population_size(size)
                .generations(4)
                .seed(5)
                .build()
                .unwrap()
                .simulate(&());
            for step in &sim.steps[..sim.steps.len() - 1] {
                assert_eq!(step.state["population"].as_array().unwrap().len(), size);
            }
        }
    }

    #[test]
    fn same_seed_same_trace() {
        let a = ga().simulate(&());
        let b = ga().simulate(&());
        assert_eq!(a.steps, b.steps);
        assert_eq!(a.result, b.result);
    }

    #[test]
    fn phases_cycle_in_order() {
        let sim = ga().simulate(&());
        let phases: Vec<&str> = sim.steps[..7]
            .iter()
            .map(|s| s.state["phase"].as_str().unwrap())
            .collect();
        assert_eq!(
            phases,
            vec!["initial", "selection", "crossover", "mutation", "selection", "crossover", "mutation"]
        );
    }

    #[test]
    fn best_ever_is_non_decreasing() {
        let sim = GeneticAlgorithm::builder()
            .target("1100110011")
            .generations(30)
            .mutation_rate(0.2)
            .seed(3)
            .build()
            .unwrap()
            .simulate(&());
        let series: Vec<f64> = sim
            .steps
            .iter()
            .filter_map(|s| s.metrics.f64("bestEverFitness"))
            .collect();
        assert!(series.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn quadratic_decode_and_score() {
        let mode = FitnessMode::Quadratic { bits: 5 };
        let genes = parse_bits("10011").unwrap();
        assert_eq!(FitnessMode::decode(&genes), 19);
        assert_eq!(mode.evaluate(&genes), 361.0);
        assert_eq!(mode.optimum(), 961.0);
    }

    #[test]
    fn roulette_with_zero_total_picks_uniformly() {
        let engine = ga();
        let population: Vec<Individual> = (0..4)
            .map(|_| Individual {
                genes: vec![false; 5],
                fitness: 0.0,
            })
            .collect();
        let mut rng = seeded(2);
        assert_eq!(engine.select(&population, &mut rng).len(), 4);
    }

    #[test]
    fn no_mutation_no_crossover_preserves_selected_genes() {
        let engine = GeneticAlgorithm::builder()
            .mutation_rate(0.0)
            .crossover_rate(0.0)
            .generations(1)
            .seed(8)
            .build()
            .unwrap();
        let sim = engine.simulate(&());
        assert_eq!(sim.steps[1].state["population"], sim.steps[3].state["population"]);
    }

    #[test]
    fn builder_validation() {
        assert!(GeneticAlgorithm::builder().population_size(1).build().is_err());
        assert!(GeneticAlgorithm::builder().mutation_rate(1.5).build().is_err());
        assert!(GeneticAlgorithm::builder().crossover_rate(-0.1).build().is_err());
        assert!(GeneticAlgorithm::builder().generations(0).build().is_err());
        assert!(GeneticAlgorithm::builder().target("10a").build().is_err());
        assert!(GeneticAlgorithm::builder().target("").build().is_err());
        assert!(GeneticAlgorithm::builder().quadratic(0).build().is_err());
    }
}
