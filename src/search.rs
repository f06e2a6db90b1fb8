use crate::annealing::{anneal, AnnealingSettings};
use crate::component::Component;
use crate::data::Dataset;
use crate::enumerate::SetPartitions;
use crate::evidence::EvidenceCache;
use crate::model::Model;
use crate::observer::{LogFile, SearchObserver};
use crate::partition::Partition;
use crate::{Error, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use std::str::FromStr;

/// The most variables [`PartitionSearch::exhaustive`] accepts. Its evidence table has a slot for
/// each of the `2^n - 1` possible components.
pub const MAX_EXHAUSTIVE_VARIABLES: usize = 20;

/// The search strategies [`PartitionSearch`] offers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Algorithm {
    /// [`PartitionSearch::exhaustive`]
    Exhaustive,
    /// [`PartitionSearch::greedy_merge`]
    GreedyMerge,
    /// [`PartitionSearch::greedy_split`]
    GreedySplit,
    /// [`PartitionSearch::simulated_annealing`]
    SimulatedAnnealing,
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Algorithm::Exhaustive => "Exhaustive Search",
            Algorithm::GreedyMerge => "Greedy Merging",
            Algorithm::GreedySplit => "Greedy Divisive Splitting",
            Algorithm::SimulatedAnnealing => "Simulated Annealing",
        })
    }
}

impl FromStr for Algorithm {
    type Err = String;

    /// Parses the short names `exhaustive`, `merge`, `split` and `annealing`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "exhaustive" => Ok(Algorithm::Exhaustive),
            "merge" => Ok(Algorithm::GreedyMerge),
            "split" => Ok(Algorithm::GreedySplit),
            "annealing" => Ok(Algorithm::SimulatedAnnealing),
            _ => Err(format!(
                "unknown algorithm {:?}, options are exhaustive, merge, split or annealing",
                s
            )),
        }
    }
}

/// A partition laid out in `n` slots, some possibly empty, with the evidence of every slot.
#[derive(Clone, Debug)]
pub(crate) struct Candidate {
    pub(crate) slots: Vec<Component>,
    pub(crate) evidence: Vec<f64>,
    pub(crate) log_evidence: f64,
    pub(crate) count: usize,
}

impl Candidate {
    pub(crate) fn new(partition: &Partition, cache: &mut EvidenceCache<'_>) -> Self {
        let slots = partition.masks();
        let evidence = slots.iter().map(|&c| cache.get_or_compute(c)).collect();
        let log_evidence = cache.total(&slots);
        Candidate {
            slots,
            evidence,
            log_evidence,
            count: partition.len(),
        }
    }

    /// Moves everything in slot `j` into slot `i`.
    pub(crate) fn merge(&mut self, i: usize, j: usize, merged_evidence: f64) {
        let diff = merged_evidence - self.evidence[i] - self.evidence[j];
        self.slots[i] = self.slots[i] | self.slots[j];
        self.slots[j] = Component::EMPTY;
        self.evidence[i] = merged_evidence;
        self.evidence[j] = 0.0;
        self.log_evidence += diff;
        self.count -= 1;
    }

    /// Builds an optimized model, dropping empty slots.
    pub(crate) fn to_model(&self) -> Model {
        let (components, evidence): (Vec<Component>, Vec<f64>) = self
            .slots
            .iter()
            .zip(self.evidence.iter())
            .filter(|(c, _)| !c.is_empty())
            .map(|(&c, &e)| (c, e))
            .unzip();
        Model::optimized(
            Partition::from_slots(self.slots.len(), components),
            self.log_evidence,
            evidence,
        )
    }
}

/// Runs searches for the partition with the highest log-evidence, and remembers the most recent
/// one.
///
/// Each search gets a fresh evidence cache, so nothing carries over between searches except the
/// random number generator and the settings.
///
/// ```
/// use mincomp::{Dataset, Model, PartitionSearch};
///
/// let mut data = Dataset::new(4, 2)?;
/// for values in [[0, 0, 1, 1], [1, 1, 0, 1], [0, 0, 0, 0], [1, 1, 1, 0]] {
///     data.add_observation(&values, 5)?;
/// }
///
/// let mut search = PartitionSearch::with_seed(42);
/// let merged = search.greedy_merge(&data, None)?;
/// // The first two variables always agree, so they end up together.
/// assert_eq!(merged.partition().component_of(0), merged.partition().component_of(1));
///
/// let trajectory = search.trajectory()?;
/// assert_eq!(trajectory[0], data.log_evidence(Model::new(4)?.partition())?);
/// assert!(trajectory.windows(2).all(|w| w[0] <= w[1]));
/// # Ok::<(), mincomp::Error>(())
/// ```
pub struct PartitionSearch {
    settings: AnnealingSettings,
    rng: StdRng,
    observer: Option<Box<dyn SearchObserver>>,
    model_in: Option<Model>,
    model_out: Option<Model>,
    trajectory: Vec<f64>,
    last: Option<Algorithm>,
}

impl Default for PartitionSearch {
    fn default() -> Self {
        PartitionSearch::new()
    }
}

impl std::fmt::Debug for PartitionSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartitionSearch")
            .field("settings", &self.settings)
            .field("last", &self.last)
            .field("observed", &self.observer.is_some())
            .finish()
    }
}

impl PartitionSearch {
    /// Creates a search engine whose random choices are seeded from the operating system.
    pub fn new() -> Self {
        PartitionSearch::from_rng(StdRng::from_os_rng())
    }

    /// Creates a search engine whose random choices are fully determined by `seed`.
    pub fn with_seed(seed: u64) -> Self {
        PartitionSearch::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        PartitionSearch {
            settings: AnnealingSettings::default(),
            rng,
            observer: None,
            model_in: None,
            model_out: None,
            trajectory: Vec::new(),
            last: None,
        }
    }

    /// The current simulated annealing settings.
    pub fn annealing_settings(&self) -> &AnnealingSettings {
        &self.settings
    }

    /// Replaces all simulated annealing settings at once.
    pub fn set_annealing_settings(&mut self, settings: AnnealingSettings) -> Result<()> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    /// Sets the maximum number of simulated annealing iterations.
    pub fn set_max_iterations(&mut self, max_iterations: usize) -> Result<()> {
        self.set_annealing_settings(AnnealingSettings {
            max_iterations,
            ..self.settings
        })
    }

    /// Sets the simulated annealing starting temperature.
    ///
    /// ```
    /// use mincomp::PartitionSearch;
    ///
    /// let mut search = PartitionSearch::with_seed(0);
    /// assert!(search.set_initial_temperature(0.0).is_err());
    /// search.set_initial_temperature(10.0)?;
    /// assert_eq!(search.annealing_settings().initial_temperature, 10.0);
    /// # Ok::<(), mincomp::Error>(())
    /// ```
    pub fn set_initial_temperature(&mut self, initial_temperature: f64) -> Result<()> {
        self.set_annealing_settings(AnnealingSettings {
            initial_temperature,
            ..self.settings
        })
    }

    /// Sets how many iterations pass between temperature updates.
    pub fn set_update_interval(&mut self, update_interval: usize) -> Result<()> {
        self.set_annealing_settings(AnnealingSettings {
            update_interval,
            ..self.settings
        })
    }

    /// Sets how many iterations without improvement end simulated annealing early.
    pub fn set_max_no_improve(&mut self, max_no_improve: usize) -> Result<()> {
        self.set_annealing_settings(AnnealingSettings {
            max_no_improve,
            ..self.settings
        })
    }

    /// Reports every following search to `observer`.
    pub fn observe<O: SearchObserver + 'static>(&mut self, observer: O) {
        self.observer = Some(Box::new(observer));
    }

    /// Writes a report of every following search to the file at `path`, which is created or
    /// truncated right away.
    pub fn log_to<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.observe(LogFile::create(path)?);
        Ok(())
    }

    /// Stops reporting searches.
    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    /// Which algorithm ran most recently, if any.
    pub fn last_algorithm(&self) -> Option<Algorithm> {
        self.last
    }

    /// The starting model of the most recent search.
    pub fn model_in(&self) -> Result<&Model> {
        match (self.last, &self.model_in) {
            (None, _) => Err(Error::NoSearch),
            (Some(_), None) => Err(Error::NoInitialModel),
            (Some(_), Some(model)) => Ok(model),
        }
    }

    /// The result of the most recent search.
    pub fn model_out(&self) -> Result<&Model> {
        self.model_out.as_ref().ok_or(Error::NoSearch)
    }

    /// The log-evidence at every step of the most recent search.
    ///
    /// For exhaustive search this is the evidence of every partition in the order they were
    /// visited. For the other searches it starts with the evidence of the starting partition and
    /// then holds the best evidence so far after each accepted merge, accepted split, or
    /// annealing iteration.
    pub fn trajectory(&self) -> Result<&[f64]> {
        match self.last {
            Some(_) => Ok(&self.trajectory),
            None => Err(Error::NoSearch),
        }
    }

    /// Runs the given algorithm. Exhaustive search ignores `seed`.
    pub fn run(
        &mut self,
        algorithm: Algorithm,
        data: &Dataset,
        seed: Option<&Model>,
    ) -> Result<Model> {
        match algorithm {
            Algorithm::Exhaustive => self.exhaustive(data),
            Algorithm::GreedyMerge => self.greedy_merge(data, seed),
            Algorithm::GreedySplit => self.greedy_split(data, seed),
            Algorithm::SimulatedAnnealing => self.simulated_annealing(data, seed),
        }
    }

    /// Scores every partition of the variables and returns the best one.
    ///
    /// This is guaranteed to find the optimum, but there are Bell(n) partitions to score, so it
    /// is only practical for about fifteen variables or fewer. Datasets with more than
    /// [`MAX_EXHAUSTIVE_VARIABLES`] variables are refused outright. When several partitions tie,
    /// the first one visited wins.
    pub fn exhaustive(&mut self, data: &Dataset) -> Result<Model> {
        let n = data.n();
        let mut cache = EvidenceCache::dense(data)?;
        self.begin(Algorithm::Exhaustive, data, None);

        let mut partitions = SetPartitions::new(n);
        let mut slots = vec![Component::EMPTY; n];
        let mut best: Option<(f64, Vec<Component>)> = None;
        loop {
            partitions.fill_slots(&mut slots);
            let log_evidence = cache.total(&slots);
            self.trajectory.push(log_evidence);
            if best.as_ref().map_or(true, |(b, _)| log_evidence > *b) {
                best = Some((log_evidence, slots.clone()));
                self.notify_improved(self.trajectory.len() - 1, log_evidence, None);
            }
            if !partitions.advance() {
                break;
            }
        }

        // The enumerator always yields at least one partition.
        let (log_evidence, slots) = best.unwrap_or_else(|| (cache.total(&slots), slots));
        let evidence = slots.iter().map(|&c| cache.get_or_compute(c)).collect();
        let best = Candidate {
            count: slots.iter().filter(|c| !c.is_empty()).count(),
            slots,
            evidence,
            log_evidence,
        };
        Ok(self.finish(Algorithm::Exhaustive, data, None, &best, &cache))
    }

    /// Starting from `seed` (or independent variables), repeatedly merges whichever pair of
    /// components improves the evidence the most, until no merge helps.
    pub fn greedy_merge(&mut self, data: &Dataset, seed: Option<&Model>) -> Result<Model> {
        let initial = starting_model(data, seed, Partition::independent)?;
        let mut cache = EvidenceCache::sparse(data);
        let mut current = Candidate::new(initial.partition(), &mut cache);
        self.begin(Algorithm::GreedyMerge, data, Some(&current));
        self.merge_until_stuck(&mut current, &mut cache);
        Ok(self.finish(Algorithm::GreedyMerge, data, Some(initial), &current, &cache))
    }

    /// Starting from `seed` (or a single component), recursively splits components in two
    /// for as long as that improves the evidence.
    ///
    /// Each split is grown greedily: members leave the component one at a time, each
    /// time picking the member whose departure scores best, and the best split seen along the way
    /// is kept. Both halves are then split in turn.
    pub fn greedy_split(&mut self, data: &Dataset, seed: Option<&Model>) -> Result<Model> {
        let initial = starting_model(data, seed, Partition::complete)?;
        let mut cache = EvidenceCache::sparse(data);
        let mut current = Candidate::new(initial.partition(), &mut cache);
        self.begin(Algorithm::GreedySplit, data, Some(&current));

        let seeds = current.count;
        let mut next_free = seeds;
        for index in 0..seeds {
            next_free = self.divide(&mut current, &mut cache, index, next_free);
        }
        Ok(self.finish(Algorithm::GreedySplit, data, Some(initial), &current, &cache))
    }

    /// Random-walks through merges, splits and single-variable moves with Metropolis acceptance
    /// under a cooling temperature, starting from `seed` (or independent variables). The best
    /// partition seen is then polished with [greedy merging](PartitionSearch::greedy_merge).
    ///
    /// The walk is driven by this search engine's random number generator, so two engines created
    /// with the same [seed](PartitionSearch::with_seed) give the same result.
    pub fn simulated_annealing(&mut self, data: &Dataset, seed: Option<&Model>) -> Result<Model> {
        let initial = starting_model(data, seed, Partition::independent)?;
        let mut cache = EvidenceCache::sparse(data);
        let current = Candidate::new(initial.partition(), &mut cache);
        self.begin(Algorithm::SimulatedAnnealing, data, Some(&current));

        let mut best = anneal(
            &self.settings,
            &mut self.rng,
            &mut cache,
            current,
            &mut self.trajectory,
            &mut self.observer,
        );
        self.merge_until_stuck(&mut best, &mut cache);
        Ok(self.finish(Algorithm::SimulatedAnnealing, data, Some(initial), &best, &cache))
    }

    fn begin(&mut self, algorithm: Algorithm, data: &Dataset, initial: Option<&Candidate>) {
        tracing::debug!(
            %algorithm,
            n = data.n(),
            q = data.q(),
            sample_size = data.sample_size(),
            "starting search"
        );
        self.trajectory.clear();
        if let Some(initial) = initial {
            self.trajectory.push(initial.log_evidence);
        }
        if let Some(observer) = self.observer.as_mut() {
            observer.started(algorithm, data, initial.map(Candidate::to_model).as_ref());
        }
    }

    fn finish(
        &mut self,
        algorithm: Algorithm,
        data: &Dataset,
        initial: Option<Model>,
        best: &Candidate,
        cache: &EvidenceCache<'_>,
    ) -> Model {
        let result = best.to_model();
        tracing::info!(
            %algorithm,
            log_evidence = best.log_evidence,
            components = best.count,
            steps = self.trajectory.len(),
            evaluated = cache.len(),
            "search finished"
        );
        if let Some(observer) = self.observer.as_mut() {
            observer.finished(data, &result);
        }
        self.model_in = initial;
        self.model_out = Some(result.clone());
        self.last = Some(algorithm);
        result
    }

    fn notify_improved(&mut self, step: usize, log_evidence: f64, temperature: Option<f64>) {
        tracing::trace!(step, log_evidence, "improved");
        if let Some(observer) = self.observer.as_mut() {
            observer.improved(step, log_evidence, temperature);
        }
    }

    /// Appends the candidate's evidence to the trajectory after an accepted move.
    fn record(&mut self, current: &Candidate) {
        self.trajectory.push(current.log_evidence);
        self.notify_improved(self.trajectory.len() - 1, current.log_evidence, None);
    }

    fn merge_until_stuck(&mut self, current: &mut Candidate, cache: &mut EvidenceCache<'_>) {
        let n = current.slots.len();
        loop {
            let mut best: Option<(usize, usize, f64, f64)> = None;
            for i in 0..n {
                if current.slots[i].is_empty() {
                    continue;
                }
                for j in i + 1..n {
                    if current.slots[j].is_empty() {
                        continue;
                    }
                    let merged = cache.get_or_compute(current.slots[i] | current.slots[j]);
                    let diff = merged - current.evidence[i] - current.evidence[j];
                    if diff > best.map_or(0.0, |(_, _, _, best_diff)| best_diff) {
                        best = Some((i, j, merged, diff));
                    }
                }
            }

            let (i, j, merged, diff) = match best {
                Some(best) => best,
                None => break,
            };
            tracing::debug!(
                first = ?current.slots[i],
                second = ?current.slots[j],
                gain = diff,
                "merging components"
            );
            current.merge(i, j, merged);
            self.record(current);
        }
    }

    /// Tries to split the component in slot `from`, putting the part that splits off in the
    /// empty slot `to`. Returns the first slot that is still free afterwards.
    fn divide(
        &mut self,
        current: &mut Candidate,
        cache: &mut EvidenceCache<'_>,
        from: usize,
        to: usize,
    ) -> usize {
        let component = current.slots[from];
        let size = component.len();
        if size < 2 {
            return to;
        }
        debug_assert!(current.slots[to].is_empty());

        let unsplit = current.evidence[from];
        let mut stay = component;
        let mut moved = Component::EMPTY;
        let mut best: Option<(Component, Component, f64, f64, f64)> = None;

        // Moving all but one member out mirrors moving one member out, so stop short of that.
        let steps = if size > 2 { size - 2 } else { 1 };
        for _ in 0..steps {
            let mut step: Option<(Component, Component, f64, f64, f64)> = None;
            for member in stay.iter() {
                let left = stay.without(member);
                let right = moved.with(member);
                let ev_left = cache.get_or_compute(left);
                let ev_right = cache.get_or_compute(right);
                let diff = ev_left + ev_right - unsplit;
                if step.map_or(true, |(_, _, _, _, best)| diff > best) {
                    step = Some((left, right, ev_left, ev_right, diff));
                }
            }

            let step = match step {
                Some(step) => step,
                None => break,
            };
            stay = step.0;
            moved = step.1;
            if step.4 > best.map_or(0.0, |(_, _, _, _, diff)| diff) {
                best = Some(step);
            }
        }

        let (left, right, ev_left, ev_right, diff) = match best {
            Some(best) => best,
            None => return to,
        };
        current.slots[from] = left;
        current.slots[to] = right;
        current.evidence[from] = ev_left;
        current.evidence[to] = ev_right;
        current.log_evidence += diff;
        tracing::debug!(kept = ?left, split_off = ?right, gain = diff, "splitting component");
        current.count += 1;
        self.record(current);
        let next_free = self.divide(current, cache, from, to + 1);
        self.divide(current, cache, to, next_free)
    }
}

/// Picks the model a search starts from, checking that a caller-supplied seed fits the data.
fn starting_model(
    data: &Dataset,
    seed: Option<&Model>,
    default: fn(usize) -> Result<Partition>,
) -> Result<Model> {
    match seed {
        Some(model) => {
            data.check_partition(model.partition())?;
            Ok(model.clone())
        }
        None => Ok(default(data.n())?.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::tests::fixture;

    const COMPLETE: f64 = -23.324842793537606;
    const INDEPENDENT: f64 = -25.209909071422572;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn exhaustive_fixture() {
        let data = fixture();
        let mut search = PartitionSearch::with_seed(0);
        let best = search.exhaustive(&data).unwrap();
        assert_eq!(best.partition(), &Partition::complete(3).unwrap());
        assert!(close(best.best_log_evidence().unwrap(), COMPLETE));
        assert!(close(best.best_log_evidence_per_component().unwrap()[0], COMPLETE));

        let expected = [
            COMPLETE,
            -8.769507120030227 - 15.982243968542207,
            -15.982243968542207 - 7.6708948313621175,
            -16.493069592308196 - 8.769507120030227,
            INDEPENDENT,
        ];
        let trajectory = search.trajectory().unwrap();
        assert_eq!(trajectory.len(), expected.len());
        for (got, want) in trajectory.iter().zip(expected.iter()) {
            assert!(close(*got, *want), "{} != {}", got, want);
        }
        assert!(matches!(search.model_in(), Err(Error::NoInitialModel)));
        assert_eq!(search.last_algorithm(), Some(Algorithm::Exhaustive));
    }

    #[test]
    fn greedy_merge_reaches_complete() {
        let data = fixture();
        let mut search = PartitionSearch::with_seed(0);
        let best = search.greedy_merge(&data, None).unwrap();
        assert_eq!(best.component_count(), 1);
        assert!(close(best.best_log_evidence().unwrap(), COMPLETE));
        // {0} and {2} merge first, then {1} joins them.
        let trajectory = search.trajectory().unwrap();
        assert_eq!(trajectory.len(), 3);
        assert!(close(trajectory[0], INDEPENDENT));
        assert!(close(
            trajectory[1],
            -15.982243968542207 - 7.6708948313621175
        ));
        assert_eq!(search.model_in().unwrap().component_count(), 3);
    }

    #[test]
    fn greedy_split_from_independent_stays_put() {
        let data = fixture();
        let mut search = PartitionSearch::with_seed(0);
        let seed = Model::new(3).unwrap();
        let best = search.greedy_split(&data, Some(&seed)).unwrap();
        assert_eq!(best.partition(), seed.partition());
        assert!(close(best.best_log_evidence().unwrap(), INDEPENDENT));
        assert_eq!(search.trajectory().unwrap().len(), 1);
    }

    #[test]
    fn greedy_split_keeps_complete_fixture() {
        // Every way of splitting the complete component loses evidence here.
        let data = fixture();
        let mut search = PartitionSearch::with_seed(0);
        let best = search.greedy_split(&data, None).unwrap();
        assert_eq!(best.component_count(), 1);
        assert!(close(best.best_log_evidence().unwrap(), COMPLETE));
    }

    #[test]
    fn greedy_split_separates_blocks() {
        // Variables 0 and 1 are copies of each other, as are 2 and 3; the pairs are unrelated.
        let mut data = Dataset::new(4, 2).unwrap();
        for (a, b) in [(0, 0), (0, 1), (1, 0), (1, 1)].iter() {
            data.add_observation(&[*a, *a, *b, *b], 25).unwrap();
        }
        let mut search = PartitionSearch::with_seed(0);
        let best = search.greedy_split(&data, None).unwrap();
        let labels = best.labels();
        assert_eq!(best.component_count(), 2, "{}", best);
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[2], labels[3]);
        assert!(search
            .trajectory()
            .unwrap()
            .windows(2)
            .all(|w| w[0] <= w[1]));
        let exhaustive = search.exhaustive(&data).unwrap();
        assert!(close(
            exhaustive.best_log_evidence().unwrap(),
            best.best_log_evidence().unwrap()
        ));
    }

    #[test]
    fn failed_searches_leave_state_alone() {
        let data = fixture();
        let mut search = PartitionSearch::with_seed(0);
        assert!(matches!(search.model_out(), Err(Error::NoSearch)));
        assert!(matches!(search.trajectory(), Err(Error::NoSearch)));
        assert!(matches!(search.model_in(), Err(Error::NoSearch)));

        search.greedy_merge(&data, None).unwrap();
        let wrong = Model::new(4).unwrap();
        assert!(matches!(
            search.simulated_annealing(&data, Some(&wrong)),
            Err(Error::VariableMismatch { data: 3, model: 4 })
        ));
        assert_eq!(search.last_algorithm(), Some(Algorithm::GreedyMerge));
        assert_eq!(search.trajectory().unwrap().len(), 3);

        let wide = Dataset::new(MAX_EXHAUSTIVE_VARIABLES + 1, 2).unwrap();
        assert!(matches!(
            search.exhaustive(&wide),
            Err(Error::TooManyForExhaustive(_))
        ));
        assert_eq!(search.last_algorithm(), Some(Algorithm::GreedyMerge));
    }

    #[test]
    fn settings_are_validated() {
        let mut search = PartitionSearch::with_seed(0);
        assert!(search.set_max_iterations(0).is_err());
        assert!(search.set_update_interval(0).is_err());
        assert!(search.set_max_no_improve(0).is_err());
        assert!(search.set_initial_temperature(-1.0).is_err());
        assert!(search.set_initial_temperature(f64::NAN).is_err());
        assert_eq!(search.annealing_settings(), &AnnealingSettings::default());
        search.set_max_iterations(10).unwrap();
        assert_eq!(search.annealing_settings().max_iterations, 10);
    }

    #[test]
    fn algorithm_names() {
        assert_eq!("split".parse(), Ok(Algorithm::GreedySplit));
        assert!("bogo".parse::<Algorithm>().is_err());
        assert_eq!(Algorithm::SimulatedAnnealing.to_string(), "Simulated Annealing");
    }
}
