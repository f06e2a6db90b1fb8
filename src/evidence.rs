//! Scoring components and partitions against a [`Dataset`].
//!
//! Every score here is additive over the components of a partition. Variables that no component
//! covers are charged as if they were uniformly distributed, which costs `ln q` nats per
//! variable per (assumed) observation.

use crate::component::Component;
use crate::data::Dataset;
use crate::partition::Partition;
use crate::search::MAX_EXHAUSTIVE_VARIABLES;
use crate::{Error, Result};
use statrs::function::gamma::ln_gamma;
use std::collections::HashMap;
use std::f64::consts::PI;

/// Components with more variables than this use an asymptotic prefactor, because `q^r / 2` is
/// too large for `ln_gamma` to be accurate.
const EXACT_PREFACTOR_LIMIT: usize = 25;

impl Dataset {
    /// The log-evidence of a single component: the log marginal likelihood of the data restricted
    /// to the component's variables, under a Dirichlet prior with concentration 1/2 on each of the
    /// `q^r` joint states.
    ///
    /// Observation counts are rescaled from the real sample size to the
    /// [assumed](Dataset::assumed_sample_size) one.
    ///
    /// ```
    /// use mincomp::{Component, Dataset};
    ///
    /// let mut data = Dataset::new(2, 2)?;
    /// data.add_observation(&[0, 0], 3)?;
    /// data.add_observation(&[1, 1], 3)?;
    ///
    /// // The two variables always agree, so modeling them jointly beats modeling them apart.
    /// let joint = data.log_evidence_icc(Component::full(2));
    /// let apart = data.log_evidence_icc(Component::singleton(0))
    ///     + data.log_evidence_icc(Component::singleton(1));
    /// assert!(joint > apart);
    /// # Ok::<(), mincomp::Error>(())
    /// ```
    pub fn log_evidence_icc(&self, component: Component) -> f64 {
        debug_assert!(component.is_subset(Component::full(self.n())));
        let assumed = self.assumed_sample_size() as f64;
        let alpha = assumed / self.sample_size() as f64;
        let half_ln_pi = 0.5 * PI.ln();

        let cells: f64 = self
            .projected_counts(component)
            .into_iter()
            .map(|count| ln_gamma(alpha * f64::from(count) + 0.5) - half_ln_pi)
            .sum();
        cells + self.log_prefactor(component.len())
    }

    /// The counts of each projected state, sorted so that sums over them don't depend on hash
    /// order.
    fn projected_counts(&self, component: Component) -> Vec<u32> {
        let mut counts: Vec<u32> = self.project(component).into_values().collect();
        counts.sort_unstable();
        counts
    }

    /// The normalizing term `ln Γ(q^r/2) - ln Γ(N + q^r/2)` of a component with `r` variables.
    pub(crate) fn log_prefactor(&self, r: usize) -> f64 {
        let assumed = self.assumed_sample_size() as f64;
        if r > EXACT_PREFACTOR_LIMIT {
            -(r as f64) * f64::from(self.q()).ln() * assumed
        } else {
            let half = self.q_power(r) / 2.0;
            ln_gamma(half) - ln_gamma(assumed + half)
        }
    }

    /// The cost of leaving `n - rank` variables out of every component.
    pub(crate) fn unassigned_penalty(&self, rank: usize) -> f64 {
        self.assumed_sample_size() as f64 * (self.n() - rank) as f64 * f64::from(self.q()).ln()
    }

    /// The log-evidence of a partition: the sum over its components, less the penalty for
    /// uncovered variables.
    ///
    /// ```
    /// use mincomp::{Dataset, Partition};
    ///
    /// let mut data = Dataset::new(3, 2)?;
    /// data.add_observation(&[1, 0, 1], 2)?;
    /// data.add_observation(&[0, 1, 1], 1)?;
    ///
    /// let p = Partition::independent(3)?;
    /// let sum: f64 = p.iter().map(|c| data.log_evidence_icc(c)).sum();
    /// assert_eq!(data.log_evidence(&p)?, sum);
    /// assert!(data.log_evidence(&Partition::independent(4)?).is_err());
    /// # Ok::<(), mincomp::Error>(())
    /// ```
    pub fn log_evidence(&self, partition: &Partition) -> Result<f64> {
        self.check_partition(partition)?;
        Ok(self.sum_over(partition, Dataset::log_evidence_icc)
            - self.unassigned_penalty(partition.rank()))
    }

    /// The maximized log-likelihood of the data restricted to one component, with counts
    /// rescaled to the assumed sample size.
    pub fn log_likelihood_icc(&self, component: Component) -> f64 {
        let total = self.sample_size() as f64;
        let alpha = self.assumed_sample_size() as f64 / total;
        self.projected_counts(component)
            .into_iter()
            .map(|count| {
                let count = f64::from(count);
                alpha * count * (count / total).ln()
            })
            .sum()
    }

    /// The maximized log-likelihood of a partition, less the penalty for uncovered variables.
    pub fn log_likelihood(&self, partition: &Partition) -> Result<f64> {
        self.check_partition(partition)?;
        Ok(self.sum_over(partition, Dataset::log_likelihood_icc)
            - self.unassigned_penalty(partition.rank()))
    }

    /// The parametric complexity of a component, `(q^r - 1)/2 · ln(N / 2π)`.
    ///
    /// This grows like `q^r`, so it is only finite for components with few enough joint states;
    /// see [`Dataset::geometric_complexity_icc`].
    pub fn parametric_complexity_icc(&self, component: Component) -> f64 {
        let parameters = self.q_power(component.len()) - 1.0;
        parameters / 2.0 * (self.assumed_sample_size() as f64 / (2.0 * PI)).ln()
    }

    /// The parametric complexity of a partition, summed over its components.
    pub fn parametric_complexity(&self, partition: &Partition) -> Result<f64> {
        self.check_partition(partition)?;
        self.check_complexity(partition)?;
        Ok(self.sum_over(partition, Dataset::parametric_complexity_icc))
    }

    /// The geometric complexity of a component, `q^r/2 · ln π - ln Γ(q^r/2)`.
    ///
    /// This doesn't depend on the data at all, only on how many states the component has. Once
    /// `q^r/2 · ln(q^r)` no longer fits in an `f64` the result is meaningless; the per-partition
    /// complexity functions reject such components with [`Error::ComplexityOverflow`].
    ///
    /// ```
    /// use mincomp::{Dataset, Error, Partition};
    ///
    /// let data = Dataset::new(128, 256)?;
    /// let complete = Partition::complete(128)?;
    /// assert!(matches!(data.mdl(&complete), Err(Error::ComplexityOverflow(128))));
    /// assert!(data.geometric_complexity(&Partition::independent(128)?)?.is_finite());
    /// # Ok::<(), mincomp::Error>(())
    /// ```
    pub fn geometric_complexity_icc(&self, component: Component) -> f64 {
        let half = self.q_power(component.len()) / 2.0;
        half * PI.ln() - ln_gamma(half)
    }

    /// The geometric complexity of a partition, summed over its components.
    pub fn geometric_complexity(&self, partition: &Partition) -> Result<f64> {
        self.check_partition(partition)?;
        self.check_complexity(partition)?;
        Ok(self.sum_over(partition, Dataset::geometric_complexity_icc))
    }

    /// The minimum description length score of a partition: its log-likelihood less both
    /// complexity terms. Larger is better, like the evidence.
    pub fn mdl(&self, partition: &Partition) -> Result<f64> {
        Ok(self.log_likelihood(partition)?
            - self.geometric_complexity(partition)?
            - self.parametric_complexity(partition)?)
    }

    fn sum_over(&self, partition: &Partition, f: impl Fn(&Self, Component) -> f64) -> f64 {
        partition.iter().map(|c| f(self, c)).sum()
    }

    /// Both complexity terms involve `ln Γ(q^r/2)`, which is roughly `q^r/2 · ln(q^r)`.
    fn check_complexity(&self, partition: &Partition) -> Result<()> {
        match partition.iter().find(|c| {
            let half = self.q_power(c.len()) / 2.0;
            !(half * half.ln()).is_finite()
        }) {
            Some(c) => Err(Error::ComplexityOverflow(c.len())),
            None => Ok(()),
        }
    }

    pub(crate) fn check_partition(&self, partition: &Partition) -> Result<()> {
        if partition.n() == self.n() {
            Ok(())
        } else {
            Err(Error::VariableMismatch {
                data: self.n(),
                model: partition.n(),
            })
        }
    }
}

/// Remembers the log-evidence of every component it has been asked about.
///
/// The sparse backend is a hash map, suited to searches that only ever look at a small and
/// unpredictable fraction of the `2^n - 1` possible components. The dense backend is a table with
/// a slot for every one of them, which is what exhaustive search needs.
///
/// ```
/// use mincomp::{Component, Dataset, EvidenceCache};
///
/// let mut data = Dataset::new(4, 2)?;
/// data.add_observation(&[1, 0, 1, 1], 1)?;
///
/// let mut cache = EvidenceCache::dense(&data)?;
/// let c = Component::from_bits(0b0101);
/// assert_eq!(cache.get_or_compute(c), data.log_evidence_icc(c));
/// assert_eq!(cache.get_or_compute(c), data.log_evidence_icc(c));
/// assert_eq!(cache.len(), 1);
/// # Ok::<(), mincomp::Error>(())
/// ```
pub struct EvidenceCache<'a> {
    data: &'a Dataset,
    store: Store,
    len: usize,
}

enum Store {
    Sparse(HashMap<Component, f64>),
    Dense(Vec<Option<f64>>),
}

/// The slot of a non-empty component in the dense table. Only dense caches call this, and they
/// hold at most `MAX_EXHAUSTIVE_VARIABLES` variables, so the mask fits in a `usize`.
fn dense_index(component: Component) -> usize {
    component.bits() as usize - 1
}

impl<'a> EvidenceCache<'a> {
    /// Creates a cache backed by a hash map.
    pub fn sparse(data: &'a Dataset) -> Self {
        EvidenceCache {
            data,
            store: Store::Sparse(HashMap::new()),
            len: 0,
        }
    }

    /// Creates a cache with a slot for every non-empty component.
    ///
    /// This allocates `2^n - 1` slots up front, so it is refused for datasets with more than
    /// [`MAX_EXHAUSTIVE_VARIABLES`] variables.
    pub fn dense(data: &'a Dataset) -> Result<Self> {
        let n = data.n();
        if n > MAX_EXHAUSTIVE_VARIABLES {
            return Err(Error::TooManyForExhaustive(n));
        }
        Ok(EvidenceCache {
            data,
            store: Store::Dense(vec![None; (1 << n) - 1]),
            len: 0,
        })
    }

    /// The dataset whose evidence this cache holds.
    pub fn dataset(&self) -> &'a Dataset {
        self.data
    }

    /// The number of distinct components computed so far.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if nothing has been computed yet.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the log-evidence of `component`, computing it on first use.
    ///
    /// The empty component always has zero evidence and is never stored.
    pub fn get_or_compute(&mut self, component: Component) -> f64 {
        if component.is_empty() {
            return 0.0;
        }
        let cached = match &self.store {
            Store::Sparse(map) => map.get(&component).copied(),
            Store::Dense(table) => table[dense_index(component)],
        };
        if let Some(evidence) = cached {
            return evidence;
        }

        let evidence = self.data.log_evidence_icc(component);
        match &mut self.store {
            Store::Sparse(map) => {
                map.insert(component, evidence);
            }
            Store::Dense(table) => table[dense_index(component)] = Some(evidence),
        }
        self.len += 1;
        evidence
    }

    /// The log-evidence of a partition given as slots, some of which may be empty, including the
    /// penalty for uncovered variables.
    pub(crate) fn total(&mut self, slots: &[Component]) -> f64 {
        let mut rank = 0;
        let mut sum = 0.0;
        for &c in slots.iter().filter(|c| !c.is_empty()) {
            rank += c.len();
            sum += self.get_or_compute(c);
        }
        sum - self.data.unassigned_penalty(rank)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Three variables with three states each: seven observations, six of them distinct.
    pub(crate) fn fixture() -> Dataset {
        let mut data = Dataset::new(3, 3).unwrap();
        let rows: [([u8; 3], u32); 6] = [
            ([2, 0, 0], 1),
            ([2, 1, 0], 2),
            ([1, 2, 0], 1),
            ([2, 1, 1], 1),
            ([1, 1, 1], 1),
            ([0, 1, 2], 1),
        ];
        for (values, count) in rows.iter() {
            data.add_observation(values, *count).unwrap();
        }
        data
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn fixture_components() {
        let data = fixture();
        let expected = [
            (0b001, -8.769507120030227),
            (0b010, -7.670894831362117),
            (0b100, -8.769507120030227),
            (0b011, -15.982243968542207),
            (0b101, -15.982243968542207),
            (0b110, -16.493069592308196),
            (0b111, -23.324842793537606),
        ];
        for &(bits, ev) in expected.iter() {
            let got = data.log_evidence_icc(Component::from_bits(bits));
            assert!(close(got, ev), "{:03b}: {} != {}", bits, got, ev);
        }
    }

    #[test]
    fn empty_component_has_no_evidence() {
        let data = fixture();
        assert!(data.log_evidence_icc(Component::EMPTY).abs() < 1e-12);
    }

    #[test]
    fn partial_partitions_pay_for_missing_variables() {
        let data = fixture();
        let ln3 = 3f64.ln();
        let only_last = Partition::new(3, &[Component::from_bits(0b100)]).unwrap();
        assert!(close(
            data.log_evidence(&only_last).unwrap(),
            -8.769507120030227 - 7.0 * 2.0 * ln3
        ));
        let two = Partition::new(3, &[0b001, 0b100].map(Component::from_bits)).unwrap();
        assert!(close(
            data.log_evidence(&two).unwrap(),
            -8.769507120030227 * 2.0 - 7.0 * ln3
        ));
    }

    #[test]
    fn likelihood_and_mdl() {
        let data = fixture();
        let complete = Partition::complete(3).unwrap();
        let independent = Partition::independent(3).unwrap();
        assert!(close(
            data.log_likelihood(&complete).unwrap(),
            -12.235076682267303
        ));
        assert!(close(
            data.log_likelihood(&independent).unwrap(),
            -6.68989923778774 * 2.0 - 5.574181481216692
        ));
        assert!(close(data.mdl(&complete).unwrap(), -7.833284059387089));
        assert!(close(data.mdl(&independent).unwrap(), -24.791710403958117));
        assert!(close(
            data.parametric_complexity(&independent).unwrap(),
            3.0 * 0.10803308264596796
        ));
        assert!(close(
            data.geometric_complexity(&complete).unwrap(),
            -5.806222697277798
        ));
    }

    #[test]
    fn assumed_sample_size_rescales_counts() {
        let mut data = fixture();
        data.set_assumed_sample_size(70).unwrap();
        assert!(close(
            data.log_evidence_icc(Component::full(3)),
            -156.32169340629463
        ));
        assert!(close(
            data.log_evidence_icc(Component::singleton(0)),
            -71.1612987588779
        ));

        // Rebuild the same number by hand: every count is scaled by 70 / 7.
        let cells: f64 = [2.0, 1.0, 1.0, 1.0, 1.0, 1.0]
            .iter()
            .map(|c: &f64| ln_gamma(10.0 * c + 0.5) - 0.5 * PI.ln())
            .sum();
        let by_hand = cells + ln_gamma(13.5) - ln_gamma(70.0 + 13.5);
        assert!(close(data.log_evidence_icc(Component::full(3)), by_hand));
    }

    #[test]
    fn asymptotic_prefactor_tracks_exact_sum() {
        // ln Γ(x) - ln Γ(N + x) is exactly -Σ ln(x + k) for k below N, which stays accurate when
        // x is huge.
        let mut data = Dataset::new(128, 2).unwrap();
        data.add_observation(&[0; 128], 10).unwrap();
        for &(r, tolerance) in [(26, 0.05), (64, 0.02), (100, 0.02)].iter() {
            let half = 2f64.powi(r as i32) / 2.0;
            let exact: f64 = -(0..10).map(|k| (half + f64::from(k)).ln()).sum::<f64>();
            let approx = data.log_prefactor(r);
            assert!(
                ((approx - exact) / exact).abs() < tolerance,
                "r = {}: {} vs {}",
                r,
                approx,
                exact
            );
        }
        // Below the cutoff the prefactor is exact.
        let half = 2f64.powi(20) / 2.0;
        let exact: f64 = -(0..10).map(|k| (half + f64::from(k)).ln()).sum::<f64>();
        assert!((data.log_prefactor(20) - exact).abs() < 1e-6);
    }

    #[test]
    fn sparse_cache_reaches_the_high_variables() {
        let mut data = Dataset::new(128, 2).unwrap();
        let mut values = [0; 128];
        data.add_observation(&values, 3).unwrap();
        values[64] = 1;
        values[127] = 1;
        data.add_observation(&values, 2).unwrap();

        let mut cache = EvidenceCache::sparse(&data);
        for c in [
            Component::singleton(64),
            Component::singleton(127),
            Component::singleton(64).with(127),
            Component::full(128),
        ] {
            assert_eq!(cache.get_or_compute(c), data.log_evidence_icc(c));
            assert_eq!(cache.get_or_compute(c), data.log_evidence_icc(c));
        }
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn complexity_of_huge_components_is_refused() {
        let mut data = Dataset::new(128, 256).unwrap();
        data.add_observation(&[7; 128], 4).unwrap();
        // 256^100 joint states is still representable.
        let wide = Partition::new(128, &[Component::full(100)]).unwrap();
        assert!(data.parametric_complexity(&wide).unwrap().is_finite());
        assert!(data.geometric_complexity(&wide).unwrap().is_finite());

        let complete = Partition::complete(128).unwrap();
        for result in [
            data.parametric_complexity(&complete),
            data.geometric_complexity(&complete),
            data.mdl(&complete),
        ] {
            assert!(matches!(result, Err(Error::ComplexityOverflow(128))));
        }
        assert!(data.log_evidence(&complete).unwrap().is_finite());
    }

    #[test]
    fn backends_agree() {
        let data = fixture();
        let mut sparse = EvidenceCache::sparse(&data);
        let mut dense = EvidenceCache::dense(&data).unwrap();
        for bits in 0..8 {
            let c = Component::from_bits(bits);
            assert_eq!(sparse.get_or_compute(c), dense.get_or_compute(c));
        }
        assert_eq!(sparse.len(), 7);
        assert_eq!(dense.len(), 7);
        let slots = [0b011, 0, 0b100].map(Component::from_bits);
        assert!(close(
            sparse.total(&slots),
            -15.982243968542207 - 8.769507120030227
        ));
    }

    #[test]
    fn dense_cache_is_bounded() {
        let data = Dataset::new(MAX_EXHAUSTIVE_VARIABLES + 1, 2).unwrap();
        assert!(matches!(
            EvidenceCache::dense(&data),
            Err(Error::TooManyForExhaustive(_))
        ));
    }
}
