use crate::component::Component;
use crate::evidence::EvidenceCache;
use crate::observer::SearchObserver;
use crate::search::Candidate;
use crate::{Error, Result};
use rand::rngs::StdRng;
use rand::Rng;

/// Tuning knobs for [`PartitionSearch::simulated_annealing`](crate::PartitionSearch::simulated_annealing).
///
/// ```
/// use mincomp::AnnealingSettings;
///
/// let settings = AnnealingSettings::default();
/// assert_eq!(settings.max_iterations, 50_000);
/// assert_eq!(settings.max_no_improve, 10_000);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnnealingSettings {
    /// Hard limit on the number of iterations.
    pub max_iterations: usize,
    /// Temperature at the start of the walk.
    pub initial_temperature: f64,
    /// The temperature is lowered every this many iterations, to `T0 / (1 + ln(1 + i))` at
    /// iteration `i`.
    pub update_interval: usize,
    /// Stop once this many iterations in a row failed to improve on the best partition.
    pub max_no_improve: usize,
    /// An improvement smaller than this doesn't count.
    pub epsilon: f64,
}

impl Default for AnnealingSettings {
    fn default() -> Self {
        AnnealingSettings {
            max_iterations: 50_000,
            initial_temperature: 100.0,
            update_interval: 100,
            max_no_improve: 10_000,
            epsilon: 1e-4,
        }
    }
}

impl AnnealingSettings {
    /// Checks that every setting is in range.
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(Error::InvalidSetting(
                "the maximum number of iterations should be positive",
            ));
        }
        if !(self.initial_temperature > 0.0 && self.initial_temperature.is_finite()) {
            return Err(Error::InvalidSetting(
                "the initial temperature should be a positive number",
            ));
        }
        if self.update_interval == 0 {
            return Err(Error::InvalidSetting(
                "the temperature update interval should be positive",
            ));
        }
        if self.max_no_improve == 0 {
            return Err(Error::InvalidSetting(
                "the number of iterations without improvement should be positive",
            ));
        }
        if self.epsilon.is_nan() || self.epsilon < 0.0 {
            return Err(Error::InvalidSetting("epsilon should not be negative"));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Move {
    Merge,
    Split,
    Switch,
}

/// The current (not necessarily best) state of the walk.
struct Walk<'c, 'a> {
    current: Candidate,
    cache: &'c mut EvidenceCache<'a>,
    temperature: f64,
    // Slots holding any variable, and slots holding at least two.
    occupied: Component,
    occupied2: Component,
}

impl<'c, 'a> Walk<'c, 'a> {
    fn new(current: Candidate, cache: &'c mut EvidenceCache<'a>, temperature: f64) -> Self {
        let mut walk = Walk {
            current,
            cache,
            temperature,
            occupied: Component::EMPTY,
            occupied2: Component::EMPTY,
        };
        for slot in 0..walk.current.slots.len() {
            walk.refresh(slot);
        }
        walk
    }

    fn refresh(&mut self, slot: usize) {
        let len = self.current.slots[slot].len();
        self.occupied = if len > 0 {
            self.occupied.with(slot)
        } else {
            self.occupied.without(slot)
        };
        self.occupied2 = if len > 1 {
            self.occupied2.with(slot)
        } else {
            self.occupied2.without(slot)
        };
    }

    fn legal_moves(&self) -> ([Move; 3], usize) {
        let mut moves = [Move::Merge; 3];
        let mut count = 0;
        let can_merge = self.occupied.len() >= 2;
        let can_split = !self.occupied2.is_empty();
        for (legal, m) in [
            (can_merge, Move::Merge),
            (can_split, Move::Split),
            (can_merge && can_split, Move::Switch),
        ] {
            if legal {
                moves[count] = m;
                count += 1;
            }
        }
        (moves, count)
    }

    /// Recomputes the total evidence from the slots, dropping rounding error accumulated over
    /// many accepted moves.
    fn resync(&mut self) {
        self.current.log_evidence = self.cache.total(&self.current.slots);
    }

    fn accept(&self, diff: f64, rng: &mut StdRng) -> bool {
        (diff / self.temperature).exp() > rng.random::<f64>()
    }

    fn merge(&mut self, rng: &mut StdRng) -> Option<()> {
        let first = self.occupied.random_member(rng)?;
        let second = self.occupied.without(first).random_member(rng)?;
        let merged = self.current.slots[first] | self.current.slots[second];
        let merged_evidence = self.cache.get_or_compute(merged);
        let diff =
            merged_evidence - self.current.evidence[first] - self.current.evidence[second];
        if self.accept(diff, rng) {
            self.current.merge(first, second, merged_evidence);
            self.refresh(first);
            self.refresh(second);
        }
        Some(())
    }

    fn split(&mut self, rng: &mut StdRng) -> Option<()> {
        let slot = self.occupied2.random_member(rng)?;
        let free = self.current.slots.iter().position(|c| c.is_empty())?;
        let component = self.current.slots[slot];
        let n = self.current.slots.len();
        let (left, right) = loop {
            let mask = Component::random(n, rng);
            let left = component & mask;
            let right = component.difference(mask);
            if !left.is_empty() && !right.is_empty() {
                break (left, right);
            }
        };

        let ev_left = self.cache.get_or_compute(left);
        let ev_right = self.cache.get_or_compute(right);
        let diff = ev_left + ev_right - self.current.evidence[slot];
        if self.accept(diff, rng) {
            let current = &mut self.current;
            current.slots[slot] = left;
            current.slots[free] = right;
            current.evidence[slot] = ev_left;
            current.evidence[free] = ev_right;
            current.log_evidence += diff;
            current.count += 1;
            self.refresh(slot);
            self.refresh(free);
        }
        Some(())
    }

    fn switch(&mut self, rng: &mut StdRng) -> Option<()> {
        let from = self.occupied2.random_member(rng)?;
        let to = self.occupied.without(from).random_member(rng)?;
        let variable = self.current.slots[from].random_member(rng)?;
        let new_from = self.current.slots[from].without(variable);
        let new_to = self.current.slots[to].with(variable);

        let ev_from = self.cache.get_or_compute(new_from);
        let ev_to = self.cache.get_or_compute(new_to);
        let diff = ev_from + ev_to - self.current.evidence[from] - self.current.evidence[to];
        if self.accept(diff, rng) {
            let current = &mut self.current;
            current.slots[from] = new_from;
            current.slots[to] = new_to;
            current.evidence[from] = ev_from;
            current.evidence[to] = ev_to;
            current.log_evidence += diff;
            self.refresh(from);
            self.refresh(to);
        }
        Some(())
    }
}

/// Runs the annealing walk from `start` and returns the best candidate it saw.
///
/// The best evidence so far is appended to `trajectory` once per iteration.
pub(crate) fn anneal(
    settings: &AnnealingSettings,
    rng: &mut StdRng,
    cache: &mut EvidenceCache<'_>,
    start: Candidate,
    trajectory: &mut Vec<f64>,
    observer: &mut Option<Box<dyn SearchObserver>>,
) -> Candidate {
    let mut best = start.clone();
    let mut walk = Walk::new(start, cache, settings.initial_temperature);
    let mut since_improvement = 0;

    for iteration in 0..settings.max_iterations {
        let (moves, count) = walk.legal_moves();
        if count > 0 {
            let _ = match moves[rng.random_range(0..count)] {
                Move::Merge => walk.merge(rng),
                Move::Split => walk.split(rng),
                Move::Switch => walk.switch(rng),
            };
        }

        if iteration % settings.update_interval == 0 {
            walk.temperature = settings.initial_temperature / (1.0 + (1.0 + iteration as f64).ln());
        }

        let current = &walk.current;
        if current.log_evidence > best.log_evidence
            && (current.log_evidence - best.log_evidence).abs() > settings.epsilon
        {
            walk.resync();
            best = walk.current.clone();
            since_improvement = 0;
            tracing::trace!(
                iteration,
                temperature = walk.temperature,
                log_evidence = best.log_evidence,
                "annealing improved"
            );
            if let Some(observer) = observer.as_mut() {
                observer.improved(iteration, best.log_evidence, Some(walk.temperature));
            }
        } else {
            since_improvement += 1;
        }
        trajectory.push(best.log_evidence);

        if since_improvement > settings.max_no_improve {
            tracing::debug!(iteration, "annealing stalled");
            if let Some(observer) = observer.as_mut() {
                observer.stalled(iteration);
            }
            break;
        }
    }
    best
}
