use crate::component::Component;
use std::iter;

/// Generates every partition of `n` labeled variables exactly once, as restricted growth
/// strings.
///
/// A restricted growth string assigns each variable the index of its component, where the first
/// variable is always in component 0 and every later variable is in one of the components already
/// used, or in the next unused one. So `[0, 1, 0]` is the partition `{0, 2}, {1}` and there is no
/// other string that describes it.
///
/// Strings are produced in lexicographic order, starting with all zeros (the complete partition)
/// and ending with `[0, 1, ..., n-1]` (the independent partition).
///
/// ```
/// use mincomp::SetPartitions;
///
/// let all: Vec<Vec<usize>> = SetPartitions::new(3).collect();
/// assert_eq!(all, vec![
///     vec![0, 0, 0],
///     vec![0, 0, 1],
///     vec![0, 1, 0],
///     vec![0, 1, 1],
///     vec![0, 1, 2],
/// ]);
/// ```
#[derive(Clone, Debug)]
pub struct SetPartitions {
    labels: Vec<usize>,
    // The largest label position `i` may take: one more than the largest label before it.
    bounds: Vec<usize>,
    state: Progress,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Progress {
    Fresh,
    Running,
    Done,
}

impl SetPartitions {
    /// Starts at the partition with every variable in one component.
    pub fn new(n: usize) -> Self {
        let mut bounds = vec![1; n];
        if let Some(first) = bounds.first_mut() {
            *first = 0;
        }
        SetPartitions {
            labels: vec![0; n],
            bounds,
            state: Progress::Fresh,
        }
    }

    /// The current restricted growth string.
    pub fn current(&self) -> &[usize] {
        &self.labels
    }

    /// Steps to the next partition, returning `false` once every partition has been visited.
    ///
    /// This finds the rightmost label that is still below its bound, increments it, and resets
    /// everything to its right back to component 0.
    pub fn advance(&mut self) -> bool {
        if self.state == Progress::Done {
            return false;
        }
        self.state = Progress::Running;

        let pivot = match (0..self.labels.len()).rfind(|&i| self.labels[i] < self.bounds[i]) {
            Some(pivot) => pivot,
            None => {
                self.state = Progress::Done;
                return false;
            }
        };

        self.labels[pivot] += 1;
        let next_bound = self.labels[pivot].max(self.bounds[pivot] - 1) + 1;
        for i in pivot + 1..self.labels.len() {
            self.labels[i] = 0;
            self.bounds[i] = next_bound;
        }
        true
    }

    /// Writes the current partition into `slots` as component masks, one per label. Slots past
    /// the highest label are cleared.
    pub fn fill_slots(&self, slots: &mut [Component]) {
        slots.iter_mut().for_each(|slot| *slot = Component::EMPTY);
        for (variable, &label) in self.labels.iter().enumerate() {
            slots[label] = slots[label].with(variable);
        }
    }
}

impl Iterator for SetPartitions {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let has_next = match self.state {
            Progress::Fresh => {
                self.state = Progress::Running;
                true
            }
            Progress::Running => self.advance(),
            Progress::Done => false,
        };
        if has_next {
            Some(self.labels.clone())
        } else {
            None
        }
    }
}

impl iter::FusedIterator for SetPartitions {}

/// Returns the number of partitions of `n` labeled items, or `None` if it doesn't fit in a
/// `u128` (beyond n = 50 or so).
///
/// ```
/// use mincomp::bell_number;
///
/// assert_eq!(bell_number(0), Some(1));
/// assert_eq!(bell_number(4), Some(15));
/// assert_eq!(bell_number(9), Some(21_147));
/// assert_eq!(bell_number(200), None);
/// ```
pub fn bell_number(n: usize) -> Option<u128> {
    // Bell triangle: each row starts with the last entry of the previous row, and each following
    // entry adds the entry above-left to its left neighbor.
    let mut row = vec![1u128];
    for _ in 0..n {
        let mut next = Vec::with_capacity(row.len() + 1);
        next.push(*row.last()?);
        for above in row.iter() {
            let left = *next.last()?;
            next.push(left.checked_add(*above)?);
        }
        row = next;
    }
    row.first().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_variable_has_one_partition() {
        let mut parts = SetPartitions::new(1);
        assert_eq!(parts.next(), Some(vec![0]));
        assert_eq!(parts.next(), None);
        assert_eq!(parts.next(), None);
    }

    #[test]
    fn advance_matches_iteration() {
        let mut stepper = SetPartitions::new(5);
        let mut stepped = vec![stepper.current().to_vec()];
        while stepper.advance() {
            stepped.push(stepper.current().to_vec());
        }
        assert!(!stepper.advance());
        let iterated: Vec<_> = SetPartitions::new(5).collect();
        assert_eq!(stepped, iterated);
        assert_eq!(iterated.last(), Some(&vec![0, 1, 2, 3, 4]));
    }

    #[test]
    fn fill_slots_converts_labels() {
        let mut parts = SetPartitions::new(3);
        parts.advance();
        parts.advance();
        assert_eq!(parts.current(), &[0, 1, 0]);
        let mut slots = [Component::from_bits(0xff); 3];
        parts.fill_slots(&mut slots);
        assert_eq!(slots.map(Component::bits), [0b101, 0b010, 0]);
    }
}
