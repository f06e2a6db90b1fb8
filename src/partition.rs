use crate::component::Component;
use crate::{check_variable_count, Error, Result};
use rand::Rng;

/// A partition of the variables `0..n` into disjoint, non-empty [`Component`]s.
///
/// Components keep the order they were given in, with empty entries dropped. The union of the
/// components doesn't have to cover every variable: the number of variables it does cover is the
/// partition's [rank](Partition::rank), and the evidence of any uncovered variable is charged as
/// if that variable were uniformly distributed.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Partition {
    n: usize,
    components: Vec<Component>,
}

impl Partition {
    /// The partition where every variable is its own component.
    ///
    /// ```
    /// use mincomp::{Component, Partition};
    ///
    /// let p = Partition::independent(3)?;
    /// assert_eq!(p.components(), &[Component::from_bits(1), Component::from_bits(2), Component::from_bits(4)]);
    /// # Ok::<(), mincomp::Error>(())
    /// ```
    pub fn independent(n: usize) -> Result<Self> {
        check_variable_count(n)?;
        Ok(Partition {
            n,
            components: (0..n).map(Component::singleton).collect(),
        })
    }

    /// The partition with a single component holding every variable.
    pub fn complete(n: usize) -> Result<Self> {
        check_variable_count(n)?;
        Ok(Partition {
            n,
            components: vec![Component::full(n)],
        })
    }

    /// A partition where each variable is dropped into one of `n` slots uniformly at random.
    pub fn random<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Result<Self> {
        check_variable_count(n)?;
        let mut slots = vec![Component::EMPTY; n];
        for variable in 0..n {
            let slot = rng.random_range(0..n);
            slots[slot] = slots[slot].with(variable);
        }
        Ok(Partition::from_slots(n, slots))
    }

    /// Creates a partition from component masks.
    ///
    /// Empty masks are skipped, so the input may have any number of them. Every other mask must
    /// only name variables below `n`, and no variable may appear twice.
    ///
    /// ```
    /// use mincomp::{Component, Partition};
    ///
    /// let masks = [0, 0, 0, 12, 0, 0, 0, 0, 3].map(Component::from_bits);
    /// let p = Partition::new(4, &masks)?;
    /// assert_eq!(p.len(), 2);
    /// assert_eq!(p.rank(), 4);
    ///
    /// let overlapping = [3, 6].map(Component::from_bits);
    /// assert!(Partition::new(4, &overlapping).is_err());
    /// # Ok::<(), mincomp::Error>(())
    /// ```
    pub fn new(n: usize, masks: &[Component]) -> Result<Self> {
        check_variable_count(n)?;
        let all = Component::full(n);
        let mut assigned = Component::EMPTY;
        for &mask in masks.iter().filter(|mask| !mask.is_empty()) {
            if !mask.is_subset(all) {
                return Err(Error::InvalidPartition(format!(
                    "component {:?} names variables beyond the first {}",
                    mask, n
                )));
            }
            if !mask.is_disjoint(assigned) {
                return Err(Error::InvalidPartition(
                    "the same variable occurs in multiple components".into(),
                ));
            }
            assigned = assigned | mask;
        }
        Ok(Partition::from_slots(n, masks.iter().copied()))
    }

    /// Creates a partition from a 0/1 matrix with one row per component and one column per
    /// variable.
    ///
    /// ```
    /// use mincomp::Partition;
    ///
    /// let p = Partition::from_matrix(3, &[vec![1, 0, 1], vec![0, 1, 0]])?;
    /// assert_eq!(p.to_labels(), vec![Some(0), Some(1), Some(0)]);
    ///
    /// assert!(Partition::from_matrix(3, &[vec![1, 2, 0]]).is_err());
    /// # Ok::<(), mincomp::Error>(())
    /// ```
    pub fn from_matrix<R: AsRef<[u8]>>(n: usize, rows: &[R]) -> Result<Self> {
        check_variable_count(n)?;
        let mut masks = Vec::with_capacity(rows.len());
        for row in rows {
            let row = row.as_ref();
            if row.len() != n {
                return Err(Error::InvalidPartition(format!(
                    "matrix rows should have {} entries, got {}",
                    n,
                    row.len()
                )));
            }
            let mut mask = Component::EMPTY;
            for (variable, &entry) in row.iter().enumerate() {
                match entry {
                    0 => {}
                    1 => mask = mask.with(variable),
                    _ => {
                        return Err(Error::InvalidPartition(
                            "entries of the matrix should be either 0 or 1".into(),
                        ))
                    }
                }
            }
            masks.push(mask);
        }
        Partition::new(n, &masks)
    }

    /// Creates a partition from a label vector, where entry `i` is the index of the component
    /// holding variable `i`, or `None` if variable `i` is left out.
    ///
    /// The vector may be shorter than `n`; missing entries are left out too. Labels don't need to
    /// be contiguous, but they must be less than `n`.
    pub fn from_labels(n: usize, labels: &[Option<usize>]) -> Result<Self> {
        check_variable_count(n)?;
        if labels.len() > n {
            return Err(Error::InvalidPartition(format!(
                "got labels for {} variables but there are only {}",
                labels.len(),
                n
            )));
        }
        let mut slots = vec![Component::EMPTY; n];
        for (variable, label) in labels.iter().enumerate() {
            if let Some(label) = *label {
                let slot = slots.get_mut(label).ok_or_else(|| {
                    Error::InvalidPartition(format!(
                        "component index {} is not less than {}",
                        label, n
                    ))
                })?;
                *slot = slot.with(variable);
            }
        }
        Ok(Partition::from_slots(n, slots))
    }

    /// Builds a partition from slots that are already known to be disjoint and within range,
    /// dropping the empty ones.
    pub(crate) fn from_slots<I: IntoIterator<Item = Component>>(n: usize, slots: I) -> Self {
        let components: Vec<Component> = slots.into_iter().filter(|c| !c.is_empty()).collect();
        debug_assert!(components.len() <= n);
        Partition { n, components }
    }

    /// The number of variables in the system this partition divides up.
    pub fn n(&self) -> usize {
        self.n
    }

    /// The number of non-empty components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns `true` if the partition has no components at all.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// The non-empty components, in order.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Returns an iterator over the non-empty components.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Component> + ExactSizeIterator + '_ {
        self.components.iter().copied()
    }

    /// The set of variables covered by some component.
    pub fn covered(&self) -> Component {
        self.iter().fold(Component::EMPTY, |all, c| all | c)
    }

    /// The number of variables covered by some component.
    pub fn rank(&self) -> usize {
        self.covered().len()
    }

    /// The components padded with empty masks to exactly `n` entries.
    ///
    /// ```
    /// use mincomp::Partition;
    ///
    /// let masks: Vec<u128> = Partition::complete(3)?.masks().iter().map(|c| c.bits()).collect();
    /// assert_eq!(masks, vec![7, 0, 0]);
    /// # Ok::<(), mincomp::Error>(())
    /// ```
    pub fn masks(&self) -> Vec<Component> {
        let mut masks = self.components.clone();
        masks.resize(self.n, Component::EMPTY);
        masks
    }

    /// The partition as a 0/1 matrix with one row per component and one column per variable.
    pub fn to_matrix(&self) -> Vec<Vec<u8>> {
        self.iter()
            .map(|c| (0..self.n).map(|v| c.contains(v) as u8).collect())
            .collect()
    }

    /// The partition as a label vector: entry `i` is the index of the component holding
    /// variable `i`, or `None` if no component does.
    pub fn to_labels(&self) -> Vec<Option<usize>> {
        let mut labels = vec![None; self.n];
        for (index, c) in self.components.iter().enumerate() {
            for variable in c.iter() {
                labels[variable] = Some(index);
            }
        }
        labels
    }

    /// Returns the index of the component holding `variable`, if any.
    pub fn component_of(&self, variable: usize) -> Option<usize> {
        self.components.iter().position(|c| c.contains(variable))
    }

    /// Adds an uncovered variable to the component at `index`. An index past the last component
    /// starts a new component.
    pub(crate) fn add_variable(&mut self, variable: usize, index: usize) -> Result<()> {
        self.check_variable(variable)?;
        if self.covered().contains(variable) {
            return Err(Error::VariablePresent(variable));
        }
        let len = self.components.len();
        if index < len {
            self.components[index] = self.components[index].with(variable);
        } else if len < self.n {
            self.components.push(Component::singleton(variable));
        } else {
            return Err(Error::InvalidPartition(format!(
                "all {} components are already in use",
                self.n
            )));
        }
        Ok(())
    }

    /// Removes a covered variable from its component, dropping the component if it becomes
    /// empty.
    pub(crate) fn remove_variable(&mut self, variable: usize) -> Result<()> {
        self.check_variable(variable)?;
        let index = self
            .component_of(variable)
            .ok_or(Error::VariableAbsent(variable))?;
        let remaining = self.components[index].without(variable);
        if remaining.is_empty() {
            self.components.remove(index);
        } else {
            self.components[index] = remaining;
        }
        Ok(())
    }

    fn check_variable(&self, variable: usize) -> Result<()> {
        if variable < self.n {
            Ok(())
        } else {
            Err(Error::VariableIndex {
                index: variable,
                n: self.n,
            })
        }
    }
}

impl std::fmt::Display for Partition {
    /// Writes each component as a bit string, separated by colons.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut iter = self.iter();
        if let Some(c) = iter.next() {
            f.write_str(&c.to_bit_string(self.n))?;
        }
        for c in iter {
            write!(f, ":{}", c.to_bit_string(self.n))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn masks(bits: &[u128]) -> Vec<Component> {
        bits.iter().copied().map(Component::from_bits).collect()
    }

    #[test]
    fn rejects_bad_sizes() {
        assert!(matches!(
            Partition::independent(0),
            Err(Error::VariableCount(0))
        ));
        assert!(matches!(
            Partition::complete(129),
            Err(Error::VariableCount(129))
        ));
        assert!(Partition::complete(128).is_ok());
    }

    #[test]
    fn rejects_variables_beyond_n() {
        assert!(matches!(
            Partition::new(3, &masks(&[8])),
            Err(Error::InvalidPartition(_))
        ));
    }

    #[test]
    fn partial_partitions_have_lower_rank() {
        let p = Partition::new(4, &masks(&[0, 1, 0, 4])).unwrap();
        assert_eq!(p.len(), 2);
        assert_eq!(p.rank(), 2);
        assert_eq!(p.to_labels(), vec![Some(0), None, Some(1), None]);
        assert_eq!(p.to_string(), "1000:0010");
    }

    #[test]
    fn labels_compact_gaps() {
        let p = Partition::from_labels(4, &[Some(3), None, Some(3), Some(1)]).unwrap();
        assert_eq!(p.components(), masks(&[8, 5]).as_slice());
        assert!(Partition::from_labels(2, &[Some(2)]).is_err());
        assert!(Partition::from_labels(2, &[None, None, None]).is_err());
    }

    #[test]
    fn matrix_shape_is_checked() {
        assert!(Partition::from_matrix(3, &[vec![1, 0]]).is_err());
        let p = Partition::from_matrix(2, &[vec![0u8, 0], vec![1, 1]]).unwrap();
        assert_eq!(p.to_matrix(), vec![vec![1, 1]]);
    }

    #[test]
    fn random_partitions_cover_everything() {
        let mut rng = StdRng::seed_from_u64(3);
        for n in 1..20 {
            let p = Partition::random(n, &mut rng).unwrap();
            assert_eq!(p.rank(), n);
            assert!(p.iter().all(|c| !c.is_empty()));
        }
    }

    #[test]
    fn single_variable_moves() {
        let mut p = Partition::complete(3).unwrap();
        assert!(matches!(p.add_variable(1, 0), Err(Error::VariablePresent(1))));
        p.remove_variable(1).unwrap();
        assert!(matches!(p.remove_variable(1), Err(Error::VariableAbsent(1))));
        p.add_variable(1, 5).unwrap();
        assert_eq!(p.components(), masks(&[5, 2]).as_slice());
        p.remove_variable(0).unwrap();
        p.add_variable(0, 1).unwrap();
        assert_eq!(p.components(), masks(&[4, 3]).as_slice());
        assert!(matches!(
            p.remove_variable(3),
            Err(Error::VariableIndex { index: 3, n: 3 })
        ));
    }
}
