use rand::Rng;
use std::iter;
use std::ops::{BitAnd, BitOr};

/// The largest number of variables a [`Component`] can hold.
pub const MAX_VARIABLES: usize = 128;

/// A set of variables, stored as a 128-bit mask where bit `i` is set if variable `i` belongs to
/// the set.
///
/// The empty set is a sentinel for an unused slot in a partition; it is never a valid component
/// on its own.
///
/// The same representation doubles as a small bitset over any indices below [`MAX_VARIABLES`],
/// which the annealing search uses to track which partition slots are occupied.
#[derive(Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Component(u128);

impl Component {
    /// The empty set.
    pub const EMPTY: Component = Component(0);

    /// Wraps a raw bitmask.
    pub const fn from_bits(bits: u128) -> Self {
        Component(bits)
    }

    /// Returns the raw bitmask.
    pub const fn bits(self) -> u128 {
        self.0
    }

    /// Creates a set containing only `variable`.
    ///
    /// `variable` must be less than [`MAX_VARIABLES`].
    pub fn singleton(variable: usize) -> Self {
        debug_assert!(variable < MAX_VARIABLES);
        Component(1 << variable)
    }

    /// Creates the set of all variables `0..n`.
    ///
    /// ```
    /// use mincomp::Component;
    ///
    /// assert_eq!(Component::full(3).bits(), 0b111);
    /// assert_eq!(Component::full(128).len(), 128);
    /// assert!(Component::full(0).is_empty());
    /// ```
    pub fn full(n: usize) -> Self {
        debug_assert!(n <= MAX_VARIABLES);
        if n >= MAX_VARIABLES {
            Component(u128::MAX)
        } else {
            Component((1 << n) - 1)
        }
    }

    /// The number of variables in the set.
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Returns `true` if no variable is in the set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if `variable` is in the set.
    pub fn contains(self, variable: usize) -> bool {
        variable < MAX_VARIABLES && self.0 & (1 << variable) != 0
    }

    /// Returns a copy of this set with `variable` added.
    pub fn with(self, variable: usize) -> Self {
        self | Component::singleton(variable)
    }

    /// Returns a copy of this set with `variable` removed.
    pub fn without(self, variable: usize) -> Self {
        Component(self.0 & !Component::singleton(variable).0)
    }

    /// Returns the variables in `self` that are not in `other`.
    pub fn difference(self, other: Self) -> Self {
        Component(self.0 & !other.0)
    }

    /// Returns `true` if the two sets share no variable.
    pub fn is_disjoint(self, other: Self) -> bool {
        self.0 & other.0 == 0
    }

    /// Returns `true` if `other` contains every variable that `self` does.
    pub fn is_subset(self, other: Self) -> bool {
        self.0 & !other.0 == 0
    }

    /// Returns an iterator over the variables in this set, in increasing order.
    ///
    /// ```
    /// use mincomp::Component;
    ///
    /// let set = Component::from_bits(0b1011_0000);
    /// assert_eq!(set.iter().collect::<Vec<_>>(), vec![4, 5, 7]);
    /// ```
    pub fn iter(self) -> impl Iterator<Item = usize> + Clone {
        let mut rest = self.0;
        iter::from_fn(move || {
            if rest == 0 {
                None
            } else {
                let variable = rest.trailing_zeros() as usize;
                rest &= rest - 1;
                Some(variable)
            }
        })
    }

    /// Returns the `k`th smallest variable in the set, counting from zero.
    pub fn nth(self, k: usize) -> Option<usize> {
        self.iter().nth(k)
    }

    /// Picks one of the variables in this set uniformly at random, or `None` if the set is empty.
    pub fn random_member<R: Rng + ?Sized>(self, rng: &mut R) -> Option<usize> {
        match self.len() {
            0 => None,
            len => self.nth(rng.random_range(0..len)),
        }
    }

    /// Draws a uniformly random subset of the variables `0..n`.
    pub fn random<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Self {
        Component(rng.random::<u128>() & Component::full(n).0)
    }

    /// Formats the set as a string of `n` characters, where character `i` is `'1'` if variable
    /// `i` is in the set.
    ///
    /// ```
    /// use mincomp::Component;
    ///
    /// assert_eq!(Component::from_bits(0b110).to_bit_string(4), "0110");
    /// ```
    pub fn to_bit_string(self, n: usize) -> String {
        (0..n)
            .map(|variable| if self.contains(variable) { '1' } else { '0' })
            .collect()
    }
}

impl BitOr for Component {
    type Output = Component;

    fn bitor(self, rhs: Self) -> Self {
        Component(self.0 | rhs.0)
    }
}

impl BitAnd for Component {
    type Output = Component;

    fn bitand(self, rhs: Self) -> Self {
        Component(self.0 & rhs.0)
    }
}

impl std::fmt::Debug for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl iter::FromIterator<usize> for Component {
    /// Creates a set containing the specified variables.
    ///
    /// It's okay if the provided iterator contains duplicates.
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Component::EMPTY, |set, variable| set.with(variable))
    }
}
