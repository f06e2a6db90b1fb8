use mincomp::{bell_number, Component, Partition, SetPartitions};
use proptest::prelude::*;
use std::collections::HashSet;

macro_rules! check_size {
    ($($name:ident)*) => {
        $(
        #[test]
        fn $name() {
            check((stringify!($name).as_bytes().last().unwrap() - b'0').into());
        }
        )*
    }
}

check_size! {
    partitions_over_1
    partitions_over_2
    partitions_over_3
    partitions_over_4
    partitions_over_5
    partitions_over_6
    partitions_over_7
    partitions_over_8
}

fn check(n: usize) {
    let mut seen = HashSet::new();
    for labels in SetPartitions::new(n) {
        // Restricted growth: every label is at most one more than the largest before it.
        let mut next_label = 0;
        for &label in labels.iter() {
            assert!(label <= next_label, "{:?}", labels);
            next_label = next_label.max(label + 1);
        }

        let labels: Vec<Option<usize>> = labels.into_iter().map(Some).collect();
        let partition = Partition::from_labels(n, &labels).unwrap();
        assert_eq!(partition.rank(), n);
        let mut canonical = partition.components().to_vec();
        canonical.sort();
        // SetPartitions must not produce duplicates
        assert!(seen.insert(canonical));
    }
    assert_eq!(Some(seen.len() as u128), bell_number(n));
}

#[test]
fn bell_table() {
    let known: [u128; 11] = [1, 1, 2, 5, 15, 52, 203, 877, 4140, 21147, 115975];
    for (n, &bell) in known.iter().enumerate() {
        assert_eq!(bell_number(n), Some(bell));
    }
}

fn labels_strategy() -> impl Strategy<Value = (usize, Vec<Option<usize>>)> {
    (1usize..12).prop_flat_map(|n| {
        (
            Just(n),
            prop::collection::vec(prop::option::weighted(0.8, 0..n), 0..=n),
        )
    })
}

proptest! {
    #[test]
    fn conversions_agree((n, labels) in labels_strategy()) {
        let partition = Partition::from_labels(n, &labels).unwrap();

        let from_matrix = Partition::from_matrix(n, &partition.to_matrix()).unwrap();
        prop_assert_eq!(&from_matrix, &partition);

        let from_masks = Partition::new(n, &partition.masks()).unwrap();
        prop_assert_eq!(&from_masks, &partition);

        let relabeled = Partition::from_labels(n, &partition.to_labels()).unwrap();
        prop_assert_eq!(&relabeled, &partition);

        let assigned = labels.iter().filter(|l| l.is_some()).count();
        prop_assert_eq!(partition.rank(), assigned);
        prop_assert!(partition.iter().all(|c| !c.is_empty()));
        let union = partition.iter().fold(Component::EMPTY, |all, c| {
            assert!(all.is_disjoint(c));
            all | c
        });
        prop_assert_eq!(union, partition.covered());
    }
}
