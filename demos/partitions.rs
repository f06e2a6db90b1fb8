use mincomp::{bell_number, Component, SetPartitions};

fn main() {
    let n = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(4);

    let mut partitions = SetPartitions::new(n);
    let mut slots = vec![Component::EMPTY; n];
    let mut count: u128 = 0;
    loop {
        partitions.fill_slots(&mut slots);
        let names: Vec<String> = slots
            .iter()
            .filter(|c| !c.is_empty())
            .map(|c| c.to_bit_string(n))
            .collect();
        println!("{}", names.join(":"));
        count += 1;
        if !partitions.advance() {
            break;
        }
    }

    println!("{} partitions of {} variables", count, n);
    assert_eq!(Some(count), bell_number(n));
}
