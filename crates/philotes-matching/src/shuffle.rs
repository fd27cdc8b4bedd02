//! Unbiased in-place shuffle.

use rand::Rng;

/// Fisher–Yates shuffle: every permutation of `items` is equally likely.
///
/// Walks `i` from the last index down to 1 and swaps `items[i]` with a
/// uniformly drawn `items[j]`, `j ∈ [0, i]`. Empty and single-element
/// slices are left untouched.
pub fn fisher_yates_shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashMap;

    #[test]
    fn test_empty_and_singleton_are_noops() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut empty: Vec<u8> = Vec::new();
        fisher_yates_shuffle(&mut empty, &mut rng);
        assert!(empty.is_empty());

        let mut one = vec!["a"];
        fisher_yates_shuffle(&mut one, &mut rng);
        assert_eq!(one, vec!["a"]);
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut items: Vec<u32> = (0..50).collect();
        fisher_yates_shuffle(&mut items, &mut rng);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_same_seed_same_permutation() {
        let mut a: Vec<u32> = (0..20).collect();
        let mut b = a.clone();
        fisher_yates_shuffle(&mut a, &mut StdRng::seed_from_u64(99));
        fisher_yates_shuffle(&mut b, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn test_all_permutations_equally_likely() {
        // 3! = 6 permutations, 60k draws → ~10k each.
        let mut rng = StdRng::seed_from_u64(2024);
        let mut counts: HashMap<Vec<u8>, u32> = HashMap::new();
        for _ in 0..60_000 {
            let mut items = vec![0u8, 1, 2];
            fisher_yates_shuffle(&mut items, &mut rng);
            *counts.entry(items).or_default() += 1;
        }
        assert_eq!(counts.len(), 6);
        for (perm, count) in counts {
            assert!(
                (9_500..=10_500).contains(&count),
                "permutation {perm:?} drawn {count} times"
            );
        }
    }
}
