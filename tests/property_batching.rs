//! Property tests for batching policies

use comprender::data::{BatchingPolicy, LengthKey};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn flatten_sorted(batches: &[Vec<usize>]) -> Vec<usize> {
    let mut all: Vec<usize> = batches.iter().flatten().copied().collect();
    all.sort_unstable();
    all
}

fn ceil_div(n: usize, b: usize) -> usize {
    (n + b - 1) / b
}

proptest! {
    #[test]
    fn prop_shuffled_count_and_coverage(
        lengths in proptest::collection::vec(1usize..500, 0..200),
        batch_size in 1usize..32,
        seed in any::<u64>(),
    ) {
        let policy = BatchingPolicy::shuffled(batch_size).unwrap();
        let batches = policy.plan(&lengths, &mut StdRng::seed_from_u64(seed));

        prop_assert_eq!(batches.len(), ceil_div(lengths.len(), batch_size));
        prop_assert_eq!(flatten_sorted(&batches), (0..lengths.len()).collect::<Vec<_>>());
    }

    #[test]
    fn prop_clustered_exact_count_and_coverage(
        lengths in proptest::collection::vec(1usize..500, 0..200),
        batch_size in 1usize..32,
        shuffle in any::<bool>(),
        seed in any::<u64>(),
    ) {
        let policy = BatchingPolicy::clustered(batch_size, LengthKey::Exact, shuffle, false).unwrap();
        let batches = policy.plan(&lengths, &mut StdRng::seed_from_u64(seed));

        prop_assert_eq!(batches.len(), ceil_div(lengths.len(), batch_size));
        prop_assert_eq!(flatten_sorted(&batches), (0..lengths.len()).collect::<Vec<_>>());
    }

    #[test]
    fn prop_bucketed_coverage_and_spread(
        lengths in proptest::collection::vec(1usize..300, 0..200),
        batch_size in 1usize..32,
        granularity in 1usize..20,
        seed in any::<u64>(),
    ) {
        let policy = BatchingPolicy::clustered(
            batch_size,
            LengthKey::Bucketed { granularity },
            true,
            false,
        )
        .unwrap();
        let batches = policy.plan(&lengths, &mut StdRng::seed_from_u64(seed));

        // Every example appears exactly once
        prop_assert_eq!(flatten_sorted(&batches), (0..lengths.len()).collect::<Vec<_>>());

        // Within a batch, length spread is bounded by the granularity
        for batch in &batches {
            let max = batch.iter().map(|&i| lengths[i]).max().unwrap();
            let min = batch.iter().map(|&i| lengths[i]).min().unwrap();
            prop_assert!(max - min < granularity);
        }

        // No batch exceeds the configured size
        prop_assert!(batches.iter().all(|b| !b.is_empty() && b.len() <= batch_size));
    }

    #[test]
    fn prop_truncate_only_drops_ragged_batches(
        lengths in proptest::collection::vec(1usize..300, 0..200),
        batch_size in 1usize..32,
        seed in any::<u64>(),
    ) {
        let policy =
            BatchingPolicy::clustered(batch_size, LengthKey::Exact, false, true).unwrap();
        let batches = policy.plan(&lengths, &mut StdRng::seed_from_u64(seed));

        prop_assert_eq!(batches.len(), lengths.len() / batch_size);
        prop_assert!(batches.iter().all(|b| b.len() == batch_size));
    }

    #[test]
    fn prop_same_seed_same_plan(
        lengths in proptest::collection::vec(1usize..300, 0..100),
        batch_size in 1usize..16,
        seed in any::<u64>(),
    ) {
        let policy = BatchingPolicy::shuffled(batch_size).unwrap();
        let a = policy.plan(&lengths, &mut StdRng::seed_from_u64(seed));
        let b = policy.plan(&lengths, &mut StdRng::seed_from_u64(seed));
        prop_assert_eq!(a, b);
    }
}
