//! Batching policies
//!
//! A policy turns a collection of example lengths into an ordered sequence
//! of index batches. Length-clustered batching keeps examples of similar
//! length together to cut padding waste; shuffled batching trades that for
//! a uniform random permutation.

use crate::error::{Error, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sort key used by clustered batching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "key", rename_all = "snake_case")]
pub enum LengthKey {
    /// Exact example length
    Exact,

    /// Length rounded down to a bucket of the given granularity
    Bucketed { granularity: usize },
}

impl LengthKey {
    pub fn bucket_of(&self, len: usize) -> usize {
        match self {
            LengthKey::Exact => len,
            LengthKey::Bucketed { granularity } => len / granularity,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let LengthKey::Bucketed { granularity: 0 } = self {
            return Err(Error::InvalidParameter(
                "bucket granularity must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// How examples are grouped into mini-batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum BatchingPolicy {
    /// Random permutation chunked into fixed-size batches
    Shuffled { batch_size: usize },

    /// Sort by a length key, then chunk; bucketed keys shuffle within
    /// each bucket and never let a batch straddle two buckets
    Clustered {
        batch_size: usize,
        key: LengthKey,
        /// Shuffle within buckets and shuffle the final batch order
        shuffle: bool,
        /// Drop ragged batches (training only; loses examples)
        truncate_last: bool,
    },
}

impl BatchingPolicy {
    pub fn shuffled(batch_size: usize) -> Result<Self> {
        check_batch_size(batch_size)?;
        Ok(BatchingPolicy::Shuffled { batch_size })
    }

    pub fn clustered(
        batch_size: usize,
        key: LengthKey,
        shuffle: bool,
        truncate_last: bool,
    ) -> Result<Self> {
        check_batch_size(batch_size)?;
        key.validate()?;
        Ok(BatchingPolicy::Clustered {
            batch_size,
            key,
            shuffle,
            truncate_last,
        })
    }

    pub fn batch_size(&self) -> usize {
        match self {
            BatchingPolicy::Shuffled { batch_size }
            | BatchingPolicy::Clustered { batch_size, .. } => *batch_size,
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_batch_size(self.batch_size())?;
        if let BatchingPolicy::Clustered { key, .. } = self {
            key.validate()?;
        }
        Ok(())
    }

    /// Plan one epoch of batches over examples with the given lengths.
    ///
    /// Returns batches of example indices. Empty input yields no batches.
    pub fn plan<R: Rng>(&self, lengths: &[usize], rng: &mut R) -> Vec<Vec<usize>> {
        if lengths.is_empty() {
            return Vec::new();
        }
        match self {
            BatchingPolicy::Shuffled { batch_size } => {
                let mut order: Vec<usize> = (0..lengths.len()).collect();
                order.shuffle(rng);
                chunk(&order, *batch_size, false)
            }
            BatchingPolicy::Clustered {
                batch_size,
                key: LengthKey::Exact,
                shuffle,
                truncate_last,
            } => {
                let mut order: Vec<usize> = (0..lengths.len()).collect();
                order.sort_by_key(|&i| lengths[i]);
                let mut batches = chunk(&order, *batch_size, *truncate_last);
                if *shuffle {
                    batches.shuffle(rng);
                }
                batches
            }
            BatchingPolicy::Clustered {
                batch_size,
                key: key @ LengthKey::Bucketed { .. },
                shuffle,
                truncate_last,
            } => {
                let mut buckets: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
                for (i, &len) in lengths.iter().enumerate() {
                    buckets.entry(key.bucket_of(len)).or_default().push(i);
                }

                let mut batches = Vec::new();
                for bucket in buckets.values_mut() {
                    if *shuffle {
                        bucket.shuffle(rng);
                    }
                    batches.extend(chunk(bucket, *batch_size, *truncate_last));
                }
                if *shuffle {
                    batches.shuffle(rng);
                }
                batches
            }
        }
    }
}

fn check_batch_size(batch_size: usize) -> Result<()> {
    if batch_size == 0 {
        return Err(Error::InvalidParameter(
            "batch size must be positive".to_string(),
        ));
    }
    Ok(())
}

fn chunk(order: &[usize], batch_size: usize, truncate_last: bool) -> Vec<Vec<usize>> {
    let mut batches: Vec<Vec<usize>> = order.chunks(batch_size).map(|c| c.to_vec()).collect();
    if truncate_last {
        if let Some(last) = batches.last() {
            if last.len() < batch_size {
                batches.pop();
            }
        }
    }
    batches
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn flatten_sorted(batches: &[Vec<usize>]) -> Vec<usize> {
        let mut all: Vec<usize> = batches.iter().flatten().copied().collect();
        all.sort_unstable();
        all
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        assert!(BatchingPolicy::shuffled(0).is_err());
        assert!(BatchingPolicy::clustered(0, LengthKey::Exact, false, false).is_err());
        assert!(
            BatchingPolicy::clustered(8, LengthKey::Bucketed { granularity: 0 }, false, false)
                .is_err()
        );
    }

    #[test]
    fn test_empty_input_yields_no_batches() {
        let policy = BatchingPolicy::shuffled(8).unwrap();
        assert!(policy.plan(&[], &mut rng()).is_empty());
    }

    #[test]
    fn test_shuffled_count_and_coverage() {
        let lengths: Vec<usize> = (0..23).map(|i| 10 + i % 5).collect();
        let policy = BatchingPolicy::shuffled(5).unwrap();
        let batches = policy.plan(&lengths, &mut rng());

        assert_eq!(batches.len(), 5); // ceil(23 / 5)
        assert_eq!(flatten_sorted(&batches), (0..23).collect::<Vec<_>>());
    }

    #[test]
    fn test_clustered_exact_sorts_by_length() {
        let lengths = vec![30, 5, 18, 7, 25, 6];
        let policy = BatchingPolicy::clustered(2, LengthKey::Exact, false, false).unwrap();
        let batches = policy.plan(&lengths, &mut rng());

        assert_eq!(batches.len(), 3);
        // Without shuffling, batches come out in ascending length order
        let batch_lens: Vec<Vec<usize>> = batches
            .iter()
            .map(|b| b.iter().map(|&i| lengths[i]).collect())
            .collect();
        assert_eq!(batch_lens, vec![vec![5, 6], vec![7, 18], vec![25, 30]]);
    }

    #[test]
    fn test_truncate_last_drops_ragged_batch() {
        let lengths = vec![4; 10];
        let policy = BatchingPolicy::clustered(3, LengthKey::Exact, false, true).unwrap();
        let batches = policy.plan(&lengths, &mut rng());

        assert_eq!(batches.len(), 3);
        assert!(batches.iter().all(|b| b.len() == 3));
    }

    #[test]
    fn test_bucketed_batches_stay_within_bucket() {
        let lengths: Vec<usize> = (0..100).map(|i| (i * 13) % 60).collect();
        let granularity = 3;
        let policy = BatchingPolicy::clustered(
            8,
            LengthKey::Bucketed { granularity },
            true,
            false,
        )
        .unwrap();

        let batches = policy.plan(&lengths, &mut rng());
        assert_eq!(flatten_sorted(&batches), (0..100).collect::<Vec<_>>());

        for batch in &batches {
            let max = batch.iter().map(|&i| lengths[i]).max().unwrap();
            let min = batch.iter().map(|&i| lengths[i]).min().unwrap();
            assert!(max - min < granularity, "spread {} in bucket batch", max - min);
        }
    }

    #[test]
    fn test_single_bucket_gives_ceil_batches() {
        // All lengths fall in one bucket, so the ceil(N/B) count applies
        let lengths = vec![10, 11, 10, 11, 10, 11, 10];
        let policy = BatchingPolicy::clustered(
            3,
            LengthKey::Bucketed { granularity: 5 },
            false,
            false,
        )
        .unwrap();
        assert_eq!(policy.plan(&lengths, &mut rng()).len(), 3);
    }

    #[test]
    fn test_policy_serde_round_trip() {
        let policy = BatchingPolicy::clustered(
            60,
            LengthKey::Bucketed { granularity: 3 },
            true,
            false,
        )
        .unwrap();
        let yaml = serde_yaml::to_string(&policy).unwrap();
        let restored: BatchingPolicy = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(restored, policy);
    }
}
