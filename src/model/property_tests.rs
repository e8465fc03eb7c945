//! Property tests for the layer-descriptor tree
//!
//! Tests serde round-trips and structural invariance under scalar changes.

#[cfg(test)]
mod tests {
    use crate::model::*;
    use proptest::prelude::*;

    // ============================================================
    // Arbitrary Generators
    // ============================================================

    fn arb_activation() -> impl Strategy<Value = Activation> {
        prop_oneof![
            Just(Activation::Relu),
            Just(Activation::Tanh),
            Just(Activation::Sigmoid),
            Just(Activation::Linear),
        ]
    }

    fn arb_keep_prob() -> impl Strategy<Value = f32> {
        // Step the probability so serde text round-trips are exact
        (0u32..=10).prop_map(|i| i as f32 / 10.0)
    }

    fn arb_cell() -> impl Strategy<Value = RecurrentCell> {
        (1usize..512, arb_keep_prob(), any::<bool>()).prop_map(|(hidden, keep_prob, lstm)| {
            if lstm {
                RecurrentCell::Lstm { hidden, keep_prob }
            } else {
                RecurrentCell::Gru { hidden, keep_prob }
            }
        })
    }

    fn arb_similarity() -> impl Strategy<Value = Similarity> {
        prop_oneof![
            any::<bool>().prop_map(|bias| Similarity::TriLinear { bias }),
            Just(Similarity::Dot),
        ]
    }

    fn arb_merge() -> impl Strategy<Value = AttentionMerge> {
        prop_oneof![
            Just(AttentionMerge::Concat),
            Just(AttentionMerge::ConcatWithProduct),
            any::<bool>().prop_map(|include_tiled| AttentionMerge::WithProjectedProduct {
                include_tiled
            }),
        ]
    }

    fn arb_leaf_mapper() -> impl Strategy<Value = SequenceMapper> {
        prop_oneof![
            Just(SequenceMapper::Null),
            arb_keep_prob().prop_map(|keep_prob| SequenceMapper::Dropout { keep_prob }),
            (1usize..512, arb_activation())
                .prop_map(|(units, activation)| SequenceMapper::FullyConnected {
                    units,
                    activation
                }),
            arb_activation().prop_map(|activation| SequenceMapper::Highway { activation }),
            (1usize..256, 1usize..8, arb_keep_prob()).prop_map(
                |(filters, kernel_width, keep_prob)| SequenceMapper::Conv1d {
                    filters,
                    kernel_width,
                    keep_prob
                }
            ),
            (arb_similarity(), arb_merge())
                .prop_map(|(similarity, merge)| SequenceMapper::SelfAttention {
                    similarity,
                    merge
                }),
            arb_cell().prop_map(|cell| SequenceMapper::BiRecurrent { cell }),
        ]
    }

    fn arb_mapper() -> impl Strategy<Value = SequenceMapper> {
        arb_leaf_mapper().prop_recursive(3, 16, 4, |inner| {
            prop_oneof![
                inner.clone().prop_map(SequenceMapper::residual),
                (
                    prop_oneof![Just(ReduceOp::Max), Just(ReduceOp::Mean), Just(ReduceOp::Sum)],
                    inner.clone()
                )
                    .prop_map(|(op, m)| SequenceMapper::reduce(op, m)),
                proptest::collection::vec(inner, 1..4).prop_map(SequenceMapper::seq),
            ]
        })
    }

    // ============================================================
    // Properties
    // ============================================================

    proptest! {
        #[test]
        fn prop_mapper_yaml_round_trip(mapper in arb_mapper()) {
            let yaml = serde_yaml::to_string(&mapper).unwrap();
            let restored: SequenceMapper = serde_yaml::from_str(&yaml).unwrap();
            prop_assert_eq!(restored, mapper);
        }

        #[test]
        fn prop_mapper_json_round_trip(mapper in arb_mapper()) {
            let json = serde_json::to_string(&mapper).unwrap();
            let restored: SequenceMapper = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(restored, mapper);
        }

        #[test]
        fn prop_generated_mappers_validate(mapper in arb_mapper()) {
            prop_assert!(mapper.validate().is_ok());
        }

        #[test]
        fn prop_node_count_ignores_keep_prob(keep_a in arb_keep_prob(), keep_b in arb_keep_prob()) {
            let tree = |keep: f32| SequenceMapper::seq(vec![
                SequenceMapper::Dropout { keep_prob: keep },
                SequenceMapper::residual(SequenceMapper::Conv1d {
                    filters: 100,
                    kernel_width: 5,
                    keep_prob: keep,
                }),
            ]);
            prop_assert_eq!(tree(keep_a).node_count(), tree(keep_b).node_count());
        }

        #[test]
        fn prop_node_count_positive(mapper in arb_mapper()) {
            prop_assert!(mapper.node_count() >= 1);
        }
    }
}
