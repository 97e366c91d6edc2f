use harness::pointwise::{add, multiply, scalar_multiply, subtract};
use harness::{generate_random_vector, HarnessError};
use proptest::prelude::*;

proptest! {
    #[test]
    fn generate_is_deterministic(size in 0usize..2048, seed in any::<u64>()) {
        let a = generate_random_vector(size, seed);
        let b = generate_random_vector(size, seed);
        prop_assert_eq!(a.len(), size);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn binary_ops_preserve_length(
        pair in (0usize..256).prop_flat_map(|n| (
            prop::collection::vec(-1e6f64..1e6, n),
            prop::collection::vec(-1e6f64..1e6, n),
        ))
    ) {
        let (a, b) = pair;
        prop_assert_eq!(add(&a, &b).unwrap().len(), a.len());
        prop_assert_eq!(subtract(&a, &b).unwrap().len(), a.len());
        prop_assert_eq!(multiply(&a, &b).unwrap().len(), a.len());
    }

    #[test]
    fn scalar_multiply_preserves_length(a in prop::collection::vec(-1e6f64..1e6, 0..256), k in -10.0f64..10.0) {
        prop_assert_eq!(scalar_multiply(&a, k).len(), a.len());
    }

    #[test]
    fn mismatched_lengths_are_rejected(
        a in prop::collection::vec(0.0f64..1.0, 0..64),
        b in prop::collection::vec(0.0f64..1.0, 0..64),
    ) {
        prop_assume!(a.len() != b.len());
        let expected = HarnessError::LengthMismatch { left: a.len(), right: b.len() };
        prop_assert_eq!(add(&a, &b), Err(expected.clone()));
        prop_assert_eq!(subtract(&a, &b), Err(expected.clone()));
        prop_assert_eq!(multiply(&a, &b), Err(expected));
    }

    #[test]
    fn adding_a_vector_to_itself_doubles_it(a in prop::collection::vec(0.1f64..5.0, 1..128)) {
        let sum = add(&a, &a).unwrap();
        let doubled = scalar_multiply(&a, 2.0);
        prop_assert_eq!(sum, doubled);
    }
}
