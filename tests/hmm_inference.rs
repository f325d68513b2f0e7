//! End-to-end inference tests across the public model surface.
//!
//! Exercises the discrete and continuous models together: likelihoods
//! against hand-computed values, decoding determinism, the shared
//! empty-sequence conventions, and stability of the scaled recursions on
//! sequences long enough to underflow a raw probability product.

use assert_approx_eq::assert_approx_eq;
use markov_inference::*;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

fn weather_model() -> HiddenMarkovModel {
    // Rain/dry states emitting umbrella/no-umbrella observations.
    HiddenMarkovModel::from_matrices(
        vec![vec![0.7, 0.3], vec![0.4, 0.6]],
        vec![vec![0.9, 0.1], vec![0.2, 0.8]],
        vec![0.6, 0.4],
    )
    .unwrap()
}

mod discrete_model {
    use super::*;

    #[test]
    fn test_evaluate_agrees_with_exhaustive_enumeration() {
        let hmm = weather_model();
        let observations = [0usize, 1, 1];

        // Brute-force sum over all 2^3 state paths.
        let a = hmm.transitions();
        let b = hmm.emissions();
        let pi = hmm.initial();
        let mut total = 0.0;
        for s0 in 0..2 {
            for s1 in 0..2 {
                for s2 in 0..2 {
                    total += pi[s0]
                        * b[s0][observations[0]]
                        * a[s0][s1]
                        * b[s1][observations[1]]
                        * a[s1][s2]
                        * b[s2][observations[2]];
                }
            }
        }

        assert_approx_eq!(hmm.evaluate(&observations).unwrap(), total, 1e-12);
    }

    #[test]
    fn test_decode_agrees_with_exhaustive_enumeration() {
        let hmm = weather_model();
        let observations = [0usize, 1, 0, 1];

        // Brute-force best path.
        let a = hmm.transitions();
        let b = hmm.emissions();
        let pi = hmm.initial();
        let mut best = (Vec::new(), f64::NEG_INFINITY);
        for mask in 0..16u32 {
            let path: Vec<usize> = (0..4).map(|t| ((mask >> t) & 1) as usize).collect();
            let mut p = pi[path[0]] * b[path[0]][observations[0]];
            for t in 1..4 {
                p *= a[path[t - 1]][path[t]] * b[path[t]][observations[t]];
            }
            if p > best.1 {
                best = (path, p);
            }
        }

        let (path, probability) = hmm.decode(&observations).unwrap();
        assert_eq!(path, best.0);
        assert_approx_eq!(probability, best.1, 1e-12);
    }

    #[test]
    fn test_log_likelihood_stays_finite_on_long_sequences() {
        let hmm = weather_model();
        let observations: Vec<usize> = (0..10_000).map(|i| i % 2).collect();
        let log_likelihood = hmm.evaluate_log(&observations).unwrap();
        assert!(log_likelihood.is_finite());
        // The raw probability underflows to zero at this length.
        assert_eq!(hmm.evaluate(&observations).unwrap(), 0.0);
    }

    #[test]
    fn test_forward_backward_public_contract() {
        let hmm = weather_model();
        let observations = [0usize, 0, 1];
        let pass = hmm.forward(&observations).unwrap();
        assert_eq!(pass.probabilities.len(), observations.len());
        assert_eq!(pass.scaling.len(), observations.len());

        let bwd = hmm.backward(&observations, &pass.scaling).unwrap();
        assert_eq!(bwd.len(), observations.len());
        for i in 0..hmm.states() {
            assert_approx_eq!(
                bwd[observations.len() - 1][i],
                1.0 / pass.scaling[observations.len() - 1],
                1e-12
            );
        }
    }

    #[test]
    fn test_repeated_evaluation_is_stable() {
        // Evaluate/Decode are pure with respect to the model.
        let hmm = weather_model();
        let observations = [1usize, 0, 1, 1, 0];
        let first = hmm.evaluate(&observations).unwrap();
        for _ in 0..10 {
            assert_eq!(hmm.evaluate(&observations).unwrap(), first);
        }
    }
}

mod continuous_model {
    use super::*;

    #[test]
    fn test_continuous_with_discrete_emissions_matches_discrete() {
        let discrete = weather_model();
        let continuous = ContinuousHiddenMarkovModel::from_parts(
            discrete.transitions().to_vec(),
            vec![
                EmissionDistribution::discrete(vec![0.9, 0.1]).unwrap(),
                EmissionDistribution::discrete(vec![0.2, 0.8]).unwrap(),
            ],
            discrete.initial().to_vec(),
        )
        .unwrap();

        let symbols = [0usize, 1, 1, 0, 1];
        let vectors: Vec<Vec<f64>> = symbols.iter().map(|&s| vec![s as f64]).collect();

        assert_approx_eq!(
            continuous.evaluate_log(&vectors).unwrap(),
            discrete.evaluate_log(&symbols).unwrap(),
            1e-12
        );
        assert_eq!(
            continuous.decode(&vectors).unwrap().0,
            discrete.decode(&symbols).unwrap().0
        );
        assert_eq!(
            continuous.most_likely_states(&vectors).unwrap(),
            discrete.most_likely_states(&symbols).unwrap()
        );
    }

    #[test]
    fn test_mixture_model_decodes_clustered_data() {
        let model = ContinuousHiddenMarkovModel::from_parts(
            vec![vec![0.95, 0.05], vec![0.05, 0.95]],
            vec![
                EmissionDistribution::gaussian_mixture(
                    vec![0.5, 0.5],
                    vec![
                        GaussianComponent {
                            mean: -3.0,
                            variance: 0.5,
                        },
                        GaussianComponent {
                            mean: -1.0,
                            variance: 0.5,
                        },
                    ],
                )
                .unwrap(),
                EmissionDistribution::gaussian(3.0, 1.0).unwrap(),
            ],
            vec![0.5, 0.5],
        )
        .unwrap();

        let sequence: Vec<Vec<f64>> = [-2.9, -1.2, -2.0, 3.1, 2.8, 3.3]
            .iter()
            .map(|&x| vec![x])
            .collect();
        let (path, _) = model.decode(&sequence).unwrap();
        assert_eq!(path, vec![0, 0, 0, 1, 1, 1]);
    }

    #[test]
    fn test_empty_sequence_conventions_match() {
        let discrete = weather_model();
        let continuous = ContinuousHiddenMarkovModel::from_parts(
            vec![vec![1.0]],
            vec![EmissionDistribution::gaussian(0.0, 1.0).unwrap()],
            vec![1.0],
        )
        .unwrap();

        assert_eq!(discrete.evaluate(&[]).unwrap(), 0.0);
        assert_eq!(continuous.evaluate(&[]).unwrap(), 0.0);
        assert_eq!(discrete.decode(&[]).unwrap(), (vec![], 0.0));
        assert_eq!(continuous.decode(&[]).unwrap(), (vec![], 0.0));
    }
}

mod seeded_construction {
    use super::*;

    #[test]
    fn test_random_topology_reproducible_from_seed() {
        let topology = Topology::ergodic_random(4).unwrap();

        let mut rng_a = ChaCha20Rng::seed_from_u64(2024);
        let mut rng_b = ChaCha20Rng::seed_from_u64(2024);
        let model_a = HiddenMarkovModel::new(&topology, 3, &mut rng_a).unwrap();
        let model_b = HiddenMarkovModel::new(&topology, 3, &mut rng_b).unwrap();
        assert_eq!(model_a, model_b);

        // A different seed produces a different transition matrix.
        let mut rng_c = ChaCha20Rng::seed_from_u64(2025);
        let model_c = HiddenMarkovModel::new(&topology, 3, &mut rng_c).unwrap();
        assert_ne!(model_a.transitions(), model_c.transitions());
    }

    #[test]
    fn test_models_from_same_seed_agree_on_inference() {
        let topology = Topology::ergodic_random(3).unwrap();
        let mut rng_a = ChaCha20Rng::seed_from_u64(99);
        let mut rng_b = ChaCha20Rng::seed_from_u64(99);
        let model_a = HiddenMarkovModel::new(&topology, 2, &mut rng_a).unwrap();
        let model_b = HiddenMarkovModel::new(&topology, 2, &mut rng_b).unwrap();

        let observations = [0usize, 1, 1, 0];
        assert_eq!(
            model_a.evaluate_log(&observations).unwrap(),
            model_b.evaluate_log(&observations).unwrap()
        );
    }
}
