use calib_mi::{kernel_density, Bandwidth, MiError, MutualInformation, LEVELS};
use float_eq::assert_float_eq;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

fn rng() -> Pcg64 {
    Pcg64::from_seed([7; 32])
}

#[test]
fn constant_signals_score_zero() {
    let score = MutualInformation::default()
        .score(&[128; 50], &[17; 50])
        .unwrap();
    assert_eq!(score, 0.0);
}

#[test]
fn too_few_samples() {
    let scorer = MutualInformation::default();
    assert_eq!(
        scorer.score(&[3], &[4]),
        Err(MiError::InsufficientSamples { found: 1 })
    );
    assert_eq!(
        scorer.score(&[], &[]),
        Err(MiError::InsufficientSamples { found: 0 })
    );
}

#[test]
fn mismatched_lengths() {
    assert_eq!(
        MutualInformation::default().score(&[1, 2, 3], &[1, 2]),
        Err(MiError::LengthMismatch {
            reflectivity: 3,
            intensity: 2
        })
    );
}

#[test]
fn dependent_signals_score_higher() {
    let mut rng = rng();
    let reflectivity: Vec<u8> = (0..2000).map(|_| rng.gen()).collect();
    let dependent: Vec<u8> = reflectivity
        .iter()
        .map(|&r| r.saturating_add(rng.gen_range(0..8)))
        .collect();
    let independent: Vec<u8> = (0..2000).map(|_| rng.gen()).collect();

    let scorer = MutualInformation::default();
    let aligned = scorer.score(&reflectivity, &dependent).unwrap();
    let unaligned = scorer.score(&reflectivity, &independent).unwrap();
    assert!(aligned > unaligned, "{} <= {}", aligned, unaligned);
}

#[test]
fn kernel_density_matches_direct_evaluation() {
    let mut rng = rng();
    let samples: Vec<u8> = (0..300).map(|_| rng.gen_range(40..200)).collect();
    let n = samples.len() as f64;
    let mean = samples.iter().map(|&s| f64::from(s)).sum::<f64>() / n;
    let variance = samples
        .iter()
        .map(|&s| (f64::from(s) - mean).powi(2))
        .sum::<f64>()
        / (n - 1.0);

    for bandwidth in [Bandwidth::Scott, Bandwidth::Silverman, Bandwidth::Factor(0.4)] {
        let h = variance.sqrt() * bandwidth.factor(samples.len());
        let density = kernel_density(&samples, bandwidth);
        assert_eq!(density.len(), LEVELS);
        for x in (0..LEVELS).step_by(17) {
            let expected = samples
                .iter()
                .map(|&s| {
                    let z = (x as f64 - f64::from(s)) / h;
                    (-0.5 * z * z).exp()
                })
                .sum::<f64>()
                / (n * h * (2.0 * std::f64::consts::PI).sqrt());
            assert_float_eq!(density[x], expected, abs <= 1e-12);
        }
    }
}

#[test]
fn score_is_symmetric_in_its_arguments() {
    let mut rng = rng();
    let a: Vec<u8> = (0..500).map(|_| rng.gen_range(0..100)).collect();
    let b: Vec<u8> = a.iter().map(|&x| x / 2 + rng.gen_range(0..20)).collect();
    let scorer = MutualInformation::default();
    assert_float_eq!(
        scorer.score(&a, &b).unwrap(),
        scorer.score(&b, &a).unwrap(),
        rmax <= 1e-9
    );
}
