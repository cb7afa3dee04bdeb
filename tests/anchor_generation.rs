use priorbox::lowlevel::FeatureGrid;
use priorbox::{generate, AnchorConfig, PriorBoxError, PriorSet};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn expected_count(width: usize, height: usize, strides: &[f32], min_boxes: &[Vec<f32>]) -> usize {
    strides
        .iter()
        .zip(min_boxes)
        .map(|(&s, sizes)| {
            let gw = (width as f32 / s).ceil() as usize;
            let gh = (height as f32 / s).ceil() as usize;
            gw * gh * sizes.len()
        })
        .sum()
}

#[test]
fn count_matches_formula_for_random_pyramids() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..50 {
        let width = rng.random_range(16..400usize);
        let height = rng.random_range(16..400usize);
        let levels = rng.random_range(1..5usize);
        let strides: Vec<f32> = (0..levels)
            .map(|_| rng.random_range(4..80u32) as f32)
            .collect();
        let min_boxes: Vec<Vec<f32>> = (0..levels)
            .map(|_| {
                let n = rng.random_range(0..4usize);
                (0..n).map(|_| rng.random_range(1.0..500.0f32)).collect()
            })
            .collect();

        let priors = generate(width, height, &strides, &min_boxes).unwrap();
        assert_eq!(
            priors.len(),
            expected_count(width, height, &strides, &min_boxes)
        );
        for prior in priors.iter() {
            assert!(prior.is_normalized(), "prior out of range: {prior:?}");
        }
    }
}

#[test]
fn levels_are_emitted_in_stride_order() {
    let cfg = AnchorConfig::default();
    let priors = PriorSet::generate(&cfg).unwrap();

    // First level: 40x30 cells with three sizes each.
    let first_level = 40 * 30 * 3;
    assert!((priors[0].width - 10.0 / 320.0).abs() < 1e-6);
    assert!((priors[first_level - 1].width - 24.0 / 320.0).abs() < 1e-6);
    assert!((priors[first_level].width - 32.0 / 320.0).abs() < 1e-6);

    // Last prior is the bottom-right cell of the coarsest level, clipped size.
    let last = priors[priors.len() - 1];
    let grid = FeatureGrid::new(320, 240, 64.0).unwrap();
    let (cx, cy) = grid.cell_center(grid.width() - 1, grid.height() - 1);
    assert!((last.center_x - cx).abs() < 1e-6);
    assert!((last.center_y - cy).abs() < 1e-6);
    assert_eq!(last.height, 1.0);
    assert!((last.width - 0.8).abs() < 1e-6);
}

#[test]
fn rows_advance_after_a_full_row_of_cells() {
    let priors = generate(32, 16, &[8.0], &[vec![8.0]]).unwrap();
    // 4 columns x 2 rows; the fifth prior starts the second row.
    assert_eq!(priors.len(), 8);
    assert!((priors[3].center_x - 0.875).abs() < 1e-6);
    assert!((priors[3].center_y - 0.25).abs() < 1e-6);
    assert!((priors[4].center_x - 0.125).abs() < 1e-6);
    assert!((priors[4].center_y - 0.75).abs() < 1e-6);
}

#[test]
fn generation_is_deterministic() {
    let cfg = AnchorConfig::default();
    assert_eq!(
        PriorSet::generate(&cfg).unwrap(),
        PriorSet::generate(&cfg).unwrap()
    );
}

#[test]
fn sub_pixel_strides_are_configuration_errors() {
    let err = generate(320, 240, &[1e-9], &[vec![10.0]]).unwrap_err();
    assert!(err.is_configuration());

    let cfg = AnchorConfig {
        strides: vec![1e-9],
        min_boxes: vec![vec![10.0]],
        ..AnchorConfig::default()
    };
    assert!(cfg.validate().unwrap_err().is_configuration());
    assert!(cfg.expected_len().unwrap_err().is_configuration());
}

#[test]
fn prior_count_overflow_is_a_configuration_error() {
    let err = generate(usize::MAX, usize::MAX, &[1.0], &[vec![10.0]]).unwrap_err();
    assert_eq!(err, PriorBoxError::InvalidConfig("prior count overflows"));

    let err = FeatureGrid::new(usize::MAX, usize::MAX, 1.0).unwrap_err();
    assert!(err.is_configuration());
}

#[cfg(target_pointer_width = "64")]
#[test]
fn overflow_across_box_sizes_is_caught() {
    // 2^63 cells fit in usize; two sizes per cell do not.
    let cfg = AnchorConfig {
        input_width: 1 << 32,
        input_height: 1 << 31,
        strides: vec![1.0],
        min_boxes: vec![vec![8.0, 16.0]],
    };
    assert_eq!(
        cfg.expected_len().unwrap_err(),
        PriorBoxError::InvalidConfig("prior count overflows")
    );
    assert!(PriorSet::generate(&cfg).is_err());
}
