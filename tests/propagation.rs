use approx::assert_abs_diff_eq;
use nalgebra::DMatrix;
use superpixel_lgc::annotations::PointAnnotation;
use superpixel_lgc::image::Partition;
use superpixel_lgc::stages::{
    broadcast_labels, decode_labels, init_label_matrix, normalize_affinity, propagate,
    solve_normalized, LabelRemapMode,
};
use superpixel_lgc::LgcError;

const SENTINEL: u32 = 99;

fn chain_affinity() -> DMatrix<f64> {
    DMatrix::from_row_slice(3, 3, &[0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0])
}

#[test]
fn three_region_chain_matches_closed_form() {
    let partition = Partition::from_rows(&[vec![0, 1, 2, SENTINEL]]).unwrap();
    let train = [
        PointAnnotation::labeled(1, 0, 0),
        PointAnnotation::labeled(2, 2, 0),
    ];
    let labels = init_label_matrix(
        &partition,
        3,
        2,
        SENTINEL,
        &LabelRemapMode::Identity,
        &train,
    );
    assert_eq!(labels.labeled_regions(), 2);

    let f = propagate(&chain_affinity(), &labels.y, 1.0).unwrap();
    let a = 0.5 / 2f64.sqrt();
    let mid = 0.5 * a / (1.0 - 2.0 * a * a);
    assert_abs_diff_eq!(f[(0, 0)], 0.5 + a * mid, epsilon = 1e-12);
    assert_abs_diff_eq!(f[(1, 0)], mid, epsilon = 1e-12);
    assert_abs_diff_eq!(f[(1, 1)], mid, epsilon = 1e-12);

    // the middle region is an exact tie and goes to the lower class
    let hard = decode_labels(&f);
    assert_eq!(hard, vec![1, 1, 2]);
    let map = broadcast_labels(&partition, &hard, SENTINEL).unwrap();
    assert_eq!(map.data, vec![1, 1, 2, SENTINEL]);
}

#[test]
fn isolated_region_is_a_degenerate_graph() {
    let mut w = chain_affinity();
    w[(1, 2)] = 0.0;
    w[(2, 1)] = 0.0;
    let y = DMatrix::from_row_slice(3, 1, &[1.0, 0.0, 0.0]);
    assert_eq!(
        propagate(&w, &y, 0.1),
        Err(LgcError::DegenerateGraph {
            region: 2,
            degree: 0.0
        })
    );
}

#[test]
fn normalized_zero_graph_only_rescales_seeds() {
    let y = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
    let f = solve_normalized(&DMatrix::zeros(3, 3), &y, 0.1).unwrap();
    assert_abs_diff_eq!(f, y * (0.1 / 1.1), epsilon = 1e-15);
}

#[test]
fn normalization_is_symmetric_with_unit_spectral_bound() {
    let s = normalize_affinity(&chain_affinity()).unwrap();
    assert_eq!(s, s.transpose());
    let eig = s.symmetric_eigenvalues();
    assert!(eig.iter().all(|&l| l.abs() <= 1.0 + 1e-12));
}
