//! End-to-end tests for the labeled series store.
//!
//! ## Test Organization
//!
//! 1. **Registration** - duplicate tags, failing loaders
//! 2. **Segmentation** - partition sizes and paired half-cycles
//! 3. **Derived series** - 2θ/Q conversion through the store
//! 4. **Figures** - CP and EIS figures built from stored groups

use approx::assert_abs_diff_eq;

use rusty_echem::config::FigureConfig;
use rusty_echem::data::model::{Series, SeriesKind, XAxis};
use rusty_echem::data::partition::{partition, partition_paired, PairPolicy};
use rusty_echem::data::store::SeriesStore;
use rusty_echem::data::transform::{angle_to_momentum_transfer, momentum_transfer_to_angle};
use rusty_echem::figure::{cp_figure, eis_figure};
use rusty_echem::SeriesError;

fn cp_kind(n: usize) -> SeriesKind {
    SeriesKind::Cp {
        time: (0..n).map(|i| i as f64).collect(),
        potential: (0..n).map(|i| 0.05 + 0.001 * i as f64).collect(),
    }
}

// ============================================================================
// Registration
// ============================================================================

#[test]
fn test_same_tag_twice_fails() {
    let mut store = SeriesStore::new();
    store.labeled_import("LiCoO2", || Ok(cp_kind(3))).unwrap();
    let err = store.labeled_import("LiCoO2", || Ok(cp_kind(3))).unwrap_err();
    assert!(matches!(err, SeriesError::DuplicateTag(_)));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_unequal_columns_fail_registration() {
    let mut store = SeriesStore::new();
    let err = store
        .labeled_import("bad", || {
            Ok(SeriesKind::Cp {
                time: Series::from(vec![0.0, 1.0]),
                potential: Series::from(vec![0.1]),
            })
        })
        .unwrap_err();
    assert!(matches!(err, SeriesError::LengthMismatch { .. }));
    assert!(!store.contains("bad"));
}

// ============================================================================
// Segmentation
// ============================================================================

#[test]
fn test_partition_scenario() {
    let s = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
    let p = partition(&s, 3).unwrap();
    assert_eq!(p.num_cycles(), 2);
    assert_eq!(p.get(0).unwrap(), &[1.0, 2.0, 3.0]);
    assert_eq!(p.get(1).unwrap(), &[4.0, 5.0, 6.0]);
    assert!(p.get(2).is_none());
}

#[test]
fn test_paired_partition_iterates_min() {
    let pos: Vec<f64> = (0..9).map(f64::from).collect();
    let neg: Vec<f64> = (0..6).map(|i| -f64::from(i)).collect();
    let paired = partition_paired(&pos, &neg, 3).unwrap();
    assert_eq!(paired.num_cycles_a(), 3);
    assert_eq!(paired.num_cycles_b(), 2);

    let n = paired.paired_count(PairPolicy::Truncate).unwrap();
    let visited: Vec<usize> = (0..n)
        .map(|i| paired.a.get(i).unwrap().len() + paired.b.get(i).unwrap().len())
        .collect();
    assert_eq!(visited, [6, 6]);
}

// ============================================================================
// Derived series
// ============================================================================

#[test]
fn test_round_trip_through_q() {
    let q = angle_to_momentum_transfer(&[30.0], 1.54).unwrap();
    let angle = momentum_transfer_to_angle(&q, 1.54).unwrap();
    assert_abs_diff_eq!(angle[0], 30.0, epsilon = 1e-9);
}

#[test]
fn test_store_conversion_uses_wavelength() {
    let mut store = SeriesStore::new();
    store
        .labeled_import("pattern", || {
            Ok(SeriesKind::Xrd {
                axis: XAxis::TwoTheta,
                x: Series::from(vec![20.0, 40.0]),
                intensity: Series::from(vec![1.0, 1.0]),
                uncertainty: Some(Series::from(vec![0.1, 0.1])),
            })
        })
        .unwrap();

    let cu = store.with_axis("pattern", XAxis::Q, 1.54).unwrap();
    let mo = store.with_axis("pattern", XAxis::Q, 0.71).unwrap();
    let q_cu = cu.column("x").unwrap();
    let q_mo = mo.column("x").unwrap();
    assert_abs_diff_eq!(q_cu[0] * 1.54, q_mo[0] * 0.71, epsilon = 1e-12);
    assert!(cu.column("uncertainty").is_some());

    assert!(matches!(
        store.with_axis("pattern", XAxis::Q, 0.0),
        Err(SeriesError::InvalidArgument(_))
    ));
}

// ============================================================================
// Figures
// ============================================================================

#[test]
fn test_cp_figure_from_store() {
    let mut store = SeriesStore::new();
    store.labeled_import("pos", || Ok(cp_kind(9))).unwrap();
    store.labeled_import("neg", || Ok(cp_kind(6))).unwrap();

    let config = FigureConfig {
        cycle_pts: 3,
        ..Default::default()
    };
    let fig = cp_figure(
        store.get("pos").unwrap(),
        store.get("neg").unwrap(),
        &config,
    )
    .unwrap();
    assert_eq!(fig.lines.len(), 4);
    assert!(fig.lines.iter().all(|l| l.points.len() == 3));
}

#[test]
fn test_cp_figure_with_cycles_longer_than_data() {
    let mut store = SeriesStore::new();
    store.labeled_import("pos", || Ok(cp_kind(4))).unwrap();
    store.labeled_import("neg", || Ok(cp_kind(4))).unwrap();

    let config = FigureConfig {
        cycle_pts: 10,
        ..Default::default()
    };
    let fig = cp_figure(
        store.get("pos").unwrap(),
        store.get("neg").unwrap(),
        &config,
    )
    .unwrap();
    assert!(fig.lines.is_empty());
    assert!(fig.texts.iter().any(|t| t.text == "0 Cycles"));
}

#[test]
fn test_eis_figure_sorts_by_time() {
    let mut store = SeriesStore::new();
    store
        .labeled_import("eis", || {
            Ok(SeriesKind::Eis {
                time: Series::from(vec![3.0, 2.0, 1.0, 0.0]),
                re_z: Series::from(vec![13.0, 12.0, 11.0, 10.0]),
                neg_im_z: Series::from(vec![3.0, 2.0, 1.0, 0.0]),
            })
        })
        .unwrap();

    let config = FigureConfig {
        cycle_pts: 2,
        ..Default::default()
    };
    let fig = eis_figure(store.get("eis").unwrap(), &config).unwrap();
    assert_eq!(fig.lines.len(), 2);
    assert_eq!(fig.lines[0].points, vec![[10.0, 0.0], [11.0, 1.0]]);
    assert_eq!(fig.lines[0].name.as_deref(), Some("Cycle 1"));
}
