// SPDX-FileCopyrightText: 2026 Procflow contributors
// SPDX-License-Identifier: LicenseRef-Procflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Procflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use glam::DVec2;
use rstest::rstest;

use super::{distance_to_polyline, head_geometry, route, HeadShape, Rect};
use crate::model::ArrowType;

const SIZE: f64 = 15.0;
const MIN_LEN: f64 = 0.001;

fn line() -> Vec<DVec2> {
    vec![DVec2::new(0.0, 0.0), DVec2::new(100.0, 0.0)]
}

fn approx(a: DVec2, b: DVec2) -> bool {
    a.distance(b) < 1e-9
}

#[rstest]
#[case(ArrowType::None)]
#[case(ArrowType::Group)]
fn headless_kinds_have_no_geometry(#[case] arrow_type: ArrowType) {
    assert!(head_geometry(arrow_type, &line(), SIZE, MIN_LEN).is_empty());
    let long = vec![DVec2::ZERO, DVec2::new(5.0, 5.0), DVec2::new(500.0, 20.0)];
    assert!(head_geometry(arrow_type, &long, SIZE, MIN_LEN).is_empty());
}

#[test]
fn fewer_than_two_points_yield_no_head() {
    assert!(head_geometry(ArrowType::Start, &[], SIZE, MIN_LEN).is_empty());
    assert!(head_geometry(ArrowType::Start, &[DVec2::ONE], SIZE, MIN_LEN).is_empty());
}

#[test]
fn start_gets_a_kite_at_the_end() {
    let head = head_geometry(ArrowType::Start, &line(), SIZE, MIN_LEN);
    assert_eq!(head.len(), 1);
    let HeadShape::Kite([wing1, tip, wing2]) = head[0] else {
        panic!("expected kite");
    };
    assert!(approx(tip, DVec2::new(100.0, 0.0)));
    let back = 100.0 - SIZE * 0.55;
    assert!(approx(wing1, DVec2::new(back, SIZE * 0.4)));
    assert!(approx(wing2, DVec2::new(back, -SIZE * 0.4)));
}

#[test]
fn reset_reset_has_kites_at_both_ends() {
    let head = head_geometry(ArrowType::ResetReset, &line(), SIZE, MIN_LEN);
    assert_eq!(head.len(), 2);
    let HeadShape::Kite([_, end_tip, _]) = head[0] else {
        panic!("expected end kite");
    };
    let HeadShape::Kite([wing, start_tip, _]) = head[1] else {
        panic!("expected start kite");
    };
    assert!(approx(end_tip, DVec2::new(100.0, 0.0)));
    assert!(approx(start_tip, DVec2::ZERO));
    // The start kite points backward, so its wings sit inside the line.
    assert!(wing.x > 0.0);
}

#[test]
fn start_reset_has_a_square_at_the_source() {
    let head = head_geometry(ArrowType::StartReset, &line(), SIZE, MIN_LEN);
    assert_eq!(head.len(), 2);
    let HeadShape::Square(corners) = head[1] else {
        panic!("expected square");
    };
    let half = SIZE * 0.25;
    assert!(corners.iter().all(|corner| corner.x >= -1e-9 && corner.x <= SIZE * 0.5 + 1e-9));
    assert!(corners.iter().all(|corner| (corner.y.abs() - half).abs() < 1e-9));
}

#[test]
fn degenerate_trailing_segments_are_skipped() {
    let points = vec![
        DVec2::new(0.0, 0.0),
        DVec2::new(0.0, 50.0),
        DVec2::new(0.0, 50.0),
    ];
    let head = head_geometry(ArrowType::Reset, &points, SIZE, MIN_LEN);
    let HeadShape::Kite([wing1, tip, _]) = head[0] else {
        panic!("expected kite");
    };
    assert!(approx(tip, DVec2::new(0.0, 50.0)));
    assert!(wing1.y < 50.0);

    let all_same = vec![DVec2::ONE, DVec2::ONE];
    assert!(head_geometry(ArrowType::Start, &all_same, SIZE, MIN_LEN).is_empty());
}

#[test]
fn route_clips_to_rect_borders() {
    let source = Rect::new(0.0, 0.0, 100.0, 40.0);
    let target = Rect::new(200.0, 0.0, 100.0, 40.0);
    let points = route(&source, &target);
    assert_eq!(points.len(), 2);
    assert!(approx(points[0], DVec2::new(100.0, 20.0)));
    assert!(approx(points[1], DVec2::new(200.0, 20.0)));
}

#[test]
fn rect_from_corners_ignores_drag_direction() {
    let a = Rect::from_corners(DVec2::new(10.0, 40.0), DVec2::new(-5.0, 0.0));
    assert_eq!(a.min, DVec2::new(-5.0, 0.0));
    assert_eq!(a.max, DVec2::new(10.0, 40.0));
    assert!(a.intersects(&Rect::new(10.0, 40.0, 5.0, 5.0)));
    assert!(!a.intersects(&Rect::new(10.5, 0.0, 5.0, 5.0)));
}

#[test]
fn polyline_distance_uses_nearest_segment() {
    let points = line();
    assert!((distance_to_polyline(DVec2::new(50.0, 3.0), &points) - 3.0).abs() < 1e-9);
    assert!((distance_to_polyline(DVec2::new(-4.0, 0.0), &points) - 4.0).abs() < 1e-9);
    assert_eq!(distance_to_polyline(DVec2::ZERO, &[]), f64::INFINITY);
}
