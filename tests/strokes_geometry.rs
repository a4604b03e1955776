use widget_sketch::strokes::geometry::{
    bounding_box, classify_orientation, hausdorff_symmetric, offset_to_origin, Orientation, Point,
};

fn samples() -> Vec<Vec<Point>> {
    vec![
        vec![Point::new(12.5, -3.0)],
        vec![Point::new(-40.0, 10.0), Point::new(60.0, 12.0), Point::new(61.5, 80.25)],
        (0..25)
            .map(|i| {
                let t = i as f32 * 0.3;
                Point::new(100.0 + 40.0 * t.cos(), -20.0 + 15.0 * t.sin())
            })
            .collect(),
        vec![Point::new(0.1, 0.2), Point::new(0.3, 0.7), Point::new(-0.9, 0.4)],
    ]
}

#[test]
fn offset_to_origin_moves_top_left_to_zero() {
    for stroke in samples() {
        let offset = offset_to_origin(&stroke).unwrap();
        let bbox = bounding_box(&offset).unwrap();
        assert_eq!(bbox.left, 0.0);
        assert_eq!(bbox.top, 0.0);
        assert_eq!(offset.len(), stroke.len());
    }
}

#[test]
fn offset_to_origin_is_idempotent() {
    for stroke in samples() {
        let once = offset_to_origin(&stroke).unwrap();
        let twice = offset_to_origin(&once).unwrap();
        assert_eq!(once, twice);
    }
}

#[test]
fn hausdorff_is_symmetric_and_zero_on_itself() {
    let sets = samples();
    for a in &sets {
        assert_eq!(hausdorff_symmetric(a, a).unwrap(), 0.0);
        for b in &sets {
            assert_eq!(
                hausdorff_symmetric(a, b).unwrap(),
                hausdorff_symmetric(b, a).unwrap()
            );
        }
    }
}

#[test]
fn hausdorff_tolerates_sampling_density() {
    let sparse: Vec<Point> = (0..=10).map(|i| Point::new(i as f32 * 10.0, 0.0)).collect();
    let dense: Vec<Point> = (0..=100).map(|i| Point::new(i as f32, 0.0)).collect();
    assert!(hausdorff_symmetric(&sparse, &dense).unwrap() <= 5.0);
}

#[test]
fn orientation_boundaries() {
    let bbox = |w: f32, h: f32| vec![Point::new(0.0, 0.0), Point::new(w, h)];
    assert_eq!(classify_orientation(&bbox(100.0, 100.0)).unwrap(), Orientation::Square);
    assert_eq!(classify_orientation(&bbox(100.0, 69.0)).unwrap(), Orientation::Landscape);
    assert_eq!(classify_orientation(&bbox(100.0, 71.0)).unwrap(), Orientation::Square);
    assert_eq!(classify_orientation(&bbox(69.0, 100.0)).unwrap(), Orientation::Portrait);
    assert_eq!(classify_orientation(&bbox(0.0, 0.0)).unwrap(), Orientation::Square);
}
