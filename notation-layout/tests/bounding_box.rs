use notation_layout::{BoundingBox, BoundingBoxComputation, GlyphOutline};

fn assert_close(a: f64, b: f64, eps: f64) {
    assert!((a - b).abs() <= eps, "{a} != {b}");
}

#[test]
fn quadratic_curve() {
    let mut bbox = BoundingBoxComputation::new();
    bbox.add_quadratic_curve(10.0, 10.0, 100.0, 20.0, 110.0, 110.0);
    assert_close(bbox.x1(), 10.0, 0.01);
    assert_close(bbox.y1(), 10.0, 0.01);
    assert_close(bbox.width(), 100.0, 0.01);
    assert_close(bbox.height(), 100.0, 0.01);
}

#[test]
fn bezier_curve() {
    let mut bbox = BoundingBoxComputation::new();
    bbox.add_bezier_curve(10.0, 10.0, 60.0, 20.0, 100.0, 60.0, 110.0, 110.0);
    let result = bbox.bounding_box().expect("curve has no bounds");
    assert_close(result.x(), 10.0, 0.01);
    assert_close(result.y(), 10.0, 0.01);
    assert_close(result.w(), 100.0, 0.01);
    assert_close(result.h(), 100.0, 0.01);
}

#[test]
fn monotonic_bezier_stays_within_endpoints() {
    let mut bbox = BoundingBoxComputation::new();
    bbox.add_bezier_curve(0.0, 5.0, 10.0, 5.0, 10.0, 5.0, 30.0, 5.0);
    let result = bbox.bounding_box().expect("curve has no bounds");
    assert_close(result.x(), 0.0, 1e-9);
    assert_close(result.x2(), 30.0, 1e-9);
    assert_close(result.y(), 5.0, 1e-9);
    assert_close(result.h(), 0.0, 1e-9);
}

#[test]
fn bulging_curve_reaches_past_endpoints() {
    let mut bbox = BoundingBoxComputation::new();
    bbox.add_quadratic_curve(0.0, 0.0, 50.0, -100.0, 100.0, 0.0);
    assert_close(bbox.y1(), -50.0, 1e-9);
    assert_close(bbox.y2(), 0.0, 1e-9);
}

#[test]
fn merge_is_commutative_and_associative() {
    let boxes = [
        BoundingBox::new(0.0, 0.0, 10.0, 5.0),
        BoundingBox::new(-3.5, 2.25, 4.0, 20.0),
        BoundingBox::new(7.0, -8.0, 1.5, 1.5),
    ];
    let [a, b, c] = boxes;
    let ab = a.merged(&b);
    let ba = b.merged(&a);
    for (l, r) in [
        (ab.x(), ba.x()),
        (ab.y(), ba.y()),
        (ab.w(), ba.w()),
        (ab.h(), ba.h()),
    ] {
        assert_close(l, r, 1e-9);
    }
    let left = a.merged(&b).merged(&c);
    let right = a.merged(&b.merged(&c));
    for (l, r) in [
        (left.x(), right.x()),
        (left.y(), right.y()),
        (left.x2(), right.x2()),
        (left.y2(), right.y2()),
    ] {
        assert_close(l, r, 1e-9);
    }
    assert_close(left.x(), -3.5, 1e-9);
    assert_close(left.y2(), 22.25, 1e-9);
}

#[test]
fn glyph_outline_bounds() {
    let outline = GlyphOutline::parse("m 0 0 l 100 0 q 100 100 150 50")
        .expect("can not parse outline");
    let bbox = outline
        .bounding_box(0.5, 10.0, 100.0)
        .expect("outline has no bounds");
    assert_close(bbox.x(), 10.0, 1e-9);
    assert_close(bbox.w(), 62.5, 1e-9);
    assert!(GlyphOutline::parse("m 0").is_err());
    assert!(GlyphOutline::parse("z 1 2").is_err());
}
