use notation_layout::{
    default_beam_groups, generate_beam_groups, Formatter, LayoutSettings,
    NoteValue, StandardMetrics, StaveNote, StemDirection, Tickable,
    TimeSignature, Voice,
};

#[test]
fn beams_in_six_eight() {
    let _ = env_logger::builder().is_test(true).try_init();
    let time = TimeSignature::new(6, 8);
    let mut voices = vec![Voice::new(time)];
    for line in [4.0, 4.5, 5.0, 1.0, 1.5, 2.0] {
        voices[0]
            .add_tickable(Box::new(StaveNote::new(NoteValue::Eighth, [line])))
            .expect("can not add eighth");
    }
    let settings = LayoutSettings::default();
    let mut beams = generate_beam_groups(
        &voices[0],
        &default_beam_groups(&time),
        settings.beam.beam_rests,
    )
    .expect("can not group");
    assert_eq!(beams.len(), 2);
    assert_eq!(beams[0].range(), 0..3);
    assert_eq!(beams[0].stem_direction(), StemDirection::Down);
    assert_eq!(beams[1].stem_direction(), StemDirection::Up);

    for beam in beams.iter() {
        beam.apply_stem_direction(&mut voices[0]);
    }
    Formatter::new(settings.clone())
        .format(&mut voices, 250.0, &StandardMetrics::default())
        .expect("can not format");
    for beam in beams.iter_mut() {
        beam.calculate_slope(&voices[0], &settings)
            .expect("can not compute slope");
        assert!(beam.slope() >= settings.beam.min_slope - 1e-9);
        assert!(beam.slope() <= settings.beam.max_slope + 1e-9);
        let ((x0, _), (x1, _)) = beam.line().expect("slope not computed");
        assert!(x1 > x0);
    }
    // a down beam over a rising line slopes upwards on screen
    assert!(beams[0].slope() < 0.0);
    let stem = voices[0].tickables()[1]
        .stem_extents(&settings)
        .expect("no stem");
    let beam_y = beams[0].y_at(stem.x).expect("slope not computed");
    assert!(stem.tip_y <= beam_y + 1e-9);
}
