use notation_layout::{
    BarNote, BarlineType, Duration, GhostNote, LayoutError, NoteValue,
    StaveNote, TimeSignature, Voice, VoiceMode,
};

fn quarter() -> Box<StaveNote> {
    Box::new(StaveNote::new(NoteValue::Quarter, [3.0]))
}

#[test]
fn four_quarters_fill_common_time() {
    let mut voice = Voice::new(TimeSignature::new(4, 4));
    for _ in 0..4 {
        voice.add_tickable(quarter()).expect("can not add quarter");
    }
    assert!(voice.is_complete());
    assert_eq!(voice.ticks_used(), Duration::whole());

    let err = voice.add_tickable(quarter()).unwrap_err();
    assert!(matches!(err, LayoutError::CapacityExceeded { .. }));
    assert_eq!(voice.ticks_used(), Duration::whole());
    assert_eq!(voice.len(), 4);
}

#[test]
fn ticks_used_is_exact() {
    let half = Duration::new(1, 2).expect("bad duration");
    let mut voice = Voice::with_total(half);
    for _ in 0..3 {
        voice
            .add_tickable(Box::new(
                StaveNote::new(NoteValue::Eighth, [3.0])
                    .tuplet(3, 2)
                    .expect("bad tuplet"),
            ))
            .expect("can not add triplet");
    }
    assert_eq!(voice.ticks_used(), Duration::new(1, 4).expect("bad duration"));
    voice
        .add_tickable(Box::new(
            StaveNote::new(NoteValue::Eighth, [3.0]).dotted(1),
        ))
        .expect("can not add dotted eighth")
        .add_tickable(Box::new(GhostNote::new(
            Duration::new(1, 16).expect("bad duration"),
        )))
        .expect("can not add ghost");
    assert!(voice.is_complete());
    assert_eq!(
        voice.smallest_tick_count(),
        Some(Duration::new(1, 16).expect("bad duration"))
    );
}

#[test]
fn ignored_tickables_take_no_time() {
    let mut voice = Voice::new(TimeSignature::new(1, 4));
    voice
        .add_tickable(Box::new(BarNote::new(BarlineType::RepeatBegin)))
        .expect("can not add bar")
        .add_tickable(quarter())
        .expect("can not add quarter")
        .add_tickable(Box::new(BarNote::new(BarlineType::Final)))
        .expect("can not add bar");
    assert!(voice.is_complete());
    assert_eq!(voice.len(), 3);
}

#[test]
fn soft_voice_is_unbounded() {
    let mut voice = Voice::new(TimeSignature::new(1, 4));
    voice.set_mode(VoiceMode::Soft);
    for _ in 0..3 {
        voice.add_tickable(quarter()).expect("soft voice refused");
    }
    assert_eq!(voice.ticks_used(), Duration::new(3, 4).expect("bad duration"));
    assert!(!voice.is_complete());
}

#[test]
fn soft_voice_rejects_overflowing_durations() {
    let mut voice = Voice::new(TimeSignature::new(1, 4));
    voice.set_mode(VoiceMode::Soft);
    let tiny = Duration::new(1, 1 << 40).expect("bad duration");
    let odd = Duration::new(1, 3u64.pow(25)).expect("bad duration");
    voice
        .add_tickable(Box::new(GhostNote::new(tiny)))
        .expect("can not add ghost");
    let err = voice.add_tickable(Box::new(GhostNote::new(odd))).unwrap_err();
    assert!(matches!(err, LayoutError::Arithmetic(_)));
    assert_eq!(voice.ticks_used(), tiny);
    assert_eq!(voice.len(), 1);
}
