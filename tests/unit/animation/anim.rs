use super::*;

fn fps() -> Fps {
    Fps::new(30, 1).unwrap()
}

fn two_keys(mode: InterpMode) -> Anim {
    Anim::Keyframes(Keyframes {
        keys: vec![
            Keyframe {
                frame: FrameIndex(0),
                value: 0.0,
                ease: Ease::Linear,
            },
            Keyframe {
                frame: FrameIndex(10),
                value: 10.0,
                ease: Ease::Linear,
            },
        ],
        mode,
    })
}

#[test]
fn keyframes_hold_is_constant_between_keys() {
    let anim = two_keys(InterpMode::Hold);
    assert_eq!(anim.evaluate(FrameIndex(5), 20, fps()), 0.0);
    assert_eq!(anim.evaluate(FrameIndex(10), 20, fps()), 10.0);
}

#[test]
fn keyframes_linear_interpolates_and_holds_outside() {
    let anim = two_keys(InterpMode::Linear);
    assert_eq!(anim.evaluate(FrameIndex(5), 20, fps()), 5.0);
    assert_eq!(anim.evaluate(FrameIndex(15), 20, fps()), 10.0);
}

#[test]
fn keyframes_validation_rejects_unsorted_and_empty() {
    let unsorted = Keyframes {
        keys: vec![
            Keyframe {
                frame: FrameIndex(5),
                value: 1.0,
                ease: Ease::Linear,
            },
            Keyframe {
                frame: FrameIndex(1),
                value: 2.0,
                ease: Ease::Linear,
            },
        ],
        mode: InterpMode::Linear,
    };
    assert!(unsorted.validate().is_err());
    let empty = Keyframes {
        keys: vec![],
        mode: InterpMode::Hold,
    };
    assert!(empty.validate().is_err());
    assert_eq!(empty.sample(FrameIndex(3)), 0.0);
}

#[test]
fn ramp_spans_item_length() {
    let anim = Anim::Ramp {
        from: 0.0,
        to: 100.0,
        ease: Ease::Linear,
    };
    assert_eq!(anim.evaluate(FrameIndex(0), 11, fps()), 0.0);
    assert_eq!(anim.evaluate(FrameIndex(5), 11, fps()), 50.0);
    assert_eq!(anim.evaluate(FrameIndex(10), 11, fps()), 100.0);
    assert_eq!(anim.evaluate(FrameIndex(40), 11, fps()), 100.0);
    assert_eq!(anim.evaluate(FrameIndex(3), 1, fps()), 0.0);
}

#[test]
fn sine_uses_frame_rate_for_time() {
    let anim = Anim::Sine {
        offset: 10.0,
        amp: 2.0,
        freq_hz: 1.0,
        phase: 0.0,
    };
    assert!((anim.evaluate(FrameIndex(0), 60, fps()) - 10.0).abs() < 1e-9);
    let quarter = anim.evaluate(FrameIndex(8), 64, Fps::new(32, 1).unwrap());
    assert!((quarter - 12.0).abs() < 1e-9);
}

#[test]
fn validation_rejects_non_finite() {
    assert!(Anim::constant(f64::NAN).validate().is_err());
    assert!(
        Anim::Sine {
            offset: 0.0,
            amp: 1.0,
            freq_hz: -1.0,
            phase: 0.0
        }
        .validate()
        .is_err()
    );
    assert!(Anim::constant(3.0).validate().is_ok());
}

#[test]
fn json_shape_is_externally_tagged() {
    let anim: Anim = serde_json::from_str(r#"{"Ramp":{"from":1.0,"to":2.0}}"#).unwrap();
    assert_eq!(
        anim,
        Anim::Ramp {
            from: 1.0,
            to: 2.0,
            ease: Ease::Linear
        }
    );
}
