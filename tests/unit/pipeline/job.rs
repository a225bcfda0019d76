use super::*;
use crate::effects::transitions::TransitionKind;

fn job(n: usize) -> RenderJob {
    RenderJob::from_paths((0..n).map(|i| format!("img{i}.jpg")), "out.mp4")
}

#[test]
fn defaults_are_valid() {
    let j = job(3);
    assert_eq!(j.sources.len(), 3);
    assert_eq!(j.still_duration_secs, DEFAULT_STILL_SECS);
    assert_eq!(j.transitions, TransitionSet::all());
    j.validate(&ReelConfig::default()).unwrap();
}

#[test]
fn image_count_is_bounded() {
    let cfg = ReelConfig::default();
    assert!(matches!(job(0).validate(&cfg), Err(ReelError::Validation(_))));
    job(30).validate(&cfg).unwrap();
    assert!(matches!(job(31).validate(&cfg), Err(ReelError::Validation(_))));
}

#[test]
fn still_duration_must_be_in_range() {
    let cfg = ReelConfig::default();
    for secs in [1.0, 4.0, 10.0] {
        job(1).with_still_duration(secs).validate(&cfg).unwrap();
    }
    for secs in [0.0, 0.99, 10.5, f64::INFINITY, f64::NAN] {
        assert!(
            matches!(
                job(1).with_still_duration(secs).validate(&cfg),
                Err(ReelError::InvalidDuration(_))
            ),
            "{secs}"
        );
    }
}

#[test]
fn transition_set_must_be_non_empty() {
    let cfg = ReelConfig::default();
    let err = job(2)
        .with_transitions(TransitionSet::empty())
        .validate(&cfg)
        .unwrap_err();
    assert!(matches!(err, ReelError::Validation(_)));
    job(2)
        .with_transitions(TransitionSet::from_kinds([TransitionKind::FadeOut]))
        .validate(&cfg)
        .unwrap();
}

#[test]
fn cancel_token_is_shared() {
    let token = CancelToken::new();
    let j = job(1).with_cancel(token.clone());
    token.cancel();
    assert!(j.cancel.is_canceled());
}
