use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ReelError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        ReelError::invalid_duration("x")
            .to_string()
            .contains("invalid duration:")
    );
    assert!(
        ReelError::unsupported_format("x")
            .to_string()
            .contains("unsupported format:")
    );
    assert!(
        ReelError::encoding("x")
            .to_string()
            .contains("encoding failure:")
    );
}

#[test]
fn at_index_names_the_item_once() {
    let err = ReelError::unsupported_format("truncated").at_index(2);
    assert_eq!(err.index(), Some(2));
    assert!(err.to_string().contains("at index 2"));

    let err = err.at_index(7);
    assert_eq!(err.index(), Some(2));
}

#[test]
fn in_stage_wraps_and_root_cause_unwraps() {
    let err = ReelError::InvalidDimensions {
        index: Some(1),
        width: 0,
        height: 10,
    }
    .in_stage(Stage::Process);

    assert_eq!(err.stage(), Some(Stage::Process));
    assert!(err.to_string().starts_with("process stage failed:"));
    assert!(matches!(
        err.root_cause(),
        ReelError::InvalidDimensions { index: Some(1), .. }
    ));
    assert_eq!(err.index(), Some(1));

    let twice = err.in_stage(Stage::Encode);
    assert_eq!(twice.stage(), Some(Stage::Process));
}

#[test]
fn canceled_is_never_wrapped() {
    let err = ReelError::Canceled {
        stage: Stage::Process,
        completed: 1,
    }
    .in_stage(Stage::Encode);
    assert!(err.is_canceled());
    assert_eq!(err.stage(), Some(Stage::Process));
    assert!(err.to_string().contains("after 1 item(s)"));
}

#[test]
fn resolution_mismatch_reports_both_sizes() {
    let err = ReelError::ResolutionMismatch {
        clip: 3,
        expected: (108, 192),
        got: (100, 192),
    };
    let msg = err.to_string();
    assert!(msg.contains("got 100x192"));
    assert!(msg.contains("expected 108x192"));
    assert_eq!(err.index(), Some(3));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ReelError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
