use super::*;
use crate::sequence::circular::CircularSequence;
use crate::test_support::*;

#[test]
fn fixture_line_is_valid() {
    validate_settings(&line(5, "Metro")).unwrap();
}

#[test]
fn empty_station_list_is_rejected() {
    let mut s = line(3, "Metro");
    s.stations.clear();
    let err = validate_settings(&s).unwrap_err();
    assert!(err.is_config());
    assert!(err.to_string().contains("station list is empty"));
}

#[test]
fn missing_hyphen_is_rejected() {
    let mut s = line(3, "Metro");
    s.stations[1].station_number = "T01".to_owned();
    assert!(validate_settings(&s).unwrap_err().is_config());

    let mut s = line(3, "Metro");
    s.terminus.terminus_number = "T99".to_owned();
    assert!(validate_settings(&s).unwrap_err().is_config());
}

#[test]
fn mismatched_pair_counts_are_rejected() {
    let mut s = line(3, "Metro");
    s.stations[2].names = names("S2", &["ja", "en", "zh"]);
    let err = validate_settings(&s).unwrap_err();
    assert!(err.to_string().contains("3 translations"));

    let mut s = line(3, "Metro");
    s.states.0.push(state("arriving", &["ja"]));
    let err = validate_settings(&s).unwrap_err();
    assert!(err.to_string().contains("'arriving'"));
}

#[test]
fn skipped_station_may_have_any_translation_count() {
    let mut s = line_with_skips(4, &[2], "Metro");
    s.stations[2].names = names("S2", &["ja"]);
    validate_settings(&s).unwrap();
}

#[test]
fn timing_constants_are_checked() {
    let mut s = line(3, "Metro");
    s.constants.duration = 0.1;
    assert!(validate_settings(&s).is_err());

    let mut s = line(3, "Metro");
    s.constants.duration = f64::NAN;
    assert!(validate_settings(&s).is_err());

    let mut s = line(3, "Metro");
    s.constants.freeze_duration = -0.5;
    assert!(validate_settings(&s).is_err());

    let mut s = line(3, "Metro");
    s.constants.freeze_duration = 0.0;
    validate_settings(&s).unwrap();
}

#[test]
fn canvas_and_states_are_checked() {
    let mut s = line(3, "Metro");
    s.constants.width = 0;
    assert!(validate_settings(&s).is_err());

    let mut s = line(3, "Metro");
    s.states.0.clear();
    assert!(validate_settings(&s).is_err());
}

#[test]
fn badge_sizes_are_checked_after_theme_adjustment() {
    // Tokyu shrinks the line letters by 10px, so 10 ends up at zero.
    let mut s = line(3, "Tokyu");
    s.constants.icon_line_fontsize = 10.0;
    let err = validate_settings(&s).unwrap_err();
    assert!(err.is_config());
    assert!(err.to_string().contains("icon line"), "{err}");

    let mut s = line(3, "Metro");
    s.constants.icon_line_fontsize = 10.0;
    validate_settings(&s).unwrap();

    let mut s = line(3, "Metro");
    s.constants.icon_station_fontsize = 0.0;
    let err = validate_settings(&s).unwrap_err();
    assert!(err.to_string().contains("icon station number"), "{err}");
}

#[test]
fn translation_sizes_must_be_positive() {
    let mut bad = translation("Broken");
    bad.fontsize = 0.0;

    let mut s = line(3, "Metro");
    s.stations[1].names = CircularSequence::new(vec![translation("ok"), bad.clone()]).unwrap();
    let err = validate_settings(&s).unwrap_err();
    assert!(err.is_config());
    assert!(err.to_string().contains("'Broken'"), "{err}");

    bad.fontsize = f32::NAN;
    let mut s = line(3, "Metro");
    s.states.0[0].names = CircularSequence::new(vec![translation("ok"), bad.clone()]).unwrap();
    assert!(validate_settings(&s).unwrap_err().to_string().contains("'next'"));

    let mut s = line(3, "Metro");
    let mut items = s.terminus.names.as_slice().to_vec();
    items[0].fontsize = -4.0;
    s.terminus.names = CircularSequence::new(items).unwrap();
    assert!(validate_settings(&s).unwrap_err().is_config());
}

#[test]
fn skipped_station_labels_are_still_checked() {
    let mut s = line_with_skips(4, &[2], "Metro");
    let mut items = transfer("Oedo").as_slice().to_vec();
    items[0].fontsize = 0.0;
    s.stations[2]
        .transfers
        .push(CircularSequence::new(items).unwrap());
    let err = validate_settings(&s).unwrap_err();
    assert!(err.to_string().contains("transfer 'Oedo'"), "{err}");
}
