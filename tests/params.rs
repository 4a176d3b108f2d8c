mod common;

use common::TestWorkspace;
use substance_match::{
    PipelineParams, RawParameters,
    params::{
        DEFAULT_MAX_PER_MATCH_ID, DEFAULT_REFERENCE_COLUMN, DEFAULT_THRESHOLD, KEY_SCORER,
        KEY_THRESHOLD, ParamsError,
    },
    scorer::Scorer,
};

#[test]
fn unknown_scorer_falls_back_to_levenshtein() {
    let params = PipelineParams::resolve(&RawParameters::new().with(KEY_SCORER, "cosine"));
    assert_eq!(params.scorer, Scorer::Levenshtein);
    let named = PipelineParams::resolve(&RawParameters::new().with(KEY_SCORER, "jaro_winkler"));
    assert_eq!(named.scorer, Scorer::JaroWinkler);
    assert_eq!(named.match_options().scorer, Scorer::JaroWinkler);
}

#[test]
fn loads_yaml_file_and_resolves() {
    let workspace = TestWorkspace::new();
    let path = workspace.write(
        "params.yml",
        "substance_col: Wirkstoff\nthreshold: 1\nmax_per_match_id: 3\nonly_first_match: yes\nscorer: sorensen-dice\nextra: ignored\n",
    );
    let raw = RawParameters::load(&path).expect("load params");
    let params = PipelineParams::resolve(&raw);
    assert_eq!(params.substance_col, "Wirkstoff");
    assert_eq!(params.ref_substance_col, DEFAULT_REFERENCE_COLUMN);
    assert_eq!(params.threshold, 1.0);
    assert_eq!(params.max_per_match_id, 3);
    assert!(params.only_first_match);
    assert_eq!(params.scorer, Scorer::SorensenDice);

    let options = params.match_options();
    assert_eq!(options.max_matches, 3);
    assert_eq!(options.cap(), 1);
}

#[test]
fn threshold_bounds_are_inclusive() {
    for (raw, expected) in [("0", 0.0), ("1", 1.0), (" 0.5 ", 0.5), ("-0.1", DEFAULT_THRESHOLD)] {
        let params = PipelineParams::resolve(&RawParameters::new().with(KEY_THRESHOLD, raw));
        assert_eq!(params.threshold, expected, "{raw:?}");
    }
}

#[test]
fn non_scalar_values_are_ignored() {
    let raw = RawParameters::from_yaml_str("scorer:\n  nested: x\nmax_per_match_id: [1, 2]\n")
        .expect("valid yaml");
    assert_eq!(raw.get(KEY_SCORER), None);
    let params = PipelineParams::resolve(&raw);
    assert_eq!(params.scorer, Scorer::Levenshtein);
    assert_eq!(params.max_per_match_id, DEFAULT_MAX_PER_MATCH_ID);
}

#[test]
fn flags_override_file_values() {
    let mut raw =
        RawParameters::from_yaml_str("threshold: 0.7\nscorer: dice\n").expect("valid yaml");
    raw.merge(RawParameters::new().with(KEY_THRESHOLD, "0.95"));
    let params = PipelineParams::resolve(&raw);
    assert_eq!(params.threshold, 0.95);
    assert_eq!(params.scorer, Scorer::SorensenDice);
}

#[test]
fn unreadable_or_malformed_files_are_errors() {
    let workspace = TestWorkspace::new();
    let missing = RawParameters::load(&workspace.path().join("absent.yml"));
    assert!(matches!(missing, Err(ParamsError::Read { .. })));

    let malformed = workspace.write("broken.yml", "threshold: [0.5\n");
    assert!(matches!(
        RawParameters::load(&malformed),
        Err(ParamsError::Yaml(_))
    ));

    let scalar = workspace.write("scalar.yml", "just text\n");
    assert!(matches!(
        RawParameters::load(&scalar),
        Err(ParamsError::NotAMapping)
    ));
}
