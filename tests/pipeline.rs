mod common;

use common::single_column;
use substance_match::{
    PipelineParams, RawParameters,
    params::{
        KEY_MAX_PER_MATCH_ID, KEY_ONLY_FIRST_MATCH, KEY_REF_SUBSTANCE_COL, KEY_SUBSTANCE_COL,
        KEY_THRESHOLD,
    },
    run_pipeline,
};

fn params(max_per_match_id: &str, only_first_match: bool) -> PipelineParams {
    let mut raw = RawParameters::new()
        .with(KEY_SUBSTANCE_COL, "substance")
        .with(KEY_REF_SUBSTANCE_COL, "substance")
        .with(KEY_THRESHOLD, "0.85")
        .with(KEY_MAX_PER_MATCH_ID, max_per_match_id);
    if only_first_match {
        raw.set(KEY_ONLY_FIRST_MATCH, "true");
    }
    PipelineParams::resolve(&raw)
}

#[test]
fn typo_and_whitespace_scenario() {
    let subject = single_column("substance", &["Aspirin", "Paracetamol ", "", "asprin"]);
    let reference = single_column("substance", &["Aspirin", "Paracetamol"]);

    let output = run_pipeline(&subject, &reference, &params("1", true));
    let rows = output.table.rows();

    assert_eq!(rows.len(), 4);
    assert_eq!(output.table.column_names(), vec!["Original", "Normalized", "Mapped_to", "Score"]);

    let first = rows[0].primary().expect("row 1 mapped");
    assert_eq!(first.reference, "Aspirin");
    assert_eq!(first.score, 1.0);

    let second = rows[1].primary().expect("row 2 mapped");
    assert_eq!(second.reference, "Paracetamol");
    assert_eq!(second.score, 1.0);
    assert_eq!(rows[1].normalized, "paracetamol");

    assert!(rows[2].is_missing());

    let fourth = rows[3].primary().expect("row 4 mapped");
    assert_eq!(fourth.reference, "Aspirin");
    assert!(fourth.score < 1.0 && fourth.score >= 0.85, "{}", fourth.score);

    let stats = &output.stats;
    assert_eq!(stats.total_rows, 4);
    assert_eq!(stats.missing_count, 1);
    assert_eq!(stats.missing_pct, 25.0);
    assert_eq!(stats.unique_total_values, 3);
    assert_eq!(stats.unique_missing_count, 0);
    assert_eq!(stats.unique_missing_pct, 0.0);
    assert!(stats.unique_missing_examples.is_empty());
    assert_eq!(stats.mapped_column.as_deref(), Some("Mapped_to"));
}

#[test]
fn empty_reference_marks_every_row_missing() {
    let subject = single_column("substance", &["Xylometazolin", "Xylometazolin", "Ibuprofen", " "]);
    let reference = single_column("substance", &[]);

    let output = run_pipeline(&subject, &reference, &params("2", false));
    let stats = &output.stats;

    assert_eq!(stats.total_rows, 4);
    assert_eq!(stats.missing_count, stats.total_rows);
    assert_eq!(stats.missing_pct, 100.0);
    assert_eq!(stats.unique_total_values, 2);
    assert_eq!(stats.unique_missing_count, 2);
    assert_eq!(stats.unique_missing_pct, 100.0);
    assert_eq!(
        stats.unique_missing_examples,
        vec![
            ("Xylometazolin".to_string(), 2),
            ("Ibuprofen".to_string(), 1)
        ]
    );
    assert_eq!(stats.mapped_column.as_deref(), Some("Mapped_to1"));
}

#[test]
fn empty_subject_reports_zero_percent() {
    let subject = single_column("substance", &[]);
    let reference = single_column("substance", &["Aspirin"]);

    let output = run_pipeline(&subject, &reference, &params("2", false));

    assert_eq!(output.stats.total_rows, 0);
    assert_eq!(output.stats.missing_count, 0);
    assert_eq!(output.stats.missing_pct, 0.0);
    assert_eq!(output.stats.unique_total_values, 0);
    assert_eq!(output.stats.unique_missing_pct, 0.0);
}

#[test]
fn absent_subject_column_treats_rows_as_empty() {
    let subject = single_column("Wirkstoff", &["Aspirin", "Ibuprofen"]);
    let reference = single_column("substance", &["Aspirin", "Ibuprofen"]);

    let output = run_pipeline(&subject, &reference, &params("2", false));

    assert_eq!(output.table.len(), 2);
    assert!(output.table.rows().iter().all(|row| row.original.is_empty()));
    assert_eq!(output.stats.missing_count, 2);
    assert_eq!(output.stats.missing_pct, 100.0);
    assert_eq!(output.stats.unique_total_values, 0);
    // No distinct values: the divisor falls back to 1.
    assert_eq!(output.stats.unique_missing_pct, 0.0);
}

#[test]
fn absent_reference_column_yields_empty_vocabulary() {
    let subject = single_column("substance", &["Aspirin"]);
    let reference = single_column("Name", &["Aspirin"]);

    let output = run_pipeline(&subject, &reference, &params("2", false));

    assert_eq!(output.stats.missing_count, 1);
    assert_eq!(
        output.stats.unique_missing_examples,
        vec![("Aspirin".to_string(), 1)]
    );
}

#[test]
fn multiple_candidates_fill_numbered_slots_in_score_order() {
    let subject = single_column("substance", &["Cisplatin"]);
    let reference = single_column("substance", &["Cisplatine", "Cisplatin", "Carboplatin"]);

    let output = run_pipeline(&subject, &reference, &params("3", false));
    let records = output.table.records().collect::<Vec<_>>();

    assert_eq!(
        output.table.column_names(),
        vec![
            "Original",
            "Normalized",
            "Mapped_to1",
            "Mapped_to2",
            "Mapped_to3",
            "Score1",
            "Score2",
            "Score3"
        ]
    );
    assert_eq!(records[0][2], "Cisplatin");
    assert_eq!(records[0][3], "Cisplatine");
    assert_eq!(records[0][4], "");
    assert_eq!(records[0][5], "1");
    assert_eq!(records[0][6], "0.9");
    assert_eq!(records[0][7], "");
}

#[test]
fn top_missing_is_capped_at_twenty() {
    let values = (0..30)
        .flat_map(|i| std::iter::repeat_n(format!("unknown-{i:02}"), (i % 4) + 1))
        .collect::<Vec<_>>();
    let refs = values.iter().map(String::as_str).collect::<Vec<_>>();
    let subject = single_column("substance", &refs);
    let reference = single_column("substance", &["Aspirin"]);

    let output = run_pipeline(&subject, &reference, &params("2", false));
    let examples = &output.stats.unique_missing_examples;

    assert_eq!(output.stats.unique_total_values, 30);
    assert_eq!(examples.len(), 20);
    assert!(examples.windows(2).all(|pair| pair[0].1 >= pair[1].1));
    assert_eq!(examples[0], ("unknown-03".to_string(), 4));
}

#[test]
fn repeated_runs_are_identical() {
    let subject = single_column("substance", &["Aspirin 500 mg", "Ibuprofn", "Unbekannt"]);
    let reference = single_column("substance", &["Aspirin", "Ibuprofen", "Ibuprofen"]);
    let params = params("2", false);

    let first = run_pipeline(&subject, &reference, &params);
    let second = run_pipeline(&subject, &reference, &params);

    assert_eq!(first.table, second.table);
    let mut a = first.stats.clone();
    let mut b = second.stats.clone();
    a.processing_seconds = 0.0;
    b.processing_seconds = 0.0;
    assert_eq!(a, b);
}
