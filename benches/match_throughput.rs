use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use substance_match::{
    match_table::build_match_table_with,
    matcher::{MatchOptions, ReferenceMatcher},
    normalize::Normalizer,
    scorer::Scorer,
};

const STEMS: &[&str] = &[
    "aspirin",
    "paracetamol",
    "ibuprofen",
    "cisplatin",
    "carboplatin",
    "fluorouracil",
    "metformin",
    "tramadol",
];

fn vocabulary(size: usize) -> Vec<String> {
    (0..size)
        .map(|i| format!("{}{}", STEMS[i % STEMS.len()], i / STEMS.len()))
        .collect()
}

fn subject(rows: usize) -> Vec<String> {
    (0..rows)
        .map(|i| {
            let stem = STEMS[i % STEMS.len()];
            match i % 3 {
                0 => format!("{stem} 500 mg"),
                1 => stem.replacen('a', "", 1),
                _ => stem.to_uppercase(),
            }
        })
        .collect()
}

fn bench_matching(c: &mut Criterion) {
    let normalizer = Normalizer::default();
    let vocabulary = vocabulary(500);
    let matcher = ReferenceMatcher::new(&vocabulary, &normalizer);
    let subject = subject(1_000);

    let mut group = c.benchmark_group("match_table");
    for scorer in [Scorer::Levenshtein, Scorer::JaroWinkler] {
        let options = MatchOptions {
            scorer,
            ..MatchOptions::default()
        };
        group.bench_function(scorer.name(), |b| {
            b.iter(|| {
                black_box(build_match_table_with(
                    &normalizer,
                    &matcher,
                    &subject,
                    &options,
                ))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_matching);
criterion_main!(benches);
