//! Benchmarks for tabmark conversion performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks use synthetic documents with many table blocks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Creates a document with `table_count` tables, every third one merged.
fn create_test_document(table_count: usize) -> String {
    let mut doc = String::from("# Benchmark document\n\n");

    for i in 0..table_count {
        doc.push_str(&format!("Paragraph {} before the table.\n\n", i));
        doc.push_str(&format!("<table><caption>Table {}</caption>", i));
        doc.push_str("<tr><th>Name</th><th>Value</th><th>Unit</th></tr>");
        if i % 3 == 0 {
            doc.push_str("<tr><td rowspan=\"2\">**Power**</td><td>12</td><td>W</td></tr>");
            doc.push_str("<tr><td>15</td><td>W</td></tr>");
        } else {
            for row in 0..5 {
                doc.push_str(&format!(
                    "<tr><td>item{}</td><td>{}</td><td>mA</td></tr>",
                    row,
                    row * 10
                ));
            }
        }
        doc.push_str("</table>\n\n");
    }

    doc
}

/// Benchmark lexing.
fn bench_lexer(c: &mut Criterion) {
    let doc = create_test_document(100);

    c.bench_function("lex_100_tables", |b| {
        b.iter(|| tabmark::tokenize(black_box(&doc)).unwrap().len());
    });
}

/// Benchmark parsing and classification without writing a workbook.
fn bench_classify(c: &mut Criterion) {
    let doc = create_test_document(100);
    let tokens = tabmark::tokenize(&doc).unwrap();
    let options = tabmark::RenderOptions::default();

    c.bench_function("classify_100_tables", |b| {
        b.iter(|| {
            tokens
                .iter()
                .filter(|t| t.is_table())
                .map(|t| tabmark::classify(&tabmark::parse_table(black_box(t.value)), &options))
                .filter(|layout| layout.is_inline())
                .count()
        });
    });
}

/// Benchmark column fitting on wide sheets.
fn bench_fit_columns(c: &mut Criterion) {
    let widths: Vec<f64> = (0..200).map(|i| (i % 37) as f64 * 3.0 + 5.0).collect();
    let budget = tabmark::WidthBudget::default();

    c.bench_function("fit_200_columns", |b| {
        b.iter(|| tabmark::sheet::fit_columns(black_box(&widths), &budget));
    });
}

/// Benchmark the full pipeline at various sizes.
fn bench_convert(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let mut group = c.benchmark_group("convert");

    for table_count in [10, 50, 100].iter() {
        let doc = create_test_document(*table_count);
        let options = tabmark::ConvertOptions::new()
            .with_workbook_path(dir.path().join(format!("bench_{}.xlsx", table_count)));

        group.bench_function(format!("{}_tables", table_count), |b| {
            b.iter(|| tabmark::convert_str(black_box(&doc), &options).unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_lexer,
    bench_classify,
    bench_fit_columns,
    bench_convert,
);
criterion_main!(benches);
