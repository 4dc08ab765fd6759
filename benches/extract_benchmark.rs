//! Benchmarks for arextract.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use arextract::parser::reconstruct_lines;
use arextract::{
    extract_text_blocking, ArabicNormalizer, Extractor, NormalizeOptions, PageTextRun,
    SourceDocument,
};

const ARABIC_SENTENCE: &str = "يتناول هذا الفصل حتليل اجلوانب النظرية يف البحث العلمي";

/// Creates a minimal synthetic PDF with the given number of pages, each
/// holding a few lines of UTF-8 Arabic text.
fn create_test_pdf(page_count: usize) -> Vec<u8> {
    let mut content = String::new();
    content.push_str("%PDF-1.4\n");
    content.push_str("1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");

    let kids: Vec<String> = (0..page_count).map(|i| format!("{} 0 R", i * 2 + 3)).collect();
    content.push_str(&format!(
        "2 0 obj\n<< /Type /Pages /Kids [{}] /Count {} >>\nendobj\n",
        kids.join(" "),
        page_count
    ));

    let mut next_obj = 3;
    for _ in 0..page_count {
        let page_obj = next_obj;
        let content_obj = next_obj + 1;
        next_obj += 2;

        content.push_str(&format!(
            "{} 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 595 842] /Contents {} 0 R >>\nendobj\n",
            page_obj, content_obj
        ));

        let mut stream = String::from("BT /F9 12 Tf");
        for line in 0..20 {
            stream.push_str(&format!(
                " 1 0 0 1 500 {} Tm ({}) Tj 1 0 0 1 90 {} Tm (ص {}) Tj",
                780 - line * 30,
                ARABIC_SENTENCE,
                780 - line * 30,
                line + 1
            ));
        }
        stream.push_str(" ET");

        content.push_str(&format!(
            "{} 0 obj\n<< /Length {} >>\nstream\n{}\nendstream\nendobj\n",
            content_obj,
            stream.len(),
            stream
        ));
    }

    // Offsets are placeholders; the parser rebuilds them.
    let xref_offset = content.len();
    content.push_str(&format!("xref\n0 {}\n", next_obj));
    content.push_str("0000000000 65535 f \n");
    for _ in 1..next_obj {
        content.push_str("0000000000 00000 n \n");
    }
    content.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        next_obj, xref_offset
    ));

    content.into_bytes()
}

fn bench_classification(c: &mut Criterion) {
    c.bench_function("classify_upload", |b| {
        b.iter(|| arextract::classify(black_box("lesson.PDF"), black_box("")).is_ok());
    });
}

fn bench_line_reconstruction(c: &mut Criterion) {
    let runs: Vec<PageTextRun> = (0..400)
        .map(|i| {
            PageTextRun::new(
                (i % 8) as f32 * 60.0,
                800.0 - (i / 8) as f32 * 14.0,
                ARABIC_SENTENCE,
            )
        })
        .collect();

    c.bench_function("reconstruct_400_runs", |b| {
        b.iter(|| reconstruct_lines(black_box(runs.clone())));
    });
}

fn bench_normalizer(c: &mut Criterion) {
    let normalizer = ArabicNormalizer::new(NormalizeOptions::default()).unwrap();
    let text = format!("{}  \u{00A0}\n\n\n", ARABIC_SENTENCE).repeat(200);

    c.bench_function("normalize_200_lines", |b| {
        b.iter(|| normalizer.normalize(black_box(&text)));
    });
}

fn bench_pdf_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("pdf_extraction");
    let extractor = Extractor::new();

    for page_count in [1, 5, 10].iter() {
        let source =
            SourceDocument::new("bench.pdf", "application/pdf", create_test_pdf(*page_count));

        group.bench_function(format!("{}_pages", page_count), |b| {
            b.iter(|| {
                let _ = extract_text_blocking(black_box(&source), &extractor);
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_classification,
    bench_line_reconstruction,
    bench_normalizer,
    bench_pdf_extraction,
);
criterion_main!(benches);
