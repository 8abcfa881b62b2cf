//! Benchmarks for opening and navigating large talking books.
//!
//! Run with: cargo bench

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use daisy_nav::{
    Direction, MemorySource, NavOption, Navigator, OpenOptions, parse_clips, parse_clock_value,
};

const DOCUMENTS: usize = 400;
const CLIPS_PER_DOCUMENT: usize = 200;
const CLIP_SECONDS: f64 = 2.5;

fn smil(n: usize) -> String {
    let mut text = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<smil><body><seq>\n");
    for i in 0..CLIPS_PER_DOCUMENT {
        let begin = i as f64 * CLIP_SECONDS;
        let end = begin + CLIP_SECONDS;
        text.push_str(&format!(
            "<par endsync=\"last\" id=\"tx{n:04}_{i:04}\"><text src=\"book.html#c{n}_{i}\" id=\"t{n}_{i}\"/>\
             <audio src=\"{n:04}.mp3\" clip-begin=\"npt={begin:.3}s\" clip-end=\"npt={end:.3}s\"/></par>\n"
        ));
    }
    text.push_str("</seq></body></smil>\n");
    text
}

/// A DAISY 2.02 book with one heading per document and a page every 50 clips.
fn large_book() -> MemorySource {
    let mut ncc = String::from("<html><head><title>Large</title></head><body>\n");
    let mut source = MemorySource::new();
    for n in 0..DOCUMENTS {
        ncc.push_str(&format!("<h1><a href=\"s{n:04}.smil#tx{n:04}_0000\">Chapter {n}</a></h1>\n"));
        for i in (0..CLIPS_PER_DOCUMENT).step_by(50).skip(1) {
            ncc.push_str(&format!(
                "<span class=\"page-normal\"><a href=\"s{n:04}.smil#tx{n:04}_{i:04}\">{n}.{i}</a></span>\n"
            ));
        }
        source.insert(format!("s{n:04}.smil"), smil(n));
    }
    ncc.push_str("</body></html>\n");
    source.insert("ncc.html", ncc);
    source
}

fn open(options: OpenOptions) -> Navigator {
    Navigator::from_source(large_book(), options).unwrap()
}

// ============================================================================
// Parsing Benchmarks
// ============================================================================

fn bench_parse_clips(c: &mut Criterion) {
    let text = smil(1);
    c.bench_function("parse_clips", |b| {
        b.iter(|| parse_clips(black_box(&text)).unwrap());
    });
}

fn bench_parse_clock_value(c: &mut Criterion) {
    c.bench_function("parse_clock_value", |b| {
        b.iter(|| {
            parse_clock_value(black_box("0:07:31.216")).unwrap()
                + parse_clock_value(black_box("npt=451.216s")).unwrap()
        });
    });
}

// ============================================================================
// Navigation Benchmarks
// ============================================================================

fn bench_open(c: &mut Criterion) {
    c.bench_function("open_large_book", |b| {
        b.iter(|| open(OpenOptions::default()));
    });
}

fn bench_phrase(c: &mut Criterion) {
    let mut nav = open(OpenOptions::default());
    c.bench_function("phrase_next", |b| {
        b.iter(|| {
            nav.navigate(NavOption::Phrase, Direction::Forward, black_box("0200.mp3"), 101.0)
                .unwrap()
        });
    });
}

fn bench_heading_across_documents(c: &mut Criterion) {
    let mut group = c.benchmark_group("heading_prev");
    for (name, capacity) in [("cached", 32), ("uncached", 0)] {
        let mut nav = open(OpenOptions::new().with_cache_capacity(capacity));
        group.bench_function(name, |b| {
            b.iter(|| {
                nav.navigate(NavOption::Heading, Direction::Backward, black_box("0200.mp3"), 1.0)
                    .unwrap()
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_parse_clips,
    bench_parse_clock_value,
    bench_open,
    bench_phrase,
    bench_heading_across_documents
);
criterion_main!(benches);
