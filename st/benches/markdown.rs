use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use studytutor::markdown::{Dialect, OutlineRenderer, parse, render_terminal};

fn lesson(sections: usize) -> String {
    let mut text = String::new();
    for i in 0..sections {
        text.push_str(&format!("# Section {}\n", i));
        text.push_str("The **mitochondria** turn glucose into **ATP** for the cell.\n");
        text.push_str("* [ ] Review the diagram\n* Key idea: energy transfer\n");
        text.push_str("1. Glycolysis\n2. Krebs cycle\n3. Electron transport\n\n");
        text.push_str("| Stage | Yield |\n|---|---|\n| Glycolysis | 2 ATP |\n| Krebs | 2 ATP |\n\n");
        text.push_str("```mermaid\ngraph TD\n  A[Glucose] --> B[Pyruvate]\n  B --> C{ATP}\n```\n\n");
    }
    text
}

fn bench_parse(c: &mut Criterion) {
    let input = lesson(50);
    c.bench_function("parse_chat_50_sections", |b| b.iter(|| parse(black_box(&input), Dialect::Chat)));
}

fn bench_render(c: &mut Criterion) {
    let blocks = parse(&lesson(50), Dialect::Chat);
    c.bench_function("render_terminal_50_sections", |b| {
        b.iter(|| render_terminal(black_box(&blocks), &OutlineRenderer))
    });
}

criterion_group!(benches, bench_parse, bench_render);
criterion_main!(benches);
