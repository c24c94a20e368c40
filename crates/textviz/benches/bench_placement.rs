use std::hint::black_box;
use std::time::Instant;

use vizlab_common::Color;
use vizlab_scene::Scene;
use vizlab_textviz::{MarkerPlacer, RotationMode, TermConfig, populate, tokenize};

const WORDS: &[&str] = &[
    "the", "shire", "was", "quiet", "until", "the", "fellowship", "left", "for", "mordor",
];

fn make_text(word_count: usize) -> String {
    let mut text = String::new();
    for i in 0..word_count {
        text.push_str(WORDS[i % WORDS.len()]);
        text.push_str(if i % 12 == 11 { ". " } else { " " });
    }
    text
}

fn bench_tokenize(word_count: usize, iterations: usize) {
    let text = make_text(word_count);

    let start = Instant::now();
    for _ in 0..iterations {
        let _ = black_box(tokenize(black_box(&text)));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  tokenize ({word_count} words, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}");
}

fn bench_place(word_count: usize, count: usize, iterations: usize) {
    let tokens = tokenize(&make_text(word_count));
    let term = TermConfig {
        count,
        rotation: RotationMode::Random,
        ..TermConfig::new("shire", Color::WHITE)
    };
    let mut placer = MarkerPlacer::new(42, 0.2, -5.0);

    let start = Instant::now();
    for _ in 0..iterations {
        let _ = black_box(placer.place(black_box(&tokens), black_box(&term)));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  place ({word_count} words, {count}/occurrence, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn bench_populate(word_count: usize, iterations: usize) {
    let tokens = tokenize(&make_text(word_count));
    let term = TermConfig::new("the", Color::WHITE);
    let mut placer = MarkerPlacer::new(42, 0.2, -5.0);
    let markers = placer.place(&tokens, &term);
    let mut scene = Scene::new();
    let group = scene.add_group("the");

    let start = Instant::now();
    for _ in 0..iterations {
        let _ = black_box(populate(&mut scene, group, black_box(&markers), &term));
        scene.drain_events();
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  populate ({} nodes, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}",
        markers.len()
    );
}

fn main() {
    println!("=== Word Viz Benchmarks ===\n");

    println!("Tokenize:");
    bench_tokenize(100, 10000);
    bench_tokenize(10000, 100);

    println!("\nPlace markers:");
    bench_place(100, 100, 1000);
    bench_place(10000, 10, 10);

    println!("\nPopulate scene group:");
    bench_populate(100, 100);
    bench_populate(1000, 10);

    println!("\n=== Done ===");
}
