//! This bench test parses and resolves a large course file in which every
//! course lists forward and backward prerequisites, then loads the same
//! catalog from a data directory on disk.

#![allow(missing_docs)]

use std::{fmt::Write, io::Cursor};

use catalog::{Directory, storage::CourseLoader};
use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use tempfile::TempDir;

const COURSES: usize = 2_000;

/// Generates a course file where course `i` requires `i - 1` and `i + 1`.
fn course_file() -> String {
    let mut out = String::new();
    for i in 0..COURSES {
        writeln!(out, "CODE:C{i:05}").unwrap();
        writeln!(out, "TITLE:Course number {i}").unwrap();
        writeln!(out, "CREDITS:{}", 1 + i % 6).unwrap();
        writeln!(out, "CAPACITY:{}", 10 + i % 90).unwrap();
        let neighbours: Vec<_> = [i.checked_sub(1), Some(i + 1).filter(|&n| n < COURSES)]
            .into_iter()
            .flatten()
            .map(|n| format!("C{n:05}"))
            .collect();
        writeln!(out, "PREREQUISITES:{}", neighbours.join(",")).unwrap();
        writeln!(out).unwrap();
    }
    out
}

fn parse_courses(c: &mut Criterion) {
    let input = course_file();
    let loader = CourseLoader::new();

    c.bench_function("parse and resolve courses", |b| {
        b.iter(|| loader.parse(Cursor::new(input.as_bytes())).unwrap());
    });

    c.bench_function("load directory", |b| {
        b.iter_batched(
            || {
                let tmp_dir = TempDir::new().unwrap();
                std::fs::write(tmp_dir.path().join("courses.txt"), &input).unwrap();
                std::fs::write(
                    tmp_dir.path().join("students.txt"),
                    "ID:1\nName:Dana\nJoined:2023-09-01\n",
                )
                .unwrap();
                tmp_dir
            },
            |tmp_dir| {
                Directory::new(tmp_dir.path().to_path_buf())
                    .load_all()
                    .unwrap();
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, parse_courses);
criterion_main!(benches);
