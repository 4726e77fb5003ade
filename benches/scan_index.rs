use bcs_ingest::ScanFile;
use bcs_ingest::app::services::scan_file::{find_header_line, locate_sub_scan};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::path::Path;

/// Scan file with `files` sub-scans of `steps` rows each
fn scan_file_lines(files: u32, steps: u32) -> Vec<String> {
    let mut lines = vec![
        "Flying Beamline Energy(700, 900)".to_string(),
        "EPU Polarization\tSample X\tSample Y\t".to_string(),
    ];
    for file in 1..=files {
        lines.push(format!("File {}", file));
        for step in 0..steps {
            let first = 700 + step;
            lines.push(format!(
                "{}\t{}.5\t-2.25\tflying({},{},0.5,0.2)",
                file % 2 * 90,
                step,
                first,
                first + 1
            ));
        }
    }
    lines
}

fn locate_sub_scans(c: &mut Criterion) {
    let lines = scan_file_lines(200, 50);
    let header_line = find_header_line(&lines).unwrap_or(0);

    c.bench_function("locate_sub_scan_in_range", |b| {
        b.iter(|| locate_sub_scan(black_box(&lines), header_line, black_box(150)))
    });
    c.bench_function("locate_sub_scan_wrapped", |b| {
        b.iter(|| locate_sub_scan(black_box(&lines), header_line, black_box(1_037)))
    });
}

fn read_motor_table(c: &mut Criterion) {
    let lines = scan_file_lines(200, 50);

    c.bench_function("scan_file_motor_table", |b| {
        b.iter(|| {
            let scan_file = ScanFile::from_lines(Path::new("bench.txt"), lines.clone());
            scan_file.motor_table(black_box(120)).ok()
        })
    });
}

criterion_group!(benches, locate_sub_scans, read_motor_table);
criterion_main!(benches);
