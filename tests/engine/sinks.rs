//! Result files written by a real sweep.

use crate::common::{engine_with_stub, quick_config};
use roofline::{open_sinks, KernelRegistry, OutputFormat, RooflineConfig, Sweep};
use tempfile::TempDir;

fn sweep_into(dir: &TempDir, format: OutputFormat, file: &str) -> RooflineConfig {
    let config = RooflineConfig {
        vlen_start: 16,
        vlen_end: 64,
        save_output: true,
        output_path: dir.path().join(file),
        output_format: format,
        kernels: vec!["peak_add".into(), "ax".into(), "diff8".into()],
        ..quick_config(1, 1)
    };
    let (engine, _) = engine_with_stub(&config);
    let mut sinks = open_sinks(&config).unwrap();
    let mut sweep = Sweep::with_engine(config.clone(), &KernelRegistry::standard(), engine).unwrap();
    sweep.run(&mut sinks).unwrap();
    config
}

#[test]
fn csv_columns_follow_selected_kernels() {
    let dir = TempDir::new().unwrap();
    let config = sweep_into(&dir, OutputFormat::Csv, "out.csv");

    let text = std::fs::read_to_string(&config.output_path).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(
        lines[0],
        "n,peak_add gflops,ax gflops,diff8 gflops,peak_add gbytes,ax gbytes,diff8 gbytes"
    );
    // 16, 32, 64
    assert_eq!(lines.len(), 4);
    for line in &lines[1..] {
        assert_eq!(line.split(',').count(), 7);
    }
    assert!(lines[3].starts_with("64,"));
}

#[test]
fn jsonl_rows_carry_every_kernel() {
    let dir = TempDir::new().unwrap();
    let config = sweep_into(&dir, OutputFormat::Jsonl, "out.jsonl");

    let text = std::fs::read_to_string(&config.output_path).unwrap();
    let rows: Vec<serde_json::Value> = text
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(rows.len(), 3);
    for row in &rows {
        assert_eq!(row["results"].as_array().unwrap().len(), 3);
        assert_eq!(row["results"][0]["best"]["bytes_loaded"], 0);
    }
    assert_eq!(rows[0]["n"], 16);
}
