//! Per-backend profiling of the lowering pipeline.
//!
//! A sample is one run of canonicalize, split, extract and render on one
//! backend. Samples of the same case are compared against the dense backend.

use crate::synthetic::SyntheticShape;
use lmisdp_core::{
    Backend, CoefficientStorage, LilMatrix, Lmi, NumericProblem, ObjectiveSense, SdpProblem,
    SplitBlocks, canonical_blocks, extract_coefficients,
};
use lmisdp_export::SdpaSparse;
use lmisdp_tools::{MeasurementRecorder, StageMeasurement};
use nalgebra::DMatrix;
use nalgebra_sparse::CooMatrix;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;

/// What one backend produced for one case, and how long it took.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileSample {
    pub case_name: String,
    pub backend: String,
    pub repetition: u32,
    pub block_struct: Vec<usize>,
    /// Stored non-zeros over every constant and coefficient matrix.
    pub nnz: usize,
    pub sdpa_bytes: usize,
    pub extract_ms: f64,
    pub total_ms: f64,
    pub extract_rss_delta_bytes: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BackendComparison {
    pub case_name: String,
    pub backend: String,
    pub runs: usize,
    pub sdp_blocks: usize,
    pub largest_block: usize,
    pub nnz: usize,
    pub sdpa_bytes: usize,
    pub best_extract_ms: f64,
    pub best_total_ms: f64,
    /// Best extraction time relative to the dense backend on the same case.
    pub extract_vs_dense: Option<f64>,
    /// Every run of the case rendered the same amount of SDPA text.
    pub output_agrees: bool,
}

struct Lowered {
    block_struct: Vec<usize>,
    nnz: usize,
    sdpa_bytes: usize,
}

pub fn profile_sample(
    shape: SyntheticShape,
    backend: Backend,
    repetition: u32,
    problem: &SdpProblem,
    split: SplitBlocks,
    capture_memory: bool,
) -> Result<ProfileSample, Box<dyn Error>> {
    let mut recorder = if capture_memory {
        MeasurementRecorder::new()
    } else {
        MeasurementRecorder::timing_only()
    };
    let lowered = match backend {
        Backend::Dense => lower::<DMatrix<f64>>(&mut recorder, problem, split)?,
        Backend::SparseLil => lower::<LilMatrix>(&mut recorder, problem, split)?,
        Backend::SparseNative => lower::<CooMatrix<f64>>(&mut recorder, problem, split)?,
    };
    let stages = recorder.into_stages();
    let extract = stages.iter().find(|m| m.stage == "extract");

    let sample = ProfileSample {
        case_name: shape.case_name(),
        backend: backend.as_str().to_string(),
        repetition,
        block_struct: lowered.block_struct,
        nnz: lowered.nnz,
        sdpa_bytes: lowered.sdpa_bytes,
        extract_ms: extract.map_or(0.0, millis),
        total_ms: stages.iter().map(millis).sum(),
        extract_rss_delta_bytes: extract.and_then(|m| m.rss_delta_bytes),
    };
    tracing::debug!(
        component = "bench",
        operation = "profile_sample",
        status = "success",
        case = sample.case_name.as_str(),
        backend = sample.backend.as_str(),
        nnz = sample.nnz,
        duration_ms = sample.total_ms,
        "Profiled case"
    );
    Ok(sample)
}

fn millis(measurement: &StageMeasurement) -> f64 {
    measurement.duration.as_secs_f64() * 1000.0
}

fn lower<M: CoefficientStorage>(
    recorder: &mut MeasurementRecorder,
    problem: &SdpProblem,
    split: SplitBlocks,
) -> Result<Lowered, Box<dyn Error>> {
    let canonical: Vec<Lmi> = recorder.measure("canonical", || {
        problem
            .lmis()
            .iter()
            .map(|lmi| lmi.canonical().into_owned())
            .collect()
    });

    let stage = recorder.begin_stage("split");
    let blocks = canonical_blocks(&canonical, split)?;
    recorder.end_stage(stage);

    let stage = recorder.begin_stage("extract");
    let objective = problem.objective_coeffs(ObjectiveSense::Minimize)?;
    let bundles = blocks
        .iter()
        .map(|block| extract_coefficients::<M>(block, problem.variables()))
        .collect::<Result<Vec<_>, _>>()?;
    let numeric = NumericProblem::new(objective, bundles);
    recorder.end_stage(stage);

    let stage = recorder.begin_stage("render");
    let text = SdpaSparse.render(&numeric, None)?;
    recorder.end_stage(stage);

    let nnz = numeric
        .blocks()
        .iter()
        .flat_map(|bundle| std::iter::once(bundle.constant()).chain(bundle.coeffs()))
        .map(|matrix| matrix.nonzero_entries().len())
        .sum();
    Ok(Lowered {
        block_struct: numeric.block_struct(),
        nnz,
        sdpa_bytes: text.len(),
    })
}

/// One row per case and backend, ordered by case then backend name.
pub fn compare_backends(samples: &[ProfileSample]) -> Vec<BackendComparison> {
    let mut cases: BTreeMap<&str, BTreeMap<&str, Vec<&ProfileSample>>> = BTreeMap::new();
    for sample in samples {
        cases
            .entry(sample.case_name.as_str())
            .or_default()
            .entry(sample.backend.as_str())
            .or_default()
            .push(sample);
    }

    let mut rows = Vec::new();
    for (case_name, backends) in cases {
        let sizes: BTreeSet<usize> = backends
            .values()
            .flatten()
            .map(|sample| sample.sdpa_bytes)
            .collect();
        let dense_extract = backends
            .get(Backend::Dense.as_str())
            .map(|runs| fastest(runs, |s| s.extract_ms))
            .filter(|ms| *ms > 0.0);

        for (backend, runs) in &backends {
            let Some(first) = runs.first() else {
                continue;
            };
            let best_extract_ms = fastest(runs, |s| s.extract_ms);
            rows.push(BackendComparison {
                case_name: case_name.to_string(),
                backend: backend.to_string(),
                runs: runs.len(),
                sdp_blocks: first.block_struct.len(),
                largest_block: first.block_struct.iter().copied().max().unwrap_or(0),
                nnz: first.nnz,
                sdpa_bytes: first.sdpa_bytes,
                best_extract_ms,
                best_total_ms: fastest(runs, |s| s.total_ms),
                extract_vs_dense: dense_extract.map(|dense| best_extract_ms / dense),
                output_agrees: sizes.len() == 1,
            });
        }
    }
    rows
}

fn fastest(runs: &[&ProfileSample], metric: impl Fn(&ProfileSample) -> f64) -> f64 {
    runs.iter()
        .map(|sample| metric(*sample))
        .fold(f64::INFINITY, f64::min)
}

pub fn print_comparison(rows: &[BackendComparison]) {
    println!(
        "{:<14} {:<14} {:>4} {:>7} {:>6} {:>8} {:>11} {:>11} {:>10} {:>9}",
        "case", "backend", "runs", "blocks", "max_n", "nnz", "sdpa_bytes", "extract_ms",
        "total_ms", "vs_dense"
    );
    for row in rows {
        let ratio = row
            .extract_vs_dense
            .map_or_else(|| "-".to_string(), |ratio| format!("{ratio:.2}x"));
        let marker = if row.output_agrees { "" } else { " (output differs)" };
        println!(
            "{:<14} {:<14} {:>4} {:>7} {:>6} {:>8} {:>11} {:>11.3} {:>10.3} {:>9}{}",
            row.case_name,
            row.backend,
            row.runs,
            row.sdp_blocks,
            row.largest_block,
            row.nnz,
            row.sdpa_bytes,
            row.best_extract_ms,
            row.best_total_ms,
            ratio,
            marker,
        );
    }
}
