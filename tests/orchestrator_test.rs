//! Integration tests for batch build orchestration
//!
//! A recording compiler stands in for esbuild so every invocation (and the
//! entry points it received) can be asserted on.

use async_trait::async_trait;
use fnpack::bundler::{
    BatchBuildOrchestrator, BuildSettings, Compiler, CompilerOptions, CompilerOutput, Concurrency,
    Error, ExternalSpec, FunctionEntry, FunctionHandle, METAFILE_NAME, ModuleFormat, Platform,
    Result, SettingsBuilder,
};
use serde_json::json;
use std::{
    num::NonZeroUsize,
    path::Path,
    sync::{Arc, Mutex},
};

/// Compiler that records every call and optionally fails one of them.
#[derive(Default)]
struct RecordingCompiler {
    calls: Mutex<Vec<CompilerOptions>>,
    fail_on_call: Option<usize>,
}

impl RecordingCompiler {
    fn failing_on(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<CompilerOptions> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Compiler for RecordingCompiler {
    async fn build(&self, options: &CompilerOptions) -> Result<CompilerOutput> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(options.clone());
            calls.len() - 1
        };
        if self.fail_on_call == Some(index) {
            return Err(Error::GenericError("syntax error".into()));
        }

        let outputs: serde_json::Map<_, _> = options
            .entry_points
            .iter()
            .map(|entry| (entry.clone(), json!({})))
            .collect();
        Ok(CompilerOutput {
            output_files: Vec::new(),
            metafile: Some(json!({ "inputs": outputs.clone(), "outputs": outputs })),
        })
    }
}

fn entry(path: &str, alias: &str) -> FunctionEntry {
    FunctionEntry::new(
        path,
        alias,
        FunctionHandle {
            name: None,
            handler: format!("{alias}.handler"),
        },
    )
}

fn settings(service: &Path) -> SettingsBuilder {
    SettingsBuilder::new().service_path(service)
}

async fn run(
    settings: BuildSettings,
    compiler: Arc<RecordingCompiler>,
    entries: &[FunctionEntry],
) -> Result<Vec<fnpack::bundler::FunctionBuildResult>> {
    BatchBuildOrchestrator::new(settings, compiler).build(entries).await
}

#[tokio::test]
async fn unbounded_concurrency_compiles_everything_at_once() {
    let dir = tempfile::tempdir().unwrap();
    let compiler = Arc::new(RecordingCompiler::default());

    let results = run(
        settings(dir.path()).build().unwrap(),
        compiler.clone(),
        &[entry("a.ts", "a"), entry("b.ts", "b")],
    )
    .await
    .unwrap();

    let calls = compiler.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].entry_points, ["a.ts", "b.ts"]);

    let bundles: Vec<_> = results.iter().map(|r| r.bundle_path.as_str()).collect();
    assert_eq!(bundles, ["a.js", "b.js"]);
}

#[tokio::test]
async fn concurrency_limit_splits_batches_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let compiler = Arc::new(RecordingCompiler::default());
    let limit = Concurrency::Limit(NonZeroUsize::new(2).unwrap());

    run(
        settings(dir.path()).concurrency(limit).build().unwrap(),
        compiler.clone(),
        &[entry("a.ts", "a"), entry("b.ts", "b"), entry("c.ts", "c")],
    )
    .await
    .unwrap();

    let batches: Vec<_> = compiler.calls().into_iter().map(|c| c.entry_points).collect();
    assert_eq!(batches, [vec!["a.ts", "b.ts"], vec!["c.ts"]]);
}

#[tokio::test]
async fn shared_entry_points_are_compiled_once() {
    let dir = tempfile::tempdir().unwrap();
    let compiler = Arc::new(RecordingCompiler::default());

    let results = run(
        settings(dir.path()).out_extension(".cjs").build().unwrap(),
        compiler.clone(),
        &[
            entry("src/api.ts", "get"),
            entry("src/api.ts", "put"),
            entry("src/jobs/cron.ts", "cron"),
        ],
    )
    .await
    .unwrap();

    assert_eq!(compiler.calls()[0].entry_points, ["src/api.ts", "src/jobs/cron.ts"]);
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].bundle_path, "src/api.cjs");
    assert_eq!(results[1].bundle_path, "src/api.cjs");
    assert_eq!(results[1].alias, "put");
    assert_eq!(results[2].bundle_path, "src/jobs/cron.cjs");
}

#[tokio::test]
async fn extension_format_mismatch_fails_before_compiling() {
    let dir = tempfile::tempdir().unwrap();
    let compiler = Arc::new(RecordingCompiler::default());

    let err = run(
        settings(dir.path())
            .format(ModuleFormat::Esm)
            .out_extension(".cjs")
            .build()
            .unwrap(),
        compiler.clone(),
        &[entry("a.ts", "a")],
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::Config(_)));
    assert!(compiler.calls().is_empty());

    let err = run(
        settings(dir.path())
            .platform(Platform::Node)
            .format(ModuleFormat::Cjs)
            .out_extension(".mjs")
            .build()
            .unwrap(),
        compiler.clone(),
        &[entry("a.ts", "a")],
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(compiler.calls().is_empty());
}

#[tokio::test]
async fn skip_build_maps_without_compiling() {
    let dir = tempfile::tempdir().unwrap();
    let compiler = Arc::new(RecordingCompiler::default());

    let results = run(
        settings(dir.path())
            .skip_build(true)
            .out_extension("mjs")
            .format(ModuleFormat::Esm)
            .build()
            .unwrap(),
        compiler.clone(),
        &[entry("src/a.ts", "a")],
    )
    .await
    .unwrap();

    assert!(compiler.calls().is_empty());
    assert_eq!(results[0].bundle_path, "src/a.mjs");
}

#[tokio::test]
async fn failing_batch_stops_later_batches() {
    let dir = tempfile::tempdir().unwrap();
    let compiler = Arc::new(RecordingCompiler::failing_on(0));
    let limit = Concurrency::Limit(NonZeroUsize::new(1).unwrap());

    let err = run(
        settings(dir.path()).concurrency(limit).build().unwrap(),
        compiler.clone(),
        &[entry("a.ts", "a"), entry("b.ts", "b")],
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::Compiler { batch: 0, .. }));
    assert!(err.to_string().contains("syntax error"));
    assert_eq!(compiler.calls().len(), 1);
}

#[tokio::test]
async fn entries_without_function_are_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let compiler = Arc::new(RecordingCompiler::default());
    let mut orphan = entry("b.ts", "b");
    orphan.function = None;

    let results = run(
        settings(dir.path()).build().unwrap(),
        compiler,
        &[entry("a.ts", "a"), orphan],
    )
    .await
    .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].alias, "a");
}

#[tokio::test]
async fn compiler_receives_filtered_options_and_externals() {
    let dir = tempfile::tempdir().unwrap();
    let compiler = Arc::new(RecordingCompiler::default());
    let pass_through = [
        ("minify".to_string(), json!(true)),
        ("concurrency".to_string(), json!(4)),
        ("packager".to_string(), json!("yarn")),
    ]
    .into_iter()
    .collect();

    run(
        settings(dir.path())
            .external(vec![ExternalSpec::Name("pg".into())])
            .exclude(vec!["aws-sdk".into()])
            .pass_through(pass_through)
            .build()
            .unwrap(),
        compiler.clone(),
        &[entry("a.ts", "a")],
    )
    .await
    .unwrap();

    let call = &compiler.calls()[0];
    assert_eq!(call.external, ["pg", "aws-sdk"]);
    assert_eq!(call.pass_through.get("minify"), Some(&json!(true)));
    assert!(!call.pass_through.contains_key("concurrency"));
    assert!(!call.pass_through.contains_key("packager"));
}

#[tokio::test]
async fn metafiles_are_merged_into_one_file() {
    let dir = tempfile::tempdir().unwrap();
    let compiler = Arc::new(RecordingCompiler::default());
    let limit = Concurrency::Limit(NonZeroUsize::new(1).unwrap());
    let settings = settings(dir.path())
        .concurrency(limit)
        .metafile(true)
        .build()
        .unwrap();
    let meta_path = settings.build_dir().join(METAFILE_NAME);

    run(settings, compiler, &[entry("a.ts", "a"), entry("b.ts", "b")])
        .await
        .unwrap();

    let meta: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(meta_path).unwrap()).unwrap();
    assert!(meta["inputs"].get("a.ts").is_some());
    assert!(meta["inputs"].get("b.ts").is_some());
}

#[tokio::test]
async fn build_dir_over_sources_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let service = dir.path().join("svc");
    std::fs::create_dir_all(service.join("src")).unwrap();
    std::fs::write(service.join("src/a.ts"), "export const handler = 1;").unwrap();
    std::fs::write(service.join("package.json"), "{}").unwrap();

    for build_dir in [service.join("."), dir.path().to_path_buf()] {
        let err = settings(&service).build_dir(&build_dir).build().unwrap_err();
        assert!(matches!(err, Error::Config(_)), "{}", build_dir.display());
    }

    assert!(service.join("src/a.ts").is_file());
    assert!(service.join("package.json").is_file());
}
