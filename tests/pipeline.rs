use anyhow::Result;
use serde_json::{Value, json};
use std::fs;
use std::path::Path;
use videorag::pipeline;
use videorag::{
    ChunkIndex, ChunkingConfig, ChunksDocument, EventBuilderConfig, EventsDocument,
    PipelineError, Settings, VideoPaths, WhitespaceTokenizer,
};

fn words(n: usize, word: &str) -> String {
    vec![word; n].join(" ")
}

fn write_transcript(settings: &Settings, video_id: &str, transcript: Value) -> Result<VideoPaths> {
    let paths = VideoPaths::new(video_id, settings)?;
    fs::create_dir_all(paths.derived_dir())?;
    fs::write(
        paths.transcript_segments_path(),
        serde_json::to_string_pretty(&transcript)?,
    )?;
    Ok(paths)
}

fn read<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

#[test]
fn full_run_produces_events_chunks_and_index_rows() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let settings = Settings::from_data_dir(dir.path());
    let paths = write_transcript(
        &settings,
        "talk",
        json!({
            "video_id": "talk",
            "segments": [
                {"start": 4.0, "end": 6.0, "text": words(100, "c")},
                {"start": 0.0, "end": 2.0, "text": format!("  {}\n", words(100, "a"))},
                {"start": 3.0, "end": 3.5, "text": "   "},
                {"start": 2.0, "end": 4.0, "text": words(100, "b")}
            ]
        }),
    )?;

    let summary = pipeline::run_all(
        &settings,
        "talk",
        &EventBuilderConfig::default(),
        &ChunkingConfig::default(),
        &WhitespaceTokenizer,
    )?;

    assert_eq!(summary.events.records, 3);
    assert_eq!(summary.chunks.records, 1);
    assert_eq!(summary.indexed, 1);

    let events: EventsDocument = read(&paths.events_path())?;
    assert_eq!(events.video_id, "talk");
    let ids: Vec<_> = events.events.iter().map(|e| e.event_id).collect();
    assert_eq!(ids, vec![Some(0), Some(1), Some(2)]);
    assert!(events.events[0].text.starts_with("a a"));

    let chunks: ChunksDocument = read(&paths.chunks_path())?;
    assert_eq!(chunks.config.tokenizer, "whitespace");
    assert_eq!(chunks.config.chunk_tokens, 512);
    let chunk = &chunks.chunks[0];
    assert_eq!(chunk.event_range, [0, 2]);
    assert_eq!(chunk.ts_start, 0.0);
    assert_eq!(chunk.ts_end, 6.0);
    assert_eq!(chunk.token_count, 300);
    assert_eq!(chunk.event_counts.get("asr"), Some(&3));

    let index = ChunkIndex::open(&settings.index_path)?;
    let rows = index.chunks_for_video("talk")?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].text, chunk.text);
    Ok(())
}

#[test]
fn rerunning_is_byte_identical_and_idempotent() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let settings = Settings::from_data_dir(dir.path());
    let segments: Vec<Value> = (0..40)
        .map(|i| json!({"start": i as f64 * 1.5, "end": i as f64 * 1.5 + 1.0, "text": words(30 + i % 7, "w")}))
        .collect();
    let paths = write_transcript(&settings, "lecture", json!({"segments": segments}))?;
    let chunking = ChunkingConfig::new(120, 30, 150);

    pipeline::run_all(&settings, "lecture", &EventBuilderConfig::default(), &chunking, &WhitespaceTokenizer)?;
    let events_first = fs::read(paths.events_path())?;
    let chunks_first = fs::read(paths.chunks_path())?;

    let summary = pipeline::run_all(
        &settings,
        "lecture",
        &EventBuilderConfig::default(),
        &chunking,
        &WhitespaceTokenizer,
    )?;

    assert_eq!(fs::read(paths.events_path())?, events_first);
    assert_eq!(fs::read(paths.chunks_path())?, chunks_first);

    let index = ChunkIndex::open(&settings.index_path)?;
    assert_eq!(index.chunks_for_video("lecture")?.len(), summary.chunks.records);
    assert!(summary.chunks.records > 1);
    Ok(())
}

#[test]
fn chunk_ranges_cover_every_event() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let settings = Settings::from_data_dir(dir.path());
    let segments: Vec<Value> = (0..25)
        .rev()
        .map(|i| json!({"start": i, "end": i + 1, "text": words(10 + (i * 13) % 90, "x")}))
        .collect();
    let paths = write_transcript(&settings, "cover", json!({"segments": segments}))?;

    pipeline::build_events(&settings, "cover", &EventBuilderConfig::default())?;
    pipeline::chunk_video(&settings, "cover", &ChunkingConfig::new(200, 50, 260), &WhitespaceTokenizer)?;

    let chunks: ChunksDocument = read(&paths.chunks_path())?;
    assert!(chunks.chunks.len() <= 25);

    let mut covered = vec![false; 25];
    for chunk in &chunks.chunks {
        assert!(!chunk.text.trim().is_empty());
        for slot in &mut covered[chunk.event_range[0]..=chunk.event_range[1]] {
            *slot = true;
        }
    }
    assert!(covered.iter().all(|&c| c));
    Ok(())
}

#[test]
fn empty_transcript_yields_empty_chunks() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let settings = Settings::from_data_dir(dir.path());
    let paths = write_transcript(&settings, "silent", json!({"video_id": "silent", "segments": []}))?;

    let summary = pipeline::run_all(
        &settings,
        "silent",
        &EventBuilderConfig::default(),
        &ChunkingConfig::default(),
        &WhitespaceTokenizer,
    )?;

    assert_eq!(summary.chunks.records, 0);
    assert_eq!(summary.indexed, 0);
    let chunks: Value = read(&paths.chunks_path())?;
    assert_eq!(chunks["chunks"], json!([]));
    Ok(())
}

#[test]
fn missing_transcript_is_reported_and_nothing_is_written() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let settings = Settings::from_data_dir(dir.path());

    let err = pipeline::build_events(&settings, "ghost", &EventBuilderConfig::default())
        .unwrap_err();

    let missing = err
        .chain()
        .any(|cause| matches!(cause.downcast_ref::<PipelineError>(), Some(PipelineError::MissingArtifact(_))));
    assert!(missing, "unexpected error: {:#}", err);
    assert!(!VideoPaths::new("ghost", &settings)?.events_path().exists());
    Ok(())
}

#[test]
fn invalid_segments_leave_previous_events_untouched() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let settings = Settings::from_data_dir(dir.path());
    let paths = write_transcript(
        &settings,
        "talk",
        json!({"segments": [{"start": 0, "end": 1, "text": "hello"}]}),
    )?;
    pipeline::build_events(&settings, "talk", &EventBuilderConfig::default())?;
    let before = fs::read(paths.events_path())?;

    write_transcript(&settings, "talk", json!({"segments": "not a list"}))?;
    let err = pipeline::build_events(&settings, "talk", &EventBuilderConfig::default())
        .unwrap_err();

    let invalid = err
        .chain()
        .any(|cause| matches!(cause.downcast_ref::<PipelineError>(), Some(PipelineError::Validation(_))));
    assert!(invalid, "unexpected error: {:#}", err);
    assert_eq!(fs::read(paths.events_path())?, before);
    Ok(())
}

#[test]
fn chunking_from_file_falls_back_to_directory_name() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let events_path = dir.path().join("derived/from_dir/events.json");
    fs::create_dir_all(events_path.parent().unwrap())?;
    fs::write(
        &events_path,
        json!({"events": [{"t": 1.0, "text": "point event"}]}).to_string(),
    )?;

    let doc = videorag::chunker::chunk_events_from_file(
        None,
        &events_path,
        &WhitespaceTokenizer,
        &ChunkingConfig::default(),
    )?;

    assert_eq!(doc.video_id, "from_dir");
    assert_eq!(doc.chunks.len(), 1);
    assert_eq!((doc.chunks[0].ts_start, doc.chunks[0].ts_end), (1.0, 1.0));
    Ok(())
}

#[test]
fn reindexing_after_shorter_rechunk_drops_stale_rows() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let settings = Settings::from_data_dir(dir.path());
    let segments: Vec<Value> = (0..10)
        .map(|i| json!({"start": i, "end": i + 1, "text": words(50, "z")}))
        .collect();
    write_transcript(&settings, "talk", json!({"segments": segments}))?;

    let small = pipeline::run_all(
        &settings,
        "talk",
        &EventBuilderConfig::default(),
        &ChunkingConfig::new(100, 0, 100),
        &WhitespaceTokenizer,
    )?;
    assert_eq!(small.indexed, 5);

    let large = pipeline::run_all(
        &settings,
        "talk",
        &EventBuilderConfig::default(),
        &ChunkingConfig::default(),
        &WhitespaceTokenizer,
    )?;
    assert_eq!(large.indexed, 1);

    let index = ChunkIndex::open(&settings.index_path)?;
    assert_eq!(index.chunks_for_video("talk")?.len(), 1);
    Ok(())
}
