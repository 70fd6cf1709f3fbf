use crate::helpers;

use helpers::fixtures::{
    build_pipeline, build_pipeline_with, greeting_script, FOLDER, NATIVE_LANGUAGE,
    TARGET_LANGUAGE, VERSION,
};
use helpers::mocks::MockSynthesisBackend;
use lessonaudio::domain::assembly::TimingEntry;
use lessonaudio::domain::script::ScriptUnit;
use lessonaudio::error::PipelineError;
use pretty_assertions::assert_eq;

fn assert_monotonic(timings: &[TimingEntry]) {
    for window in timings.windows(2) {
        assert!(
            window[0].original_index < window[1].original_index,
            "entries must be sorted by original index: {timings:?}"
        );
        assert_eq!(
            window[0].end_ms, window[1].start_ms,
            "stream must be gapless: {timings:?}"
        );
    }
    for entry in timings {
        assert!(entry.start_ms < entry.end_ms, "empty segment: {entry:?}");
    }
}

#[tokio::test]
async fn it_should_assemble_the_greeting_scenario() {
    helpers::init_logging();
    let pipeline = build_pipeline(false);

    let result = pipeline
        .service
        .generate(&greeting_script(), NATIVE_LANGUAGE, TARGET_LANGUAGE, VERSION)
        .await
        .unwrap();

    // Three speed variants, keyed by the file-naming convention.
    let mut keys: Vec<&str> = result.per_speed.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["0_7", "0_85", "1_0"]);
    assert_eq!(
        result.combined_audio_url,
        result.per_speed.get("1_0").unwrap().url
    );

    // Narration alone, then the two ja units spanning the pause: two batches
    // per speed on the speech-mark backend, nothing anywhere else.
    assert_eq!(pipeline.speech.call_count(), 2 * 3);
    assert_eq!(pipeline.cloud.call_count(), 0);
    assert_eq!(pipeline.markless.call_count(), 0);

    // Four entries: three text units plus the pause gap.
    let variant = result.per_speed.get("1_0").unwrap();
    assert_eq!(variant.timings.len(), 4);
    assert_monotonic(&variant.timings);

    let indices: Vec<usize> = variant
        .timings
        .iter()
        .map(|entry| entry.original_index)
        .collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);

    // The pause entry carries exactly its configured second.
    let pause = variant.timings[2];
    assert_eq!(pause.end_ms - pause.start_ms, 1000);
    assert_eq!(
        variant.timings[3].start_ms,
        variant.timings[1].end_ms + 1000,
        "start after the gap equals previous end plus the pause"
    );
}

#[tokio::test]
async fn it_should_batch_consecutive_same_voice_units() {
    helpers::init_logging();
    let pipeline = build_pipeline(false);

    let units: Vec<ScriptUnit> = (0..5)
        .map(|i| ScriptUnit::target(i, "こんにちは", "Takumi"))
        .collect();

    let result = pipeline
        .service
        .generate(&units, NATIVE_LANGUAGE, TARGET_LANGUAGE, VERSION)
        .await
        .unwrap();

    // One batched call per speed, strictly fewer than one call per unit.
    assert_eq!(pipeline.speech.call_count(), 3);
    assert!(pipeline.speech.call_count() < units.len() * 3);

    for variant in result.per_speed.values() {
        assert_eq!(variant.timings.len(), 5);
        assert_monotonic(&variant.timings);
    }
}

#[tokio::test]
async fn it_should_fall_back_to_per_unit_calls_for_the_markless_backend() {
    helpers::init_logging();
    let pipeline = build_pipeline(false);

    let units: Vec<ScriptUnit> = (0..3)
        .map(|i| ScriptUnit::target(i, "おはようございます", "openai:alloy"))
        .collect();

    let result = pipeline
        .service
        .generate(&units, NATIVE_LANGUAGE, TARGET_LANGUAGE, VERSION)
        .await
        .unwrap();

    // No timing signal: one call per unit per speed, never more.
    assert_eq!(pipeline.markless.call_count(), 3 * 3);

    // The final unit of the final batch carries the trailing break directive;
    // per speed that is exactly one call.
    let calls = pipeline.markless.calls.lock().unwrap();
    let trailing = calls
        .iter()
        .filter(|call| call.body.ends_with("(pause)"))
        .count();
    assert_eq!(trailing, 3);
    drop(calls);

    // Trimming put the padded final unit back at its natural length.
    let variant = result.per_speed.get("1_0").unwrap();
    assert_monotonic(&variant.timings);
    let last = variant.timings.last().unwrap();
    assert_eq!(last.end_ms - last.start_ms, 400);
}

#[tokio::test]
async fn it_should_route_batches_by_voice_identifier() {
    helpers::init_logging();
    let pipeline = build_pipeline(false);

    let units = vec![
        ScriptUnit::target(0, "こんにちは", "ja-JP-Neural2-B"),
        ScriptUnit::target(1, "さようなら", "Takumi"),
        ScriptUnit::target(2, "おはよう", "openai:alloy"),
    ];

    pipeline
        .service
        .generate(&units, NATIVE_LANGUAGE, TARGET_LANGUAGE, VERSION)
        .await
        .unwrap();

    assert_eq!(pipeline.cloud.call_count(), 3);
    assert_eq!(pipeline.speech.call_count(), 3);
    assert_eq!(pipeline.markless.call_count(), 3);
}

#[tokio::test]
async fn it_should_resynthesize_per_unit_when_a_capable_backend_omits_marks() {
    helpers::init_logging();
    let pipeline = build_pipeline_with(
        MockSynthesisBackend::cloud_marks(),
        MockSynthesisBackend::speech_marks().without_marks(),
        MockSynthesisBackend::markless(),
        false,
    );

    let units: Vec<ScriptUnit> = (0..4)
        .map(|i| ScriptUnit::target(i, "こんにちは", "Takumi"))
        .collect();

    let result = pipeline
        .service
        .generate(&units, NATIVE_LANGUAGE, TARGET_LANGUAGE, VERSION)
        .await
        .unwrap();

    // One failed batched attempt plus one call per unit, per speed.
    assert_eq!(pipeline.speech.call_count(), (1 + 4) * 3);
    let variant = result.per_speed.get("0_85").unwrap();
    assert_eq!(variant.timings.len(), 4);
    assert_monotonic(&variant.timings);
}

#[tokio::test]
async fn it_should_upload_combined_and_segment_artifacts() {
    helpers::init_logging();
    let pipeline = build_pipeline(true);

    pipeline
        .service
        .generate(&greeting_script(), NATIVE_LANGUAGE, TARGET_LANGUAGE, VERSION)
        .await
        .unwrap();

    // 3 combined artifacts + 3 text units * 3 speeds.
    assert_eq!(pipeline.storage.upload_count(), 3 + 9);

    let filenames = pipeline.storage.uploaded_filenames();
    for expected in [
        "lesson_v42_0_7.mp3",
        "lesson_v42_0_85.mp3",
        "lesson_v42_1_0.mp3",
        "lesson_v42_u1_1_0.mp3",
        "lesson_v42_u3_0_7.mp3",
    ] {
        assert!(
            filenames.iter().any(|name| name == expected),
            "missing upload {expected}, got {filenames:?}"
        );
    }

    let uploads = pipeline.storage.uploads.lock().unwrap();
    assert!(uploads
        .iter()
        .all(|upload| upload.folder == FOLDER && upload.content_type == "audio/mpeg"));
}

#[tokio::test]
async fn it_should_skip_segment_uploads_when_disabled() {
    helpers::init_logging();
    let pipeline = build_pipeline(false);

    pipeline
        .service
        .generate(&greeting_script(), NATIVE_LANGUAGE, TARGET_LANGUAGE, VERSION)
        .await
        .unwrap();

    assert_eq!(pipeline.storage.upload_count(), 3);
}

#[tokio::test]
async fn it_should_reject_scripts_with_no_audible_units() {
    helpers::init_logging();
    let pipeline = build_pipeline(false);

    let units = vec![ScriptUnit::pause(0, 1.0), ScriptUnit::marker(1, "intro")];
    let error = pipeline
        .service
        .generate(&units, NATIVE_LANGUAGE, TARGET_LANGUAGE, VERSION)
        .await
        .unwrap_err();

    assert!(matches!(error, PipelineError::InvalidInput(_)));
    assert_eq!(pipeline.storage.upload_count(), 0);
}
