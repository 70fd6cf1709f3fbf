use crate::helpers;

use helpers::mocks::{encode_audio, MockAudioToolkit, MockStorageRepository};
use lessonaudio::domain::assembly::AudioAssembler;
use lessonaudio::domain::batching::{PauseEntry, PauseIndex};
use lessonaudio::domain::synthesis::UnitAudio;
use pretty_assertions::assert_eq;
use std::sync::Arc;

struct TestAssembler {
    assembler: AudioAssembler,
    toolkit: Arc<MockAudioToolkit>,
    storage: Arc<MockStorageRepository>,
}

fn build_assembler(upload_segments: bool) -> TestAssembler {
    let toolkit = Arc::new(MockAudioToolkit::new());
    let storage = Arc::new(MockStorageRepository::new());
    let assembler = AudioAssembler::new(toolkit.clone(), storage.clone(), upload_segments);
    TestAssembler {
        assembler,
        toolkit,
        storage,
    }
}

fn unit(original_index: usize, duration_ms: u64) -> UnitAudio {
    UnitAudio {
        original_index,
        audio: encode_audio(duration_ms),
    }
}

#[tokio::test]
async fn it_should_insert_silence_before_the_indexed_unit() {
    helpers::init_logging();
    let harness = build_assembler(false);

    let units = vec![unit(0, 400), unit(2, 600)];
    let mut pauses = PauseIndex::new();
    pauses.insert(
        1,
        PauseEntry {
            seconds: 0.5,
            original_index: 1,
        },
    );

    let variant = harness
        .assembler
        .assemble(&units, &pauses, "1_0", "v1", "lessons")
        .await
        .unwrap();

    let spans: Vec<(usize, u64, u64)> = variant
        .timings
        .iter()
        .map(|entry| (entry.original_index, entry.start_ms, entry.end_ms))
        .collect();
    assert_eq!(spans, vec![(0, 0, 400), (1, 400, 900), (2, 900, 1500)]);
}

#[tokio::test]
async fn it_should_append_trailing_silence_past_the_last_unit() {
    helpers::init_logging();
    let harness = build_assembler(false);

    let units = vec![unit(0, 400)];
    let mut pauses = PauseIndex::new();
    pauses.insert(
        1,
        PauseEntry {
            seconds: 2.0,
            original_index: 1,
        },
    );

    let variant = harness
        .assembler
        .assemble(&units, &pauses, "1_0", "v1", "lessons")
        .await
        .unwrap();

    assert_eq!(variant.timings.len(), 2);
    let trailing = variant.timings[1];
    assert_eq!(trailing.original_index, 1);
    assert_eq!((trailing.start_ms, trailing.end_ms), (400, 2400));
}

#[tokio::test]
async fn it_should_reuse_one_silence_buffer_per_distinct_duration() {
    helpers::init_logging();
    let harness = build_assembler(false);

    let units = vec![unit(0, 400), unit(2, 400), unit(4, 400)];
    let mut pauses = PauseIndex::new();
    pauses.insert(
        1,
        PauseEntry {
            seconds: 1.0,
            original_index: 1,
        },
    );
    pauses.insert(
        2,
        PauseEntry {
            seconds: 1.0,
            original_index: 3,
        },
    );

    harness
        .assembler
        .assemble(&units, &pauses, "1_0", "v1", "lessons")
        .await
        .unwrap();

    // Two identical gaps, one generated buffer.
    assert_eq!(harness.toolkit.silence_call_count(), 1);
}

#[tokio::test]
async fn it_should_generate_distinct_silence_per_duration() {
    helpers::init_logging();
    let harness = build_assembler(false);

    let units = vec![unit(0, 400), unit(2, 400), unit(4, 400)];
    let mut pauses = PauseIndex::new();
    pauses.insert(
        1,
        PauseEntry {
            seconds: 1.0,
            original_index: 1,
        },
    );
    pauses.insert(
        2,
        PauseEntry {
            seconds: 2.5,
            original_index: 3,
        },
    );

    harness
        .assembler
        .assemble(&units, &pauses, "1_0", "v1", "lessons")
        .await
        .unwrap();

    assert_eq!(harness.toolkit.silence_call_count(), 2);
}

#[tokio::test]
async fn it_should_upload_segments_for_text_units_only() {
    helpers::init_logging();
    let harness = build_assembler(true);

    let units = vec![unit(0, 400), unit(2, 600)];
    let mut pauses = PauseIndex::new();
    pauses.insert(
        1,
        PauseEntry {
            seconds: 0.5,
            original_index: 1,
        },
    );

    let variant = harness
        .assembler
        .assemble(&units, &pauses, "0_7", "v1", "lessons")
        .await
        .unwrap();

    // One combined upload plus one per text unit; the silence gap is never
    // uploaded on its own.
    assert_eq!(harness.storage.upload_count(), 3);
    assert_eq!(variant.segments.len(), 2);
    assert_eq!(variant.segments[0].original_index, 0);
    assert_eq!(variant.segments[1].original_index, 2);

    let filenames = harness.storage.uploaded_filenames();
    assert!(filenames.iter().any(|name| name == "lesson_v1_0_7.mp3"));
    assert!(filenames.iter().any(|name| name == "lesson_v1_u0_0_7.mp3"));
    assert!(filenames.iter().any(|name| name == "lesson_v1_u2_0_7.mp3"));
}

#[tokio::test]
async fn it_should_concatenate_exactly_once_per_variant() {
    helpers::init_logging();
    let harness = build_assembler(false);

    let units = vec![unit(0, 400), unit(1, 400)];
    harness
        .assembler
        .assemble(&units, &PauseIndex::new(), "1_0", "v1", "lessons")
        .await
        .unwrap();

    assert_eq!(*harness.toolkit.concat_calls.lock().unwrap(), 1);
}
