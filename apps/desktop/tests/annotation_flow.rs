//! End-to-end annotation of one video without a window: analyze, refine,
//! commit, seek, delete and export.

use assistant::ScriptedAssistant;
use media_io::{MediaInfo, MediaKind, MediaSource, RgbaFrame};
use notes::Note;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use videonote::{AssistDispatcher, Session};

fn lecture() -> MediaSource {
    MediaSource::from_info(MediaInfo {
        path: PathBuf::from("/media/lecture.webm"),
        kind: MediaKind::Video,
        format_name: Some("matroska,webm".into()),
        width: Some(16),
        height: Some(9),
        duration_seconds: Some(300.0),
    })
    .unwrap()
}

#[tokio::test]
async fn annotate_and_export() {
    let assistant = ScriptedAssistant::new()
        .with_description("A speaker points at a chart.")
        .with_refinement("The speaker points to the revenue chart.");
    let mut session = Session::new();
    session.install_source(lecture());
    session.present_frame(RgbaFrame::solid(16, 9, [20, 20, 20, 255]));

    session.on_time_update(95.0);
    assert!(session.analyze_with(&assistant).await);
    session.on_time_update(140.0);
    assert!(session.refine_with(&assistant).await);
    let first = session.add_note().unwrap();
    assert_eq!(first.timestamp, 95.0);
    assert_eq!(first.text, "The speaker points to the revenue chart.");

    session.draft_text_mut().push_str("Questions begin");
    let second = session.add_note().unwrap();
    assert_eq!(second.timestamp, 140.0);

    session.on_time_update(12.0);
    session.draft_text_mut().push_str("Intro slide");
    session.add_note().unwrap();

    let texts: Vec<_> = session
        .notes()
        .list_notes()
        .iter()
        .map(|n| n.text.as_str())
        .collect();
    assert_eq!(
        texts,
        vec![
            "Intro slide",
            "The speaker points to the revenue chart.",
            "Questions begin"
        ]
    );

    assert_eq!(session.seek_to(first.timestamp), 95.0);
    assert!(session.delete_note(&second.id).is_some());
    assert!(session.delete_note(&second.id).is_none());

    let export = session.export().unwrap();
    assert_eq!(export.file_name, "notes-lecture.webm.json");
    let parsed: Vec<Note> = serde_json::from_str(&export.contents).unwrap();
    assert_eq!(parsed.as_slice(), session.notes().list_notes());
    assert!(parsed[1].ai_generated);
    assert!(!parsed[0].ai_generated);
}

#[test]
fn dispatched_requests_complete_through_the_channel() {
    let assistant = Arc::new(ScriptedAssistant::new().with_description("Sunset over water."));
    let dispatcher = AssistDispatcher::new(assistant.clone()).unwrap();
    let mut session = Session::new();
    session.install_source(lecture());
    session.present_frame(RgbaFrame::solid(16, 9, [200, 120, 40, 255]));

    let request = session.begin_analyze().unwrap();
    assert!(session.is_processing());
    dispatcher.dispatch(request, || {});

    let response = dispatcher.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(session.complete(response));
    assert!(!session.is_processing());
    assert_eq!(session.draft().text, "Sunset over water.");
    assert_eq!(assistant.analyze_calls(), 1);
}

#[test]
fn switching_video_drops_in_flight_result() {
    let assistant = Arc::new(ScriptedAssistant::new().with_description("stale"));
    let dispatcher = AssistDispatcher::new(assistant).unwrap();
    let mut session = Session::new();
    session.install_source(lecture());
    session.present_frame(RgbaFrame::solid(16, 9, [0, 0, 0, 255]));

    let request = session.begin_analyze().unwrap();
    dispatcher.dispatch(request, || {});
    session.unload_video();
    session.install_source(lecture());

    let response = dispatcher.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(!session.complete(response));
    assert!(session.draft().text.is_empty());
    assert!(!session.is_processing());
    assert_eq!(session.active_timestamp(), None);
}
