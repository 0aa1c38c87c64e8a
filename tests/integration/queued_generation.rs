//! Queued generation: submit, poll, observe progress.

use crate::integration::mock_server::MockServerFixture;
use imagegen_client::{
    ErrorKind, GenerationRequest, GenerationResult, JobHandle, ProgressEvent, RecordingObserver,
};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::time::Duration;

fn artifact() -> GenerationResult {
    GenerationResult {
        success: true,
        image_url: Some("https://img.example.com/out/abc.png".into()),
        seed: Some(1234),
        model: Some("flux-realism".into()),
        error: None,
    }
}

#[tokio::test]
async fn test_generate_reports_every_transition_in_order() {
    let fixture = MockServerFixture::new().await;
    let _submit = fixture
        .mock_json(
            "POST",
            "/api/v1/generate/queue",
            200,
            json!({"job_id": "job-1", "status": "pending", "position": 5}),
        )
        .await;
    let (_poll, served) = fixture
        .mock_status_sequence(
            "job-1",
            vec![
                json!({"job_id": "job-1", "status": "pending", "position": 3}),
                json!({"job_id": "job-1", "status": "pending", "position": 1}),
                json!({"job_id": "job-1", "status": "processing"}),
                json!({"job_id": "job-1", "status": "completed", "result": artifact()}),
            ],
        )
        .await;

    let observer = RecordingObserver::new();
    let result = fixture
        .client()
        .generate_with_progress(&GenerationRequest::new("a red fox"), &observer)
        .await
        .expect("generation should complete");

    assert_eq!(result, artifact());
    assert_eq!(served.load(Ordering::SeqCst), 4);
    assert_eq!(
        observer.events(),
        vec![
            ProgressEvent::new("In queue - Position: 5", Some(5)),
            ProgressEvent::new("In queue - Position: 3", Some(3)),
            ProgressEvent::new("In queue - Position: 1", Some(1)),
            ProgressEvent::new("Generating image...", None),
            ProgressEvent::new("Complete!", None),
        ]
    );
}

#[tokio::test]
async fn test_polling_alone_yields_one_event_per_observation() {
    let fixture = MockServerFixture::new().await;
    let (_poll, _) = fixture
        .mock_status_sequence(
            "job-2",
            vec![
                json!({"status": "pending", "position": 3}),
                json!({"status": "pending", "position": 1}),
                json!({"status": "processing"}),
                json!({"status": "completed", "result": artifact()}),
            ],
        )
        .await;

    let observer = RecordingObserver::new();
    let result = fixture
        .client()
        .wait_for_job(&JobHandle::new("job-2"), &observer)
        .await
        .unwrap();

    assert_eq!(result, artifact());
    assert_eq!(
        observer.status_texts(),
        vec![
            "In queue - Position: 3",
            "In queue - Position: 1",
            "Generating image...",
            "Complete!",
        ]
    );
}

#[tokio::test]
async fn test_submission_body_omits_unset_fields() {
    let fixture = MockServerFixture::new().await;
    let submit = {
        let mut server = fixture.server.lock().await;
        server
            .mock("POST", "/api/v1/generate/queue")
            .match_body(mockito::Matcher::Json(json!({
                "prompt": "castle",
                "style": "fantasy",
                "resolution": "1024x768",
                "enhance": true
            })))
            .with_status(200)
            .with_body(json!({"job_id": "job-3", "status": "pending", "position": 1}).to_string())
            .expect(1)
            .create_async()
            .await
    };
    let (_poll, _) = fixture
        .mock_status_sequence(
            "job-3",
            vec![json!({"status": "completed", "result": artifact()})],
        )
        .await;

    let request = GenerationRequest::new("castle")
        .style("fantasy")
        .resolution("1024x768")
        .enhance(true);
    fixture.client().generate(&request).await.unwrap();
    submit.assert_async().await;
}

#[tokio::test]
async fn test_failed_job_surfaces_service_message() {
    let fixture = MockServerFixture::new().await;
    let _submit = fixture
        .mock_json(
            "POST",
            "/api/v1/generate/queue",
            200,
            json!({"job_id": "job-4", "status": "pending", "position": 1}),
        )
        .await;
    let (_poll, served) = fixture
        .mock_status_sequence(
            "job-4",
            vec![
                json!({"status": "processing"}),
                json!({"status": "failed", "error": "E"}),
            ],
        )
        .await;

    let err = fixture
        .client()
        .generate(&GenerationRequest::new("a red fox"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::JobFailed);
    assert_eq!(err.to_string(), "E");
    assert_eq!(err.context().and_then(|c| c.job_id.as_deref()), Some("job-4"));
    // Failure is terminal: no further polls.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(served.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failed_job_without_message_uses_fallback() {
    let fixture = MockServerFixture::new().await;
    let (_poll, _) = fixture
        .mock_status_sequence("job-5", vec![json!({"status": "failed"})])
        .await;

    let err = fixture
        .client()
        .wait_for_job(&JobHandle::new("job-5"), &RecordingObserver::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::JobFailed);
    assert_eq!(err.to_string(), "Generation failed");
}

#[tokio::test]
async fn test_completed_without_result_is_a_protocol_error() {
    let fixture = MockServerFixture::new().await;
    let (_poll, _) = fixture
        .mock_status_sequence("job-6", vec![json!({"status": "completed"})])
        .await;

    let observer = RecordingObserver::new();
    let err = fixture
        .client()
        .wait_for_job(&JobHandle::new("job-6"), &observer)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Protocol);
    assert_eq!(err.to_string(), "Job completed but no result");
    assert!(observer.is_empty(), "no success event for a broken completion");
}

#[tokio::test]
async fn test_budget_exhaustion_times_out_after_progress() {
    let fixture = MockServerFixture::new().await;
    let _submit = fixture
        .mock_json(
            "POST",
            "/api/v1/generate/queue",
            200,
            json!({"job_id": "job-7", "status": "pending", "position": 9}),
        )
        .await;
    let (_poll, _) = fixture
        .mock_status_sequence("job-7", vec![json!({"status": "pending", "position": 9})])
        .await;

    let client = fixture
        .builder()
        .poll_interval(Duration::from_millis(20))
        .poll_budget(Duration::from_millis(200))
        .build()
        .unwrap();
    let observer = RecordingObserver::new();
    let started = std::time::Instant::now();
    let err = client
        .generate_with_progress(&GenerationRequest::new("slow"), &observer)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert_eq!(err.to_string(), "Generation timed out - please try again");
    assert!(observer.len() >= 2, "submission event plus at least one poll");
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_submission_without_job_id_never_polls() {
    let fixture = MockServerFixture::new().await;
    let _submit = fixture
        .mock_json(
            "POST",
            "/api/v1/generate/queue",
            200,
            json!({"status": "pending", "position": 1}),
        )
        .await;

    let err = fixture
        .client()
        .generate(&GenerationRequest::new("a red fox"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Protocol);
    assert_eq!(err.to_string(), "Job submission response has no job id");
}

#[tokio::test]
async fn test_rejected_submission_is_normalized() {
    let fixture = MockServerFixture::new().await;
    let _submit = fixture
        .mock_json(
            "POST",
            "/api/v1/generate/queue",
            422,
            json!({"detail": [{"loc": ["body", "style"], "msg": "unknown style"}]}),
        )
        .await;

    let err = fixture
        .client()
        .generate(&GenerationRequest::new("a red fox").style("nope"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.to_string(), "unknown style");
}

#[tokio::test]
async fn test_broken_status_channel_is_not_retried() {
    let fixture = MockServerFixture::new().await;
    let poll = {
        let mut server = fixture.server.lock().await;
        server
            .mock("GET", "/api/v1/generate/queue/gone")
            .with_status(404)
            .with_body(json!({"detail": "Job not found"}).to_string())
            .expect(1)
            .create_async()
            .await
    };

    let err = fixture
        .client()
        .wait_for_job(&JobHandle::new("gone"), &RecordingObserver::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Protocol);
    assert_eq!(err.to_string(), "Job not found");
    assert_eq!(err.context().and_then(|c| c.http_status), Some(404));
    poll.assert_async().await;
}

#[tokio::test]
async fn test_status_error_without_usable_body_uses_fallback() {
    let fixture = MockServerFixture::new().await;
    let _poll = fixture
        .mock_raw("GET", "/api/v1/generate/queue/job-8", 502, "<html>Bad Gateway</html>")
        .await;

    let err = fixture
        .client()
        .job_status(&JobHandle::new("job-8"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Failed to check job status");
}

#[tokio::test]
async fn test_blank_prompt_is_rejected_before_any_request() {
    let fixture = MockServerFixture::new().await;
    let submit = {
        let mut server = fixture.server.lock().await;
        server
            .mock("POST", mockito::Matcher::Any)
            .with_status(200)
            .expect(0)
            .create_async()
            .await
    };
    let client = fixture.client();

    for prompt in ["", "   ", "\n\t "] {
        let request = GenerationRequest::new(prompt);
        assert_eq!(
            client.generate(&request).await.unwrap_err().kind(),
            ErrorKind::InvalidRequest
        );
        assert_eq!(
            client.generate_direct(&request).await.unwrap_err().kind(),
            ErrorKind::InvalidRequest
        );
    }
    submit.assert_async().await;
}

#[tokio::test]
async fn test_concurrent_jobs_do_not_share_progress() {
    let fixture = MockServerFixture::new().await;
    let _submit_a = fixture
        .mock_submit_matching(json!({"prompt": "job a"}), "job-a", 7)
        .await;
    let _submit_b = fixture
        .mock_submit_matching(json!({"prompt": "job b"}), "job-b", 2)
        .await;
    let (_poll_a, _) = fixture
        .mock_status_sequence(
            "job-a",
            vec![
                json!({"status": "pending", "position": 7}),
                json!({"status": "pending", "position": 6}),
                json!({"status": "processing"}),
                json!({"status": "completed", "result": {"success": true, "image_url": "https://img/a.png"}}),
            ],
        )
        .await;
    let (_poll_b, _) = fixture
        .mock_status_sequence(
            "job-b",
            vec![
                json!({"status": "pending", "position": 2}),
                json!({"status": "completed", "result": {"success": true, "image_url": "https://img/b.png"}}),
            ],
        )
        .await;

    let client = fixture.client();
    let observer_a = RecordingObserver::new();
    let observer_b = RecordingObserver::new();
    let request_a = GenerationRequest::new("job a");
    let request_b = GenerationRequest::new("job b");

    let (a, b) = tokio::join!(
        client.generate_with_progress(&request_a, &observer_a),
        client.generate_with_progress(&request_b, &observer_b),
    );

    assert_eq!(a.unwrap().image_url.as_deref(), Some("https://img/a.png"));
    assert_eq!(b.unwrap().image_url.as_deref(), Some("https://img/b.png"));

    let positions_a: Vec<u32> = observer_a.events().iter().filter_map(|e| e.position).collect();
    let positions_b: Vec<u32> = observer_b.events().iter().filter_map(|e| e.position).collect();
    assert_eq!(positions_a, vec![7, 7, 6]);
    assert_eq!(positions_b, vec![2, 2]);
    assert_eq!(observer_a.len(), 5);
    assert_eq!(observer_b.len(), 3);
}
