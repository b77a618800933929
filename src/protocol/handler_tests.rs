use super::appletv;
use super::handler::handle_request;
use super::http::{HttpRequest, Method, StatusCode};
use super::payload::BINARY_PLIST_MIME;
use crate::backend::PlayerPosition;
use crate::protocol::plist::decode::tests::play_body;
use crate::testing::{BackendCall, RecordingBackend};

fn request(method: Method, uri: &str) -> HttpRequest {
    HttpRequest::new(method, uri)
}

fn request_with_body(method: Method, uri: &str, content_type: &str, body: &[u8]) -> HttpRequest {
    let mut req = HttpRequest::new(method, uri);
    req.headers.insert("Content-Type", content_type.to_string());
    req.body = body.to_vec();
    req
}

#[tokio::test]
async fn test_reverse_returns_upgrade_handshake() {
    let backend = RecordingBackend::new();
    let mut req = request(Method::Post, "/reverse");
    // Whatever the client sends along is irrelevant to the handshake.
    req.headers.insert("X-Apple-Session-ID", "abc".to_string());
    req.body = b"ignored".to_vec();

    let response = handle_request(&req, &backend).await;

    assert_eq!(response.status, StatusCode::SWITCHING_PROTOCOLS);
    assert_eq!(response.headers.get("Upgrade"), Some("PTTH/1.0"));
    assert_eq!(response.headers.get("Connection"), Some("Upgrade"));
    assert!(response.body.is_empty());
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_play_with_binary_plist_body() {
    let backend = RecordingBackend::new();
    let body = play_body("http://example.com/video.mp4", 0.5);
    let req = request_with_body(Method::Post, "/play", BINARY_PLIST_MIME, &body);

    let response = handle_request(&req, &backend).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        backend.calls(),
        vec![
            BackendCall::PlayMovie("http://example.com/video.mp4".to_string()),
            BackendCall::SetStartPosition(50.0),
        ]
    );
}

#[tokio::test]
async fn test_play_with_header_style_body() {
    let backend = RecordingBackend::new();
    let req = request_with_body(
        Method::Post,
        "/play",
        "text/parameters",
        b"Content-Location: http://example.com/a.mp4\r\nStart-Position: 0.3\r\n",
    );

    handle_request(&req, &backend).await;

    let calls = backend.calls();
    assert_eq!(
        calls[0],
        BackendCall::PlayMovie("http://example.com/a.mp4".to_string())
    );
    match calls[1] {
        BackendCall::SetStartPosition(pct) => assert!((pct - 30.0).abs() < 1e-9),
        ref other => panic!("unexpected call {other:?}"),
    }
}

#[tokio::test]
async fn test_play_without_start_position() {
    let backend = RecordingBackend::new();
    let req = request_with_body(
        Method::Post,
        "/play",
        "text/parameters",
        b"Content-Location: http://example.com/a.mp4\r\n",
    );

    handle_request(&req, &backend).await;

    assert_eq!(
        backend.calls(),
        vec![BackendCall::PlayMovie("http://example.com/a.mp4".to_string())]
    );
}

#[tokio::test]
async fn test_play_without_content_location_is_a_noop() {
    let backend = RecordingBackend::new();
    // Start-Position alone must not trigger anything.
    let req = request_with_body(
        Method::Post,
        "/play",
        "text/parameters",
        b"Start-Position: 0.5\r\n",
    );

    let response = handle_request(&req, &backend).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_play_with_malformed_plist_is_a_noop() {
    let backend = RecordingBackend::new();
    let req = request_with_body(Method::Post, "/play", BINARY_PLIST_MIME, b"bplist00junk");

    let response = handle_request(&req, &backend).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_play_with_invalid_start_position_still_plays() {
    let backend = RecordingBackend::new();
    let req = request_with_body(
        Method::Post,
        "/play",
        "text/parameters",
        b"Content-Location: http://example.com/a.mp4\r\nStart-Position: soon\r\n",
    );

    handle_request(&req, &backend).await;

    assert_eq!(
        backend.calls(),
        vec![BackendCall::PlayMovie("http://example.com/a.mp4".to_string())]
    );
}

#[tokio::test]
async fn test_scrub_get_with_no_media() {
    let backend = RecordingBackend::new();
    let req = request(Method::Get, "/scrub");

    let response = handle_request(&req, &backend).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body_as_str(),
        "duration: 0.000000\r\nposition: 0.000000\r\n"
    );
}

#[tokio::test]
async fn test_scrub_get_with_position() {
    let backend = RecordingBackend::new();
    backend.set_position(PlayerPosition::new(12.5, 100.0));
    let req = request(Method::Get, "/scrub");

    let response = handle_request(&req, &backend).await;

    assert_eq!(
        response.body_as_str(),
        "duration: 100.000000\r\nposition: 12.500000\r\n"
    );
}

#[tokio::test]
async fn test_scrub_post_seeks() {
    let backend = RecordingBackend::new();
    let req = request(Method::Post, "/scrub?position=42");

    let response = handle_request(&req, &backend).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(backend.calls(), vec![BackendCall::SetPlayerPosition(42)]);
}

#[tokio::test]
async fn test_scrub_post_truncates_fractional_seconds() {
    let backend = RecordingBackend::new();
    let req = request(Method::Post, "/scrub?position=42.81");

    handle_request(&req, &backend).await;

    assert_eq!(backend.calls(), vec![BackendCall::SetPlayerPosition(42)]);
}

#[tokio::test]
async fn test_scrub_post_with_unparseable_position() {
    let backend = RecordingBackend::new();
    let req = request(Method::Post, "/scrub?position=notanumber");

    let response = handle_request(&req, &backend).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.is_empty());
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_rate_nonzero_plays() {
    let backend = RecordingBackend::new();
    let req = request(Method::Post, "/rate?value=1.000000");

    handle_request(&req, &backend).await;

    assert_eq!(backend.calls(), vec![BackendCall::Play]);
}

#[tokio::test]
async fn test_rate_zero_pauses() {
    let backend = RecordingBackend::new();
    let req = request(Method::Post, "/rate?value=0.000000");

    handle_request(&req, &backend).await;

    assert_eq!(backend.calls(), vec![BackendCall::Pause]);
}

#[tokio::test]
async fn test_rate_without_value_does_nothing() {
    let backend = RecordingBackend::new();
    let req = request(Method::Post, "/rate");

    let response = handle_request(&req, &backend).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_photo_with_data() {
    let backend = RecordingBackend::new();
    let jpeg = vec![0xff, 0xd8, 0xff, 0xe0, 0x01, 0x02];
    let mut req = request(Method::Put, "/photo");
    req.body = jpeg.clone();

    let response = handle_request(&req, &backend).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(backend.calls(), vec![BackendCall::ShowPicture(jpeg)]);
}

#[tokio::test]
async fn test_photo_with_empty_body_is_a_noop() {
    let backend = RecordingBackend::new();
    let req = request(Method::Put, "/photo");

    handle_request(&req, &backend).await;

    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_authorize_always_succeeds_without_backend_calls() {
    let backend = RecordingBackend::new();

    for method in [Method::Get, Method::Post] {
        let mut req = request(method, "/authorize");
        req.headers
            .insert("X-Apple-Session-ID", "1bd6ceeb-fffd-456c-a09c-996053a7a08c");
        req.body = b"drm challenge".to_vec();

        let response = handle_request(&req, &backend).await;
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.body.is_empty());
    }

    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_stop_invokes_backend_each_time() {
    let backend = RecordingBackend::new();
    let req = request(Method::Post, "/stop");

    handle_request(&req, &backend).await;
    handle_request(&req, &backend).await;

    assert_eq!(
        backend.calls(),
        vec![BackendCall::StopPlaying, BackendCall::StopPlaying]
    );
}

#[tokio::test]
async fn test_server_info_document() {
    let backend = RecordingBackend::new();
    let response = handle_request(&request(Method::Get, "/server-info"), &backend).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.headers.content_type(),
        Some(appletv::PLIST_CONTENT_TYPE)
    );
    assert_eq!(response.body, appletv::SERVER_INFO.as_bytes());
}

#[tokio::test]
async fn test_slideshow_features_is_empty_success() {
    let backend = RecordingBackend::new();
    let response = handle_request(&request(Method::Get, "/slideshow-features"), &backend).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.is_empty());
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_playback_info_reflects_backend_state() {
    let backend = RecordingBackend::new();
    backend.set_position(PlayerPosition::new(12.5, 100.0));
    backend.set_playing(true);

    let response = handle_request(&request(Method::Get, "/playback-info"), &backend).await;

    assert_eq!(
        response.headers.content_type(),
        Some(appletv::PLIST_CONTENT_TYPE)
    );
    let body = response.body_as_str();
    assert!(body.contains("<real>100.000000</real>"));
    assert!(body.contains("<real>12.500000</real>"));
    assert!(body.contains("<real>1</real>"));
}

#[tokio::test]
async fn test_playback_info_with_no_media() {
    let backend = RecordingBackend::new();

    let response = handle_request(&request(Method::Get, "/playback-info"), &backend).await;

    let body = response.body_as_str();
    assert!(body.contains("<key>position</key>\n<real>0.000000</real>"));
    assert!(body.contains("<real>0</real>"));
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let backend = RecordingBackend::new();
    let response = handle_request(&request(Method::Get, "/volume"), &backend).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_paths_are_case_sensitive() {
    let backend = RecordingBackend::new();
    let response = handle_request(&request(Method::Post, "/Stop"), &backend).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(backend.calls().is_empty());
}
