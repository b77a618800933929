//! AirPlay request handlers
//!
//! Maps each (method, path) pair to its behavior: decode the body if
//! there is one, pull out the fields the command needs, translate
//! units, invoke the bound backend and format the response.
//!
//! Failure policy: a response other than success would break the client
//! session, so malformed optional fields are logged and skipped, backend
//! errors are logged and swallowed, and unsupported features (DRM,
//! slideshow effects) are acknowledged with empty success. The only
//! non-2xx/101 answer is a 404 for paths outside the protocol.

use tracing::{debug, warn};

use super::appletv;
use super::http::headers::names;
use super::http::{HttpRequest, HttpResponse, Method, ResponseBuilder, StatusCode};
use super::payload::{self, Payload};
use super::position;
use crate::backend::{MediaBackend, PlayerPosition};

/// Dispatch a request to its handler
///
/// Paths and methods are matched case-sensitively against the exact
/// wire names.
pub async fn handle_request(request: &HttpRequest, backend: &dyn MediaBackend) -> HttpResponse {
    debug!(method = request.method.as_str(), uri = %request.uri, "handling request");

    match (request.method, request.path()) {
        (Method::Post, "/reverse") => handle_reverse(),
        (Method::Post, "/play") => handle_play(request, backend).await,
        (Method::Get, "/scrub") => handle_scrub_get(backend).await,
        (Method::Post, "/scrub") => handle_scrub_post(request, backend).await,
        (Method::Post, "/rate") => handle_rate(request, backend).await,
        (Method::Put, "/photo") => handle_photo(request, backend).await,
        (Method::Get | Method::Post, "/authorize") => handle_authorize(request),
        (Method::Post, "/stop") => handle_stop(backend).await,
        (Method::Get, "/server-info") => handle_server_info(),
        (Method::Get, "/slideshow-features") => handle_slideshow_features(),
        (Method::Get, "/playback-info") => handle_playback_info(backend).await,
        (method, path) => {
            warn!(method = method.as_str(), path, "unknown endpoint");
            ResponseBuilder::new(StatusCode::NOT_FOUND).build()
        }
    }
}

fn empty_success() -> HttpResponse {
    ResponseBuilder::ok().build()
}

/// `POST /reverse` — the `PTTH/1.0` handshake opening a session
///
/// Always answered with 101 and the two fixed upgrade headers,
/// regardless of what the client sent. No backend involvement.
fn handle_reverse() -> HttpResponse {
    ResponseBuilder::upgrade().build()
}

/// `POST /play` — start playback of a URL
///
/// The body carries `Content-Location` and optionally `Start-Position`,
/// in either body encoding. A missing or unreadable body degrades to a
/// no-op.
async fn handle_play(request: &HttpRequest, backend: &dyn MediaBackend) -> HttpResponse {
    let payload = match payload::decode(request.headers.content_type(), &request.body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("discarding unreadable /play body: {e}");
            Payload::default()
        }
    };

    if let Some(url) = payload.get("Content-Location") {
        debug!(url, "playing");

        if let Err(e) = backend.play_movie(url).await {
            warn!("play_movie failed: {e}");
        }

        if let Some(raw) = payload.get("Start-Position") {
            // Sent as a fraction from 0 to 1; backends take 0 to 100.
            match raw.parse::<f64>() {
                Ok(fraction) => {
                    let percentage = position::fraction_to_percentage(fraction);
                    if let Err(e) = backend.set_start_position(percentage).await {
                        warn!("set_start_position failed: {e}");
                    }
                }
                Err(_) => warn!(value = raw, "invalid start-position supplied"),
            }
        }
    }

    empty_success()
}

/// `GET /scrub` — report the current player position
async fn handle_scrub_get(backend: &dyn MediaBackend) -> HttpResponse {
    let pair = query_position(backend).await;
    let (position, duration) = position::normalize_pair(&pair);

    ResponseBuilder::ok()
        .text_body(&appletv::scrub_body(duration, position))
        .build()
}

/// `POST /scrub?position=<seconds>` — seek
async fn handle_scrub_post(request: &HttpRequest, backend: &dyn MediaBackend) -> HttpResponse {
    if let Some(raw) = request.query_param("position") {
        // Clients send fractional seconds; backends seek to whole ones.
        match raw.parse::<f64>() {
            Ok(seconds) => {
                if let Err(e) = backend.set_player_position(seconds as i64).await {
                    warn!("set_player_position failed: {e}");
                }
            }
            Err(_) => warn!(value = raw, "invalid scrub position supplied"),
        }
    }

    empty_success()
}

/// `POST /rate?value=<float>` — play/pause toggle
///
/// A nonzero rate means play, zero means pause. No rate at all means
/// nothing to do.
async fn handle_rate(request: &HttpRequest, backend: &dyn MediaBackend) -> HttpResponse {
    if let Some(raw) = request.query_param("value") {
        match raw.parse::<f64>() {
            Ok(value) => {
                let result = if value != 0.0 {
                    backend.play().await
                } else {
                    backend.pause().await
                };
                if let Err(e) = result {
                    warn!("rate change failed: {e}");
                }
            }
            Err(_) => warn!(value = raw, "invalid rate value supplied"),
        }
    }

    empty_success()
}

/// `PUT /photo` — display raw JPEG data from the body
async fn handle_photo(request: &HttpRequest, backend: &dyn MediaBackend) -> HttpResponse {
    if !request.body.is_empty() {
        if let Err(e) = backend.show_picture(&request.body).await {
            warn!("show_picture failed: {e}");
        }
    }

    empty_success()
}

/// `GET|POST /authorize` — DRM authorization, not supported
///
/// Acknowledged with empty success so the client session survives; the
/// media simply won't play.
fn handle_authorize(request: &HttpRequest) -> HttpResponse {
    warn!("client tried to play DRM protected media, this is unsupported");
    debug!(
        method = request.method.as_str(),
        session = request.headers.get(names::X_APPLE_SESSION_ID).unwrap_or("-"),
        body_len = request.body.len(),
        "authorize request"
    );

    empty_success()
}

/// `POST /stop` — stop playback
async fn handle_stop(backend: &dyn MediaBackend) -> HttpResponse {
    if let Err(e) = backend.stop_playing().await {
        warn!("stop_playing failed: {e}");
    }

    empty_success()
}

/// `GET /server-info` — static capability document
fn handle_server_info() -> HttpResponse {
    ResponseBuilder::ok()
        .typed_body(
            appletv::SERVER_INFO.as_bytes().to_vec(),
            appletv::PLIST_CONTENT_TYPE,
        )
        .build()
}

/// `GET /slideshow-features` — declare no slideshow-effect support
///
/// An empty answer enables the client's plain slideshow without
/// effects, which is all the backends can render.
fn handle_slideshow_features() -> HttpResponse {
    empty_success()
}

/// `GET /playback-info` — playback state document
async fn handle_playback_info(backend: &dyn MediaBackend) -> HttpResponse {
    let playing = match backend.is_playing().await {
        Ok(playing) => playing,
        Err(e) => {
            warn!("is_playing failed: {e}");
            false
        }
    };

    let pair = query_position(backend).await;
    let (position, duration) = position::normalize_pair(&pair);

    ResponseBuilder::ok()
        .typed_body(
            appletv::playback_info(duration, position, playing).into_bytes(),
            appletv::PLIST_CONTENT_TYPE,
        )
        .build()
}

/// Ask the backend where it is; failures read as "nothing playing"
async fn query_position(backend: &dyn MediaBackend) -> PlayerPosition {
    match backend.get_player_position().await {
        Ok(pair) => pair,
        Err(e) => {
            warn!("get_player_position failed: {e}");
            PlayerPosition::unknown()
        }
    }
}
