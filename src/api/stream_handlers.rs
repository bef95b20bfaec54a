//! Server-Sent Events endpoint for real-time book change notifications

use super::handlers::{ApiState, AppError};
use crate::auth::extractor::AuthUser;
use crate::events::{Event, EventSink, SinkError, StreamLoop};
use async_trait::async_trait;
use axum::{
    extract::State,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
};
use futures::{Stream, StreamExt};
use std::convert::Infallible;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::info;

/// Frames buffered between the stream loop and the response body
const SSE_BUFFER: usize = 16;

/// Sink feeding the SSE response body.
///
/// The body owns the receiving half; once the client goes away hyper drops
/// the body, which closes this sink.
pub struct SseSink {
    sender: mpsc::Sender<Event>,
}

impl SseSink {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl EventSink for SseSink {
    async fn forward(&mut self, event: Event) -> Result<(), SinkError> {
        self.sender
            .send(event)
            .await
            .map_err(|_| SinkError::Disconnected)
    }

    fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// SSE `data` payload for an event.
///
/// Clients rejoin multi-line data with `\n`, so `\n` survives framing but a
/// bare `\r` would come back as `\n`. CR is sent as the two characters `\r`.
fn frame_data(event: Event) -> String {
    let text = event.into_string();
    if text.contains('\r') {
        text.replace('\r', "\\r")
    } else {
        text
    }
}

/// GET /event/stream: one `data:` frame per change event.
///
/// Only one stream may drain the event channel at a time; a second request
/// while one is attached gets 409.
pub async fn stream_events(
    State(state): State<ApiState>,
    user: AuthUser,
) -> Result<Sse<impl Stream<Item = Result<SseEvent, Infallible>>>, AppError> {
    let consumer = state
        .events
        .try_consumer()
        .ok_or_else(|| AppError::Conflict("An event stream is already active".to_string()))?;

    let (tx, rx) = mpsc::channel(SSE_BUFFER);
    let stream_loop = StreamLoop::with_timeout(
        consumer,
        SseSink::new(tx),
        state.stream_timeout,
        state.shutdown.child_token(),
    );

    info!(username = %user.username, "Event stream client attached");
    let username = user.username;
    tokio::spawn(async move {
        let summary = stream_loop.run().await;
        info!(
            username = %username,
            exit = ?summary.exit,
            forwarded = summary.forwarded,
            "Event stream client detached"
        );
    });

    let body = ReceiverStream::new(rx)
        .map(|event| Ok(SseEvent::default().data(frame_data(event))));

    Ok(Sse::new(body).keep_alive(KeepAlive::default()))
}

#[cfg(test)]
mod tests {
    use crate::api::create_router;
    use crate::events::{Event, EventEmitter};
    use crate::test_helpers::{bearer, mock_server_state, test_auth_config};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use futures::StreamExt;
    use std::time::Duration;
    use tower::ServiceExt;

    fn stream_request(auth: Option<String>) -> Request<Body> {
        let mut builder = Request::builder().uri("/event/stream");
        if let Some(value) = auth {
            builder = builder.header("authorization", value);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn wait_until_released(state: &crate::api::handlers::ApiState) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while state.events.is_streaming() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("stream loop released the channel");
    }

    #[tokio::test]
    async fn test_unauthenticated_stream_rejected_before_channel() {
        let state = mock_server_state(Some(test_auth_config()));
        let app = create_router(state.clone());

        let resp = app.oneshot(stream_request(None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(!state.events.is_streaming());
    }

    #[tokio::test]
    async fn test_stream_forwards_events_as_sse_frames() {
        let state = mock_server_state(Some(test_auth_config()));
        let app = create_router(state.clone());

        let resp = app
            .oneshot(stream_request(Some(bearer("alice"))))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/event-stream"));

        state.events.emit(Event::new("Book A created"));
        state.events.emit(Event::new("Book B created"));

        let mut body = resp.into_body().into_data_stream();
        let mut text = String::new();
        while !text.contains("Book B created") {
            let chunk = tokio::time::timeout(Duration::from_secs(2), body.next())
                .await
                .expect("frame within one cycle")
                .expect("stream still open")
                .unwrap();
            text.push_str(std::str::from_utf8(&chunk).unwrap());
        }
        assert!(text.contains("data: Book A created\n\n"));
        let a = text.find("Book A created").unwrap();
        let b = text.find("Book B created").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_frame_data_escapes_carriage_returns() {
        assert_eq!(super::frame_data(Event::new("plain")), "plain");
        assert_eq!(super::frame_data(Event::new("Bad\rTitle")), "Bad\\rTitle");
        assert_eq!(super::frame_data(Event::new("a\r\nb")), "a\\r\nb");
    }

    #[tokio::test]
    async fn test_carriage_return_in_title_stays_in_one_frame() {
        let state = mock_server_state(Some(test_auth_config()));
        let app = create_router(state.clone());

        let resp = app
            .oneshot(stream_request(Some(bearer("alice"))))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        state.events.emit(Event::new("Book \"Bad\rTitle\" (id 1) was created"));

        let mut body = resp.into_body().into_data_stream();
        let mut text = String::new();
        while !text.contains("\n\n") {
            let chunk = tokio::time::timeout(Duration::from_secs(2), body.next())
                .await
                .expect("frame within one cycle")
                .expect("stream still open")
                .unwrap();
            text.push_str(std::str::from_utf8(&chunk).unwrap());
        }
        assert_eq!(text, "data: Book \"Bad\\rTitle\" (id 1) was created\n\n");
    }

    #[tokio::test]
    async fn test_second_stream_conflicts_until_first_disconnects() {
        let state = mock_server_state(Some(test_auth_config()));
        let app = create_router(state.clone());

        let first = app
            .clone()
            .oneshot(stream_request(Some(bearer("alice"))))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        assert!(state.events.is_streaming());

        let second = app
            .clone()
            .oneshot(stream_request(Some(bearer("bob"))))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);

        // Client goes away: the loop notices at its next idle tick
        drop(first);
        wait_until_released(&state).await;

        // Events pushed meanwhile reach the next stream
        state.events.emit(Event::new("after reconnect"));
        let third = app
            .oneshot(stream_request(Some(bearer("alice"))))
            .await
            .unwrap();
        assert_eq!(third.status(), StatusCode::OK);

        let mut body = third.into_body().into_data_stream();
        let chunk = tokio::time::timeout(Duration::from_secs(2), body.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert!(std::str::from_utf8(&chunk)
            .unwrap()
            .contains("data: after reconnect"));
    }

    #[tokio::test]
    async fn test_shutdown_cancels_stream() {
        let state = mock_server_state(Some(test_auth_config()));
        let app = create_router(state.clone());

        let resp = app
            .oneshot(stream_request(Some(bearer("alice"))))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        state.shutdown.cancel();
        wait_until_released(&state).await;

        // Body ends once the loop has dropped its sink
        let mut body = resp.into_body().into_data_stream();
        let next = tokio::time::timeout(Duration::from_secs(2), body.next())
            .await
            .unwrap();
        assert!(next.is_none());
    }
}
