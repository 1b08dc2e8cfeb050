// Chunked newline-delimited JSON streaming utilities
use axum::body::Body;
use axum::http::{Response, StatusCode, header};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::StreamExt;
use futures::stream::Stream;
use serde::Serialize;
use tokio::sync::watch;

/// Create a chunked NDJSON streaming response, one line per item
pub fn ndjson_stream<S, T>(stream: S) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = T> + Send + 'static,
    T: Serialize + Send + 'static,
{
    let byte_stream = stream.map(|item| serialize_line(&item));
    let body = Body::from_stream(byte_stream);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/x-ndjson")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(body)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

fn serialize_line<T: Serialize>(item: &T) -> Result<Bytes, std::io::Error> {
    let json = serde_json::to_vec(item).map_err(std::io::Error::other)?;
    let mut line = BytesMut::with_capacity(json.len() + 1);
    line.put_slice(&json);
    line.put_u8(b'\n');
    Ok(line.freeze())
}

/// Yield the current value of a watch channel, then every later change,
/// skipping values the mapper rejects. Ends when the sender is dropped.
pub fn watch_updates<V, T, F>(mut rx: watch::Receiver<V>, mut map: F) -> impl Stream<Item = T>
where
    V: Send + Sync + 'static,
    T: Send + 'static,
    F: FnMut(&V) -> Option<T> + Send + 'static,
{
    async_stream::stream! {
        loop {
            let next = map(&rx.borrow_and_update());
            if let Some(item) = next {
                yield item;
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
    }
}

/// Helper to create a streaming response from a watch channel
pub fn stream_from_watch<V, T, F>(rx: watch::Receiver<V>, map: F) -> axum::response::Response
where
    V: Send + Sync + 'static,
    T: Serialize + Send + 'static,
    F: FnMut(&V) -> Option<T> + Send + 'static,
{
    match ndjson_stream(watch_updates(rx, map)) {
        Ok(response) => response.into_response(),
        Err(status) => status.into_response(),
    }
}
