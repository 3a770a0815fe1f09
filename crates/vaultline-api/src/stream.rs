//! Conversion of a completion stream into a data-stream response body.

use axum::body::Body;
use axum::http::HeaderValue;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::Response;
use bytes::Bytes;
use futures::{StreamExt, future, stream};
use vaultline_core::classify::UpstreamErrorKind;
use vaultline_core::datastream::{self, DataStreamPart};
use vaultline_core::error::ProxyErrorKind;
use vaultline_openai::completion::{CompletionEvent, CompletionStream};

/// Map completion events to data-stream parts.
///
/// A start part always comes first. Each text delta becomes exactly one
/// text part, in order. A finish event closes the step and the message. An
/// error after streaming began becomes a single in-band error part and ends
/// the stream.
pub fn data_stream_parts(
    events: CompletionStream,
) -> impl futures::Stream<Item = DataStreamPart> + Send {
    let parts = events
        .scan(false, |failed, event| {
            if *failed {
                return future::ready(None);
            }
            let parts = match event {
                Ok(CompletionEvent::TextDelta(text)) => vec![DataStreamPart::Text(text)],
                Ok(CompletionEvent::Finish {
                    finish_reason,
                    usage,
                }) => vec![
                    DataStreamPart::FinishStep {
                        finish_reason: finish_reason.clone(),
                        usage,
                        is_continued: false,
                    },
                    DataStreamPart::FinishMessage {
                        finish_reason,
                        usage,
                    },
                ],
                Err(e) => {
                    *failed = true;
                    let raw = e.to_string();
                    tracing::warn!(
                        error = %raw,
                        kind = %ProxyErrorKind::MidStreamFailure,
                        "completion stream failed after response started"
                    );
                    vec![DataStreamPart::Error(
                        UpstreamErrorKind::classify(&raw).chat_details(&raw),
                    )]
                }
            };
            future::ready(Some(stream::iter(parts)))
        })
        .flatten();

    stream::once(future::ready(DataStreamPart::start())).chain(parts)
}

/// A 200 response whose body forwards each part as soon as it is produced.
pub fn data_stream_response(events: CompletionStream) -> Response {
    let body = data_stream_parts(events).map(|part| part.encode().map(Bytes::from));

    let mut response = Response::new(Body::from_stream(body));
    let headers = response.headers_mut();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static(datastream::CONTENT_TYPE),
    );
    headers.insert(
        datastream::PROTOCOL_HEADER,
        HeaderValue::from_static(datastream::PROTOCOL_VERSION),
    );
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    response
}
