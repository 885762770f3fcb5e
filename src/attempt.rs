use bytes::BytesMut;
use encoding_rs::{Encoding, UTF_8};
use futures_util::TryStreamExt;
use reqwest::StatusCode;

use crate::{
    transport::{OutboundRequest, RawResponse, Transport, JSON_CONTENT_TYPE},
    JsonObject, JsonRequest, JsonWebError, Result, TransportError,
};

/// Runs one request/response cycle: send, check status, read body, parse.
pub(crate) async fn execute_once<T>(
    transport: &T,
    request: &JsonRequest,
    log_response_body: bool,
) -> Result<JsonObject>
where
    T: Transport + ?Sized,
{
    // A body that cannot be encoded never reaches the wire.
    let content = request.encode_body().map_err(TransportError::new)?;
    let response = transport
        .send(OutboundRequest {
            url: request.url.clone(),
            method: request.method.clone(),
            content_type: JSON_CONTENT_TYPE,
            content,
        })
        .await?;

    ensure_ok(response.status)?;
    let text = read_body_text(response).await?;

    #[cfg(feature = "tracing")]
    if log_response_body {
        tracing::debug!(url = %request.url, body = %text, "received response body");
    }
    #[cfg(not(feature = "tracing"))]
    let _ = log_response_body;

    parse_object(&text)
}

fn ensure_ok(status: StatusCode) -> Result<()> {
    if status == StatusCode::OK {
        return Ok(());
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(status = status.as_u16(), "endpoint returned non-OK status");

    Err(JsonWebError::Status {
        status: status.as_u16(),
        message: status.canonical_reason().unwrap_or("Unknown").to_owned(),
    })
}

async fn read_body_text(response: RawResponse) -> Result<String> {
    let encoding = match response.content_encoding.as_deref() {
        Some(label) => Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| {
            JsonWebError::BodyRead(format!("unsupported content encoding '{label}'"))
        })?,
        None => UTF_8,
    };

    let bytes = response
        .body
        .try_fold(BytesMut::new(), |mut buf, chunk| async move {
            buf.extend_from_slice(&chunk);
            Ok(buf)
        })
        .await
        .map_err(|err| JsonWebError::BodyRead(err.to_string()))?;

    Ok(decode_text(encoding, &bytes))
}

/// Decodes `bytes`, replacing malformed sequences with U+FFFD.
fn decode_text(encoding: &'static Encoding, bytes: &[u8]) -> String {
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

pub(crate) fn parse_object(text: &str) -> Result<JsonObject> {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(serde_json::Value::Object(object)) => Ok(object),
        Ok(other) => Err(JsonWebError::BodyParse(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(err) => Err(JsonWebError::BodyParse(err.to_string())),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use bytes::Bytes;
    use encoding_rs::{UTF_8, WINDOWS_1252};
    use futures_util::StreamExt;
    use reqwest::StatusCode;

    use super::{decode_text, ensure_ok, parse_object, read_body_text};
    use crate::{error::BoxError, transport::RawResponse, JsonWebError};

    fn chunked(chunks: Vec<Result<Bytes, BoxError>>, encoding: Option<&str>) -> RawResponse {
        RawResponse {
            status: StatusCode::OK,
            content_encoding: encoding.map(str::to_owned),
            body: futures_util::stream::iter(chunks).boxed(),
        }
    }

    #[test]
    fn only_200_passes_status_check() {
        assert!(ensure_ok(StatusCode::OK).is_ok());

        for status in [StatusCode::CREATED, StatusCode::NO_CONTENT, StatusCode::NOT_FOUND] {
            let err = ensure_ok(status).expect_err("non-200 must fail");
            match err {
                JsonWebError::Status { status: code, message } => {
                    assert_eq!(code, status.as_u16());
                    assert_eq!(Some(message.as_str()), status.canonical_reason());
                }
                other => panic!("expected status error, got {other:?}"),
            }
        }
    }

    #[test]
    fn parse_object_rejects_non_objects() {
        for text in ["not-json", "[1, 2]", "42", "\"text\"", "null", ""] {
            let err = parse_object(text).expect_err("must fail");
            assert!(matches!(err, JsonWebError::BodyParse(_)), "{text}: {err:?}");
        }
    }

    #[test]
    fn parse_object_reports_array_kind() {
        let err = parse_object("[]").expect_err("must fail");
        assert_eq!(
            err.to_string(),
            "failed to parse JSON response: expected a JSON object, got an array"
        );
    }

    #[test]
    fn decode_text_honors_declared_encoding() {
        let text = decode_text(WINDOWS_1252, b"{\"name\":\"caf\xe9\"}");
        assert_eq!(text, "{\"name\":\"café\"}");
    }

    #[test]
    fn decode_text_strips_utf8_bom() {
        let text = decode_text(UTF_8, b"\xef\xbb\xbf{}");
        assert_eq!(text, "{}");
    }

    #[test]
    fn decode_text_replaces_malformed_utf8() {
        let text = decode_text(UTF_8, b"{\"name\":\"caf\xe9\"}");
        assert_eq!(text, "{\"name\":\"caf\u{FFFD}\"}");
    }

    #[tokio::test]
    async fn read_body_joins_chunks() {
        let response = chunked(
            vec![Ok(Bytes::from_static(b"{\"a\":")), Ok(Bytes::from_static(b"1}"))],
            None,
        );
        let text = read_body_text(response).await.expect("must read");
        assert_eq!(text, "{\"a\":1}");
    }

    #[tokio::test]
    async fn read_body_wraps_stream_failure() {
        let broken: BoxError =
            Box::new(io::Error::new(io::ErrorKind::UnexpectedEof, "reset mid-body"));
        let response = chunked(vec![Ok(Bytes::from_static(b"{\"a\"")), Err(broken)], None);

        let err = read_body_text(response).await.expect_err("must fail");
        match err {
            JsonWebError::BodyRead(cause) => assert!(cause.contains("reset mid-body")),
            other => panic!("expected body read error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn read_body_rejects_unknown_encoding() {
        let response = chunked(vec![Ok(Bytes::from_static(b"{}"))], Some("klingon-8"));
        let err = read_body_text(response).await.expect_err("must fail");
        assert!(matches!(err, JsonWebError::BodyRead(_)));
    }
}
