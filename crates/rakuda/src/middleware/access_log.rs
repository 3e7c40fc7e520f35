use crate::body::{BoxError, ReqBody, ResponseBody};
use crate::handler::{BoxedHandler, RequestHandler};
use crate::middleware::Middleware;
use async_trait::async_trait;
use bytes::Bytes;
use http::{Method, Request, Response};
use http_body::{Body as HttpBody, Frame, SizeHint};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;
use tracing::info;

/// Logs one `info` event per request.
///
/// The event carries the method, path, status, content type, the number of body bytes actually
/// sent and the elapsed time. It is emitted once the response body has been fully read, or when it
/// is dropped before that, so streamed bodies are measured too.
#[derive(Debug, Default, Copy, Clone)]
pub struct AccessLog;

struct AccessLogHandler {
    handler: BoxedHandler,
}

impl Middleware for AccessLog {
    fn wrap(&self, handler: BoxedHandler) -> BoxedHandler {
        Box::new(AccessLogHandler { handler })
    }
}

#[async_trait]
impl RequestHandler for AccessLogHandler {
    async fn invoke(&self, req: Request<ReqBody>) -> Response<ResponseBody> {
        let start = Instant::now();
        let method = req.method().clone();
        let path = req.uri().path().to_owned();

        let response = self.handler.invoke(req).await;

        let record = AccessRecord {
            method,
            path,
            status: response.status().as_u16(),
            content_type: response
                .headers()
                .get(http::header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned),
            start,
        };

        response.map(|body| ResponseBody::stream(CountingBody { inner: body, size: 0, record: Some(record) }))
    }
}

struct AccessRecord {
    method: Method,
    path: String,
    status: u16,
    content_type: Option<String>,
    start: Instant,
}

impl AccessRecord {
    fn emit(self, size: u64) {
        info!(
            method = %self.method,
            path = %self.path,
            status = self.status,
            size,
            content_type = self.content_type.as_deref(),
            duration = ?self.start.elapsed(),
            "request"
        );
    }
}

/// counts data bytes as they are polled and logs the record at most once
struct CountingBody {
    inner: ResponseBody,
    size: u64,
    record: Option<AccessRecord>,
}

impl CountingBody {
    fn finish(&mut self) {
        if let Some(record) = self.record.take() {
            record.emit(self.size);
        }
    }
}

impl HttpBody for CountingBody {
    type Data = Bytes;
    type Error = BoxError;

    fn poll_frame(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        let poll = Pin::new(&mut this.inner).poll_frame(cx);

        match &poll {
            Poll::Ready(Some(Ok(frame))) => {
                if let Some(data) = frame.data_ref() {
                    this.size += data.len() as u64;
                }
            }
            Poll::Ready(None) => this.finish(),
            Poll::Ready(Some(Err(_))) | Poll::Pending => {}
        }

        poll
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl Drop for CountingBody {
    fn drop(&mut self) {
        self.finish();
    }
}

#[cfg(test)]
mod tests {
    use crate::body::BoxError;
    use crate::handler::{RequestHandler, handler_fn};
    use crate::middleware::{AccessLog, Middleware};
    use crate::ResponseBody;
    use bytes::Bytes;
    use http::{Method, Request, Response, StatusCode};
    use http_body::{Body as HttpBody, Frame};
    use http_body_util::{BodyExt, StreamBody};
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn output(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture() -> (Captured, tracing::subscriber::DefaultGuard) {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt().with_writer(move || writer.clone()).with_ansi(false).finish();
        (captured, tracing::subscriber::set_default(subscriber))
    }

    #[tokio::test]
    async fn test_logs_request_line() {
        let (captured, _guard) = capture();

        let handler = AccessLog.wrap(Box::new(handler_fn(|_req| async { (StatusCode::CREATED, "made") })));
        let req = Request::builder().method(Method::POST).uri("/items").body(Bytes::new()).unwrap();

        let response = handler.invoke(req).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.body().size_hint().exact(), Some(4));
        assert!(captured.output().is_empty());

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body.as_ref(), b"made");

        let output = captured.output();
        assert!(output.contains("request"), "{output}");
        assert!(output.contains("method=POST"), "{output}");
        assert!(output.contains("path=/items"), "{output}");
        assert!(output.contains("status=201"), "{output}");
        assert!(output.contains("size=4"), "{output}");
        assert_eq!(output.lines().count(), 1, "{output}");
    }

    #[tokio::test]
    async fn test_counts_streamed_bytes() {
        let (captured, _guard) = capture();

        let handler = AccessLog.wrap(Box::new(handler_fn(|_req| async {
            let chunks: Vec<Result<_, BoxError>> =
                vec![Ok(Frame::data(Bytes::from_static(b"abc"))), Ok(Frame::data(Bytes::from_static(b"defgh")))];
            Response::new(ResponseBody::stream(StreamBody::new(futures::stream::iter(chunks))))
        })));

        let response = handler.invoke(Request::new(Bytes::new())).await;
        assert!(response.body().size_hint().exact().is_none());

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body.len(), 8);
        assert!(captured.output().contains("size=8"), "{}", captured.output());
    }

    #[tokio::test]
    async fn test_logs_when_body_dropped_unread() {
        let (captured, _guard) = capture();

        let handler = AccessLog.wrap(Box::new(handler_fn(|_req| async { "unread" })));
        let response = handler.invoke(Request::new(Bytes::new())).await;
        drop(response);

        let output = captured.output();
        assert!(output.contains("size=0"), "{output}");
        assert!(output.contains("status=200"), "{output}");
    }
}
