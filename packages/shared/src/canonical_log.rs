//! # Canonical Log Line ミドルウェア
//!
//! 1 リクエストにつき 1 行、メソッド・パス・ステータス・処理時間をまとめた
//! サマリログを出力する tower Layer。レスポンスには一切手を加えない。
//!
//! | 結果 | レベル | メッセージ |
//! |------|--------|-----------|
//! | 1xx〜4xx | INFO | `リクエスト完了` |
//! | 5xx | WARN | `リクエスト完了（サーバーエラー）` |
//! | Service エラー | ERROR | `リクエスト処理エラー` |
//!
//! TraceLayer の内側に置くと、リクエストスパンのフィールドが同じ行に付与される。
//!
//! ```text
//! TraceLayer → CanonicalLogLineLayer → handler
//! ```

use std::{
    fmt::Display,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Instant,
};

use http::{Method, Request, Response, StatusCode};
use tower::{Layer, Service};

#[derive(Clone, Debug)]
pub struct CanonicalLogLineLayer;

impl<S> Layer<S> for CanonicalLogLineLayer {
    type Service = CanonicalLogLineService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CanonicalLogLineService { inner }
    }
}

/// [`CanonicalLogLineLayer`] が生成する Service
#[derive(Clone, Debug)]
pub struct CanonicalLogLineService<S> {
    inner: S,
}

/// ログ 1 行分のリクエスト情報
struct RequestSummary {
    method:  Method,
    path:    String,
    started: Instant,
}

impl RequestSummary {
    fn begin<B>(req: &Request<B>) -> Self {
        Self {
            method:  req.method().clone(),
            path:    req.uri().path().to_owned(),
            started: Instant::now(),
        }
    }

    fn latency_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    fn finish(&self, status: StatusCode) {
        let latency_ms = self.latency_ms();
        let status_code = status.as_u16();

        if status.is_server_error() {
            tracing::warn!(
                log.r#type = "canonical",
                http.method = %self.method,
                http.path = %self.path,
                http.status_code = status_code,
                http.latency_ms = latency_ms,
                "リクエスト完了（サーバーエラー）"
            );
        } else {
            tracing::info!(
                log.r#type = "canonical",
                http.method = %self.method,
                http.path = %self.path,
                http.status_code = status_code,
                http.latency_ms = latency_ms,
                "リクエスト完了"
            );
        }
    }

    fn fail(&self, err: &dyn Display) {
        tracing::error!(
            log.r#type = "canonical",
            http.method = %self.method,
            http.path = %self.path,
            http.latency_ms = self.latency_ms(),
            error.message = %err,
            "リクエスト処理エラー"
        );
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for CanonicalLogLineService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Display + 'static,
    ReqBody: Send + 'static,
    ResBody: Send + 'static,
{
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;
    type Response = S::Response;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        // poll_ready 済みの inner を取り出し、代わりに clone を残す
        let ready = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, ready);
        let summary = RequestSummary::begin(&req);

        Box::pin(async move {
            let result = inner.call(req).await;
            match &result {
                Ok(response) => summary.finish(response.status()),
                Err(err) => summary.fail(err),
            }
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{
        convert::Infallible,
        io,
        sync::{Arc, Mutex},
    };

    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tower::service_fn;
    use tracing_subscriber::layer::SubscriberExt;

    use super::*;

    /// JSON ログを書き込む共有バッファ
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn lines(&self) -> Vec<serde_json::Value> {
            let bytes = self.0.lock().unwrap().clone();
            String::from_utf8(bytes)
                .unwrap()
                .lines()
                .map(|line| serde_json::from_str(line).unwrap())
                .collect()
        }
    }

    /// 返り値のガードを保持している間だけログをバッファに書き込む
    fn capture_json() -> (tracing::subscriber::DefaultGuard, LogBuffer) {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::registry().with(
            tracing_subscriber::fmt::layer()
                .json()
                .flatten_event(true)
                .with_writer(move || writer.clone()),
        );
        (tracing::subscriber::set_default(subscriber), buffer)
    }

    fn request(method: Method, path: &str) -> Request<()> {
        Request::builder()
            .method(method)
            .uri(path)
            .body(())
            .unwrap()
    }

    #[rstest]
    #[case(StatusCode::OK, "INFO", "リクエスト完了", "成功")]
    #[case(StatusCode::BAD_REQUEST, "INFO", "リクエスト完了", "クライアントエラー")]
    #[case(StatusCode::NOT_FOUND, "INFO", "リクエスト完了", "対象なし")]
    #[case(
        StatusCode::SERVICE_UNAVAILABLE,
        "WARN",
        "リクエスト完了（サーバーエラー）",
        "サーバーエラー"
    )]
    #[tokio::test]
    async fn test_ステータスに応じたレベルで1行出力され応答は変わらない(
        #[case] status: StatusCode,
        #[case] level: &str,
        #[case] message: &str,
        #[case] _description: &str,
    ) {
        // Given
        let (_guard, logs) = capture_json();
        let mut sut = CanonicalLogLineLayer.layer(service_fn(move |_req: Request<()>| async move {
            Ok::<_, Infallible>(Response::builder().status(status).body("body").unwrap())
        }));

        // When
        let response = sut
            .call(request(Method::PUT, "/todo/0191d6f0?x=1"))
            .await
            .unwrap();

        // Then
        assert_eq!(response.status(), status);
        assert_eq!(*response.body(), "body");

        let lines = logs.lines();
        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert_eq!(line["level"], level);
        assert_eq!(line["message"], message);
        assert_eq!(line["log.type"], "canonical");
        assert_eq!(line["http.method"], "PUT");
        assert_eq!(line["http.path"], "/todo/0191d6f0");
        assert_eq!(line["http.status_code"], status.as_u16());
        assert!(line["http.latency_ms"].as_u64().unwrap() < 1000);
    }

    #[tokio::test]
    async fn test_serviceエラーはerrorレベルで出力されそのまま返る() {
        // Given
        let (_guard, logs) = capture_json();
        let mut sut = CanonicalLogLineLayer.layer(service_fn(|_req: Request<()>| async {
            Err::<Response<()>, _>("connection reset".to_string())
        }));

        // When
        let result = sut.call(request(Method::GET, "/todo/")).await;

        // Then
        assert_eq!(result.unwrap_err(), "connection reset");

        let lines = logs.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["level"], "ERROR");
        assert_eq!(lines[0]["message"], "リクエスト処理エラー");
        assert_eq!(lines[0]["error.message"], "connection reset");
        assert_eq!(lines[0]["http.path"], "/todo/");
        assert!(lines[0].get("http.status_code").is_none());
    }
}
