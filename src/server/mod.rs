//! HTTP boundary for the watermark service.
//!
//! A thin request/response adapter over the watermark processor:
//!
//! - `GET /health`: liveness probe for containers and load balancers
//! - `POST /process`: body is the raw encoded image (`Content-Type`
//!   must be `image/*`); optional `watermark` query parameter carries the
//!   text; responds with the watermarked JPEG as an attachment
//!
//! The boundary validates the declared content type (400), caps the body
//! size (413), and maps processing failures through
//! [`WatermarkError::to_http_status`] (422 for undecodable uploads, 500
//! for processing defects). All image work runs on the blocking pool.

use bytes::Bytes;
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::Incoming;
use hyper::header::{HeaderValue, CONTENT_DISPOSITION, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::sync::Arc;

use crate::config::Config;
use crate::watermark::WatermarkProcessor;

/// Shared per-process state: the processor and the upload limit.
pub struct AppState {
    pub processor: WatermarkProcessor,
    pub max_body_size: usize,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            processor: WatermarkProcessor::from_config(config),
            max_body_size: config.server.max_body_size,
        }
    }
}

/// Bind and serve until the listener fails.
pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let state = Arc::new(AppState::new(&config));
    let address = format!("{}:{}", config.server.address, config.server.port);

    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Watermark service listening");

    loop {
        let (stream, _peer) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let state = state.clone();

        tokio::task::spawn(async move {
            let service = service_fn(move |req| handle_request(req, state.clone()));
            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                tracing::debug!(error = %err, "Connection closed with error");
            }
        });
    }
}

/// Route a request. Infallible: every failure becomes an error response.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: hyper::body::Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let response = match (req.method(), req.uri().path()) {
        (&Method::GET, "/health") => health_response(),
        (&Method::POST, "/process") => process_upload(req, state).await,
        _ => error_response(StatusCode::NOT_FOUND, "Not found"),
    };

    Ok(response)
}

fn health_response() -> Response<Full<Bytes>> {
    json_response(
        StatusCode::OK,
        serde_json::json!({"status": "healthy", "service": "sukashi"}),
    )
}

async fn process_upload<B>(req: Request<B>, state: Arc<AppState>) -> Response<Full<Bytes>>
where
    B: hyper::body::Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    if !is_image_content_type(content_type.as_deref()) {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Uploaded file is not an image. Supported formats: JPEG, PNG, GIF, BMP",
        );
    }

    let text = watermark_text_from_query(req.uri().query());

    let body = match Limited::new(req.into_body(), state.max_body_size)
        .collect()
        .await
    {
        Ok(collected) => collected.to_bytes(),
        Err(err) => {
            return if err.downcast_ref::<http_body_util::LengthLimitError>().is_some() {
                error_response(StatusCode::PAYLOAD_TOO_LARGE, "Uploaded file is too large")
            } else {
                error_response(StatusCode::BAD_REQUEST, "Failed to read request body")
            };
        }
    };

    let task_state = state.clone();
    let result =
        tokio::task::spawn_blocking(move || task_state.processor.apply(&body, text.as_deref()))
            .await;

    match result {
        Ok(Ok(jpeg)) => jpeg_response(jpeg),
        Ok(Err(err)) => {
            tracing::warn!(error = %err, "Watermarking failed");
            let status = StatusCode::from_u16(err.to_http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            error_response(status, &err.to_string())
        }
        Err(err) => {
            tracing::error!(error = %err, "Watermarking task panicked");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Image processing task failed",
            )
        }
    }
}

/// Content-type gate for uploads. The decoder is the real judge; this
/// rejects obviously wrong uploads before the body is read.
fn is_image_content_type(content_type: Option<&str>) -> bool {
    content_type
        .map(|value| value.trim().to_ascii_lowercase().starts_with("image/"))
        .unwrap_or(false)
}

/// Extract the `watermark` query parameter, percent-decoded.
fn watermark_text_from_query(query: Option<&str>) -> Option<String> {
    let query = query?;

    for pair in query.split('&') {
        let mut parts = pair.splitn(2, '=');
        if parts.next() != Some("watermark") {
            continue;
        }
        let raw = parts.next().unwrap_or("").replace('+', " ");
        return urlencoding::decode(&raw).ok().map(|text| text.into_owned());
    }

    None
}

fn jpeg_response(data: Vec<u8>) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(data)));
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("image/jpeg"));
    response.headers_mut().insert(
        CONTENT_DISPOSITION,
        HeaderValue::from_static("attachment; filename=\"watermarked.jpg\""),
    );
    response
}

fn json_response(status: StatusCode, body: serde_json::Value) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body.to_string())));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

fn error_response(status: StatusCode, detail: &str) -> Response<Full<Bytes>> {
    json_response(status, serde_json::json!({ "detail": detail }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::DynamicImage;
    use std::io::Cursor;

    fn test_state() -> Arc<AppState> {
        let config = Config::from_yaml("fonts:\n  search_paths: []\n").unwrap();
        Arc::new(AppState::new(&config))
    }

    fn encode_png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([60, 120, 60]));
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buffer, image::ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    fn request(
        method: &str,
        uri: &str,
        content_type: Option<&str>,
        body: Vec<u8>,
    ) -> Request<Full<Bytes>> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(value) = content_type {
            builder = builder.header("content-type", value);
        }
        builder.body(Full::new(Bytes::from(body))).unwrap()
    }

    async fn body_bytes(response: Response<Full<Bytes>>) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    #[test]
    fn test_is_image_content_type() {
        assert!(is_image_content_type(Some("image/png")));
        assert!(is_image_content_type(Some("image/jpeg")));
        assert!(is_image_content_type(Some("IMAGE/GIF")));
        assert!(is_image_content_type(Some("  image/bmp")));

        assert!(!is_image_content_type(Some("text/plain")));
        assert!(!is_image_content_type(Some("application/octet-stream")));
        assert!(!is_image_content_type(None));
    }

    #[test]
    fn test_watermark_text_from_query() {
        assert_eq!(
            watermark_text_from_query(Some("watermark=CONFIDENTIAL")),
            Some("CONFIDENTIAL".to_string())
        );
        assert_eq!(
            watermark_text_from_query(Some("other=1&watermark=Do%20Not%20Copy")),
            Some("Do Not Copy".to_string())
        );
        assert_eq!(
            watermark_text_from_query(Some("watermark=Do+Not+Copy")),
            Some("Do Not Copy".to_string())
        );
        assert_eq!(
            watermark_text_from_query(Some("watermark=")),
            Some(String::new())
        );
        assert_eq!(watermark_text_from_query(Some("other=1")), None);
        assert_eq!(watermark_text_from_query(None), None);
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = handle_request(request("GET", "/health", None, vec![]), test_state())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_bytes(response).await;
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["service"], "sukashi");
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let response = handle_request(request("GET", "/nope", None, vec![]), test_state())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_process_rejects_wrong_content_type() {
        let response = handle_request(
            request("POST", "/process", Some("text/plain"), b"hello".to_vec()),
            test_state(),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_bytes(response).await;
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["detail"].as_str().unwrap().contains("not an image"));
    }

    #[tokio::test]
    async fn test_process_rejects_missing_content_type() {
        let response = handle_request(
            request("POST", "/process", None, encode_png(32, 32)),
            test_state(),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_process_undecodable_body_is_422() {
        let response = handle_request(
            request(
                "POST",
                "/process",
                Some("image/png"),
                b"not actually a png".to_vec(),
            ),
            test_state(),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_process_body_too_large_is_413() {
        let config =
            Config::from_yaml("server:\n  max_body_size: 16\nfonts:\n  search_paths: []\n")
                .unwrap();
        let state = Arc::new(AppState::new(&config));

        let response = handle_request(
            request("POST", "/process", Some("image/png"), encode_png(64, 64)),
            state,
        )
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_process_success_returns_jpeg() {
        let response = handle_request(
            request(
                "POST",
                "/process?watermark=hello",
                Some("image/png"),
                encode_png(96, 64),
            ),
            test_state(),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "image/jpeg"
        );
        assert_eq!(
            response.headers().get(CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=\"watermarked.jpg\""
        );

        let body = body_bytes(response).await;
        let decoded = image::load_from_memory(&body).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (96, 64));
        assert_eq!(
            image::guess_format(&body).unwrap(),
            image::ImageFormat::Jpeg
        );
    }
}
