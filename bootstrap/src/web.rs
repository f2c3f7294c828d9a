//! 静态资源

use std::path::PathBuf;

use axum::Router;
use axum::handler::HandlerWithoutStateExt;
use axum::http::StatusCode;
use tower_http::services::{ServeDir, ServeFile};

/// 静态资源配置
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// 挂载前缀，例如 "/" 或 "/web"
    pub prefix: String,
    /// 资源目录
    pub dir: PathBuf,
    /// 前缀根路径返回的首页文件名
    pub index: String,
}

impl WebConfig {
    pub fn new(prefix: impl Into<String>, dir: impl Into<PathBuf>, index: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            dir: dir.into(),
            index: index.into(),
        }
    }

    pub fn index_path(&self) -> PathBuf {
        self.dir.join(&self.index)
    }
}

/// 把静态资源挂载到已有路由上
///
/// 挂载在根路径时资源目录作为整个应用的 fallback，
/// 其他前缀则嵌套在该前缀下。找不到的文件返回 404，
/// 非 GET/HEAD 请求（包括未注册的 gRPC 方法）同样返回 404。
pub fn mount(app: Router, web: &WebConfig) -> Router {
    let index = ServeFile::new(web.index_path());
    let assets = ServeDir::new(&web.dir)
        .append_index_html_on_directories(false)
        .call_fallback_on_method_not_allowed(true)
        .not_found_service(not_found.into_service());

    let prefix = web.prefix.trim_end_matches('/');
    if prefix.is_empty() {
        app.route_service("/", index).fallback_service(assets)
    } else {
        let site = Router::new()
            .route_service("/", index)
            .fallback_service(assets);
        app.nest(prefix, site)
    }
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    fn site() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("home.html"), "<h1>home</h1>").unwrap();
        std::fs::write(dir.path().join("app.js"), "console.log(1)").unwrap();
        dir
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    #[tokio::test]
    async fn test_root_prefix_serves_custom_index() {
        let dir = site();
        let app = mount(Router::new(), &WebConfig::new("/", dir.path(), "home.html"));

        let (status, body) = get(app.clone(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<h1>home</h1>");

        let (status, body) = get(app.clone(), "/app.js").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "console.log(1)");

        let (status, _) = get(app, "/missing.css").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_nested_prefix() {
        let dir = site();
        let app = mount(Router::new(), &WebConfig::new("/web/", dir.path(), "home.html"));

        let (status, body) = get(app.clone(), "/web").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<h1>home</h1>");

        let (status, _) = get(app.clone(), "/web/app.js").await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = get(app, "/app.js").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_post_is_not_found() {
        let dir = site();
        let app = mount(Router::new(), &WebConfig::new("/", dir.path(), "home.html"));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/pkg.Missing/Call")
                    .header("content-type", "application/grpc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
