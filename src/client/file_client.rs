//! File operations exposed by the REST-SFTP server.

use super::dispatcher::{RequestBody, RequestDispatcher};
use super::observer::{RequestObserver, TracingObserver};
use super::tree::{TreeNode, TreeOptions};
use super::validator::ResponseValidator;
use super::OperationParams;
use crate::auth::AuthStrategy;
use crate::config::{
    COMMANDS_PATH, COMMANDS_URL_PATH, DOWNLOAD_CHUNK_SIZE, TREE_PATH, UPLOAD_FILE_FIELD, wire_flag,
};
use crate::error::Result;
use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, Response};
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Client for one REST-SFTP server.
///
/// Owns its authentication strategy; token state is never shared between
/// clients.
pub struct FileClient {
    base_url: String,
    dispatcher: RequestDispatcher,
    validator: ResponseValidator,
    observer: Arc<dyn RequestObserver>,
}

impl FileClient {
    /// Create a client for the server at `base_url`.
    pub fn new(base_url: impl Into<String>, auth: impl AuthStrategy + 'static) -> Self {
        let observer: Arc<dyn RequestObserver> = Arc::new(TracingObserver);
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            dispatcher: RequestDispatcher::new(Box::new(auth)),
            validator: ResponseValidator::new(observer.clone()),
            observer,
        }
    }

    /// Use a preconfigured HTTP client for file operations.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.dispatcher = self.dispatcher.with_http_client(http);
        self
    }

    /// Replace the default `tracing` observer.
    pub fn with_observer(mut self, observer: Arc<dyn RequestObserver>) -> Self {
        self.validator = ResponseValidator::new(observer.clone());
        self.observer = observer;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// List the directory tree rooted at `folder`.
    pub async fn list_tree(&self, folder: &str, options: TreeOptions) -> Result<TreeNode> {
        let params = OperationParams::new(&(
            folder,
            options.recursive,
            options.ignore_hidden,
            options.absolute_path,
        ));
        let query = [
            ("folder", folder.to_string()),
            ("recursive_enabled", wire_flag(options.recursive).to_string()),
            (
                "ignore_hidden_file_enabled",
                wire_flag(options.ignore_hidden).to_string(),
            ),
            (
                "absolute_path_enabled",
                wire_flag(options.absolute_path).to_string(),
            ),
        ];

        let response = self
            .execute(
                "list_tree",
                &params,
                Method::GET,
                TREE_PATH,
                &query,
                RequestBody::Empty,
                HeaderMap::new(),
            )
            .await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Ask the server to fetch `url` and store it as `dest_folder/filename`.
    pub async fn upload_from_url(&self, url: &str, dest_folder: &str, filename: &str) -> Result<()> {
        let params = OperationParams::new(&(url, dest_folder, filename));
        let form = vec![
            ("url", url.to_string()),
            ("filepath", dest_folder.to_string()),
            ("filename", filename.to_string()),
        ];

        self.execute(
            "upload_from_url",
            &params,
            Method::POST,
            COMMANDS_URL_PATH,
            &[],
            RequestBody::Form(form),
            HeaderMap::new(),
        )
        .await?;
        Ok(())
    }

    /// Download a remote file into memory.
    pub async fn download_content(&self, file_path: &str) -> Result<Bytes> {
        let response = self.fetch_content("download_content", file_path).await?;
        Ok(response.bytes().await?)
    }

    /// Download a remote file into memory as text.
    pub async fn download_text(&self, file_path: &str) -> Result<String> {
        let response = self.fetch_content("download_text", file_path).await?;
        Ok(response.text().await?)
    }

    /// Download `file_paths` to `local_path`, returning the number of bytes
    /// written.
    ///
    /// With `zip_enabled` the server bundles the files into one archive. With
    /// `chunked` the body is written as it arrives in pieces of at most
    /// [`DOWNLOAD_CHUNK_SIZE`] bytes; otherwise it is buffered whole first.
    /// Nothing is written when the server rejects the request.
    pub async fn download_to_file(
        &self,
        file_paths: &str,
        local_path: impl AsRef<Path>,
        zip_enabled: bool,
        chunked: bool,
    ) -> Result<u64> {
        let local_path = local_path.as_ref();
        let params =
            OperationParams::new(&(file_paths, local_path.display().to_string(), zip_enabled, chunked));
        let query = [
            ("file_paths", file_paths.to_string()),
            ("zip_enabled", wire_flag(zip_enabled).to_string()),
        ];

        let mut response = self
            .execute(
                "download_to_file",
                &params,
                Method::GET,
                COMMANDS_PATH,
                &query,
                RequestBody::Empty,
                HeaderMap::new(),
            )
            .await?;

        let mut file = tokio::fs::File::create(local_path).await?;
        if chunked {
            write_chunked(&mut response, &mut file, DOWNLOAD_CHUNK_SIZE).await
        } else {
            let body = response.bytes().await?;
            file.write_all(&body).await?;
            file.flush().await?;
            Ok(body.len() as u64)
        }
    }

    /// Upload the local file at `local_path` as `dest_folder/filename`.
    pub async fn upload_file(
        &self,
        dest_folder: &str,
        filename: &str,
        local_path: impl AsRef<Path>,
    ) -> Result<()> {
        let local_path = local_path.as_ref();
        let params =
            OperationParams::new(&(dest_folder, filename, local_path.display().to_string()));

        let contents = tokio::fs::read(local_path).await?;
        let part = Part::bytes(contents)
            .file_name(filename.to_string())
            .mime_str("text/plain")?;
        let form = Form::new()
            .text("filepath", dest_folder.to_string())
            .part(UPLOAD_FILE_FIELD, part);

        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_str(&format!("multipart/form-data; boundary={}", form.boundary()))?,
        );

        self.execute(
            "upload_file",
            &params,
            Method::POST,
            COMMANDS_PATH,
            &[],
            RequestBody::Multipart(form),
            headers,
        )
        .await?;
        Ok(())
    }

    /// Delete a remote file, optionally moving it to the server's bin.
    pub async fn delete_file(&self, filepath: &str, move_to_bin: bool) -> Result<()> {
        let params = OperationParams::new(&(filepath, move_to_bin));
        let query = [
            ("filepath", filepath.to_string()),
            ("move_to_bin_enabled", wire_flag(move_to_bin).to_string()),
        ];

        self.execute(
            "delete_file",
            &params,
            Method::DELETE,
            COMMANDS_PATH,
            &query,
            RequestBody::Empty,
            HeaderMap::new(),
        )
        .await?;
        Ok(())
    }

    /// Move or rename a remote file.
    pub async fn move_file(&self, from: &str, to: &str) -> Result<()> {
        let params = OperationParams::new(&(from, to));
        let form = vec![
            ("filepath_from", from.to_string()),
            ("filepath_to", to.to_string()),
        ];

        self.execute(
            "move_file",
            &params,
            Method::PUT,
            COMMANDS_PATH,
            &[],
            RequestBody::Form(form),
            HeaderMap::new(),
        )
        .await?;
        Ok(())
    }

    async fn fetch_content(&self, operation: &str, file_path: &str) -> Result<Response> {
        let params = OperationParams::new(&(file_path,));
        let query = [
            ("file_paths", file_path.to_string()),
            ("zip_enabled", wire_flag(false).to_string()),
        ];

        self.execute(
            operation,
            &params,
            Method::GET,
            COMMANDS_PATH,
            &query,
            RequestBody::Empty,
            HeaderMap::new(),
        )
        .await
    }

    #[allow(clippy::too_many_arguments)]
    async fn execute(
        &self,
        operation: &str,
        params: &OperationParams,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: RequestBody,
        headers: HeaderMap,
    ) -> Result<Response> {
        self.observer.before_dispatch(operation, params);
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .dispatcher
            .dispatch(method, &url, query, body, headers)
            .await?;
        self.validator.validate(response, operation, params).await
    }
}

/// Copy a response body to `writer`, never writing more than `chunk_size`
/// bytes at once.
pub(crate) async fn write_chunked<W>(
    response: &mut Response,
    writer: &mut W,
    chunk_size: usize,
) -> Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await? {
        for piece in chunk.chunks(chunk_size) {
            writer.write_all(piece).await?;
            written += piece.len() as u64;
        }
    }
    writer.flush().await?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{BasicAuth, TokenAuth};
    use crate::error::RestSftpError;
    use reqwest::StatusCode;
    use serde_json::json;
    use std::pin::Pin;
    use std::sync::Mutex;
    use std::task::{Context, Poll};
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn basic_client(server: &MockServer) -> FileClient {
        init_tracing();
        FileClient::new(server.uri(), BasicAuth::new("user", "pass"))
    }

    async fn token_client(server: &MockServer) -> FileClient {
        init_tracing();
        Mock::given(method("POST"))
            .and(path("/auth/realms/files/protocol/openid-connect/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "tok",
                "expires_in": 300
            })))
            .mount(server)
            .await;
        FileClient::new(
            server.uri(),
            TokenAuth::new(server.uri(), "files", "id", "secret"),
        )
    }

    fn sample_bytes(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    #[tokio::test]
    async fn test_list_tree_returns_server_structure() {
        let server = MockServer::start().await;
        let tree = json!({
            "name": "docs",
            "children": [
                {"name": "a.txt", "path": "/docs/a.txt"},
                {"name": "reports", "children": [{"name": "q1.pdf"}]}
            ]
        });
        Mock::given(method("GET"))
            .and(path("/api/tree"))
            .and(query_param("folder", "/docs"))
            .and(query_param("recursive_enabled", "True"))
            .and(query_param("ignore_hidden_file_enabled", "True"))
            .and(query_param("absolute_path_enabled", "False"))
            .respond_with(ResponseTemplate::new(200).set_body_json(tree.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let client = basic_client(&server);
        let node = client
            .list_tree("/docs", TreeOptions::default().recursive(true))
            .await
            .unwrap();
        assert_eq!(node.name, "docs");
        assert_eq!(serde_json::to_value(&node).unwrap(), tree);
    }

    #[tokio::test]
    async fn test_list_tree_invalid_json_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tree"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = basic_client(&server)
            .list_tree("/", TreeOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RestSftpError::Decode(_)));
    }

    #[tokio::test]
    async fn test_list_tree_with_bearer_token() {
        let server = MockServer::start().await;
        let client = token_client(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/tree"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "/"})))
            .expect(1)
            .mount(&server)
            .await;

        let node = client.list_tree("/", TreeOptions::default()).await.unwrap();
        assert_eq!(node.name, "/");
        assert!(!node.is_dir());
    }

    #[tokio::test]
    async fn test_upload_file_sends_multipart_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/commands"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("a.txt");
        std::fs::write(&local, b"hello from a.txt").unwrap();

        basic_client(&server)
            .upload_file("/dst", "a.txt", &local)
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let request = &requests[0];
        let content_type = request.headers.get("content-type").unwrap().to_str().unwrap();
        assert!(content_type.starts_with("multipart/form-data; boundary="));
        assert_eq!(request.headers.get_all("content-type").iter().count(), 1);

        let body = String::from_utf8_lossy(&request.body);
        assert!(body.contains("name=\"filepath\"\r\n\r\n/dst\r\n"));
        assert!(body.contains("name=\"f\"; filename=\"a.txt\""));
        assert!(body.contains("hello from a.txt"));
    }

    #[tokio::test]
    async fn test_upload_file_with_bearer_keeps_multipart_type() {
        let server = MockServer::start().await;
        let client = token_client(&server).await;
        Mock::given(method("POST"))
            .and(path("/api/commands"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("b.txt");
        std::fs::write(&local, b"bbb").unwrap();
        client.upload_file("/dst", "b.txt", &local).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let upload = requests
            .iter()
            .find(|r| r.url.path() == "/api/commands")
            .unwrap();
        let content_type = upload.headers.get("content-type").unwrap().to_str().unwrap();
        assert!(content_type.starts_with("multipart/form-data; boundary="));
    }

    #[tokio::test]
    async fn test_upload_missing_local_file_is_io_error() {
        let server = MockServer::start().await;
        let err = basic_client(&server)
            .upload_file("/dst", "x.txt", "/nonexistent/x.txt")
            .await
            .unwrap_err();
        assert!(matches!(err, RestSftpError::Io(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_chunked_download_is_byte_identical() {
        let server = MockServer::start().await;
        let source = sample_bytes(100 * 1024);
        Mock::given(method("GET"))
            .and(path("/api/commands"))
            .and(query_param("file_paths", "/big.bin"))
            .and(query_param("zip_enabled", "False"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(source.clone()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("big.bin");
        let written = basic_client(&server)
            .download_to_file("/big.bin", &local, false, true)
            .await
            .unwrap();

        assert_eq!(written, source.len() as u64);
        assert_eq!(std::fs::read(&local).unwrap(), source);
    }

    #[tokio::test]
    async fn test_buffered_download_is_byte_identical() {
        let server = MockServer::start().await;
        let source = sample_bytes(20 * 1024);
        Mock::given(method("GET"))
            .and(path("/api/commands"))
            .and(query_param("zip_enabled", "True"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(source.clone()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("bundle.zip");
        basic_client(&server)
            .download_to_file("/a.txt,/b.txt", &local, true, false)
            .await
            .unwrap();
        assert_eq!(std::fs::read(&local).unwrap(), source);
    }

    #[tokio::test]
    async fn test_rejected_download_writes_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/commands"))
            .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("never.bin");
        let err = basic_client(&server)
            .download_to_file("/missing", &local, false, true)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert!(!local.exists());
    }

    #[derive(Default)]
    struct RecordingWriter {
        data: Vec<u8>,
        writes: Vec<usize>,
    }

    impl AsyncWrite for RecordingWriter {
        fn poll_write(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<std::io::Result<usize>> {
            self.writes.push(buf.len());
            self.data.extend_from_slice(buf);
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_write_chunked_bounds_each_write() {
        let server = MockServer::start().await;
        let source = sample_bytes(100 * 1024);
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(source.clone()))
            .mount(&server)
            .await;

        let mut response = reqwest::get(server.uri()).await.unwrap();
        let mut writer = RecordingWriter::default();
        let written = write_chunked(&mut response, &mut writer, DOWNLOAD_CHUNK_SIZE)
            .await
            .unwrap();

        assert_eq!(written, source.len() as u64);
        assert_eq!(writer.data, source);
        assert!(writer.writes.len() >= source.len() / DOWNLOAD_CHUNK_SIZE);
        assert!(writer.writes.iter().all(|&n| n <= DOWNLOAD_CHUNK_SIZE));
    }

    #[tokio::test]
    async fn test_download_content_and_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/commands"))
            .and(query_param("file_paths", "/notes.txt"))
            .and(query_param("zip_enabled", "False"))
            .respond_with(ResponseTemplate::new(200).set_body_string("line one\nline two"))
            .mount(&server)
            .await;

        let client = basic_client(&server);
        let bytes = client.download_content("/notes.txt").await.unwrap();
        assert_eq!(&bytes[..], b"line one\nline two");

        let text = client.download_text("/notes.txt").await.unwrap();
        assert_eq!(text, "line one\nline two");
    }

    #[tokio::test]
    async fn test_delete_twice_second_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/commands"))
            .and(query_param("filepath", "/old.txt"))
            .and(query_param("move_to_bin_enabled", "True"))
            .respond_with(ResponseTemplate::new(200))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/commands"))
            .respond_with(ResponseTemplate::new(404).set_body_string("file not found"))
            .mount(&server)
            .await;

        let client = basic_client(&server);
        client.delete_file("/old.txt", true).await.unwrap();

        match client.delete_file("/old.txt", true).await.unwrap_err() {
            RestSftpError::RemoteOperation(e) => {
                assert_eq!(e.operation, "delete_file");
                assert_eq!(e.params, "(\"/old.txt\", true)");
                assert_eq!(e.status, StatusCode::NOT_FOUND);
                assert_eq!(e.body_excerpt.as_deref(), Some("file not found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_move_file_sends_form() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/commands"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("filepath_from=%2Fa.txt"))
            .and(body_string_contains("filepath_to=%2Farchive%2Fa.txt"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        basic_client(&server)
            .move_file("/a.txt", "/archive/a.txt")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_upload_from_url_sends_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/commands/url"))
            .and(body_string_contains("url=https%3A%2F%2Fexample.com%2Fdata.csv"))
            .and(body_string_contains("filepath=%2Fincoming"))
            .and(body_string_contains("filename=data.csv"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        basic_client(&server)
            .upload_from_url("https://example.com/data.csv", "/incoming", "data.csv")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_auth_failure_surfaces_before_dispatch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/realms/files/protocol/openid-connect/token"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = FileClient::new(
            server.uri(),
            TokenAuth::new(server.uri(), "files", "id", "bad"),
        );
        let err = client.delete_file("/a", false).await.unwrap_err();
        assert!(matches!(err, RestSftpError::Auth(_)));

        let requests = server.received_requests().await.unwrap();
        assert!(requests.iter().all(|r| r.url.path() != "/api/commands"));
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl RequestObserver for Recorder {
        fn before_dispatch(&self, operation: &str, params: &OperationParams) {
            self.events
                .lock()
                .unwrap()
                .push(format!("before {operation} {params}"));
        }

        fn after_validation(
            &self,
            operation: &str,
            _params: &OperationParams,
            status: StatusCode,
            _failure: Option<&crate::error::RemoteOperationError>,
        ) {
            self.events
                .lock()
                .unwrap()
                .push(format!("after {operation} {}", status.as_u16()));
        }
    }

    #[tokio::test]
    async fn test_observer_sees_each_operation() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let recorder = Arc::new(Recorder::default());
        let client = basic_client(&server).with_observer(recorder.clone());
        client.move_file("/a", "/b").await.unwrap();

        assert_eq!(
            *recorder.events.lock().unwrap(),
            vec![
                "before move_file (\"/a\", \"/b\")".to_string(),
                "after move_file 200".to_string(),
            ]
        );
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = FileClient::new("http://files.local/", BasicAuth::new("u", "p"));
        assert_eq!(client.base_url(), "http://files.local");
    }
}
