//! Crate-wide constants and endpoint paths.

/// Response bodies at or above this size are left out of error details.
pub const BODY_EXCERPT_LIMIT: usize = 1024;

/// Largest single write issued by a chunked download.
pub const DOWNLOAD_CHUNK_SIZE: usize = 8 * 1024;

/// Deflate level used when packing archives.
pub const ZIP_COMPRESSION_LEVEL: i64 = 9;

/// Directory tree listing.
pub const TREE_PATH: &str = "/api/tree";

/// Upload, download, move and delete.
pub const COMMANDS_PATH: &str = "/api/commands";

/// Server-side fetch of a remote URL.
pub const COMMANDS_URL_PATH: &str = "/api/commands/url";

/// Multipart field carrying the uploaded file.
pub const UPLOAD_FILE_FIELD: &str = "f";

/// Build the OpenID Connect token endpoint for a realm.
pub fn token_endpoint(endpoint_uri: &str, realm: &str) -> String {
    format!(
        "{}/auth/realms/{}/protocol/openid-connect/token",
        endpoint_uri.trim_end_matches('/'),
        realm
    )
}

/// Render a flag the way the server expects it on the wire.
pub(crate) fn wire_flag(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}
