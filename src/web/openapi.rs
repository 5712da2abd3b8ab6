//! OpenAPI document for the file API.

use utoipa::OpenApi;

use super::dto::{MessageResponse, UploadForm, UploadResponse};
use super::error::ErrorBody;
use super::handlers::file;
use crate::file::FileRecord;

/// OpenAPI description of the four file operations.
#[derive(OpenApi)]
#[openapi(
    info(title = "VinnoDrive API", description = "Minimal file storage service"),
    paths(
        file::upload_file,
        file::list_files,
        file::download_file,
        file::delete_file
    ),
    components(schemas(FileRecord, UploadForm, UploadResponse, MessageResponse, ErrorBody)),
    tags((name = "files", description = "Upload, list, download and delete files"))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_file_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        assert!(paths.contains(&"/upload"));
        assert!(paths.contains(&"/files"));
        assert!(paths.contains(&"/download/{id}"));
        assert!(paths.contains(&"/delete/{id}"));
    }
}
