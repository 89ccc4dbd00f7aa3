use std::sync::Arc;

use crate::session::SessionManager;
use crate::upload::UploadClient;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<SessionManager>,
    pub uploader: Arc<UploadClient>,
    /// Body limit for the analyze upload, sized to the replay cap so any
    /// recording the buffer can hold is uploadable.
    pub upload_limit: usize,
}

impl AppState {
    pub fn new(
        manager: Arc<SessionManager>,
        uploader: Arc<UploadClient>,
        upload_limit: usize,
    ) -> Self {
        Self {
            manager,
            uploader,
            upload_limit,
        }
    }
}
