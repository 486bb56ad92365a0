mod log_viewer;
mod unlock;

pub use log_viewer::LogViewerScreen;
pub use unlock::UnlockScreen;
