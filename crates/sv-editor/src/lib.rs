pub mod selection;
pub mod session;
pub mod visibility;

pub use selection::{SelectedElement, SelectionState};
pub use session::EditorSession;
pub use visibility::VisibilitySet;
