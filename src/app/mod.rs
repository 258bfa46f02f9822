// Application layer - Use case interactors

pub mod container;
pub mod edit_interactor;
pub mod inspect_interactor;
pub mod thumbnail_interactor;

// Re-export interactors
pub use container::{AppContainer, DefaultAppContainer};
pub use edit_interactor::EditInteractor;
pub use inspect_interactor::InspectInteractor;
pub use thumbnail_interactor::ThumbnailInteractor;
