pub mod backend;
pub mod character;
pub mod config;
pub mod effect;
pub mod event;
pub mod manifest;
pub mod player;
pub mod runtime;
pub mod scene;
pub mod scheduler;
pub mod sound_chain;
pub mod stage;
pub mod story;
pub mod trigger;

pub use backend::{AudioBackend, Renderer, ResourceLoader, Resources};
pub use event::RuntimeEvent;
pub use player::StoryPlayer;
pub use runtime::World;
pub use story::StoryDocument;
