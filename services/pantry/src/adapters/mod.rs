pub mod clock;
pub mod data;
pub mod memory;

pub use clock::SystemClock;
pub use data::{load_achievement_catalog, load_knowledge_base};
pub use memory::InMemoryProgressStore;
