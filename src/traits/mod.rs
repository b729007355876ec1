pub mod bus;
pub mod plugin;
pub mod storage;

pub use bus::{MessageBus, TopicHandler};
pub use plugin::Plugin;
pub use storage::Storage;
