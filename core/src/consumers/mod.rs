//! Ready-made subscribers for common consumers: logging, in-memory
//! recording and bridging a topic onto an async channel.

pub mod channel;
pub mod log;
pub mod recorder;

pub use channel::subscribe_channel;
pub use log::LogSubscriber;
pub use recorder::Recorder;
