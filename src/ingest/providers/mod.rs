// src/ingest/providers/mod.rs
pub mod channel;
pub mod feed;
pub mod page;

pub use channel::ChannelAdapter;
pub use feed::FeedAdapter;
pub use page::PageAdapter;
