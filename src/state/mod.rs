//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `QueueStatus`: the queue item state machine (pending, processing, completed, failed, disallowed)

mod queue_status;

// Re-export main types
pub use queue_status::QueueStatus;
