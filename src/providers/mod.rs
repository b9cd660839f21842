pub mod oembed;
pub mod sheets;
