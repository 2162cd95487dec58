//! Offline normalizers for captured social-media timeline payloads.
//!
//! Currently only the Twitter/X search timeline is implemented: capture bundles
//! written by a browser session go in, a deduplicated newest-first dataset of
//! flattened post records comes out. Nothing here touches the network.
pub mod twitter;
