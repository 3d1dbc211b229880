// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

pub mod canvas;
pub mod config;
pub mod encoder;
pub mod error;
pub mod export;
pub mod playback;
pub mod player;
pub mod timeline;
