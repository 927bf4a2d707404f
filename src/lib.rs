pub mod acquire;
pub mod app;
pub mod audio;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod error;
pub mod features;
pub mod http;
pub mod mfcc;
pub mod output;
pub mod pipeline;
pub mod store;
pub mod ytdlp;
