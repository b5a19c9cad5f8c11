pub mod api;
pub mod attributes;
pub mod client;
pub mod config;
pub mod grouping;
pub mod normalization;
pub mod service;
pub mod sheets;
pub mod structures;
pub mod viewer;
