pub mod config;
pub mod fetch;
pub mod kmeans;
pub mod label;
pub mod levers;
pub mod matrix;
pub mod models;
pub mod orchestrator;
pub mod project;
pub mod relevance;
pub mod smallmerge;
pub mod tfidf;
pub mod tokenize;
pub mod vocab;
