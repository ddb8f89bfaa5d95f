//! OpenSearch suggestion service for Gene Ontology terms and gene products.
//!
//! `GET /<entity_type>/<query>` answers with the OpenSearch suggestions array
//! `[query, labels, ids, links]`, built from one GOlr search per request.

pub mod cli;
pub mod config;
pub mod entities;
pub mod error;
pub mod gateway;
pub mod link;
pub mod server;
pub mod sources;
pub mod transform;
