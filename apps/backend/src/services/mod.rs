//! Business-logic services composing clients and the request cache.

pub mod portfolio;
