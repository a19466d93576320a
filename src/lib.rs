#![allow(clippy::module_inception)]

//! Plain-text notes kept in a local directory (mirrored to a remote git
//! repository), exposed through a filesystem provider and a sorted tree
//! projection for a presentation layer to consume.

pub mod application;
pub mod cli;
pub mod ext;
pub mod filesystem;
pub mod provision;
