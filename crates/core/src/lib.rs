//! Core library for atlasmcp
//!
//! This crate implements the **Functional Core** of the atlasmcp server,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! - **`atlasmcp_core`** (this crate): Pure transformation functions with zero I/O
//! - **`atlasmcp`**: I/O operations and transports (the Imperative Shell)
//!
//! Everything that can be computed without touching the network lives here:
//! JQL assembly, pagination arithmetic, transition matching, page-update
//! merging, and reply summarization. All functions are deterministic and
//! tested with fixture data, no mocking required.

pub mod atlassian;
