//! Chess move-search engine core: given a position in [FEN], find the best
//! move within a bounded search depth and report it in coordinate notation
//! (e.g. `e2e4`).
//!
//! The crate is organized bottom-up:
//!
//! - [`chess`] implements the rules: bitboard-based position representation,
//!   legal move generation and move application;
//! - [`evaluation`] scores positions with a tapered material + piece-square
//!   evaluation;
//! - [`search`] drives iterative-deepening negamax with alpha-beta pruning
//!   and a per-search transposition cache;
//! - [`engine`] is the thin request/response facade external callers speak
//!   to.
//!
//! [FEN]: https://www.chessprogramming.org/Forsyth-Edwards_Notation

// Rustc lints.
#![warn(
    missing_docs,
    variant_size_differences,
    absolute_paths_not_starting_with_crate,
    keyword_idents,
    macro_use_extern_crate,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unused_extern_crates,
    unused_import_braces,
    unused_lifetimes,
    unused_qualifications
)]
// Rustdoc lints.
#![warn(
    rustdoc::private_doc_tests,
    rustdoc::missing_crate_level_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::invalid_codeblock_attributes,
    rustdoc::invalid_html_tags,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::bare_urls
)]
// Clippy lints.
#![warn(
    clippy::correctness,
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]
// Performance is extremely important.
#![deny(clippy::perf)]

pub mod chess;
pub mod engine;
pub mod evaluation;
pub mod search;
