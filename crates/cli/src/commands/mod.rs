//! `lw-cli` subcommands.

pub mod seed;
