//! CLI argument definitions using clap
//!
//! Commands:
//! - docshim compile-filter --collection <name> [--filter <json>] [--offset <n>]
//! - docshim compile-update --collection <name> --update <json> [--filter <json>] [--many]
//! - docshim compile-insert --collection <name> [--document <json>]
//! - docshim names [--collection <name>]
//! - docshim count --collection <name> [--filter <json>] [--config <path>]
//! - docshim find --collection <name> [--filter <json>] [--sort <field>] ...
//!
//! JSON arguments that are omitted are read as one line from stdin.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::query::SortOrder;

/// docshim - document-style queries over a relational schema
#[derive(Parser, Debug)]
#[command(name = "docshim")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log level when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Pool configuration source; falls back to the environment
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Path to a JSON pool configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the WHERE predicate and parameters for a filter
    CompileFilter {
        #[arg(long)]
        collection: String,

        /// Filter expression as JSON
        #[arg(long)]
        filter: Option<String>,

        /// Number of the first placeholder, from 1
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        offset: u32,
    },

    /// Print the UPDATE statement for a filter and update expression
    CompileUpdate {
        #[arg(long)]
        collection: String,

        /// Update expression as JSON
        #[arg(long)]
        update: Option<String>,

        #[arg(long, default_value = "{}")]
        filter: String,

        /// Target every matching row instead of the first
        #[arg(long)]
        many: bool,
    },

    /// Print the INSERT statement for a document
    CompileInsert {
        #[arg(long)]
        collection: String,

        /// Document as JSON
        #[arg(long)]
        document: Option<String>,
    },

    /// Report field-name overrides that do not round-trip
    Names {
        /// Limit the report to one collection
        #[arg(long)]
        collection: Option<String>,
    },

    /// Count matching documents
    Count {
        #[arg(long)]
        collection: String,

        #[arg(long)]
        filter: Option<String>,

        #[command(flatten)]
        connection: ConnectionArgs,
    },

    /// List matching documents
    Find {
        #[arg(long)]
        collection: String,

        #[arg(long)]
        filter: Option<String>,

        /// External field name to sort by
        #[arg(long)]
        sort: Option<String>,

        /// asc, desc, 1 or -1
        #[arg(long, default_value = "asc", allow_hyphen_values = true)]
        order: SortOrder,

        #[arg(long, default_value_t = 0)]
        limit: u64,

        #[arg(long, default_value_t = 0)]
        skip: u64,

        /// Print the statement without running it
        #[arg(long)]
        dry_run: bool,

        #[command(flatten)]
        connection: ConnectionArgs,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compile_filter() {
        let cli = Cli::try_parse_from([
            "docshim",
            "compile-filter",
            "--collection",
            "posts",
            "--filter",
            r#"{"isArchived":{"$ne":true}}"#,
            "--offset",
            "3",
        ])
        .unwrap();

        match cli.command {
            Command::CompileFilter {
                collection,
                filter,
                offset,
            } => {
                assert_eq!(collection, "posts");
                assert_eq!(filter.as_deref(), Some(r#"{"isArchived":{"$ne":true}}"#));
                assert_eq!(offset, 3);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_offset_zero_rejected() {
        let result = Cli::try_parse_from([
            "docshim",
            "compile-filter",
            "--collection",
            "posts",
            "--filter",
            "{}",
            "--offset",
            "0",
        ]);
        assert_eq!(result.unwrap_err().kind(), clap::error::ErrorKind::ValueValidation);

        let cli =
            Cli::try_parse_from(["docshim", "compile-filter", "--collection", "posts"]).unwrap();
        assert!(matches!(cli.command, Command::CompileFilter { offset: 1, .. }));
    }

    #[test]
    fn test_parse_find_with_descending_order() {
        let cli = Cli::try_parse_from([
            "docshim", "find", "--collection", "posts", "--sort", "createdAt", "--order", "-1",
            "--limit", "20", "--dry-run",
        ])
        .unwrap();

        match cli.command {
            Command::Find {
                sort,
                order,
                limit,
                skip,
                dry_run,
                connection,
                ..
            } => {
                assert_eq!(sort.as_deref(), Some("createdAt"));
                assert_eq!(order, SortOrder::Descending);
                assert_eq!(limit, 20);
                assert_eq!(skip, 0);
                assert!(dry_run);
                assert!(connection.config.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_log_flags() {
        let cli = Cli::try_parse_from(["docshim", "names", "--json-logs", "--log-level", "debug"])
            .unwrap();
        assert!(cli.json_logs);
        assert_eq!(cli.log_level, "debug");
    }
}
