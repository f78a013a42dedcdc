use clap::{Args, Subcommand};

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a filter and print the compiled predicate tree
    Validate {
        #[arg(long, default_value = "[]", help = "Filter JSON, or @path to read it from a file")]
        filter: String,
    },

    /// Print the SQL a filter compiles to
    Sql {
        #[arg(long, default_value = "[]", help = "Filter JSON, or @path to read it from a file")]
        filter: String,

        #[arg(long, help = "Restrict to one metric key, as a trend query does")]
        key: Option<String>,

        #[arg(long, default_value = "postgres", help = "SQL dialect: postgres or mysql")]
        dialect: String,
    },

    /// Count the samples a filter matches
    Count {
        #[arg(long, default_value = "[]", help = "Filter JSON, or @path to read it from a file")]
        filter: String,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Build trend series for metric keys
    Trend {
        #[arg(long, default_value = "[]", help = "Filter JSON, or @path to read it from a file")]
        filter: String,

        #[arg(long, help = "JSON array of metric keys, e.g. '[\"percent_gc\"]'")]
        fields: String,

        #[command(flatten)]
        source: SourceArgs,

        #[arg(
            long,
            help = "If specified, writes the plot JSON to this file instead of stdout"
        )]
        output: Option<String>,
    },
}

#[derive(Args)]
pub struct SourceArgs {
    /// PostgreSQL connection URL
    #[arg(long)]
    pub conn: Option<String>,

    /// JSON snapshot to query instead of a database
    #[arg(long, conflicts_with = "conn")]
    pub fixture: Option<String>,
}
