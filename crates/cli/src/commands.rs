use clap::{Args, Subcommand};

#[derive(Args, Debug, Clone)]
pub struct CollectionArgs {
    #[arg(long, help = "JSON file holding an array of rows ({\"id\", \"value\", \"priority\"})")]
    pub rows: String,

    #[arg(
        long,
        default_value = "$key",
        help = "Ordering: \"$key\", \"$priority\" or the name of a child field"
    )]
    pub order_by: String,

    #[arg(long, default_value_t = 10, help = "Page size")]
    pub max: usize,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve the boundary row of one or more offsets
    Resolve {
        #[command(flatten)]
        collection: CollectionArgs,

        #[arg(long = "offset", required = true, num_args = 1.., help = "Offsets to resolve, in order")]
        offsets: Vec<usize>,
    },
    /// Follow one offset while a change script mutates the rows
    Watch {
        #[command(flatten)]
        collection: CollectionArgs,

        #[arg(long)]
        offset: usize,

        #[arg(long, help = "JSON file holding an array of changes to apply")]
        changes: Option<String>,

        #[arg(long, default_value_t = 250, help = "Delay between changes, in milliseconds")]
        interval_ms: u64,
    },
}
