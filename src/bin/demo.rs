//! pagealloc demo
//!
//! Builds an allocator, allocates, writes, reallocates and prints the dump.

use clap::{Parser, Subcommand};
use pagealloc::{classify, Config, PageAllocator};
use tracing_subscriber::{fmt, EnvFilter};

/// pagealloc demo driver
#[derive(Parser, Debug)]
#[command(name = "pagealloc-demo")]
#[command(about = "Exercise the page allocator and print its dump")]
#[command(version)]
struct Args {
    /// Buffer capacity in bytes (rounded up to whole pages)
    #[arg(short, long, default_value = "1024")]
    capacity: usize,

    /// Payload size of the first allocation
    #[arg(short, long, default_value = "24")]
    size: usize,

    /// Bytes written into the first allocation
    #[arg(short, long, value_delimiter = ',', default_values_t = [1u8, 4, 8, 5])]
    data: Vec<u8>,

    /// Payload size the block is reallocated to
    #[arg(short, long, default_value = "48")]
    realloc: usize,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the size class a request would land in
    Classify {
        /// Requested payload size in bytes
        size: usize,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,pagealloc=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let args = Args::parse();

    if let Some(Commands::Classify { size }) = &args.command {
        let class = classify(*size);
        println!("{} -> {} ({} byte blocks)", size, class, class.payload_width());
        return;
    }

    tracing::info!("pagealloc demo v{}", pagealloc::VERSION);

    let config = Config::builder().capacity(args.capacity).build();
    let mut allocator = match PageAllocator::from_config(&config) {
        Ok(a) => a,
        Err(e) => {
            tracing::error!("Failed to create allocator: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Allocator ready: {} bytes in {} pages",
        allocator.capacity(),
        allocator.page_count()
    );

    if let Err(e) = run(&mut allocator, &args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }

    println!("{}", allocator);

    let stats = allocator.stats();
    tracing::info!(
        "Committed pages: {}, live blocks: {}, live bytes: {}",
        stats.committed_pages(),
        stats.live_blocks(),
        stats.live_bytes()
    );
}

fn run(allocator: &mut PageAllocator, args: &Args) -> Result<(), String> {
    let offset = allocator
        .allocate(args.size)
        .ok_or_else(|| format!("No space for a {}-byte allocation", args.size))?;
    tracing::info!("Allocated {} bytes at offset {}", args.size, offset);

    allocator
        .write_payload(offset, &args.data)
        .map_err(|e| e.to_string())?;

    let moved = allocator
        .reallocate(offset, args.realloc)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("No space to reallocate to {} bytes", args.realloc))?;
    tracing::info!("Reallocated offset {} to {} ({} bytes)", offset, moved, args.realloc);

    Ok(())
}
