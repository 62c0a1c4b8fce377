//! # image-sweep CLI
//!
//! Command-line interface for the image reconciliation engine.
//!
//! ## Usage
//! ```bash
//! image-sweep sweep --dir /srv/uploads --refs /tmp/docs.json
//! image-sweep sweep --config sweep.json --dry-run=false
//! ```

mod cli;

use image_sweeper::Result;

fn main() -> Result<()> {
    cli::run()
}
