//! # gallery-index CLI
//!
//! Command-line front-end for the gallery index.
//!
//! ## Usage
//! ```bash
//! gallery-index scan --dir ~/WhatsApp/Images
//! gallery-index albums --output json
//! ```

mod cli;

use contact_gallery::Result;

fn main() -> Result<()> {
    contact_gallery::init_tracing();
    cli::run()
}
