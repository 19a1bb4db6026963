mod logging;

use std::io::Write;

use anyhow::{Context, Result};

use hyprconfirm::WaylandConnection;

fn main() -> Result<()> {
    let _guard = logging::init_logging()?;

    // Any command-line arguments are ignored; the prompt takes no options.
    let conn = WaylandConnection::new()?;
    let outcome = conn.run()?;

    // The invoking script blocks on this line; flush before exiting so a
    // pipe reader never waits on a buffered token.
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{outcome}").context("failed to write the outcome")?;
    stdout.flush().context("failed to flush stdout")?;
    Ok(())
}
