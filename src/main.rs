use anyhow::Result;
use nanolang::cli;

fn main() -> Result<()> {
    cli::run()
}
