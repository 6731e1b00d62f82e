use anyhow::Result;
use timeline_cli::cli_main;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    cli_main(args)
}
