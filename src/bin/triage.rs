use anyhow::Result;

fn main() -> Result<()> {
    triagebox::cli::run()
}
