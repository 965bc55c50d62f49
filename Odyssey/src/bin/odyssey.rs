fn main() -> anyhow::Result<()> {
    odyssey::cli::run_cli()
}
