fn main() -> anyhow::Result<()> {
    recall_cli::run()
}
