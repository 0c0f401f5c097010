fn main() -> anyhow::Result<()> {
    oribi::engine::run_loop(&mut std::io::stdin().lock(), &mut std::io::stdout())
}
