fn main() -> anyhow::Result<()> {
    neuroless::run()
}
