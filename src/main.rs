fn main() -> anyhow::Result<()> {
    show_listings_lib::run()
}
