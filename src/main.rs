fn main() -> anyhow::Result<()> {
    meeting_scrape_lib::run()
}
