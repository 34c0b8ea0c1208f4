use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

use campaign_server::Error;

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_span_events(FmtSpan::NEW)
        .compact()
        .init();

    campaign_server::run(true)
}
