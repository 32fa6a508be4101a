//! Preview command: render the dashboard once without posting it.

use std::path::Path;

use chrono::{DateTime, Utc};
use raidwatch_core::{Dashboard, DashboardRenderer, Event, classify};
use raidwatch_providers::{EventSource, EventsApiClient};
use raidwatch_render::ImageRenderer;
use tracing::info;

use crate::config::BotConfig;
use crate::error::BotResult;

/// Fetches the schedule, writes the PNG to `output`, and prints the caption.
///
/// Needs no Telegram credentials. Unlike the daemon, a failed fetch is an
/// error here.
pub async fn preview(config: &BotConfig, output: &Path) -> BotResult<()> {
    config.validate(false)?;

    let source = EventsApiClient::new(config.events_api_config()?)?;
    let events = source.fetch_events().await?;

    let dashboard = render(config, &events, Utc::now())?;
    std::fs::write(output, &dashboard.image)?;
    info!(
        path = %output.display(),
        bytes = dashboard.image.len(),
        event_count = events.len(),
        "preview written"
    );

    println!("{}", dashboard.caption);
    Ok(())
}

fn render(config: &BotConfig, events: &[Event], now: DateTime<Utc>) -> BotResult<Dashboard> {
    let renderer = ImageRenderer::new(config.caption_formatter());
    Ok(renderer.render(&classify(events, now), now)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn renders_and_writes_png() {
        let now = Utc.with_ymd_and_hms(2025, 11, 3, 12, 0, 0).unwrap();
        let events = vec![
            Event::new("Matriarch", "Dam", now - Duration::minutes(5), now + Duration::minutes(25)),
            Event::new("Night Raid", "Spaceport", now + Duration::minutes(40), now + Duration::minutes(100)),
        ];

        let dashboard = render(&BotConfig::default(), &events, now).unwrap();
        assert!(dashboard.image.starts_with(&[0x89, b'P', b'N', b'G']));
        assert!(dashboard.caption.contains("Матриарх"));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.png");
        std::fs::write(&path, &dashboard.image).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), dashboard.image);
    }
}
