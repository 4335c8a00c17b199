use clap::{Args, ValueEnum};

use songbook::services::SimpleServices;
use songbook::{Result, Song, SongFilter, SongbookError};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Args)]
pub struct ListArgs {
    /// Title contains (case-insensitive)
    #[arg(short, long)]
    title: Option<String>,

    /// Group contains (case-insensitive)
    #[arg(short, long)]
    group: Option<String>,

    /// Lyrics contain (case-insensitive)
    #[arg(short, long)]
    lyrics: Option<String>,

    /// Link contains (case-insensitive)
    #[arg(long)]
    link: Option<String>,

    /// Exact release date (YYYY-MM-DD)
    #[arg(short, long)]
    release_date: Option<String>,

    /// Maximum number of songs (defaults to the configured page limit)
    #[arg(long)]
    limit: Option<u32>,

    /// Number of matching songs to skip
    #[arg(long, default_value = "0")]
    offset: u32,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
}

impl ListArgs {
    fn filter(&self, default_limit: u32) -> SongFilter {
        SongFilter::new()
            .title(self.title.as_deref().unwrap_or_default())
            .group(self.group.as_deref().unwrap_or_default())
            .lyrics(self.lyrics.as_deref().unwrap_or_default())
            .link(self.link.as_deref().unwrap_or_default())
            .release_date(self.release_date.as_deref().unwrap_or_default())
            .page(self.limit.unwrap_or(default_limit), self.offset)
    }
}

pub async fn execute(args: ListArgs, services: &SimpleServices) -> Result<()> {
    let filter = args.filter(services.config().default_page_limit);
    let service = services.song_service().await?;
    let songs = service.find_all(&filter).await?;

    match args.format {
        OutputFormat::Json => output_json(&songs)?,
        OutputFormat::Table => output_table(&songs),
    }

    Ok(())
}

fn output_json(songs: &[Song]) -> Result<()> {
    let json = serde_json::to_string_pretty(songs)
        .map_err(|e| SongbookError::Internal(e.into()))?;
    println!("{}", json);
    Ok(())
}

fn output_table(songs: &[Song]) {
    if songs.is_empty() {
        println!("No songs found");
        return;
    }

    println!("{:<6} {:<32} {:<24} {:<12} {}", "ID", "Title", "Group", "Released", "Link");
    println!("{}", "-".repeat(96));
    for song in songs {
        println!(
            "{:<6} {:<32} {:<24} {:<12} {}",
            song.id,
            truncate(&song.title, 32),
            truncate(&song.group, 24),
            song.release_date,
            song.link
        );
    }
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        value.to_string()
    } else {
        let mut cut: String = value.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}
