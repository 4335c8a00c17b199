use clap::Args;
use std::path::PathBuf;
use tracing::info;

use songbook::services::SimpleServices;
use songbook::{Insertion, NewSong, Result, SongbookError};

use crate::cli::input::{validate_link, validate_release_date};

#[derive(Args)]
pub struct AddArgs {
    /// Song title
    #[arg(short, long)]
    title: String,

    /// Performing group or artist
    #[arg(short, long)]
    group: String,

    /// Lyrics, verses separated by newlines
    #[arg(short, long, conflicts_with = "lyrics_file")]
    lyrics: Option<String>,

    /// Read lyrics from a text file
    #[arg(long, value_name = "FILE")]
    lyrics_file: Option<PathBuf>,

    /// External link (URL)
    #[arg(long)]
    link: Option<String>,

    /// Release date (YYYY-MM-DD)
    #[arg(short, long)]
    release_date: Option<String>,
}

pub async fn execute(args: AddArgs, services: &SimpleServices) -> Result<()> {
    if args.title.trim().is_empty() || args.group.trim().is_empty() {
        return Err(SongbookError::Validation(
            "Title and group must not be empty".to_string(),
        ));
    }
    if let Some(link) = &args.link {
        validate_link(link)?;
    }
    if let Some(date) = &args.release_date {
        validate_release_date(date)?;
    }

    let lyrics = match (&args.lyrics, &args.lyrics_file) {
        (Some(lyrics), _) => lyrics.clone(),
        (None, Some(path)) => tokio::fs::read_to_string(path).await.map_err(|e| {
            SongbookError::Validation(format!("Cannot read {}: {}", path.display(), e))
        })?,
        (None, None) => String::new(),
    };

    let song = NewSong::new(args.title, args.group)
        .lyrics(lyrics)
        .link(args.link.unwrap_or_default())
        .release_date(args.release_date.unwrap_or_default());

    let service = services.song_service().await?;
    match service.add_song(&song).await? {
        Insertion::Created(id) => {
            info!("Added song {}", id);
            println!("🎵 Added \"{}\" by {} (id {})", song.title, song.group, id);
        }
        Insertion::Duplicate => {
            let existing = service
                .find_by_title_and_group(&song.title, &song.group)
                .await?
                .map(|existing| existing.id.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            println!(
                "⏭️  \"{}\" by {} is already in the catalog (id {}), nothing changed",
                song.title, song.group, existing
            );
        }
    }

    Ok(())
}
