use clap::Args;

use songbook::services::SimpleServices;
use songbook::{Result, SongId, SongPatch, SongbookError};

use crate::cli::input::{validate_link, validate_release_date};

#[derive(Args)]
pub struct UpdateArgs {
    /// Song id
    #[arg(value_name = "ID")]
    id: SongId,

    /// Replace the lyrics
    #[arg(short, long, conflicts_with = "clear_lyrics")]
    lyrics: Option<String>,

    /// Replace the link
    #[arg(long, conflicts_with = "clear_link")]
    link: Option<String>,

    /// Replace the release date (YYYY-MM-DD)
    #[arg(short, long, conflicts_with = "clear_release_date")]
    release_date: Option<String>,

    /// Clear the stored lyrics
    #[arg(long)]
    clear_lyrics: bool,

    /// Clear the stored link
    #[arg(long)]
    clear_link: bool,

    /// Clear the stored release date
    #[arg(long)]
    clear_release_date: bool,
}

impl UpdateArgs {
    fn patch(&self) -> Result<SongPatch> {
        if let Some(link) = self.link.as_deref().filter(|link| !link.is_empty()) {
            validate_link(link)?;
        }
        if let Some(date) = self.release_date.as_deref().filter(|date| !date.is_empty()) {
            validate_release_date(date)?;
        }

        // An empty value on the command line keeps the stored one; clearing
        // takes the explicit --clear-* flag.
        let mut patch = SongPatch::new(self.id);
        patch.lyrics = field(&self.lyrics, self.clear_lyrics);
        patch.link = field(&self.link, self.clear_link);
        patch.release_date = field(&self.release_date, self.clear_release_date);
        Ok(patch)
    }
}

fn field(value: &Option<String>, clear: bool) -> Option<String> {
    if clear {
        return Some(String::new());
    }
    value.clone().filter(|value| !value.is_empty())
}

pub async fn execute(args: UpdateArgs, services: &SimpleServices) -> Result<()> {
    let patch = args.patch()?;
    if patch.is_empty() {
        return Err(SongbookError::Validation(
            "Nothing to update: pass --lyrics, --link, --release-date or a --clear-* flag"
                .to_string(),
        ));
    }

    let service = services.song_service().await?;
    service.update_song(&patch).await?;
    println!("✅ Song {} updated", args.id);
    Ok(())
}
