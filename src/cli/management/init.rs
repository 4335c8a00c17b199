use clap::Args;
use tracing::info;

use songbook::services::SimpleServices;
use songbook::{Result, SongFilter};

#[derive(Args)]
pub struct InitArgs {}

pub async fn execute(_args: InitArgs, services: &SimpleServices) -> Result<()> {
    let config = services.config();
    info!("Initializing song catalog at: {}", config.database_path.display());

    let service = services.song_service().await?;
    let songs = service.find_all(&SongFilter::new().page(u32::MAX, 0)).await?;

    println!("🎵 Catalog ready!");
    println!("🗄️  Database: {}", config.database_path.display());
    println!("📊 Songs: {}", songs.len());
    println!("\n📋 Next steps:");
    println!("  1. Run 'songbook add --title <TITLE> --group <GROUP>' to add a song");
    println!("  2. Run 'songbook list' to browse the catalog");

    Ok(())
}
