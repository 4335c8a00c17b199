use clap::Args;

use songbook::services::SimpleServices;
use songbook::{Result, SongId};

#[derive(Args)]
pub struct DeleteArgs {
    /// Song id
    #[arg(value_name = "ID")]
    id: SongId,
}

pub async fn execute(args: DeleteArgs, services: &SimpleServices) -> Result<()> {
    let service = services.song_service().await?;
    service.delete_song(args.id).await?;
    println!("🗑️  Song {} deleted", args.id);
    Ok(())
}
