use clap::Args;

use songbook::core::lyrics::verse_count;
use songbook::services::SimpleServices;
use songbook::{Result, SongId, VerseWindow};

#[derive(Args)]
pub struct TextArgs {
    /// Song id
    #[arg(value_name = "ID")]
    id: SongId,

    /// First verse to show (0-based)
    #[arg(short, long, default_value = "0")]
    start: usize,

    /// Number of verses to show (defaults to the configured verse count)
    #[arg(short, long)]
    count: Option<usize>,

    /// Also print the total number of verses
    #[arg(long)]
    show_total: bool,
}

pub async fn execute(args: TextArgs, services: &SimpleServices) -> Result<()> {
    let window = VerseWindow::new(
        args.start,
        args.count.unwrap_or(services.config().default_verse_count),
    );

    let service = services.song_service().await?;
    let text = service.get_text(args.id, window).await?;

    if text.is_empty() {
        println!("(no verses in this range)");
    } else {
        println!("{}", text);
    }

    if args.show_total {
        let all = service.get_text(args.id, VerseWindow::new(0, usize::MAX)).await?;
        println!("\n📊 {} verse(s) in total", verse_count(&all));
    }

    Ok(())
}
