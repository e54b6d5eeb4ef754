//! List the voice messages stored in the library.

use crate::config;
use crate::library::MessageLibrary;
use crate::player::format_time;

/// Prints the library contents, oldest first.
///
/// Unlistened messages are marked with `●` so they are easy to spot, matching
/// the unread indicator in the player footer.
pub async fn handle_list() -> Result<(), anyhow::Error> {
    let mut library = MessageLibrary::new(&config::get_data_dir()?)?;
    let messages = library.get_all_messages()?;

    if messages.is_empty() {
        println!("No voice messages in the library.");
        println!("Import one with: ovmp import <file.wav>");
        return Ok(());
    }

    println!("Voice messages ({}):", messages.len());
    println!();

    for (i, message) in messages.iter().enumerate() {
        let marker = if message.listened { " " } else { "●" };
        println!(
            "{} {:>3}  {}  {:>5}  {}",
            marker,
            i + 1,
            message.created_at.format("%Y-%m-%d %H:%M"),
            format_time(message.duration_secs),
            message.title
        );
    }

    let unread = messages.iter().filter(|m| !m.listened).count();
    if unread > 0 {
        println!();
        println!("{unread} unlistened. Play them with: ovmp play");
    }

    Ok(())
}
