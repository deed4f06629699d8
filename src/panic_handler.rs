//! Panic hook that restores the terminal before reporting, so a crash never
//! leaves the shell in raw mode with a blank alternate screen.

use crossterm::{
    event::DisableMouseCapture,
    execute,
    terminal::{LeaveAlternateScreen, disable_raw_mode},
};

pub fn initialize_panic_handler() {
    std::panic::set_hook(Box::new(move |panic_info| {
        // Best effort: the terminal may not have been initialized yet.
        let _ = disable_raw_mode();
        let _ = execute!(std::io::stderr(), LeaveAlternateScreen, DisableMouseCapture);

        #[cfg(not(debug_assertions))]
        {
            use human_panic::{Metadata, handle_dump, print_msg};
            let meta = Metadata::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
            let file_path = handle_dump(&meta, panic_info);
            let _ = print_msg(file_path, &meta);
        }

        #[cfg(debug_assertions)]
        {
            better_panic::Settings::auto()
                .most_recent_first(false)
                .lineno_suffix(true)
                .create_panic_handler()(panic_info);
        }

        std::process::exit(1);
    }));
}
