use clap::Parser;
use color_eyre::Result;
use pmfviz::{App, AppConfig, AppEvent, Args, Theme};
use ratatui::DefaultTerminal;
use std::sync::mpsc::channel;
use std::time::Duration;

fn render(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    terminal.draw(|frame| frame.render_widget(app, frame.area()))?;
    Ok(())
}

fn run(mut terminal: DefaultTerminal, args: &Args, config: AppConfig, theme: Theme) -> Result<()> {
    let poll_interval = Duration::from_millis(config.performance.event_poll_interval_ms);
    let (tx, rx) = channel::<AppEvent>();
    let mut app = App::new_with_config(tx.clone(), theme, config);
    if args.debug {
        app.enable_debug();
    }
    if let Some(choice) = args.distribution {
        app.set_distribution_kind(choice.into());
    }
    app.preload(&args.add)?;
    render(&mut terminal, &mut app)?;

    loop {
        if crossterm::event::poll(poll_interval)? {
            match crossterm::event::read()? {
                crossterm::event::Event::Key(key) => tx.send(AppEvent::Key(key))?,
                crossterm::event::Event::Resize(cols, rows) => {
                    tx.send(AppEvent::Resize(cols, rows))?
                }
                _ => {}
            }
        }

        let updated = match rx.recv_timeout(Duration::from_millis(0)) {
            Ok(event) => {
                match event {
                    AppEvent::Exit => break,
                    AppEvent::Crash(msg) => {
                        return Err(color_eyre::eyre::eyre!(msg));
                    }
                    event => {
                        if let Some(event) = app.event(&event) {
                            tx.send(event)?;
                        }
                    }
                }
                true
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => false,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        };

        if updated {
            render(&mut terminal, &mut app)?;
        }
    }
    Ok(())
}

/// Write the chart for `--add` to `--export` without starting the interface.
fn export_headless(args: &Args, config: &AppConfig) -> Result<Option<()>> {
    let Some(ref path) = args.export else {
        return Ok(None);
    };
    let format = pmfviz::resolve_export_format(path, args.export_format)?;
    let mut list = pmfviz::distribution_list(config);
    pmfviz::preload_distributions(&mut list, &args.add)?;
    pmfviz::chart_export::export_chart(path, format, &list.chart_data())?;
    println!(
        "Exported {} distribution(s) to {} ({})",
        list.len(),
        path.display(),
        format.as_str()
    );
    Ok(Some(()))
}

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.generate_config {
        match pmfviz::ConfigManager::new(pmfviz::APP_NAME) {
            Ok(config_manager) => match config_manager.write_default_config(args.force) {
                Ok(path) => {
                    println!("Configuration file written to {}", path.display());
                    return Ok(Some(()));
                }
                Err(e) => {
                    eprintln!("Error writing config file: {}", e);
                    std::process::exit(1);
                }
            },
            Err(e) => {
                eprintln!("Error initializing config manager: {}", e);
                std::process::exit(1);
            }
        }
    }

    if args.clear_cache {
        // Log file name comes from config; fall back to the default name
        let log_file = AppConfig::load(pmfviz::APP_NAME)
            .map(|c| c.logging.file_name)
            .unwrap_or_else(|_| AppConfig::default().logging.file_name);
        match pmfviz::CacheManager::new(pmfviz::APP_NAME) {
            Ok(cache) => {
                match cache.clear_all(&log_file) {
                    Ok(removed) => println!("Cache cleared successfully ({} files)", removed),
                    Err(e) => {
                        eprintln!("Error clearing cache: {}", e);
                        std::process::exit(1);
                    }
                }
                return Ok(Some(()));
            }
            Err(_e) => {
                println!("No cache to clear");
                return Ok(Some(()));
            }
        }
    }

    Ok(None)
}

fn load_config() -> Result<(AppConfig, Theme)> {
    let config = AppConfig::load(pmfviz::APP_NAME)?;
    let palette = config.chart.palette()?;
    let theme = Theme::from_config_with_palette(&config.theme, &palette)?;
    Ok((config, theme))
}

fn init_logging(args: &Args, config: &AppConfig) {
    let env = std::env::var(pmfviz::logging::LOG_ENV).ok();
    let Some(filter) =
        pmfviz::logging::resolve_filter(args.log_level.as_deref(), env.as_deref(), &config.logging)
    else {
        return;
    };
    let dir = match pmfviz::CacheManager::new(pmfviz::APP_NAME) {
        Ok(cache) => cache.cache_dir().to_path_buf(),
        Err(e) => {
            eprintln!("Warning: logging disabled: {}", e);
            return;
        }
    };
    if let Err(e) = pmfviz::logging::init(&filter, &dir, &config.logging.file_name) {
        eprintln!("Warning: logging disabled: {}", e);
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    color_eyre::install()?;

    let (config, theme) = match load_config() {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    init_logging(&args, &config);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "pmfviz starting");

    match export_headless(&args, &config) {
        Ok(Some(())) => return Ok(()),
        Ok(None) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }

    // Reject bad --add specs before taking over the terminal
    if let Err(e) = pmfviz::preload_distributions(&mut pmfviz::distribution_list(&config), &args.add)
    {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let terminal = ratatui::init();
    let result = run(terminal, &args, config, theme);
    ratatui::restore();
    if let Err(e) = result {
        tracing::error!("exited with error: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_requires_known_format() {
        let args = Args::parse_from(["pmfviz", "--add", "poisson:2", "--export", "chart"]);
        let err = export_headless(&args, &AppConfig::default()).unwrap_err();
        assert!(err.to_string().contains("Cannot detect export format"));
    }

    #[test]
    fn no_export_flag_continues_to_tui() {
        let args = Args::parse_from(["pmfviz", "--add", "poisson:2"]);
        assert!(export_headless(&args, &AppConfig::default())
            .unwrap()
            .is_none());
    }
}
