#![allow(dead_code)]

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pmfviz::{App, AppEvent, CacheManager};
use std::sync::mpsc::channel;
use tempfile::TempDir;

/// App with default config and a throwaway cache directory.
pub fn test_app() -> (App, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let (tx, _rx) = channel();
    let app = App::new(tx).with_cache(CacheManager::with_dir(dir.path().to_path_buf()));
    (app, dir)
}

/// Feed an event and every follow-up event it produces, like the main loop does.
pub fn dispatch(app: &mut App, event: AppEvent) {
    let mut next = Some(event);
    while let Some(event) = next {
        next = app.event(&event);
    }
}

pub fn press(app: &mut App, code: KeyCode) {
    dispatch(app, AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)));
}

pub fn ctrl(app: &mut App, c: char) {
    dispatch(
        app,
        AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)),
    );
}

pub fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        press(app, KeyCode::Char(c));
    }
}
