use std::io::Write;
use std::sync::{Mutex, MutexGuard};

use tagdb::config::Settings;
use tagdb::persist::PersistenceMode;

// Environment variables are process wide, so tests reading them take turns.
static ENV: Mutex<()> = Mutex::new(());

fn env_lock() -> MutexGuard<'static, ()> {
    ENV.lock().unwrap_or_else(|e| e.into_inner())
}

fn write_config(name: &str, contents: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("tagdb_{}_{}.toml", name, std::process::id()));
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "{contents}").unwrap();
    path
}

#[test]
fn missing_file_gives_defaults() {
    let _env = env_lock();
    let settings = Settings::load_from("tagdb_no_such_config_file").expect("settings");
    assert_eq!(settings.port, 8080);
    assert_eq!(settings.database_file, "/tmp/db.sql");
    assert_eq!(settings.persistence_mode(), PersistenceMode::File("/tmp/db.sql".to_string()));
    assert_eq!(settings.address(), format!("{}:8080", settings.host));
}

#[test]
fn file_overrides_defaults() {
    let _env = env_lock();
    let path = write_config("settings", "port = 9090\nin_memory = true\nlog_level = \"debug\"");

    let settings = Settings::load_from(path.to_str().unwrap()).expect("settings");
    assert_eq!(settings.port, 9090);
    assert_eq!(settings.log_level, "debug");
    assert_eq!(settings.persistence_mode(), PersistenceMode::InMemory);
    // Clean up
    let _ = std::fs::remove_file(&path);
}

#[test]
fn environment_overrides_file_and_defaults() {
    let _env = env_lock();
    let path = write_config("env_settings", "port = 9090\nhost = \"127.0.0.1\"");
    unsafe {
        std::env::set_var("TAGDB_PORT", "7070");
        std::env::set_var("TAGDB_IN_MEMORY", "true");
    }
    let settings = Settings::load_from(path.to_str().unwrap());
    unsafe {
        std::env::remove_var("TAGDB_PORT");
        std::env::remove_var("TAGDB_IN_MEMORY");
    }
    let settings = settings.expect("settings");
    assert_eq!(settings.port, 7070);
    assert_eq!(settings.address(), "127.0.0.1:7070");
    assert_eq!(settings.persistence_mode(), PersistenceMode::InMemory);
    assert_eq!(settings.log_level, "info");
    // Clean up
    let _ = std::fs::remove_file(&path);
}

#[test]
fn config_file_is_named_by_the_environment() {
    let _env = env_lock();
    let path = write_config("named_settings", "port = 6060");
    unsafe {
        std::env::set_var("TAGDB_CONFIG", path.to_str().unwrap());
    }
    let settings = Settings::load();
    unsafe {
        std::env::remove_var("TAGDB_CONFIG");
    }
    assert_eq!(settings.expect("settings").port, 6060);
    // Clean up
    let _ = std::fs::remove_file(&path);
}
