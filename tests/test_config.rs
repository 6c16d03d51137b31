use std::path::PathBuf;

use rawhttp::config::{CONFIG_ENV, Config};

#[test]
fn test_config_defaults() {
    let cfg = Config::default();

    assert_eq!(cfg.port, 8888);
    assert_eq!(cfg.read_buffer_size, 1024);
    assert_eq!(cfg.assets_dir, PathBuf::from("assets"));
    assert_eq!(cfg.upstream_url, "http://httpbin.org");
    assert_eq!(cfg.proxy_chunk_size, 32);
    assert_eq!(cfg.upstream_timeout_secs, 5);
}

#[test]
fn test_config_from_yaml_partial() {
    let cfg = Config::from_yaml_str("port: 3000\nassets_dir: /srv/assets\n").unwrap();

    assert_eq!(cfg.port, 3000);
    assert_eq!(cfg.assets_dir, PathBuf::from("/srv/assets"));
    assert_eq!(cfg.read_buffer_size, 1024);
}

#[test]
fn test_config_from_yaml_full() {
    let yaml = r#"
port: 9000
read_buffer_size: 4096
assets_dir: media
upstream_url: "http://127.0.0.1:8080"
proxy_chunk_size: 1024
upstream_timeout_secs: 2
"#;
    let cfg = Config::from_yaml_str(yaml).unwrap();

    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.read_buffer_size, 4096);
    assert_eq!(cfg.upstream_url, "http://127.0.0.1:8080");
    assert_eq!(cfg.proxy_chunk_size, 1024);
    assert_eq!(cfg.upstream_timeout_secs, 2);
}

#[test]
fn test_config_rejects_bad_values() {
    assert!(Config::from_yaml_str("read_buffer_size: 0\n").is_err());
    assert!(Config::from_yaml_str("proxy_chunk_size: 0\n").is_err());
    assert!(Config::from_yaml_str("upstream_url: not a url\n").is_err());
    assert!(Config::from_yaml_str("upstream_url: https://httpbin.org\n").is_err());
    assert!(Config::from_yaml_str("port: 70000\n").is_err());
}

#[test]
fn test_config_from_file() {
    let path = std::env::temp_dir().join(format!("rawhttp-config-{}.yaml", std::process::id()));
    std::fs::write(&path, "port: 4321\n").unwrap();

    let cfg = Config::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(cfg.port, 4321);
}

#[test]
fn test_config_missing_file() {
    assert!(Config::from_file("/definitely/not/here.yaml").is_err());
}

// Env vars are process wide, so every env-driven case lives in this one test.
#[test]
fn test_config_load_from_env() {
    unsafe {
        std::env::remove_var(CONFIG_ENV);
        std::env::remove_var("PORT");
        std::env::remove_var("ASSETS_DIR");
        std::env::remove_var("UPSTREAM_URL");
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.port, 8888);

    unsafe {
        std::env::set_var("PORT", "3000");
        std::env::set_var("ASSETS_DIR", "/tmp/media");
        std::env::set_var("UPSTREAM_URL", "http://localhost:9999");
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.port, 3000);
    assert_eq!(cfg.assets_dir, PathBuf::from("/tmp/media"));
    assert_eq!(cfg.upstream_url, "http://localhost:9999");

    let path = std::env::temp_dir().join(format!("rawhttp-env-{}.yaml", std::process::id()));
    std::fs::write(&path, "port: 5000\nproxy_chunk_size: 64\n").unwrap();
    unsafe {
        std::env::set_var(CONFIG_ENV, &path);
        std::env::remove_var("PORT");
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.port, 5000);
    assert_eq!(cfg.proxy_chunk_size, 64);

    unsafe {
        std::env::set_var("PORT", "not-a-port");
    }
    assert!(Config::load().is_err());

    unsafe {
        std::env::remove_var(CONFIG_ENV);
        std::env::remove_var("PORT");
        std::env::remove_var("ASSETS_DIR");
        std::env::remove_var("UPSTREAM_URL");
    }
    std::fs::remove_file(&path).unwrap();
}
