use flipbook_core::*;
use tempfile::tempdir;

#[test]
fn test_defaults_are_valid() {
    let options = ViewerOptions::default();
    assert!(options.validate().is_ok());
    assert!(options.show_cover);
    assert_eq!(options.initial_pages_to_load, 3);
    assert_eq!(options.zoom.initial(), ZoomLevel(150));
    assert_eq!(options.surface.flipping_time_ms, 1200);
    assert_eq!(options.surface.resize_debounce_ms, 100);
}

#[test]
fn test_validate_rejects_bad_values() {
    let cases: Vec<(&str, ViewerOptions)> = vec![
        (
            "initial_pages_to_load",
            ViewerOptions {
                initial_pages_to_load: 0,
                ..Default::default()
            },
        ),
        (
            "max_concurrent_renders",
            ViewerOptions {
                max_concurrent_renders: 0,
                ..Default::default()
            },
        ),
        (
            "cache_capacity",
            ViewerOptions {
                cache_capacity: 0,
                ..Default::default()
            },
        ),
        (
            "Zoom step",
            ViewerOptions {
                zoom: ZoomConfig {
                    step_percent: 0,
                    ..Default::default()
                },
                ..Default::default()
            },
        ),
        (
            "Invalid zoom range",
            ViewerOptions {
                zoom: ZoomConfig {
                    min_percent: 400,
                    ..Default::default()
                },
                ..Default::default()
            },
        ),
        (
            "Initial zoom",
            ViewerOptions {
                zoom: ZoomConfig {
                    initial_percent: 50,
                    ..Default::default()
                },
                ..Default::default()
            },
        ),
        (
            "Viewport ratios",
            ViewerOptions {
                surface: SurfaceOptions {
                    viewport_ratio: 0.99,
                    ..Default::default()
                },
                ..Default::default()
            },
        ),
        (
            "minimum size",
            ViewerOptions {
                surface: SurfaceOptions {
                    min_width: 2000.0,
                    ..Default::default()
                },
                ..Default::default()
            },
        ),
    ];

    for (expected, options) in cases {
        match options.validate() {
            Err(ViewerError::Config(message)) => {
                assert!(message.contains(expected), "{} not in {}", expected, message)
            }
            other => panic!("expected a config error for {}, got {:?}", expected, other),
        }
    }
}

#[test]
fn test_disabled_cache_allows_zero_capacity() {
    let options = ViewerOptions {
        cache_enabled: false,
        cache_capacity: 0,
        ..Default::default()
    };
    assert!(options.validate().is_ok());
}

#[tokio::test]
async fn test_save_and_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("viewer.json");

    let options = ViewerOptions {
        show_cover: false,
        initial_pages_to_load: 5,
        cache_capacity: 16,
        zoom: ZoomConfig {
            initial_percent: 100,
            ..Default::default()
        },
        ..Default::default()
    };
    options.save(&path).await.unwrap();

    let loaded = ViewerOptions::load(&path).await.unwrap();
    assert_eq!(loaded, options);
}

#[tokio::test]
async fn test_partial_config_uses_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("viewer.json");
    std::fs::write(&path, r#"{ "initial_pages_to_load": 6, "zoom": { "step_percent": 10 } }"#)
        .unwrap();

    let loaded = ViewerOptions::load(&path).await.unwrap();
    assert_eq!(loaded.initial_pages_to_load, 6);
    assert_eq!(loaded.zoom.step_percent, 10);
    assert_eq!(loaded.zoom.max_percent, 300);
    assert!(loaded.show_cover);
    assert_eq!(loaded.surface, SurfaceOptions::default());
}

#[tokio::test]
async fn test_load_rejects_malformed_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("viewer.json");
    std::fs::write(&path, "{ not json").unwrap();

    let result = ViewerOptions::load(&path).await;
    assert!(matches!(result, Err(ViewerError::Config(message)) if message.contains("parse")));
}

#[tokio::test]
async fn test_load_validates() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("viewer.json");
    std::fs::write(&path, r#"{ "max_concurrent_renders": 0 }"#).unwrap();

    assert!(matches!(
        ViewerOptions::load(&path).await,
        Err(ViewerError::Config(_))
    ));
}

#[tokio::test]
async fn test_load_missing_file() {
    let dir = tempdir().unwrap();
    let result = ViewerOptions::load(dir.path().join("absent.json")).await;
    assert!(matches!(result, Err(ViewerError::Io(_))));
}
