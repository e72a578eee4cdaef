use tempfile::TempDir;
use tordie::{
    enable_navigation, Config, EditSession, HeadlessSurface, ListenerKind, PointerEvent, Surface,
};
use tordie_core::types::shared;

#[test]
fn test_config_file_drives_session() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(
        &path,
        "[viewport]\ndefault_zoom = 2.0\nwheel_zoom_factor = 2.0\n",
    )
    .unwrap();

    let config = Config::load_or_default(&path);
    assert_eq!(config.viewport.default_zoom, 2.0);

    let session = shared(EditSession::from_config(config, 800.0, 600.0));
    assert_eq!(session.borrow().view.zoom(), 2.0);

    let surface = shared(HeadlessSurface::new());
    let dispose = enable_navigation(&surface, &session);
    surface
        .borrow_mut()
        .dispatch(ListenerKind::Wheel, &PointerEvent::wheel(400.0, 300.0, -1.0));
    assert!((session.borrow().view.zoom() - 4.0).abs() < 1e-12);
    dispose();
}

#[test]
fn test_missing_config_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let config = Config::load_or_default(&dir.path().join("absent.toml"));
    assert_eq!(config, Config::default());
}
