use std::path::PathBuf;

use tordie::{
    enable_navigation, enable_select_mode, init_logging, Config, EditSession, HeadlessSurface,
    ListenerKind, PointerEvent, RulerOrientation, Surface, BUILD_DATE, VERSION,
};
use tordie_core::types::shared;

const VIEWPORT_WIDTH: f64 = 1280.0;
const VIEWPORT_HEIGHT: f64 = 800.0;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    init_logging()?;
    tracing::info!("tordie {} (built {})", VERSION, BUILD_DATE);

    let config_path = match std::env::args().nth(1) {
        Some(path) => PathBuf::from(path),
        None => Config::default_path()?,
    };
    let config = Config::load_or_default(&config_path);

    let session = shared(EditSession::from_config(config, VIEWPORT_WIDTH, VIEWPORT_HEIGHT));
    if session.borrow_mut().diagram.seed_if_empty() {
        tracing::info!("Seeded empty diagram with starter geometry");
    }

    let surface = shared(HeadlessSurface::new());
    let dispose_select = enable_select_mode(&surface, &session);
    let dispose_navigation = enable_navigation(&surface, &session);

    // Lasso around the first seed point, then zoom in one notch under the cursor.
    surface.borrow_mut().replay_drag(
        PointerEvent::primary(130.0, 150.0),
        &[PointerEvent::primary(140.0, 160.0), PointerEvent::primary(150.0, 170.0)],
    );
    surface
        .borrow_mut()
        .dispatch(ListenerKind::Wheel, &PointerEvent::wheel(640.0, 400.0, -1.0));

    {
        let session = session.borrow();
        let render = session.render_list();
        let ruler = session.ruler(RulerOrientation::Horizontal);
        tracing::info!(
            "{} selected, {} primitives ({} highlighted), zoom {:.3}, {} ruler ticks",
            session.selection.len(),
            render.len(),
            render.selected_count(),
            session.view.zoom(),
            ruler.ticks.len()
        );
    }

    dispose_navigation();
    dispose_select();
    tracing::info!("{} redraws requested", surface.borrow().redraws());

    Ok(())
}
