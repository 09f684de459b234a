use fpview_assets::{AssetError, TextureRequest, TextureSet};
use fpview_common::Pose;
use fpview_input::{InputEvent, KeyMap};
use fpview_kernel::{MotionStep, Player};
use fpview_map::GridMap;
use fpview_render::{DrawCall, TransformBuilder, draw_calls};
use fpview_scene::{SceneCatalog, SceneConfig, SceneError};

/// Why the scene never left the loading phase.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("texture load failed: {0}")]
    Textures(#[from] AssetError),
    #[error("scene build failed: {0}")]
    Scene(#[from] SceneError),
}

/// Lifecycle phase of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for textures. Input and ticks are ignored.
    Loading,
    /// Catalog built; the player can move and the scene draws.
    Ready,
}

enum LoadState {
    Loading,
    Ready {
        textures: TextureSet,
        catalog: SceneCatalog,
    },
}

/// Orchestrates one viewer session.
///
/// Owns the player pose and intent exclusively. Events are handled one at a
/// time, each to completion.
pub struct FrameController {
    config: SceneConfig,
    map: GridMap,
    motion: MotionStep,
    player: Player,
    transforms: TransformBuilder,
    state: LoadState,
    load_error: Option<LoadError>,
    ticks: u64,
}

impl FrameController {
    /// Set up a session in the loading phase. `width`/`height` size the
    /// initial viewport.
    pub fn new(config: SceneConfig, width: u32, height: u32) -> Result<Self, SceneError> {
        let map = config.grid()?;
        let rates = config.controls.rates;
        let motion = MotionStep::new(rates, config.controls.scheme.policy(&rates));
        let player = Player::new(config.start.pose());
        let transforms = TransformBuilder::new(&config.camera, width, height);

        tracing::info!(
            width = map.width(),
            height = map.height(),
            scheme = motion.policy_name(),
            "frame controller created"
        );

        Ok(Self {
            config,
            map,
            motion,
            player,
            transforms,
            state: LoadState::Loading,
            load_error: None,
            ticks: 0,
        })
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            LoadState::Loading => Phase::Loading,
            LoadState::Ready { .. } => Phase::Ready,
        }
    }

    /// Textures this session needs, for the loader.
    pub fn texture_requests(&self) -> Vec<TextureRequest> {
        self.config.texture_requests()
    }

    /// Key bindings for the input source.
    pub fn keymap(&self) -> KeyMap {
        self.config.keymap()
    }

    /// Deliver the outcome of the texture batch.
    ///
    /// Success builds the catalog and enters [`Phase::Ready`]. Failure keeps
    /// the controller in [`Phase::Loading`] with the error available from
    /// [`load_error`](Self::load_error); there is no retry.
    pub fn on_textures(&mut self, result: Result<TextureSet, AssetError>) {
        if let LoadState::Ready { .. } = self.state {
            tracing::warn!("textures delivered after the scene was built; ignoring");
            return;
        }

        let built = result
            .map_err(LoadError::from)
            .and_then(|textures| {
                let catalog = SceneCatalog::build(&self.config, &self.map, &textures)?;
                Ok((textures, catalog))
            });

        match built {
            Ok((textures, catalog)) => {
                tracing::info!(objects = catalog.len(), "scene ready");
                self.load_error = None;
                self.state = LoadState::Ready { textures, catalog };
            }
            Err(e) => {
                tracing::error!("{e}; staying in loading phase");
                self.load_error = Some(e);
            }
        }
    }

    /// Handle one input event. Ignored while loading.
    pub fn handle(&mut self, event: InputEvent) {
        if self.phase() == Phase::Loading {
            tracing::trace!(?event, "ignored while loading");
            return;
        }

        match event {
            InputEvent::KeyDown(key) => {
                tracing::debug!(?key, "key down");
                self.player.press(key);
            }
            InputEvent::KeyUp(key) => {
                tracing::debug!(?key, "key up");
                self.player.release(key);
            }
            InputEvent::MouseMove { dx } => self.player.look(dx),
            InputEvent::Tick { elapsed_ms } => {
                self.player.advance(&self.motion, elapsed_ms, &self.map);
                self.ticks += 1;
            }
        }
    }

    /// Release every held key, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.player.clear_intent();
    }

    /// Draw list for the current pose. Empty while loading.
    pub fn draw_calls(&self) -> Vec<DrawCall> {
        match &self.state {
            LoadState::Loading => Vec::new(),
            LoadState::Ready { catalog, .. } => {
                draw_calls(&self.transforms, &self.player.pose(), catalog)
            }
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.transforms.set_viewport(width, height);
    }

    pub fn pose(&self) -> Pose {
        self.player.pose()
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn map(&self) -> &GridMap {
        &self.map
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn transforms(&self) -> &TransformBuilder {
        &self.transforms
    }

    pub fn catalog(&self) -> Option<&SceneCatalog> {
        match &self.state {
            LoadState::Loading => None,
            LoadState::Ready { catalog, .. } => Some(catalog),
        }
    }

    pub fn textures(&self) -> Option<&TextureSet> {
        match &self.state {
            LoadState::Loading => None,
            LoadState::Ready { textures, .. } => Some(textures),
        }
    }

    pub fn load_error(&self) -> Option<&LoadError> {
        self.load_error.as_ref()
    }

    /// Ticks processed since the scene became ready.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fpview_assets::{SolidTextureLoader, load_batch};
    use fpview_common::Key;
    use glam::Vec2;
    use std::f32::consts::PI;

    fn ready(config: SceneConfig) -> FrameController {
        let mut c = FrameController::new(config, 800, 600).unwrap();
        let textures = load_batch(&SolidTextureLoader::new(), &c.texture_requests());
        c.on_textures(textures);
        assert_eq!(c.phase(), Phase::Ready);
        c
    }

    fn open_scene(start: &str) -> SceneConfig {
        let rows = vec!["'........'"; 8].join(", ");
        SceneConfig::from_yaml(&format!("map: [{rows}]\nstart: {start}\ntextures: {{}}\n"))
            .unwrap()
    }

    #[test]
    fn starts_loading_with_no_draws() {
        let c = FrameController::new(SceneConfig::builtin().unwrap(), 800, 600).unwrap();
        assert_eq!(c.phase(), Phase::Loading);
        assert!(c.catalog().is_none());
        assert!(c.draw_calls().is_empty());
        assert!(c.load_error().is_none());
    }

    #[test]
    fn successful_load_builds_catalog() {
        let c = ready(SceneConfig::builtin().unwrap());
        assert_eq!(c.catalog().unwrap().len(), 31);
        assert_eq!(c.textures().unwrap().len(), 2);
        assert_eq!(c.draw_calls().len(), 31);
    }

    #[test]
    fn shipped_textures_load() {
        let mut c = FrameController::new(SceneConfig::builtin().unwrap(), 800, 600).unwrap();
        let root = concat!(env!("CARGO_MANIFEST_DIR"), "/../../assets");
        let loader = fpview_assets::PngTextureLoader::new(root);
        c.on_textures(load_batch(&loader, &c.texture_requests()));
        assert_eq!(c.phase(), Phase::Ready);
        let textures = c.textures().unwrap();
        let tree = textures.get(textures.id("tree").unwrap()).unwrap();
        assert_eq!((tree.width, tree.height), (64, 64));
        // Corner texel is transparent so the billboard cutout shows.
        assert_eq!(tree.rgba[3], 0);
    }

    #[test]
    fn partial_texture_failure_stays_loading() {
        let mut c = FrameController::new(SceneConfig::builtin().unwrap(), 800, 600).unwrap();
        let loader = SolidTextureLoader::new().failing("tree");
        c.on_textures(load_batch(&loader, &c.texture_requests()));

        assert_eq!(c.phase(), Phase::Loading);
        assert!(c.catalog().is_none());
        assert!(c.draw_calls().is_empty());
        assert!(matches!(c.load_error(), Some(LoadError::Textures(_))));

        // Still inert afterwards: no retry, input ignored.
        let before = c.pose();
        c.handle(InputEvent::KeyDown(Key::Forward));
        c.handle(InputEvent::Tick { elapsed_ms: 100.0 });
        assert_eq!(c.pose(), before);
        assert_eq!(c.ticks(), 0);
    }

    #[test]
    fn textures_missing_a_name_fail_catalog_build() {
        let mut c = FrameController::new(SceneConfig::builtin().unwrap(), 800, 600).unwrap();
        c.on_textures(Ok(TextureSet::default()));
        assert_eq!(c.phase(), Phase::Loading);
        assert!(matches!(c.load_error(), Some(LoadError::Scene(_))));
    }

    #[test]
    fn second_texture_delivery_is_ignored() {
        let mut c = ready(SceneConfig::builtin().unwrap());
        c.on_textures(Err(AssetError::Missing("wall".into())));
        assert_eq!(c.phase(), Phase::Ready);
        assert!(c.load_error().is_none());
        assert_eq!(c.catalog().unwrap().len(), 31);
    }

    #[test]
    fn key_events_drive_ticks() {
        let mut c = ready(open_scene("{ x: 2.5, y: 2.5 }"));
        c.handle(InputEvent::KeyDown(Key::Forward));
        c.handle(InputEvent::Tick { elapsed_ms: 200.0 });
        assert!(c.pose().position.abs_diff_eq(Vec2::new(3.0, 2.5), 1e-5));

        c.handle(InputEvent::KeyUp(Key::Forward));
        c.handle(InputEvent::Tick { elapsed_ms: 200.0 });
        assert!(c.pose().position.abs_diff_eq(Vec2::new(3.0, 2.5), 1e-5));
        assert_eq!(c.ticks(), 2);
    }

    #[test]
    fn corner_scenario_keeps_x_exactly() {
        let mut c = ready(open_scene("{ x: 0.5, y: 0.5, facing_degrees: 180 }"));
        c.handle(InputEvent::KeyDown(Key::Forward));
        c.handle(InputEvent::Tick { elapsed_ms: 400.0 });
        assert_eq!(c.pose().position.x, 0.5);
        assert!((c.pose().position.y - 0.5).abs() < 1e-5);
        assert!((c.pose().facing - PI).abs() < 1e-6);
    }

    #[test]
    fn mouse_delta_is_consumed_by_one_tick() {
        let mut c = ready(open_scene("{ x: 2.5, y: 2.5 }"));
        c.handle(InputEvent::MouseMove { dx: 10.0 });
        c.handle(InputEvent::MouseMove { dx: 10.0 });
        c.handle(InputEvent::Tick { elapsed_ms: 16.0 });
        let turned = c.pose().facing;
        assert!((turned + 20.0 * 0.003).abs() < 1e-6);
        c.handle(InputEvent::Tick { elapsed_ms: 16.0 });
        assert_eq!(c.pose().facing, turned);
    }

    #[test]
    fn release_all_stops_motion() {
        let mut c = ready(open_scene("{ x: 2.5, y: 2.5 }"));
        c.handle(InputEvent::KeyDown(Key::Forward));
        c.release_all();
        c.handle(InputEvent::Tick { elapsed_ms: 100.0 });
        assert_eq!(c.pose().position, Vec2::new(2.5, 2.5));
    }

    #[test]
    fn walls_stop_the_player() {
        let mut c = ready(SceneConfig::builtin().unwrap());
        c.handle(InputEvent::MouseMove {
            dx: (45.0_f32 + 90.0).to_radians() / 0.003,
        });
        c.handle(InputEvent::KeyDown(Key::Forward));
        for _ in 0..50 {
            c.handle(InputEvent::Tick { elapsed_ms: 16.0 });
        }
        // Facing -Y from (1.5, 1.5): the top border wall holds y inside row 1.
        let pose = c.pose();
        assert!(pose.position.y >= 1.0 && pose.position.y < 2.0);
        assert!((pose.position.x - 1.5).abs() < 1e-3);
    }

    #[test]
    fn resize_changes_projection() {
        let mut c = ready(SceneConfig::builtin().unwrap());
        let before = c.draw_calls()[0].uniforms.projection;
        c.resize(400, 400);
        assert_eq!(c.transforms().projection.aspect, 1.0);
        assert_ne!(c.draw_calls()[0].uniforms.projection, before);
    }
}
