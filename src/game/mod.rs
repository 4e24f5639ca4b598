//! The ship demo itself: one camera, one light, one ship turned by the keyboard.

use glam::Vec3;
use log::info;

use crate::app::{Application, FrameEvent, KeyboardEvent, MouseMotionEvent, Root};
use crate::core::{Color, LightType, NodeId, ShadowTechnique, TransformSpace};
use crate::error::Result;

pub mod input;
pub mod ship;

pub use input::{InputFlags, KeyOutcome, ShipKey};
pub use ship::{Ship, ShipKind, ShipProfile};

pub const TITLE: &str = "ShipGame";

/// Where both the camera and the light sit, looking at the ship from the side.
const EYE: Vec3 = Vec3::new(-50.0, 0.0, 0.0);

pub struct ShipGame {
    flags: InputFlags,
    ship: Ship,
    camera_node: NodeId,
    light_node: NodeId,
}

impl ShipGame {
    /// Builds the scene with a specific ship, optionally swapping its mesh.
    pub fn setup_with(root: &mut Root, kind: ShipKind, mesh: Option<&str>) -> Result<Self> {
        let scene = root.scene_manager_mut();

        let camera_node = scene.create_child_scene_node(scene.root_scene_node());
        let cam = scene.create_camera("myCam");
        scene.set_position(camera_node, EYE);
        scene.look_at(camera_node, Vec3::ZERO, TransformSpace::World);
        scene.roll(camera_node, -90.0);
        scene.camera_mut(cam).set_near_clip_distance(5.0);
        scene.attach_object(camera_node, cam);

        let viewport = root.add_viewport(cam);
        viewport.set_background_colour(Color::BLACK);
        let aspect = viewport.aspect_ratio();

        let scene = root.scene_manager_mut();
        let ship = Ship::spawn(scene, kind, mesh)?;
        scene.camera_mut(cam).set_aspect_ratio(aspect);

        scene.set_ambient_light(Color::BLACK);
        scene.set_shadow_technique(ShadowTechnique::StencilAdditive);

        let sun = scene.create_light("Sun");
        {
            let light = scene.light_mut(sun);
            light.set_diffuse_colour(1.0, 1.0, 1.0);
            light.set_specular_colour(1.0, 1.0, 1.0);
            light.set_type(LightType::Point);
        }
        let light_node = scene.create_child_scene_node(scene.root_scene_node());
        scene.attach_object(light_node, sun);
        scene.set_position(light_node, EYE);

        info!(
            "scene ready: {} nodes, ship mesh {}",
            scene.node_count(),
            mesh.unwrap_or(ship.profile().mesh)
        );

        Ok(Self {
            flags: InputFlags::new(),
            ship,
            camera_node,
            light_node,
        })
    }

    pub fn ship(&self) -> &Ship {
        &self.ship
    }

    pub fn flags(&self) -> &InputFlags {
        &self.flags
    }

    pub fn camera_node(&self) -> NodeId {
        self.camera_node
    }

    pub fn light_node(&self) -> NodeId {
        self.light_node
    }
}

impl Application for ShipGame {
    fn setup(root: &mut Root) -> Result<Self> {
        Self::setup_with(root, ShipKind::Default, None)
    }

    fn key_pressed(&mut self, root: &mut Root, evt: &KeyboardEvent) {
        if self.flags.on_key_down(evt.keycode) == KeyOutcome::Quit {
            root.queue_end_rendering();
        }
    }

    fn key_released(&mut self, root: &mut Root, evt: &KeyboardEvent) {
        if self.flags.on_key_up(evt.keycode) == KeyOutcome::Quit {
            root.queue_end_rendering();
        }
    }

    fn mouse_moved(&mut self, _root: &mut Root, evt: &MouseMotionEvent) {
        info!("{}|{}", evt.x, evt.y);
    }

    fn frame_rendered(&mut self, root: &mut Root, evt: &FrameEvent) {
        self.ship
            .apply_input(root.scene_manager_mut(), &self.flags, evt.time_since_last_frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{ApplicationContext, InputEvent, Keycode};
    use crate::logging::capture;
    use crate::renderers::HeadlessBackend;
    use glam::Quat;
    use log::Level;

    const EPS: f32 = 1e-4;

    fn run(backend: HeadlessBackend) -> (ApplicationContext<HeadlessBackend>, ShipGame) {
        let mut ctx = ApplicationContext::init_app(TITLE, backend, Vec::new()).unwrap();
        let mut game = ShipGame::setup(ctx.root_mut()).unwrap();
        ctx.start_rendering(&mut game).unwrap();
        (ctx, game)
    }

    fn ship_orientation(ctx: &ApplicationContext<HeadlessBackend>, game: &ShipGame) -> Quat {
        ctx.root()
            .scene_manager()
            .node(game.ship().node())
            .orientation()
    }

    #[test]
    fn setup_builds_the_scene() {
        let mut ctx =
            ApplicationContext::init_app(TITLE, HeadlessBackend::new(64, 48), Vec::new()).unwrap();
        let game = ShipGame::setup(ctx.root_mut()).unwrap();
        let root = ctx.root();
        let scene = root.scene_manager();

        assert_eq!(scene.ambient_light(), Color::BLACK);
        assert_eq!(scene.shadow_technique(), ShadowTechnique::StencilAdditive);
        assert_eq!(scene.derived_position(game.camera_node()), EYE);
        assert_eq!(scene.derived_position(game.light_node()), EYE);

        // camera looks down +X at the origin
        let forward = scene.derived_orientation(game.camera_node()) * Vec3::NEG_Z;
        assert!(forward.abs_diff_eq(Vec3::X, EPS));

        let vp = root.viewport().unwrap();
        assert_eq!(vp.background_colour(), Color::BLACK);
        let cam = scene.camera(vp.camera());
        assert_eq!(cam.near, 5.0);
        assert!((cam.aspect_ratio - 64.0 / 48.0).abs() < EPS);

        let lights = scene.world_lights();
        assert_eq!(lights.len(), 1);
        assert_eq!(lights[0].light.name, "Sun");
        assert_eq!(lights[0].light.specular, Color::WHITE);

        assert!(!game.flags().is_held(ShipKey::RotateLeft));
        assert_eq!(scene.node(game.ship().node()).orientation(), Quat::IDENTITY);
    }

    #[test]
    fn ship_is_visible_in_the_first_frame() {
        let (ctx, _) = run(HeadlessBackend::new(64, 48).with_frame_limit(1));
        let frame = ctx.backend().last_frame().unwrap();
        assert!(frame.data.iter().any(|p| *p != 0));
    }

    #[test]
    fn holding_w_for_half_a_second_rolls_two_and_a_half_degrees() {
        // 30 frames held at 60fps, then 30 released
        let backend = HeadlessBackend::new(32, 24)
            .with_frame_limit(60)
            .with_event(0, InputEvent::key_down('w'))
            .with_event(30, InputEvent::key_up('w'));
        let (ctx, game) = run(backend);

        let expected = Quat::from_rotation_z(2.5_f32.to_radians());
        assert!(ship_orientation(&ctx, &game).abs_diff_eq(expected, EPS));
        assert!(!game.flags().is_held(ShipKey::RotateUp));
    }

    #[test]
    fn holding_a_yaws_about_y() {
        let backend = HeadlessBackend::new(32, 24)
            .with_frame_limit(60)
            .with_event(0, InputEvent::key_down('a'))
            .with_event(30, InputEvent::key_up('a'));
        let (ctx, game) = run(backend);

        let expected = Quat::from_rotation_y(2.5_f32.to_radians());
        assert!(ship_orientation(&ctx, &game).abs_diff_eq(expected, EPS));
    }

    #[test]
    fn thrust_and_unknown_keys_do_nothing() {
        let backend = HeadlessBackend::new(32, 24)
            .with_frame_limit(20)
            .with_event(0, InputEvent::key_down('q'))
            .with_event(0, InputEvent::key_down('e'))
            .with_event(0, InputEvent::key_down('x'));
        let (ctx, game) = run(backend);
        assert!(game.flags().is_held(ShipKey::PrimaryThrust));
        assert!(game.flags().is_held(ShipKey::SecondaryThrust));
        assert_eq!(ship_orientation(&ctx, &game), Quat::IDENTITY);
    }

    #[test]
    fn escape_stops_the_loop() {
        let backend = HeadlessBackend::new(32, 24)
            .with_frame_limit(600)
            .with_event(3, InputEvent::KeyDown(KeyboardEvent {
                keycode: Keycode::Escape,
            }));
        let (ctx, _) = run(backend);
        assert_eq!(ctx.backend().frames_presented(), 3);
        assert!(ctx.root().end_requested());
    }

    #[test]
    fn mouse_motion_is_logged_at_the_default_level() {
        capture::install();
        let backend = HeadlessBackend::new(16, 16)
            .with_frame_limit(2)
            .with_event(1, InputEvent::MouseMoved(MouseMotionEvent { x: 123, y: 45 }));
        let (ctx, game) = run(backend);

        assert!(capture::find(Level::Info, "123|45").is_some());
        assert_eq!(ship_orientation(&ctx, &game), Quat::IDENTITY);
    }

    #[test]
    fn mesh_override_is_used() {
        let mut ctx =
            ApplicationContext::init_app(TITLE, HeadlessBackend::new(8, 8), Vec::new()).unwrap();
        ShipGame::setup_with(ctx.root_mut(), ShipKind::Default, Some("cube.mesh")).unwrap();
        let renderables = ctx.root().scene_manager().renderables();
        assert_eq!(renderables[0].0.mesh.name, "cube.mesh");
    }
}
