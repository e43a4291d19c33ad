use bevy::{
    asset::RenderAssetUsages,
    mesh::{Indices, PrimitiveTopology},
    prelude::*,
    window::PrimaryWindow,
};

use crate::mesh::triangulate;
use crate::render::Surface;
use crate::runtime::SimulationClock;
use crate::session::{
    Anchor, ConfettiEffects, CursorLocator, SurfaceError, SurfaceProvider, SurfaceRequest,
};
use crate::settings::Settings;

/// Screen size assumed until a primary window reports its own.
pub const DEFAULT_SCREEN_SIZE: Vec2 = Vec2::new(1280.0, 720.0);

/// Half extent of the bounds baked into every canvas mesh.
const CANVAS_EXTENT: f32 = 16_384.0;

/// A filled polygon recorded by a [`CanvasSurface`], in screen pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct FilledPolygon {
    /// Closed outline.
    pub points: Vec<Vec2>,
    /// Fill color.
    pub color: Srgba,
}

/// [`Surface`] that records the current frame for [`update_confetti_canvas`].
#[derive(Debug, Clone, Default)]
pub struct CanvasSurface {
    size: Vec2,
    polygons: Vec<FilledPolygon>,
}

impl CanvasSurface {
    /// Polygons of the last drawn frame.
    pub fn polygons(&self) -> &[FilledPolygon] {
        &self.polygons
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn clear(&mut self) {
        self.polygons.clear();
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Srgba) {
        self.polygons.push(FilledPolygon {
            points: points.to_vec(),
            color,
        });
    }
}

/// Hands out [`CanvasSurface`]s covering the primary window.
#[derive(Debug, Clone)]
pub struct CanvasSurfaceProvider {
    /// Logical size of the primary window.
    pub screen: Vec2,
}

impl Default for CanvasSurfaceProvider {
    fn default() -> Self {
        Self {
            screen: DEFAULT_SCREEN_SIZE,
        }
    }
}

impl SurfaceProvider for CanvasSurfaceProvider {
    type Surface = CanvasSurface;

    fn screen_size(&self) -> Vec2 {
        self.screen
    }

    fn acquire(&mut self, request: &SurfaceRequest) -> Result<CanvasSurface, SurfaceError> {
        if request.size.x < 1.0 || request.size.y < 1.0 {
            return Err(SurfaceError::Empty {
                width: request.size.x as u32,
                height: request.size.y as u32,
            });
        }
        Ok(CanvasSurface {
            size: request.size,
            polygons: Vec::new(),
        })
    }
}

/// Last known cursor position in the primary window.
#[derive(Debug, Clone, Copy, Default)]
pub struct CursorSnapshot {
    /// Logical pixels from the top-left corner.
    pub position: Option<Vec2>,
}

impl CursorLocator for CursorSnapshot {
    fn cursor_position(&self) -> Option<Vec2> {
        self.position
    }
}

/// Running confetti sessions and the clock that ticks them.
#[derive(Resource)]
pub struct ConfettiRuntime {
    /// Every running session.
    pub effects: ConfettiEffects<CanvasSurfaceProvider, CursorSnapshot>,
    /// Converts frame time into fixed ticks.
    pub clock: SimulationClock,
}

impl ConfettiRuntime {
    /// Creates an idle runtime, seeded when `seed` is set.
    pub fn new(seed: Option<u64>) -> Self {
        let provider = CanvasSurfaceProvider::default();
        let cursor = CursorSnapshot::default();
        let effects = match seed {
            Some(seed) => ConfettiEffects::with_seed(provider, cursor, seed),
            None => ConfettiEffects::new(provider, cursor),
        };
        Self {
            effects,
            clock: SimulationClock::default(),
        }
    }
}

/// Starts a confetti burst when written.
#[derive(Message, Debug, Clone)]
pub struct TriggerConfetti {
    /// Settings snapshot for this burst.
    pub settings: Settings,
    /// Where to start; `None` uses `settings.position`.
    pub anchor: Option<Anchor>,
}

impl TriggerConfetti {
    /// A burst at the configured position.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            anchor: None,
        }
    }

    /// Overrides the anchor.
    pub fn at(mut self, anchor: impl Into<Anchor>) -> Self {
        self.anchor = Some(anchor.into());
        self
    }
}

/// Keeps the surface provider and cursor in sync with the primary window.
pub fn sync_host_window(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut runtime: ResMut<ConfettiRuntime>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let effects = &mut runtime.effects;
    effects.provider_mut().screen = Vec2::new(window.width(), window.height());
    effects.cursor_mut().position = window.cursor_position();
}

/// Starts a session for every [`TriggerConfetti`] written since last frame.
pub fn handle_confetti_triggers(
    mut triggers: MessageReader<TriggerConfetti>,
    mut runtime: ResMut<ConfettiRuntime>,
) {
    for trigger in triggers.read() {
        match trigger.anchor {
            Some(anchor) => runtime.effects.run_effect(&trigger.settings, anchor),
            None => runtime.effects.trigger(&trigger.settings),
        }
    }
}

/// Ticks running sessions at the fixed simulation rate.
pub fn advance_confetti(time: Res<Time>, mut runtime: ResMut<ConfettiRuntime>) {
    let runtime = &mut *runtime;
    let steps = runtime.clock.consume(time.delta());
    if runtime.effects.is_idle() {
        runtime.clock.reset();
        return;
    }
    for _ in 0..steps {
        runtime.effects.tick();
    }
}

/// Marks the entity whose mesh shows every running session.
#[derive(Component, Debug)]
pub struct ConfettiCanvas;

/// Builds one triangle mesh holding the current frame of every session.
///
/// Screen pixels (y down, origin top-left) become world units (y up, origin
/// at the screen center) for a 2D camera at the world origin. Colors are
/// stored per vertex.
pub fn confetti_canvas_mesh(runtime: &ConfettiRuntime) -> Mesh {
    // two unused corners keep the computed bounds covering the whole canvas
    let mut positions = vec![
        [-CANVAS_EXTENT, -CANVAS_EXTENT, 0.0],
        [CANVAS_EXTENT, CANVAS_EXTENT, 0.0],
    ];
    let mut colors = vec![[0.0; 4]; 2];
    let mut indices = Vec::new();
    let mut triangles = Vec::new();

    for session in runtime.effects.sessions() {
        let surface = session.surface();
        let half = surface.size() / 2.0;
        for polygon in surface.polygons() {
            triangulate(&polygon.points, &mut triangles);
            if triangles.is_empty() {
                continue;
            }
            let base = positions.len() as u32;
            let linear = LinearRgba::from(polygon.color);
            let color = [linear.red, linear.green, linear.blue, linear.alpha];
            for p in &polygon.points {
                positions.push([p.x - half.x, half.y - p.y, 0.0]);
                colors.push(color);
            }
            indices.extend(triangles.iter().map(|i| base + i));
        }
    }

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::default(),
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, colors);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}

/// Spawns the [`ConfettiCanvas`] entity.
pub fn setup_confetti_canvas(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    runtime: Res<ConfettiRuntime>,
) {
    commands.spawn((
        ConfettiCanvas,
        Mesh2d(meshes.add(confetti_canvas_mesh(&runtime))),
        MeshMaterial2d(materials.add(ColorMaterial::default())),
        Transform::from_xyz(0.0, 0.0, 100.0),
    ));
}

/// Replaces the canvas mesh with the current frame of every session.
pub fn update_confetti_canvas(
    runtime: Res<ConfettiRuntime>,
    canvases: Query<&Mesh2d, With<ConfettiCanvas>>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    if !runtime.is_changed() {
        return;
    }
    for canvas in &canvases {
        if let Some(mesh) = meshes.get_mut(&canvas.0) {
            *mesh = confetti_canvas_mesh(&runtime);
        }
    }
}

/// Plugin that runs confetti bursts inside a Bevy app.
///
/// Write a [`TriggerConfetti`] message to start a burst.
pub struct ConfettiPlugin {
    /// Draws running sessions as a filled 2D mesh. Requires the render and
    /// 2D mesh plugins. Defaults to `true`.
    pub draw_canvas: bool,
    /// Fixed seed for reproducible bursts. Defaults to `None`.
    pub seed: Option<u64>,
}

impl Default for ConfettiPlugin {
    fn default() -> Self {
        Self {
            draw_canvas: true,
            seed: None,
        }
    }
}

impl Plugin for ConfettiPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<TriggerConfetti>()
            .insert_resource(ConfettiRuntime::new(self.seed))
            .add_systems(
                Update,
                (sync_host_window, handle_confetti_triggers, advance_confetti).chain(),
            );

        if self.draw_canvas {
            app.add_systems(Startup, setup_confetti_canvas)
                .add_systems(Update, update_confetti_canvas.after(advance_confetti));
        }
    }
}
