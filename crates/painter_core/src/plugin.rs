//! Bevy integration: plugins, messages, and the entity-spawning factory.
//!
//! The original tool surface (tool buttons, color palette, save and clear
//! buttons, pointer raycasts) lives outside the core; it talks to the core
//! exclusively through the messages below. Notifications flow back out the
//! same way, so subscribers never outlive the message registry.

use bevy::prelude::*;
use std::path::PathBuf;

use crate::assembler::{LevelAssembler, ObjectFactory, RebuildReport};
use crate::canvas::RasterCanvas;
use crate::color::Rgba;
use crate::color_key::ObjectTemplateRef;
use crate::layer::{LayerDescriptor, LevelLayers};
use crate::tool::{PaintController, ToolKind};

/// Name given to layers appended by a quick build.
pub const QUICK_LAYER_NAME: &str = "QuickLayer";

/// Label for the canvas and tool systems.
///
/// Systems that read the canvas buffer (the rebuild flow in particular)
/// schedule after this set, so a frame's draw operations are applied
/// before any snapshot of the buffer is taken.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PaintSet;

// ---------------------------------------------------------------------------
// Messages in (commands from the UI / input layer)
// ---------------------------------------------------------------------------

/// Switch the active paint tool.
#[derive(Message)]
pub struct SetToolCommand(pub ToolKind);

/// Set the active draw color.
#[derive(Message)]
pub struct SetColorCommand(pub Rgba);

/// A discrete click on the canvas at a normalized coordinate.
#[derive(Message)]
pub struct PointerClick(pub Vec2);

/// Continuous pointer movement with the button held.
#[derive(Message)]
pub struct PointerDrag(pub Vec2);

/// Abandon a pending line gesture.
#[derive(Message)]
pub struct CancelLine;

/// Save the canvas to the configured directory.
#[derive(Message)]
pub struct SaveRequested;

/// Reset the canvas to its background color.
#[derive(Message)]
pub struct ClearRequested;

/// Rebuild the level from the configured layer list.
#[derive(Message)]
pub struct RebuildRequested;

/// Snapshot the canvas as a quick-build layer and rebuild.
#[derive(Message)]
pub struct QuickBuildRequested;

// ---------------------------------------------------------------------------
// Messages out (notifications for the UI)
// ---------------------------------------------------------------------------

/// The active tool changed.
#[derive(Message)]
pub struct ToolChanged(pub ToolKind);

/// The active draw color changed.
#[derive(Message)]
pub struct ColorChanged(pub Rgba);

/// A painted texture was written to disk.
#[derive(Message)]
pub struct TextureSaved(pub PathBuf);

/// A level rebuild completed.
#[derive(Message)]
pub struct LevelRebuilt(pub RebuildReport);

// ---------------------------------------------------------------------------
// Components and resources
// ---------------------------------------------------------------------------

/// Marks an entity placed by the assembler and names its template.
///
/// The application decides how a template looks; the core only records
/// what was placed where.
#[derive(Component)]
pub struct PlacedObject(pub ObjectTemplateRef);

/// Directory painted textures are saved into.
#[derive(Resource)]
pub struct SaveDirectory(pub PathBuf);

// ---------------------------------------------------------------------------
// Entity factory
// ---------------------------------------------------------------------------

/// `ObjectFactory` over Bevy `Commands`.
///
/// Containers get a name and an identity transform; placed objects get
/// their transform, a `PlacedObject` marker, and `ChildOf` parenting.
pub struct EntityFactory<'a, 'w, 's> {
    commands: &'a mut Commands<'w, 's>,
}

impl<'a, 'w, 's> EntityFactory<'a, 'w, 's> {
    /// Wrap a `Commands` for one rebuild.
    pub fn new(commands: &'a mut Commands<'w, 's>) -> Self {
        Self { commands }
    }
}

impl ObjectFactory for EntityFactory<'_, '_, '_> {
    type Handle = Entity;

    fn spawn_container(&mut self, name: &str, parent: Option<Entity>) -> Entity {
        let mut entity = self.commands.spawn((
            Name::new(name.to_string()),
            Transform::IDENTITY,
            Visibility::default(),
        ));
        if let Some(parent) = parent {
            entity.insert(ChildOf(parent));
        }
        entity.id()
    }

    fn spawn_object(
        &mut self,
        template: &ObjectTemplateRef,
        position: Vec3,
        rotation: Quat,
        parent: Entity,
    ) -> Entity {
        self.commands
            .spawn((
                Name::new(template.id().to_string()),
                Transform::from_translation(position).with_rotation(rotation),
                Visibility::default(),
                PlacedObject(template.clone()),
                ChildOf(parent),
            ))
            .id()
    }

    fn set_rotation(&mut self, handle: Entity, rotation: Quat) {
        // Containers sit at the origin, so replacing the whole transform
        // only changes the rotation.
        self.commands
            .entity(handle)
            .insert(Transform::from_rotation(rotation));
    }

    fn despawn(&mut self, handle: Entity) {
        self.commands.entity(handle).despawn();
    }
}

// ---------------------------------------------------------------------------
// Plugins
// ---------------------------------------------------------------------------

/// Installs the paint canvas, the tool controller, and their message flow.
pub struct PaintPlugin {
    /// Canvas width in pixels.
    pub width: usize,
    /// Canvas height in pixels.
    pub height: usize,
    /// Background (and eraser) color.
    pub background: Rgba,
    /// Directory saved textures are written into.
    pub save_dir: PathBuf,
}

impl Default for PaintPlugin {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            background: Rgba::WHITE,
            save_dir: PathBuf::from("SavedImages"),
        }
    }
}

impl Plugin for PaintPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(RasterCanvas::new(self.width, self.height, self.background))
            .init_resource::<PaintController>()
            .insert_resource(SaveDirectory(self.save_dir.clone()))
            .add_message::<SetToolCommand>()
            .add_message::<SetColorCommand>()
            .add_message::<PointerClick>()
            .add_message::<PointerDrag>()
            .add_message::<CancelLine>()
            .add_message::<SaveRequested>()
            .add_message::<ClearRequested>()
            .add_message::<ToolChanged>()
            .add_message::<ColorChanged>()
            .add_message::<TextureSaved>()
            .add_systems(
                Update,
                (
                    apply_tool_commands,
                    apply_color_commands,
                    apply_pointer_input,
                    apply_canvas_commands,
                )
                    .chain()
                    .in_set(PaintSet),
            );
    }
}

/// Installs the level layer list, the assembler, and the rebuild flow.
pub struct LevelBuilderPlugin {
    /// World-units per pixel on each axis.
    pub grid_spacing: Vec3,
}

impl Default for LevelBuilderPlugin {
    fn default() -> Self {
        Self {
            grid_spacing: Vec3::ONE,
        }
    }
}

impl Plugin for LevelBuilderPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(LevelLayers::new(self.grid_spacing))
            .insert_resource(LevelAssembler::<Entity>::new())
            .add_message::<RebuildRequested>()
            .add_message::<QuickBuildRequested>()
            .add_message::<LevelRebuilt>()
            .add_systems(Update, rebuild_level.after(PaintSet));
    }
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

fn apply_tool_commands(
    mut controller: ResMut<PaintController>,
    mut commands: MessageReader<SetToolCommand>,
    mut changed: MessageWriter<ToolChanged>,
) {
    for SetToolCommand(tool) in commands.read() {
        controller.set_tool(*tool);
        // Notify even when the tool is unchanged so the UI can re-animate
        // the selected button.
        changed.write(ToolChanged(*tool));
    }
}

fn apply_color_commands(
    mut controller: ResMut<PaintController>,
    mut canvas: ResMut<RasterCanvas>,
    mut commands: MessageReader<SetColorCommand>,
    mut tool_changed: MessageWriter<ToolChanged>,
    mut color_changed: MessageWriter<ColorChanged>,
) {
    for SetColorCommand(color) in commands.read() {
        if controller.set_color(canvas.as_mut(), *color) {
            tool_changed.write(ToolChanged(ToolKind::Brush));
        }
        color_changed.write(ColorChanged(*color));
    }
}

fn apply_pointer_input(
    mut controller: ResMut<PaintController>,
    mut canvas: ResMut<RasterCanvas>,
    mut cancels: MessageReader<CancelLine>,
    mut clicks: MessageReader<PointerClick>,
    mut drags: MessageReader<PointerDrag>,
) {
    for CancelLine in cancels.read() {
        controller.cancel_line();
    }
    for PointerClick(uv) in clicks.read() {
        controller.pointer_click(canvas.as_mut(), *uv);
    }
    for PointerDrag(uv) in drags.read() {
        controller.pointer_drag(canvas.as_mut(), *uv);
    }
}

fn apply_canvas_commands(
    mut canvas: ResMut<RasterCanvas>,
    save_dir: Res<SaveDirectory>,
    mut clears: MessageReader<ClearRequested>,
    mut saves: MessageReader<SaveRequested>,
    mut saved: MessageWriter<TextureSaved>,
) {
    for ClearRequested in clears.read() {
        canvas.clear();
    }
    for SaveRequested in saves.read() {
        match canvas.save_timestamped(&save_dir.0) {
            Ok(path) => {
                saved.write(TextureSaved(path));
            }
            Err(e) => error!("failed to save painted texture: {}", e),
        }
    }
}

fn rebuild_level(
    mut commands: Commands,
    mut layers: ResMut<LevelLayers>,
    canvas: Option<Res<RasterCanvas>>,
    mut assembler: ResMut<LevelAssembler<Entity>>,
    mut rebuilds: MessageReader<RebuildRequested>,
    mut quick_builds: MessageReader<QuickBuildRequested>,
    mut rebuilt: MessageWriter<LevelRebuilt>,
) {
    let mut requested = rebuilds.read().count() > 0;

    for QuickBuildRequested in quick_builds.read() {
        let Some(canvas) = canvas.as_ref() else {
            warn!("quick build requested without a paint canvas");
            continue;
        };
        match layers.quick_build_table.clone() {
            Some(table) => {
                let snapshot = canvas.snapshot();
                layers.push(LayerDescriptor::new(QUICK_LAYER_NAME, snapshot, table));
                requested = true;
            }
            None => warn!("quick build requested but no quick-build table is configured"),
        }
    }

    if !requested {
        return;
    }

    let mut factory = EntityFactory::new(&mut commands);
    match assembler.rebuild(&mut factory, &layers.layers, layers.grid_spacing) {
        Ok(report) => {
            rebuilt.write(LevelRebuilt(report));
        }
        Err(e) => error!("level rebuild failed: {}", e),
    }
}
