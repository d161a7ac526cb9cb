use bevy::prelude::*;
use painter_core::{
    ClearRequested, ColorKeyTable, LevelBuilderPlugin, LevelLayers, ObjectTemplateRef,
    PaintController, PaintPlugin, PlacedObject, QuickBuildRequested, RasterCanvas, Rgba,
    SaveRequested, ToolKind,
};

fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins(PaintPlugin {
            width: 64,
            height: 64,
            background: Rgba::TRANSPARENT,
            ..Default::default()
        })
        .add_plugins(LevelBuilderPlugin::default())
        .insert_resource(ClearColor(Color::srgb(0.05, 0.05, 0.08)))
        .add_systems(Startup, (setup, paint_demo_pattern))
        .add_systems(Update, (demo_controls, attach_placeholder_meshes))
        .run();
}

fn setup(mut commands: Commands, mut layers: ResMut<LevelLayers>) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(40.0, 50.0, 40.0).looking_at(Vec3::new(32.0, 0.0, -32.0), Vec3::Y),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 10_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(EulerRot::XYZ, -0.9, 0.4, 0.0)),
    ));

    // Colors the quick build resolves when snapshotting the canvas.
    layers.quick_build_table = Some(ColorKeyTable::build(vec![
        (Rgba::BLACK, ObjectTemplateRef::new("wall")),
        (Rgba::opaque(255, 0, 0), ObjectTemplateRef::new("hazard")),
    ]));
}

/// Stroke a simple pattern so the first quick build has something to place.
fn paint_demo_pattern(mut canvas: ResMut<RasterCanvas>, mut controller: ResMut<PaintController>) {
    controller.set_color(canvas.as_mut(), Rgba::BLACK);
    controller.set_tool(ToolKind::Line);
    controller.pointer_click(canvas.as_mut(), Vec2::new(0.1, 0.1));
    controller.pointer_click(canvas.as_mut(), Vec2::new(0.9, 0.9));
    controller.pointer_click(canvas.as_mut(), Vec2::new(0.1, 0.9));
    controller.pointer_click(canvas.as_mut(), Vec2::new(0.9, 0.1));
}

/// B = quick build, S = save the painted texture, C = clear the canvas.
fn demo_controls(
    keys: Res<ButtonInput<KeyCode>>,
    mut quick_builds: MessageWriter<QuickBuildRequested>,
    mut saves: MessageWriter<SaveRequested>,
    mut clears: MessageWriter<ClearRequested>,
) {
    if keys.just_pressed(KeyCode::KeyB) {
        quick_builds.write(QuickBuildRequested);
    }
    if keys.just_pressed(KeyCode::KeyS) {
        saves.write(SaveRequested);
    }
    if keys.just_pressed(KeyCode::KeyC) {
        clears.write(ClearRequested);
    }
}

/// Give freshly placed objects a placeholder cube so the level is visible.
fn attach_placeholder_meshes(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    placed: Query<(Entity, &PlacedObject), Added<PlacedObject>>,
) {
    for (entity, PlacedObject(template)) in &placed {
        let color = match template.id() {
            "wall" => Color::srgb(0.6, 0.6, 0.65),
            "hazard" => Color::srgb(0.85, 0.2, 0.2),
            _ => Color::srgb(1.0, 0.0, 1.0),
        };
        commands.entity(entity).insert((
            Mesh3d(meshes.add(Cuboid::new(0.9, 0.9, 0.9))),
            MeshMaterial3d(materials.add(color)),
        ));
    }
}
