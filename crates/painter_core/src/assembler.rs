//! Layered pixel-to-entity placement.
//!
//! `LevelAssembler` clears its previously generated output and, for each
//! configured layer in order, scans the layer's raster and spawns one
//! object per resolved pixel through an `ObjectFactory`. Generated output
//! is tracked as an explicit owned collection of factory handles, so a
//! clear releases handles instead of walking a scene graph.

use bevy::prelude::*;
use std::f32::consts::FRAC_PI_2;

use crate::color_key::ObjectTemplateRef;
use crate::layer::LayerDescriptor;

/// Name of the root container created above all generated layers.
pub const GENERATION_ROOT_NAME: &str = "Level";

/// External collaborator that turns placement decisions into scene objects.
///
/// `despawn` releases a handle and everything parented beneath it.
pub trait ObjectFactory {
    /// Opaque handle to a spawned object or container.
    type Handle: Copy + Send + Sync + 'static;

    /// Create an empty, identity-transform container node.
    fn spawn_container(&mut self, name: &str, parent: Option<Self::Handle>) -> Self::Handle;

    /// Instantiate a template at a position relative to `parent`.
    fn spawn_object(
        &mut self,
        template: &ObjectTemplateRef,
        position: Vec3,
        rotation: Quat,
        parent: Self::Handle,
    ) -> Self::Handle;

    /// Replace the local rotation of a spawned node.
    fn set_rotation(&mut self, handle: Self::Handle, rotation: Quat);

    /// Destroy a spawned node and its children.
    fn despawn(&mut self, handle: Self::Handle);
}

/// Errors that abort a rebuild before anything is cleared or generated.
#[derive(Debug, PartialEq, Eq)]
pub enum AssemblyError {
    /// The configured layer list was empty.
    NoLayers,
}

impl std::fmt::Display for AssemblyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssemblyError::NoLayers => write!(f, "no layers configured"),
        }
    }
}

impl std::error::Error for AssemblyError {}

/// Result type for assembly operations.
pub type AssemblyResult<T> = Result<T, AssemblyError>;

/// Summary of one completed rebuild.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RebuildReport {
    /// Layers that generated a container.
    pub layers_built: usize,
    /// Layers skipped for missing pixels or an empty table.
    pub layers_skipped: usize,
    /// Objects instantiated across all layers.
    pub objects_placed: usize,
}

/// Owned collection of handles produced by the last rebuild.
///
/// Children are fully replaced, never partially updated: clearing releases
/// every container (and, through recursive despawn, every object).
pub struct GenerationRoot<H: Copy + Send + Sync + 'static> {
    root: Option<H>,
    containers: Vec<H>,
    objects: Vec<H>,
}

impl<H: Copy + Send + Sync + 'static> Default for GenerationRoot<H> {
    fn default() -> Self {
        Self {
            root: None,
            containers: Vec::new(),
            objects: Vec::new(),
        }
    }
}

impl<H: Copy + Send + Sync + 'static> GenerationRoot<H> {
    /// The root container handle, if it has been created.
    pub fn root(&self) -> Option<H> {
        self.root
    }

    /// Handles of objects placed by the last rebuild.
    pub fn objects(&self) -> &[H] {
        &self.objects
    }

    /// Return the root handle, creating the root container on first use.
    fn ensure_root<F: ObjectFactory<Handle = H>>(&mut self, factory: &mut F) -> H {
        *self
            .root
            .get_or_insert_with(|| factory.spawn_container(GENERATION_ROOT_NAME, None))
    }

    /// Release every generated child of the root.
    fn release_children<F: ObjectFactory<Handle = H>>(&mut self, factory: &mut F) {
        for &container in &self.containers {
            factory.despawn(container);
        }
        self.containers.clear();
        self.objects.clear();
    }
}

/// Rebuilds placed-object output from a layer list.
#[derive(Resource)]
pub struct LevelAssembler<H: Copy + Send + Sync + 'static> {
    generated: GenerationRoot<H>,
}

impl<H: Copy + Send + Sync + 'static> Default for LevelAssembler<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Copy + Send + Sync + 'static> LevelAssembler<H> {
    /// Create an assembler with no generated output.
    pub fn new() -> Self {
        Self {
            generated: GenerationRoot::default(),
        }
    }

    /// The generated output of the last rebuild.
    pub fn generated(&self) -> &GenerationRoot<H> {
        &self.generated
    }

    /// Clear previous output and regenerate every layer.
    ///
    /// An empty layer list is an error and aborts before the clear phase,
    /// leaving prior output untouched. Individual layers that cannot
    /// generate are skipped with a warning while the rest proceed; pixels
    /// that are fully transparent or miss the table are silent no-ops.
    ///
    /// Each resolved pixel spawns its template at
    /// `(x * spacing.x, y * spacing.y, 0)` with identity rotation inside a
    /// per-layer container, and the container is then rotated 90 degrees
    /// about X so the authored X/Y pixel plane lands on the world X/Z
    /// plane.
    pub fn rebuild<F>(
        &mut self,
        factory: &mut F,
        layers: &[LayerDescriptor],
        grid_spacing: Vec3,
    ) -> AssemblyResult<RebuildReport>
    where
        F: ObjectFactory<Handle = H>,
    {
        if layers.is_empty() {
            return Err(AssemblyError::NoLayers);
        }

        let root = self.generated.ensure_root(factory);
        self.generated.release_children(factory);

        let mut report = RebuildReport::default();
        for layer in layers {
            if let Some(issue) = layer.validity_issue() {
                warn!("skipping layer '{}': {}", layer.name, issue);
                report.layers_skipped += 1;
                continue;
            }

            let container = factory.spawn_container(&layer.name, Some(root));
            self.generated.containers.push(container);

            for y in 0..layer.image.height() {
                for x in 0..layer.image.width() {
                    let pixel = layer.image.get(x, y);
                    if pixel.is_transparent() {
                        continue;
                    }
                    let Some(template) = layer.table.lookup(pixel) else {
                        continue;
                    };
                    let position = Vec3::new(
                        x as f32 * grid_spacing.x,
                        y as f32 * grid_spacing.y,
                        0.0,
                    );
                    let handle =
                        factory.spawn_object(template, position, Quat::IDENTITY, container);
                    self.generated.objects.push(handle);
                    report.objects_placed += 1;
                }
            }

            factory.set_rotation(container, Quat::from_rotation_x(FRAC_PI_2));
            report.layers_built += 1;
        }

        info!(
            "rebuilt level: {} layers, {} skipped, {} objects",
            report.layers_built, report.layers_skipped, report.objects_placed
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;
    use crate::color_key::ColorKeyTable;
    use crate::raster::RasterImage;
    use std::collections::HashMap;

    /// In-memory factory recording spawns and parent links.
    #[derive(Default)]
    struct RecordingFactory {
        next: usize,
        /// handle -> parent handle
        alive: HashMap<usize, Option<usize>>,
        /// (template id, position, parent) per spawned object, in order.
        placements: Vec<(String, Vec3, usize)>,
        rotations: HashMap<usize, Quat>,
    }

    impl RecordingFactory {
        fn alloc(&mut self, parent: Option<usize>) -> usize {
            let handle = self.next;
            self.next += 1;
            self.alive.insert(handle, parent);
            handle
        }

        fn live_count(&self) -> usize {
            self.alive.len()
        }

        fn live_placements(&self) -> Vec<&(String, Vec3, usize)> {
            self.placements
                .iter()
                .filter(|(_, _, parent)| self.alive.contains_key(parent))
                .collect()
        }
    }

    impl ObjectFactory for RecordingFactory {
        type Handle = usize;

        fn spawn_container(&mut self, _name: &str, parent: Option<usize>) -> usize {
            self.alloc(parent)
        }

        fn spawn_object(
            &mut self,
            template: &ObjectTemplateRef,
            position: Vec3,
            _rotation: Quat,
            parent: usize,
        ) -> usize {
            let handle = self.alloc(Some(parent));
            self.placements
                .push((template.id().to_string(), position, parent));
            handle
        }

        fn set_rotation(&mut self, handle: usize, rotation: Quat) {
            self.rotations.insert(handle, rotation);
        }

        fn despawn(&mut self, handle: usize) {
            self.alive.remove(&handle);
            let orphans: Vec<usize> = self
                .alive
                .iter()
                .filter(|(_, parent)| **parent == Some(handle))
                .map(|(h, _)| *h)
                .collect();
            for orphan in orphans {
                self.despawn(orphan);
            }
        }
    }

    fn wall_table() -> ColorKeyTable {
        ColorKeyTable::build(vec![(Rgba::BLACK, ObjectTemplateRef::new("wall"))])
    }

    fn single_pixel_layer(name: &str, pixel: Rgba) -> LayerDescriptor {
        LayerDescriptor::new(name, RasterImage::from_pixels(1, 1, vec![pixel]), wall_table())
    }

    #[test]
    fn test_empty_layer_list_aborts_before_clearing() {
        let mut factory = RecordingFactory::default();
        let mut assembler = LevelAssembler::new();

        assembler
            .rebuild(&mut factory, &[single_pixel_layer("a", Rgba::BLACK)], Vec3::ONE)
            .unwrap();
        let before = factory.live_count();

        let result = assembler.rebuild(&mut factory, &[], Vec3::ONE);
        assert_eq!(result, Err(AssemblyError::NoLayers));
        assert_eq!(factory.live_count(), before); // prior output untouched
    }

    #[test]
    fn test_transparent_pixels_never_generate() {
        let mut factory = RecordingFactory::default();
        let mut assembler = LevelAssembler::new();

        // Table maps transparent black too, but alpha 0 is filtered first.
        let table = ColorKeyTable::build(vec![
            (Rgba::TRANSPARENT, ObjectTemplateRef::new("never")),
            (Rgba::BLACK, ObjectTemplateRef::new("wall")),
        ]);
        let image = RasterImage::from_pixels(
            2,
            1,
            vec![Rgba::TRANSPARENT, Rgba::BLACK],
        );
        let layer = LayerDescriptor::new("mixed", image, table);

        let report = assembler
            .rebuild(&mut factory, &[layer], Vec3::ONE)
            .unwrap();
        assert_eq!(report.objects_placed, 1);
        assert_eq!(factory.placements[0].0, "wall");
    }

    #[test]
    fn test_lookup_miss_is_silent_no_op() {
        let mut factory = RecordingFactory::default();
        let mut assembler = LevelAssembler::new();

        let layer = single_pixel_layer("unknown", Rgba::opaque(1, 2, 3));
        let report = assembler
            .rebuild(&mut factory, &[layer], Vec3::ONE)
            .unwrap();
        assert_eq!(report.layers_built, 1);
        assert_eq!(report.objects_placed, 0);
    }

    #[test]
    fn test_full_clear_before_regenerate() {
        let mut factory = RecordingFactory::default();
        let mut assembler = LevelAssembler::new();

        let l1 = vec![
            single_pixel_layer("one", Rgba::BLACK),
            single_pixel_layer("two", Rgba::BLACK),
        ];
        assembler.rebuild(&mut factory, &l1, Vec3::ONE).unwrap();

        let l2 = vec![single_pixel_layer("three", Rgba::BLACK)];
        let report = assembler.rebuild(&mut factory, &l2, Vec3::ONE).unwrap();

        // Exactly l2's output survives: root + one container + one object.
        assert_eq!(report.objects_placed, 1);
        assert_eq!(factory.live_count(), 3);
        assert_eq!(factory.live_placements().len(), 1);
    }

    #[test]
    fn test_invalid_layer_skipped_others_proceed() {
        let mut factory = RecordingFactory::default();
        let mut assembler = LevelAssembler::new();

        let layers = vec![
            LayerDescriptor::new(
                "broken",
                RasterImage::from_pixels(0, 0, Vec::new()),
                wall_table(),
            ),
            single_pixel_layer("good", Rgba::BLACK),
        ];
        let report = assembler
            .rebuild(&mut factory, &layers, Vec3::ONE)
            .unwrap();
        assert_eq!(report.layers_skipped, 1);
        assert_eq!(report.layers_built, 1);
        assert_eq!(report.objects_placed, 1);
    }

    #[test]
    fn test_grid_spacing_scales_positions() {
        let mut factory = RecordingFactory::default();
        let mut assembler = LevelAssembler::new();

        let image = RasterImage::from_pixels(
            2,
            2,
            vec![Rgba::TRANSPARENT, Rgba::BLACK, Rgba::TRANSPARENT, Rgba::BLACK],
        );
        let layer = LayerDescriptor::new("grid", image, wall_table());
        assembler
            .rebuild(&mut factory, &[layer], Vec3::new(2.0, 3.0, 1.0))
            .unwrap();

        // Pixels (1, 0) and (1, 1) resolve; z stays 0 in layer space.
        let positions: Vec<Vec3> = factory.placements.iter().map(|p| p.1).collect();
        assert_eq!(positions, vec![Vec3::new(2.0, 0.0, 0.0), Vec3::new(2.0, 3.0, 0.0)]);
    }

    #[test]
    fn test_layer_container_rotated_into_xz_plane() {
        let mut factory = RecordingFactory::default();
        let mut assembler = LevelAssembler::new();

        assembler
            .rebuild(&mut factory, &[single_pixel_layer("flat", Rgba::BLACK)], Vec3::ONE)
            .unwrap();

        // Handle 1 is the layer container (0 is the root).
        let rotation = factory.rotations.get(&1).copied().unwrap();
        let expected = Quat::from_rotation_x(FRAC_PI_2);
        assert!(rotation.angle_between(expected) < 1e-6);
        assert!(!factory.rotations.contains_key(&2)); // object keeps identity
    }

    #[test]
    fn test_root_persists_across_rebuilds() {
        let mut factory = RecordingFactory::default();
        let mut assembler = LevelAssembler::new();

        let layers = vec![single_pixel_layer("a", Rgba::BLACK)];
        assembler.rebuild(&mut factory, &layers, Vec3::ONE).unwrap();
        let root = assembler.generated().root().unwrap();

        assembler.rebuild(&mut factory, &layers, Vec3::ONE).unwrap();
        assert_eq!(assembler.generated().root(), Some(root));
    }
}
