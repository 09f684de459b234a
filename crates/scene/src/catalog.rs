use fpview_assets::TextureSet;
use fpview_common::{MeshKind, TextureId};
use fpview_map::{CellCoord, GridMap, Tile};
use glam::{Vec2, Vec3};
use std::f32::consts::FRAC_PI_2;

use crate::{SceneConfig, SceneError, TREE_TEXTURE, WALL_TEXTURE};

/// Rotation of an object about an axis through a pivot.
///
/// `pivot` is an offset from the object's center; `Vec3::ZERO` rotates the
/// object in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    pub angle: f32,
    pub axis: Vec3,
    pub pivot: Vec3,
}

impl Rotation {
    /// Rotation about the vertical axis through the object's center.
    pub fn about_z(angle: f32) -> Self {
        Self {
            angle,
            axis: Vec3::Z,
            pivot: Vec3::ZERO,
        }
    }
}

/// A static, placed, textured mesh instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameObject {
    pub mesh: MeshKind,
    pub texture: TextureId,
    /// Ground-plane position of the object's center; height is fixed at 0.
    pub position: Vec2,
    /// Width and height scale applied to the unit mesh.
    pub size: Vec2,
    pub rotation: Option<Rotation>,
}

/// Which side of a wall cell a face looks out of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    North,
    East,
    South,
    West,
}

impl Side {
    const ALL: [Side; 4] = [Side::North, Side::East, Side::South, Side::West];

    fn neighbor(self, c: CellCoord) -> CellCoord {
        match self {
            Side::North => CellCoord::new(c.x, c.y - 1),
            Side::East => CellCoord::new(c.x + 1, c.y),
            Side::South => CellCoord::new(c.x, c.y + 1),
            Side::West => CellCoord::new(c.x - 1, c.y),
        }
    }

    /// Center of the shared edge and the rotation that puts a unit quad on it.
    fn face(self, c: CellCoord) -> (Vec2, Option<Rotation>) {
        let (x, y) = (c.x as f32, c.y as f32);
        match self {
            Side::North => (Vec2::new(x + 0.5, y), None),
            Side::South => (Vec2::new(x + 0.5, y + 1.0), None),
            Side::West => (Vec2::new(x, y + 0.5), Some(Rotation::about_z(FRAC_PI_2))),
            Side::East => (Vec2::new(x + 1.0, y + 0.5), Some(Rotation::about_z(FRAC_PI_2))),
        }
    }
}

/// The full list of renderable objects, built once after textures load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneCatalog {
    objects: Vec<GameObject>,
}

impl SceneCatalog {
    /// Derive wall faces and trees from the map, then append configured props.
    pub fn build(
        config: &SceneConfig,
        map: &GridMap,
        textures: &TextureSet,
    ) -> Result<Self, SceneError> {
        let _span = tracing::info_span!("build_catalog").entered();
        let texture = |name: &str| {
            textures
                .id(name)
                .ok_or_else(|| SceneError::MissingTexture(name.to_string()))
        };

        let mut objects = Vec::new();

        let faces = wall_faces(map);
        if !faces.is_empty() {
            let wall = texture(WALL_TEXTURE)?;
            objects.extend(faces.into_iter().map(|(position, rotation)| GameObject {
                mesh: MeshKind::Quad,
                texture: wall,
                position,
                size: Vec2::ONE,
                rotation,
            }));
        }

        let trees = map.tree_cells();
        if !trees.is_empty() {
            let tree = texture(TREE_TEXTURE)?;
            objects.extend(trees.into_iter().map(|cell| GameObject {
                mesh: MeshKind::CrossedQuads,
                texture: tree,
                position: cell.center(),
                size: Vec2::ONE,
                rotation: None,
            }));
        }

        for prop in &config.props {
            objects.push(GameObject {
                mesh: prop.mesh,
                texture: texture(&prop.texture)?,
                position: prop.position,
                size: prop.size,
                rotation: prop.rotation.map(|r| Rotation {
                    angle: r.degrees.to_radians(),
                    axis: r.axis,
                    pivot: r.pivot,
                }),
            });
        }

        tracing::info!(objects = objects.len(), "scene catalog built");
        Ok(Self { objects })
    }

    pub fn objects(&self) -> &[GameObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// One face per side of a wall cell that borders an in-bounds floor cell.
/// Row-major over cells, then north, east, south, west.
fn wall_faces(map: &GridMap) -> Vec<(Vec2, Option<Rotation>)> {
    map.iter()
        .filter(|(_, tile)| *tile == Tile::Wall)
        .flat_map(|(cell, _)| {
            Side::ALL.into_iter().filter_map(move |side| {
                let open = map.tile_at(side.neighbor(cell)) == Some(Tile::Floor);
                open.then(|| side.face(cell))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fpview_assets::{SolidTextureLoader, load_batch};

    fn textures(cfg: &SceneConfig) -> TextureSet {
        load_batch(&SolidTextureLoader::new(), &cfg.texture_requests()).unwrap()
    }

    #[test]
    fn builtin_scene_catalog() {
        let cfg = SceneConfig::builtin().unwrap();
        let map = cfg.grid().unwrap();
        let set = textures(&cfg);
        let catalog = SceneCatalog::build(&cfg, &map, &set).unwrap();

        // 24 border faces, 3 + 3 around the inner wall pair, one tree.
        assert_eq!(catalog.len(), 31);
        let trees: Vec<_> = catalog
            .objects()
            .iter()
            .filter(|o| o.mesh == MeshKind::CrossedQuads)
            .collect();
        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0].position, Vec2::new(3.5, 2.5));
        assert_eq!(trees[0].texture, set.id("tree").unwrap());
        assert!(catalog
            .objects()
            .iter()
            .filter(|o| o.mesh == MeshKind::Quad)
            .all(|o| o.texture == set.id("wall").unwrap()));
    }

    #[test]
    fn single_wall_gets_four_faces() {
        let map = GridMap::from_rows(&["...", ".#.", "..."]).unwrap();
        let faces = wall_faces(&map);
        let positions: Vec<Vec2> = faces.iter().map(|(p, _)| *p).collect();
        assert_eq!(
            positions,
            vec![
                Vec2::new(1.5, 1.0),
                Vec2::new(2.0, 1.5),
                Vec2::new(1.5, 2.0),
                Vec2::new(1.0, 1.5),
            ]
        );
        assert!(faces[0].1.is_none());
        assert_eq!(faces[1].1, Some(Rotation::about_z(FRAC_PI_2)));
    }

    #[test]
    fn no_faces_toward_map_edge_or_trees() {
        let map = GridMap::from_rows(&["#T"]).unwrap();
        assert!(wall_faces(&map).is_empty());
    }

    #[test]
    fn props_follow_derived_objects() {
        let cfg = SceneConfig::from_yaml(
            "map: ['..']\nstart: { x: 0.5, y: 0.5 }\ntextures: { sign: s.png }\n\
             props:\n  - { mesh: quad, texture: sign, position: [1.0, 0.5], size: [0.5, 2.0], \
             rotation: { degrees: 180, pivot: [0.25, 0, 0] } }\n",
        )
        .unwrap();
        let map = cfg.grid().unwrap();
        let catalog = SceneCatalog::build(&cfg, &map, &textures(&cfg)).unwrap();
        assert_eq!(catalog.len(), 1);
        let prop = catalog.objects()[0];
        assert_eq!(prop.size, Vec2::new(0.5, 2.0));
        let rot = prop.rotation.unwrap();
        assert!((rot.angle - std::f32::consts::PI).abs() < 1e-6);
        assert_eq!(rot.pivot, Vec3::new(0.25, 0.0, 0.0));
    }

    #[test]
    fn missing_texture_in_set_fails_build() {
        let cfg = SceneConfig::builtin().unwrap();
        let map = cfg.grid().unwrap();
        let empty = TextureSet::default();
        assert!(matches!(
            SceneCatalog::build(&cfg, &map, &empty),
            Err(SceneError::MissingTexture(_))
        ));
    }
}
