//! Declarative scene descriptions (TOML) for object models
//!
//! ```toml
//! ticks_per_frame = 2
//!
//! [[face_types]]
//! color = [255, 128, 0]
//!
//! [[primitives]]
//! kind = "quad"
//! face_type = 0
//! vertices = [0, 1, 3, 2]
//! normals = [0, 0, 0, 0]
//!
//! [[frames]]
//! positions = [[-256, -256, -256], ...]
//!
//! [[attachments]]
//! position = [0, 512, 0]
//! ```

use anyhow::{Context, Result, bail};
use legacy_common::formats::{FaceType, UNUSED_SLOT};
use legacy_common::{
    AnimationTiming, ChildAttachment, Model, Polygon, PolygonKind, Star, StarAnimation,
};
use serde::Deserialize;
use std::path::Path;

/// Root scene structure
#[derive(Debug, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub semi_transparent_environment_map: bool,
    #[serde(default = "default_ticks_per_frame")]
    pub ticks_per_frame: u16,
    #[serde(default)]
    pub face_types: Vec<FaceTypeEntry>,
    #[serde(default)]
    pub primitives: Vec<PrimitiveEntry>,
    #[serde(default)]
    pub frames: Vec<FrameEntry>,
    #[serde(default)]
    pub attachments: Vec<AttachmentEntry>,
}

fn default_ticks_per_frame() -> u16 {
    AnimationTiming::default().ticks_per_frame
}

#[derive(Debug, Deserialize)]
pub struct FaceTypeEntry {
    #[serde(default)]
    pub color: Option<[u8; 3]>,
    #[serde(default)]
    pub tex_coords: Option<[[u8; 2]; 4]>,
    #[serde(default)]
    pub bitmap: u32,
}

impl FaceTypeEntry {
    fn to_face_type(&self) -> FaceType {
        FaceType {
            has_vertex_color: self.color.is_some(),
            color: self.color.unwrap_or_default(),
            has_tex_coords: self.tex_coords.is_some(),
            tex_coords: self.tex_coords.unwrap_or_default(),
            bitmap_id: self.bitmap,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Star,
    Triangle,
    Quad,
    Billboard,
    Line,
}

impl PrimitiveKind {
    fn polygon_kind(self) -> Option<PolygonKind> {
        match self {
            PrimitiveKind::Star => None,
            PrimitiveKind::Triangle => Some(PolygonKind::Triangle),
            PrimitiveKind::Quad => Some(PolygonKind::Quad),
            PrimitiveKind::Billboard => Some(PolygonKind::Billboard),
            PrimitiveKind::Line => Some(PolygonKind::Line),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PrimitiveEntry {
    pub kind: PrimitiveKind,
    #[serde(default)]
    pub face_type: usize,
    #[serde(default)]
    pub vertices: Vec<u8>,
    #[serde(default)]
    pub normals: Vec<u8>,
    #[serde(default)]
    pub material: Option<u8>,
    #[serde(default)]
    pub textured: bool,
    #[serde(default)]
    pub reflective: bool,
    /// Stars only
    #[serde(default)]
    pub vertex_count: Option<u16>,
    /// Stars only
    #[serde(default)]
    pub animation: Option<StarAnimationEntry>,
}

#[derive(Debug, Deserialize)]
pub struct StarAnimationEntry {
    pub color: [u8; 3],
    pub seconds: f32,
}

#[derive(Debug, Default, Deserialize)]
pub struct FrameEntry {
    #[serde(default)]
    pub positions: Vec<[i16; 3]>,
    /// Missing normals keep the default unit X normal
    #[serde(default)]
    pub normals: Vec<[i16; 3]>,
    #[serde(default)]
    pub lengths: Vec<i16>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AttachmentEntry {
    Fixed { position: [i16; 3] },
    PerFrame { positions: Vec<[i16; 3]> },
}

/// Load and parse a scene file
pub fn load_scene(path: &Path) -> Result<Scene> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scene: {:?}", path))?;
    let scene: Scene =
        toml::from_str(&content).with_context(|| format!("Failed to parse scene: {:?}", path))?;
    Ok(scene)
}

fn slots(values: &[u8], what: &str, index: usize) -> Result<[u8; 4]> {
    if values.len() > 4 {
        bail!(
            "Primitive {} has {} {} slots (at most 4)",
            index,
            values.len(),
            what
        );
    }
    let mut slots = [UNUSED_SLOT; 4];
    slots[..values.len()].copy_from_slice(values);
    Ok(slots)
}

impl Scene {
    /// Build the in-memory model this scene describes
    pub fn to_model(&self) -> Result<Model> {
        let mut model = Model::new();
        model.semi_transparent_environment_map = self.semi_transparent_environment_map;
        model.timing = AnimationTiming {
            ticks_per_frame: self.ticks_per_frame,
        };

        for face_type in &self.face_types {
            model.add_face_type(face_type.to_face_type());
        }

        for (index, entry) in self.primitives.iter().enumerate() {
            let vertices = slots(&entry.vertices, "vertex", index)?;
            let normals = slots(&entry.normals, "normal", index)?;

            match entry.kind.polygon_kind() {
                None => {
                    let vertex_count = entry
                        .vertex_count
                        .unwrap_or(entry.vertices.len().max(1) as u16);
                    let mut star = Star::new(vertex_count)
                        .with_vertices(vertices)
                        .with_normals(normals);
                    if let Some(animation) = &entry.animation {
                        star = star.with_animation(StarAnimation::from_seconds(
                            animation.color,
                            animation.seconds,
                        ));
                    }
                    model.add_primitive(star);
                }
                Some(kind) => {
                    let mut polygon = Polygon::new(kind, entry.face_type)
                        .with_vertices(vertices)
                        .with_normals(normals);
                    polygon.set_textured(entry.textured);
                    polygon
                        .set_reflective(entry.reflective)
                        .with_context(|| format!("Primitive {}", index))?;
                    if let Some(material) = entry.material {
                        polygon
                            .set_material(material)
                            .with_context(|| format!("Primitive {}", index))?;
                    }
                    model.add_primitive(polygon);
                }
            }
        }

        self.fill_frames(&mut model)?;

        for (index, attachment) in self.attachments.iter().enumerate() {
            let attachment = match attachment {
                AttachmentEntry::Fixed { position } => {
                    ChildAttachment::fixed(*position, model.frame_count())
                }
                AttachmentEntry::PerFrame { positions } => {
                    ChildAttachment::per_frame(positions.clone())
                }
            };
            model
                .add_child_attachment(attachment)
                .with_context(|| format!("Attachment {}", index))?;
        }

        Ok(model)
    }

    fn fill_frames(&self, model: &mut Model) -> Result<()> {
        let Some(first) = self.frames.first() else {
            return Ok(());
        };
        let counts = (
            first.positions.len(),
            first.normals.len(),
            first.lengths.len(),
        );
        for (frame, entry) in self.frames.iter().enumerate() {
            let got = (entry.positions.len(), entry.normals.len(), entry.lengths.len());
            if got != counts {
                bail!(
                    "Frame {} has {:?} positions/normals/lengths, frame 0 has {:?}",
                    frame,
                    got,
                    counts
                );
            }
        }

        model.allocate_frames(self.frames.len(), counts.0, counts.1, counts.2)?;
        for (frame, entry) in self.frames.iter().enumerate() {
            let positions = model.positions_mut(frame)?;
            for (i, &p) in entry.positions.iter().enumerate() {
                positions.set(i, p)?;
            }
            let normals = model.normals_mut(frame)?;
            for (i, &n) in entry.normals.iter().enumerate() {
                normals.set(i, n)?;
            }
            let lengths = model.lengths_mut(frame)?;
            for (i, &l) in entry.lengths.iter().enumerate() {
                lengths.set(i, l)?;
            }
        }
        Ok(())
    }
}
