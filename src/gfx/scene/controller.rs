//! # Transform Controller
//!
//! UI controls produce [`SceneEdit`] messages; [`ObjectTransform::applied`]
//! folds one message into a transform. The scene routes each message to the
//! selected instance, so nothing is rebound when the selection changes.

use std::str::FromStr;

use thiserror::Error;

use super::object::ObjectTransform;
use crate::gfx::resources::AssetError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    #[error("unknown control '{0}'")]
    UnknownField(String),
    #[error("control '{field}' got '{value}', expected a finite number")]
    InvalidNumber { field: EditField, value: String },
    #[error("texture control got an empty path")]
    EmptyTexture,
    #[error("texture change failed: {0}")]
    Texture(#[from] AssetError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// One change coming from the editing controls
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEdit {
    /// Set the yaw, radians
    Rotation(f32),
    /// Set the uniform scale
    Scale(f32),
    /// Set one component of the offset
    Offset(Axis, f32),
    /// Move the offset along one axis
    Translate(Axis, f32),
    /// Bind another texture image to every part
    Texture(String),
}

/// Names of the editing controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditField {
    Rotation,
    Scale,
    OffsetX,
    OffsetY,
    OffsetZ,
    Texture,
}

impl EditField {
    pub const ALL: [EditField; 6] = [
        EditField::Rotation,
        EditField::Scale,
        EditField::OffsetX,
        EditField::OffsetY,
        EditField::OffsetZ,
        EditField::Texture,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EditField::Rotation => "rotation",
            EditField::Scale => "scale",
            EditField::OffsetX => "offset_x",
            EditField::OffsetY => "offset_y",
            EditField::OffsetZ => "offset_z",
            EditField::Texture => "texture",
        }
    }
}

impl std::fmt::Display for EditField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EditField {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        match key.as_str() {
            "rotation" | "rotate" | "yaw" => Ok(EditField::Rotation),
            "scale" => Ok(EditField::Scale),
            "offset_x" | "x" => Ok(EditField::OffsetX),
            "offset_y" | "y" => Ok(EditField::OffsetY),
            "offset_z" | "z" => Ok(EditField::OffsetZ),
            "texture" => Ok(EditField::Texture),
            _ => Err(EditError::UnknownField(s.to_string())),
        }
    }
}

impl SceneEdit {
    /// Build an edit from a control name and its raw string value
    pub fn from_control(field: EditField, raw: &str) -> Result<Self, EditError> {
        let number = || {
            raw.trim()
                .parse::<f32>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| EditError::InvalidNumber {
                    field,
                    value: raw.to_string(),
                })
        };

        Ok(match field {
            EditField::Rotation => SceneEdit::Rotation(number()?),
            EditField::Scale => SceneEdit::Scale(number()?),
            EditField::OffsetX => SceneEdit::Offset(Axis::X, number()?),
            EditField::OffsetY => SceneEdit::Offset(Axis::Y, number()?),
            EditField::OffsetZ => SceneEdit::Offset(Axis::Z, number()?),
            EditField::Texture => match raw.trim() {
                "" => return Err(EditError::EmptyTexture),
                path => SceneEdit::Texture(path.to_string()),
            },
        })
    }

    /// True for edits that only touch the transform
    pub fn is_transform(&self) -> bool {
        !matches!(self, SceneEdit::Texture(_))
    }
}

impl ObjectTransform {
    /// Transform after applying `edit`.
    ///
    /// Texture edits and non-finite values leave the transform unchanged.
    pub fn applied(mut self, edit: &SceneEdit) -> Self {
        match *edit {
            SceneEdit::Rotation(yaw) if yaw.is_finite() => self.rotation = yaw,
            SceneEdit::Scale(scale) if scale.is_finite() => self.scale = scale,
            SceneEdit::Offset(axis, value) if value.is_finite() => {
                self.offset[axis.index()] = value;
            }
            SceneEdit::Translate(axis, delta) if delta.is_finite() => {
                self.offset[axis.index()] += delta;
            }
            SceneEdit::Texture(_) => {}
            _ => log::warn!("ignoring non-finite edit {:?}", edit),
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    #[test]
    fn test_field_names_round_trip() {
        for field in EditField::ALL {
            assert_eq!(field.name().parse::<EditField>(), Ok(field));
        }
        assert_eq!(" Scale ".parse::<EditField>(), Ok(EditField::Scale));
        assert_eq!(
            "colour".parse::<EditField>(),
            Err(EditError::UnknownField("colour".to_string()))
        );
    }

    #[test]
    fn test_from_control_parses_numbers() {
        assert_eq!(
            SceneEdit::from_control(EditField::Rotation, "1.5"),
            Ok(SceneEdit::Rotation(1.5))
        );
        assert_eq!(
            SceneEdit::from_control(EditField::OffsetY, " -2 "),
            Ok(SceneEdit::Offset(Axis::Y, -2.0))
        );
        assert_eq!(
            SceneEdit::from_control(EditField::Texture, "assets/objs/textura2.jpg"),
            Ok(SceneEdit::Texture("assets/objs/textura2.jpg".to_string()))
        );
    }

    #[test]
    fn test_from_control_rejects_bad_values() {
        for raw in ["", "abc", "NaN", "inf"] {
            assert!(matches!(
                SceneEdit::from_control(EditField::Scale, raw),
                Err(EditError::InvalidNumber { .. })
            ));
        }
        assert_eq!(
            SceneEdit::from_control(EditField::Texture, "  "),
            Err(EditError::EmptyTexture)
        );
    }

    #[test]
    fn test_applied_reducer() {
        let start = ObjectTransform::new(Vector3::new(1.0, 2.0, 3.0), 1.2, 0.0);

        let t = start
            .applied(&SceneEdit::Rotation(0.25))
            .applied(&SceneEdit::Scale(2.0))
            .applied(&SceneEdit::Offset(Axis::X, 5.0))
            .applied(&SceneEdit::Translate(Axis::Z, -1.0));

        assert_eq!(t.rotation, 0.25);
        assert_eq!(t.scale, 2.0);
        assert_eq!(t.offset, Vector3::new(5.0, 2.0, 2.0));
        // The input is a value, untouched
        assert_eq!(start.scale, 1.2);
    }

    #[test]
    fn test_applied_ignores_texture_and_non_finite() {
        let start = ObjectTransform::default();

        assert_eq!(start.applied(&SceneEdit::Texture("t.png".into())), start);
        assert_eq!(start.applied(&SceneEdit::Scale(f32::NAN)), start);
        assert_eq!(start.applied(&SceneEdit::Translate(Axis::X, f32::INFINITY)), start);
    }
}
