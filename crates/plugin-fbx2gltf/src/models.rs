//! Domain models: converter options, per-file outcomes, task context.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::ConversionError;
use crate::metrics::MetricsSnapshot;

/// Default discovery pattern: every `.fbx` file, recursively.
pub const DEFAULT_PATTERN: &str = "**/*.fbx";

macro_rules! cli_enum {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident => $text:literal),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $text)]
                $variant,
            )*
        }

        impl $name {
            /// Value as passed on the converter command line.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)*
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

cli_enum! {
    /// When to use 32-bit indices.
    LongIndices {
        /// Always 16-bit indices.
        Never => "never",
        /// 32-bit only when a mesh needs it.
        Auto => "auto",
        /// Always 32-bit indices.
        Always => "always",
    }
}

cli_enum! {
    /// When to recompute vertex normals.
    ComputeNormals {
        /// Never recompute.
        Never => "never",
        /// Recompute only broken normals.
        Broken => "broken",
        /// Compute where normals are missing.
        Missing => "missing",
        /// Always recompute.
        Always => "always",
    }
}

cli_enum! {
    /// Animation bake rate.
    AnimFramerate {
        /// 24 frames per second.
        Bake24 => "bake24",
        /// 30 frames per second.
        Bake30 => "bake30",
        /// 60 frames per second.
        Bake60 => "bake60",
    }
}

cli_enum! {
    /// Vertex attribute to retain in the output.
    KeepAttribute {
        /// Vertex positions.
        Position => "position",
        /// Vertex normals.
        Normal => "normal",
        /// Vertex tangents.
        Tangent => "tangent",
        /// Vertex binormals.
        Binormal => "binormal",
        /// Vertex colors.
        Color => "color",
        /// First UV set.
        Uv0 => "uv0",
        /// Second UV set.
        Uv1 => "uv1",
        /// Let the converter decide.
        Auto => "auto",
    }
}

/// Task options for one conversion run.
///
/// Deserialized from a project's `fbx2gltf` target. Only `in_path` is
/// required. Numeric Draco parameters of zero count as unset.
#[derive(Debug, Clone, Default, PartialEq, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    /// Input directory, relative to the project root.
    #[validate(length(min = 1, message = "in_path is required"))]
    pub in_path: String,
    /// Discovery glob, relative to `in_path`.
    pub pattern: Option<String>,

    pub anim_framerate: Option<AnimFramerate>,
    /// Emits `--binary` and produces `<name>.glb`, not `--embed` and `.gltf`.
    pub binary: bool,
    pub blend_shape_normals: bool,
    pub blend_shape_tangents: bool,
    pub compute_normals: Option<ComputeNormals>,

    pub draco: bool,
    #[validate(range(max = 32))]
    pub draco_bits_for_colors: Option<u32>,
    #[validate(range(max = 32))]
    pub draco_bits_for_normals: Option<u32>,
    #[validate(range(max = 32))]
    pub draco_bits_for_other: Option<u32>,
    #[validate(range(max = 32))]
    pub draco_bits_for_position: Option<u32>,
    #[validate(range(max = 32))]
    pub draco_bits_for_uv: Option<u32>,
    #[validate(range(max = 10))]
    pub draco_compression_level: Option<u32>,

    pub embed: bool,
    pub flip_u: bool,
    pub flip_v: bool,
    /// One attribute or a list; all follow a single `--keep-attribute`.
    #[serde(deserialize_with = "one_or_many")]
    pub keep_attribute: Vec<KeepAttribute>,
    pub khr_materials_unlit: bool,
    pub long_indices: Option<LongIndices>,
    pub no_flip_u: bool,
    pub no_flip_v: bool,
    pub no_khr_lights_punctual: bool,
    pub pbr_metallic_roughness: bool,
    /// Scratch directory handed to the converter's FBX SDK.
    pub tmp_path: Option<PathBuf>,
    pub user_properties: bool,
    /// Log each converter command line and pass `--verbose` through.
    pub verbose: bool,
}

impl ConversionOptions {
    /// Options for the given input directory with everything else unset.
    pub fn new(in_path: impl Into<String>) -> Self {
        Self {
            in_path: in_path.into(),
            ..Default::default()
        }
    }

    /// Parse and validate options from a raw target table. Keys may be
    /// snake_case or camelCase.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, ConversionError> {
        let options: Self = serde_json::from_value(snake_case_keys(value))
            .map_err(|e| ConversionError::InvalidOptions(e.to_string()))?;
        options
            .validate()
            .map_err(|e| ConversionError::InvalidOptions(e.to_string()))?;
        Ok(options)
    }

    /// Effective discovery pattern.
    pub fn pattern(&self) -> &str {
        self.pattern.as_deref().unwrap_or(DEFAULT_PATTERN)
    }

    /// Extension of the file the converter produces.
    pub fn output_extension(&self) -> &'static str {
        if self.binary { "glb" } else { "gltf" }
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<KeepAttribute>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(KeepAttribute),
        Many(Vec<KeepAttribute>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(attribute) => vec![attribute],
        OneOrMany::Many(attributes) => attributes,
    })
}

fn snake_case_keys(value: &serde_json::Value) -> serde_json::Value {
    let serde_json::Value::Object(map) = value else {
        return value.clone();
    };
    map.iter()
        .map(|(key, v)| {
            let mut snake = String::with_capacity(key.len() + 4);
            for c in key.chars() {
                if c.is_ascii_uppercase() {
                    snake.push('_');
                    snake.push(c.to_ascii_lowercase());
                } else {
                    snake.push(c);
                }
            }
            (snake, v.clone())
        })
        .collect::<serde_json::Map<_, _>>()
        .into()
}

/// Outcome of converting one input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConversionResult {
    /// The file converted; `output_file` is the canonical glTF path.
    Success {
        /// Absolute path of the produced glTF file.
        output_file: PathBuf,
    },
    /// The file failed; its partial output has been removed.
    Failure {
        /// Input path relative to the project root.
        input_file: PathBuf,
        /// Human-readable cause.
        reason: String,
    },
}

impl ConversionResult {
    /// Returns `true` for a successful conversion.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Explicit task context handed to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskContext {
    /// Absolute workspace root.
    pub workspace_root: PathBuf,
    /// Name of the project the task runs for.
    pub project_name: String,
    /// Absolute project root; the converter's working directory.
    pub project_root: PathBuf,
}

/// Result of a successful task run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskOutput {
    /// Always `true`; failed runs surface as errors.
    pub success: bool,
    /// Identifier of this run, also recorded on the tracing span.
    pub run_id: Uuid,
    /// Number of files converted.
    pub converted: usize,
    /// Where the manifest was written.
    pub manifest_path: PathBuf,
    /// Run start time.
    pub started_at: DateTime<Utc>,
    /// Run end time.
    pub finished_at: DateTime<Utc>,
    /// Counters and durations of this run only.
    pub metrics: MetricsSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(LongIndices::Auto.to_string(), "auto");
        assert_eq!(ComputeNormals::Broken.as_str(), "broken");
        assert_eq!(AnimFramerate::Bake60.as_str(), "bake60");
        assert_eq!(KeepAttribute::Binormal.as_str(), "binormal");

        let parsed: AnimFramerate = serde_json::from_str("\"bake30\"").expect("parse");
        assert_eq!(parsed, AnimFramerate::Bake30);
    }

    #[test]
    fn test_options_from_value() {
        let value = serde_json::json!({
            "in_path": "assets/fbx",
            "draco": true,
            "draco_bits_for_uv": 12,
            "long_indices": "always",
            "keep_attribute": ["position", "uv0"],
        });
        let options = ConversionOptions::from_value(&value).expect("parse");
        assert_eq!(options.in_path, "assets/fbx");
        assert!(options.draco);
        assert_eq!(options.draco_bits_for_uv, Some(12));
        assert_eq!(options.long_indices, Some(LongIndices::Always));
        assert_eq!(
            options.keep_attribute,
            vec![KeepAttribute::Position, KeepAttribute::Uv0]
        );
        assert_eq!(options.pattern(), DEFAULT_PATTERN);
    }

    #[test]
    fn test_options_accept_camel_case_keys() {
        let value = serde_json::json!({
            "inPath": "fbx",
            "dracoCompressionLevel": 7,
            "noKhrLightsPunctual": true,
            "computeNormals": "missing",
        });
        let options = ConversionOptions::from_value(&value).expect("parse");
        assert_eq!(options.in_path, "fbx");
        assert_eq!(options.draco_compression_level, Some(7));
        assert!(options.no_khr_lights_punctual);
        assert_eq!(options.compute_normals, Some(ComputeNormals::Missing));
    }

    #[test]
    fn test_keep_attribute_accepts_single_value() {
        let value = serde_json::json!({ "inPath": "fbx", "keepAttribute": "position" });
        let options = ConversionOptions::from_value(&value).expect("parse");
        assert_eq!(options.keep_attribute, vec![KeepAttribute::Position]);

        let value = serde_json::json!({ "in_path": "fbx", "keep_attribute": "uv3" });
        assert!(ConversionOptions::from_value(&value).is_err());
    }

    #[test]
    fn test_missing_in_path_rejected() {
        let err = ConversionOptions::from_value(&serde_json::json!({ "draco": true })).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidOptions(_)));
    }

    #[test]
    fn test_out_of_range_draco_bits_rejected() {
        let value = serde_json::json!({ "in_path": "fbx", "draco_bits_for_position": 40 });
        assert!(ConversionOptions::from_value(&value).is_err());
    }

    #[test]
    fn test_unknown_enum_value_rejected() {
        let value = serde_json::json!({ "in_path": "fbx", "anim_framerate": "bake25" });
        assert!(ConversionOptions::from_value(&value).is_err());
    }

    #[test]
    fn test_output_extension() {
        let mut options = ConversionOptions::new("fbx");
        assert_eq!(options.output_extension(), "gltf");
        options.binary = true;
        assert_eq!(options.output_extension(), "glb");
    }
}
