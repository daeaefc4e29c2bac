//! Converter flag construction.
//!
//! Flags come from a fixed table evaluated in order, so a given options
//! value always yields the same command line.

use std::fmt;
use std::path::Path;

use crate::models::ConversionOptions;

/// One converter flag with its values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterFlag {
    /// Flag name including the leading dashes.
    pub name: &'static str,
    /// Values following the flag; empty for switches.
    pub values: Vec<String>,
}

impl ConverterFlag {
    /// A flag followed by one value.
    pub fn with_value(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            name,
            values: vec![value.into()],
        }
    }

    /// Flatten into argv tokens.
    pub fn to_args(&self) -> Vec<String> {
        std::iter::once(self.name.to_string())
            .chain(self.values.iter().cloned())
            .collect()
    }
}

impl fmt::Display for ConverterFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)?;
        for value in &self.values {
            write!(f, " {}", value)?;
        }
        Ok(())
    }
}

type Extractor = fn(&ConversionOptions) -> Option<Vec<String>>;

fn on(enabled: bool) -> Option<Vec<String>> {
    enabled.then(Vec::new)
}

fn value(v: Option<impl ToString>) -> Option<Vec<String>> {
    v.map(|v| vec![v.to_string()])
}

/// Draco-dependent numeric flag; zero counts as unset.
fn draco_value(options: &ConversionOptions, v: Option<u32>) -> Option<Vec<String>> {
    if !options.draco {
        return None;
    }
    value(v.filter(|n| *n > 0))
}

fn path_value(p: Option<&Path>) -> Option<Vec<String>> {
    p.map(|p| vec![p.to_string_lossy().into_owned()])
}

/// Emission order of every flag the converter understands.
const FLAG_TABLE: &[(&str, Extractor)] = &[
    ("--anim-framerate", |o| value(o.anim_framerate)),
    ("--binary", |o| on(o.binary)),
    ("--blend-shape-normals", |o| on(o.blend_shape_normals)),
    ("--blend-shape-tangents", |o| on(o.blend_shape_tangents)),
    ("--compute-normals", |o| value(o.compute_normals)),
    ("--draco", |o| on(o.draco)),
    ("--draco-bits-for-colors", |o| draco_value(o, o.draco_bits_for_colors)),
    ("--draco-bits-for-normals", |o| draco_value(o, o.draco_bits_for_normals)),
    ("--draco-bits-for-other", |o| draco_value(o, o.draco_bits_for_other)),
    ("--draco-bits-for-position", |o| draco_value(o, o.draco_bits_for_position)),
    ("--draco-bits-for-uv", |o| draco_value(o, o.draco_bits_for_uv)),
    ("--draco-compression-level", |o| draco_value(o, o.draco_compression_level)),
    ("--embed", |o| on(o.embed)),
    ("--flip-u", |o| on(o.flip_u)),
    ("--flip-v", |o| on(o.flip_v)),
    ("--keep-attribute", |o| {
        (!o.keep_attribute.is_empty())
            .then(|| o.keep_attribute.iter().map(|a| a.as_str().to_string()).collect())
    }),
    ("--khr-materials-unlit", |o| on(o.khr_materials_unlit)),
    ("--long-indices", |o| value(o.long_indices)),
    ("--no-flip-u", |o| on(o.no_flip_u)),
    ("--no-flip-v", |o| on(o.no_flip_v)),
    ("--no-khr-lights-punctual", |o| on(o.no_khr_lights_punctual)),
    ("--pbr-metallic-roughness", |o| on(o.pbr_metallic_roughness)),
    ("--user-properties", |o| on(o.user_properties)),
    ("--verbose", |o| on(o.verbose)),
    ("--fbx-temp-dir", |o| path_value(o.tmp_path.as_deref())),
];

/// Build the option-derived flags, in table order.
pub fn build_flags(options: &ConversionOptions) -> Vec<ConverterFlag> {
    FLAG_TABLE
        .iter()
        .filter_map(|&(name, extract)| {
            extract(options).map(|values| ConverterFlag { name, values })
        })
        .collect()
}

/// Build the complete argv for one input: `--input`, `--output`, then the
/// option-derived flags.
pub fn build_args(input: &Path, output_prefix: &Path, options: &ConversionOptions) -> Vec<String> {
    let mut flags = vec![
        ConverterFlag::with_value("--input", input.to_string_lossy()),
        ConverterFlag::with_value("--output", output_prefix.to_string_lossy()),
    ];
    flags.extend(build_flags(options));
    flags.iter().flat_map(ConverterFlag::to_args).collect()
}
