use std::fs;
use std::path::Path;

use naga::front::wgsl;
use naga::valid::{Capabilities, ValidationFlags, Validator};

use crate::error::ShaderError;

/// Samples the presentation texture across the whole viewport.
pub const BUILTIN_PRESENT_SHADER: &str = include_str!("present.wgsl");

pub fn load_shader(path: &Path) -> Result<String, ShaderError> {
    let source =
        fs::read_to_string(path).map_err(|source| ShaderError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    validate_shader(&source)?;

    Ok(source)
}

pub fn validate_shader(source: &str) -> Result<(), ShaderError> {
    let module = wgsl::parse_str(source)
        .map_err(|err| ShaderError::Parse(err.emit_to_string(source)))?;

    let mut validator =
        Validator::new(ValidationFlags::all(), Capabilities::all());

    validator
        .validate(&module)
        .map_err(|err| ShaderError::Validation(err.to_string()))
        .map(|_| ())
}
