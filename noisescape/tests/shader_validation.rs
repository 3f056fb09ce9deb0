//! The shipped WGSL stage pairs must pass the same compile path the
//! application uses at startup.

use noisescape::shaders;
use render::{CompiledProgram, ProgramDesc, RenderError, ShaderStage, UniformSlot};

fn compile(desc: ProgramDesc, vert: &str, frag: &str) -> Result<CompiledProgram, RenderError> {
    CompiledProgram::compile(
        desc,
        &[ShaderStage::vertex(vert), ShaderStage::fragment(frag)],
    )
}

#[test]
fn primary_pair_compiles() {
    let desc = ProgramDesc {
        label: "primary".into(),
        slots: vec![
            UniformSlot::Time,
            UniformSlot::Resolution,
            UniformSlot::Frequency,
            UniformSlot::Intensity,
            UniformSlot::GeoColor,
        ],
        samples_texture: true,
        depth_write: true,
    };
    compile(desc, shaders::PRIMARY_VERTEX, shaders::PRIMARY_FRAGMENT)
        .expect("primary stage pair must compile");
}

#[test]
fn background_pair_compiles() {
    let desc = ProgramDesc {
        label: "background".into(),
        slots: vec![UniformSlot::Time, UniformSlot::Resolution],
        samples_texture: false,
        depth_write: false,
    };
    compile(
        desc,
        shaders::BACKGROUND_VERTEX,
        shaders::BACKGROUND_FRAGMENT,
    )
    .expect("background stage pair must compile");
}

#[test]
fn swapped_stage_kinds_fail_to_link() {
    let desc = ProgramDesc {
        label: "swapped".into(),
        slots: vec![],
        samples_texture: false,
        depth_write: true,
    };
    // The fragment source has no vertex entry point; the pair must be
    // rejected before any GPU object is created.
    let result = compile(desc, shaders::PRIMARY_FRAGMENT, shaders::PRIMARY_VERTEX);
    assert!(matches!(result, Err(RenderError::Link { .. })));
}
