//! Validates the debug-draw WGSL with naga.

use wetcloth_viz::shader::DEBUG_DRAW_WGSL;

fn parse_and_validate(code: &str) -> Result<naga::Module, String> {
    let module = naga::front::wgsl::parse_str(code)
        .map_err(|e| format!("WGSL parse error: {:?}", e))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    validator
        .validate(&module)
        .map_err(|e| format!("WGSL validation error: {:?}", e))?;

    Ok(module)
}

#[test]
fn test_debug_draw_shader_is_valid() {
    if let Err(e) = parse_and_validate(DEBUG_DRAW_WGSL) {
        panic!("{e}\n\n{DEBUG_DRAW_WGSL}");
    }
}

#[test]
fn test_debug_draw_entry_points() {
    let module = parse_and_validate(DEBUG_DRAW_WGSL).unwrap();
    let mut names: Vec<(&str, naga::ShaderStage)> = module
        .entry_points
        .iter()
        .map(|ep| (ep.name.as_str(), ep.stage))
        .collect();
    names.sort_by_key(|(name, _)| *name);

    assert_eq!(
        names,
        vec![
            ("fs_main", naga::ShaderStage::Fragment),
            ("vs_main", naga::ShaderStage::Vertex),
            ("vs_point", naga::ShaderStage::Vertex),
        ]
    );
}
