use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

use wgpu::naga;

/// Uniform names the sketch supplies. Declarations of these are stripped
/// from user code and replaced by the header definitions.
const CONTRACT_UNIFORMS: [&str; 7] = [
    "millis",
    "uMouse",
    "uTexture",
    "uResolution",
    "uImageResolution",
    "uProjectionMatrix",
    "uModelViewMatrix",
];

/// Vertex attributes fed by the rect vertex buffer, with their locations.
const VERTEX_ATTRIBUTES: [(&str, u32); 2] = [("aPosition", 0), ("aTexCoord", 1)];

/// Qualifiers dropped while rewriting declarations.
const PRECISION_QUALIFIERS: [&str; 3] = ["lowp", "mediump", "highp"];

/// Qualifiers carried over onto rewritten varyings.
const INTERPOLATION_QUALIFIERS: [&str; 5] = ["flat", "smooth", "noperspective", "centroid", "invariant"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Vertex,
    Fragment,
}

impl Stage {
    fn naga(self) -> naga::ShaderStage {
        match self {
            Stage::Vertex => naga::ShaderStage::Vertex,
            Stage::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Vertex => f.write_str("vertex"),
            Stage::Fragment => f.write_str("fragment"),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProgramError {
    #[error("{stage} shader declares unsupported uniform `{name}`")]
    UnknownUniform { stage: Stage, name: String },
    #[error("{stage} shader declares unsupported attribute `{name}` (expected aPosition or aTexCoord)")]
    UnknownAttribute { stage: Stage, name: String },
    #[error("fragment shader declares more than one colour output (`{first}` and `{second}`)")]
    MultipleOutputs { first: String, second: String },
    #[error("{stage} shader failed to compile:\n{message}")]
    Compile { stage: Stage, message: String },
}

/// Both stages rewritten into Vulkan-flavoured GLSL 450.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedProgram {
    pub vertex: String,
    pub fragment: String,
}

impl WrappedProgram {
    pub fn stage(&self, stage: Stage) -> &str {
        match stage {
            Stage::Vertex => &self.vertex,
            Stage::Fragment => &self.fragment,
        }
    }
}

/// Rewrites a WebGL-style shader pair so naga accepts it.
///
/// Steps performed on each stage:
///
/// 1. Drop `#version`, `#extension` and `precision` lines.
/// 2. Strip declarations of the contract uniforms; any other uniform is an
///    error.
/// 3. Give attributes their vertex buffer locations and give varyings a
///    location shared by both stages (varying names sorted).
/// 4. Prepend [`COMMON_HEADER`] (plus [`FRAGMENT_HEADER`] for the fragment
///    stage), which declares the uniform block and maps the contract names
///    onto it with macros.
///
/// The fragment stage also has its `main` renamed and wrapped by
/// [`FRAGMENT_FOOTER`] so `gl_FragCoord` is canvas-relative with a
/// bottom-left origin, wherever the canvas sits in the surface.
pub fn wrap_program(vertex: &str, fragment: &str) -> Result<WrappedProgram, ProgramError> {
    let vertex_lines = scan(vertex);
    let fragment_lines = scan(fragment);

    let mut varyings = BTreeSet::new();
    collect_varyings(Stage::Vertex, &vertex_lines, &mut varyings);
    collect_varyings(Stage::Fragment, &fragment_lines, &mut varyings);
    let varyings: Vec<String> = varyings.into_iter().collect();

    Ok(WrappedProgram {
        vertex: rewrite(Stage::Vertex, &vertex_lines, &varyings)?,
        fragment: rewrite(Stage::Fragment, &fragment_lines, &varyings)?,
    })
}

/// Parses and validates a wrapped stage with naga, without touching a GPU.
pub fn validate_stage(stage: Stage, source: &str) -> Result<naga::Module, ProgramError> {
    let mut frontend = naga::front::glsl::Frontend::default();
    let module = frontend
        .parse(&naga::front::glsl::Options::from(stage.naga()), source)
        .map_err(|errors| ProgramError::Compile {
            stage,
            message: errors.emit_to_string(source),
        })?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    validator
        .validate(&module)
        .map_err(|err| ProgramError::Compile {
            stage,
            message: err.emit_to_string(source),
        })?;
    Ok(module)
}

/// Wraps and validates both stages.
pub fn check_program(vertex: &str, fragment: &str) -> Result<WrappedProgram, ProgramError> {
    let program = wrap_program(vertex, fragment)?;
    for stage in [Stage::Vertex, Stage::Fragment] {
        if let Err(err) = validate_stage(stage, program.stage(stage)) {
            tracing::debug!(%stage, wrapped = program.stage(stage), "wrapped shader rejected");
            return Err(err);
        }
    }
    Ok(program)
}

/// Hands a validated stage to wgpu.
pub(crate) fn create_module(
    device: &wgpu::Device,
    stage: Stage,
    source: &str,
) -> wgpu::ShaderModule {
    let label = format!("reefer {stage}");
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&label),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Owned(source.to_string()),
            stage: stage.naga(),
            defines: &[],
        },
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Storage {
    Uniform,
    Attribute,
    Varying,
    In,
    Out,
}

impl Storage {
    fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "uniform" => Some(Storage::Uniform),
            "attribute" => Some(Storage::Attribute),
            "varying" => Some(Storage::Varying),
            "in" => Some(Storage::In),
            "out" => Some(Storage::Out),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Declaration {
    storage: Storage,
    interpolation: Vec<String>,
    ty: String,
    names: Vec<String>,
    /// Uniform blocks are reported by block name.
    block: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line<'a> {
    Skip,
    Declaration(Declaration),
    /// A `layout(...)` declaration that writes a fragment colour output.
    LayoutOutput(&'a str),
    Code(&'a str),
}

fn scan(source: &str) -> Vec<Line<'_>> {
    let mut seen_version = false;
    source
        .lines()
        .map(|line| {
            let trimmed = line.trim();
            if !seen_version && trimmed.starts_with("#version") {
                seen_version = true;
                return Line::Skip;
            }
            if trimmed.starts_with("#extension") || trimmed.starts_with("precision ") {
                return Line::Skip;
            }
            if trimmed.starts_with("layout") {
                let is_output = trimmed
                    .split(|c: char| !c.is_ascii_alphanumeric() && c != '_')
                    .any(|word| word == "out");
                return if is_output {
                    Line::LayoutOutput(line)
                } else {
                    Line::Code(line)
                };
            }
            match parse_declaration(trimmed) {
                Some(declaration) => Line::Declaration(declaration),
                None => Line::Code(line),
            }
        })
        .collect()
}

/// Recognises single-line global declarations such as
/// `uniform mediump vec2 uMouse;` or `varying vec2 vTexCoord, vPos;`.
fn parse_declaration(line: &str) -> Option<Declaration> {
    let code = match line.find("//") {
        Some(index) => line[..index].trim_end(),
        None => line,
    };

    let mut words = code.split_whitespace();
    let storage = Storage::from_keyword(words.next()?)?;

    if storage == Storage::Uniform && code.contains('{') {
        let name = words
            .next()
            .map(|word| word.trim_end_matches('{').to_string())
            .unwrap_or_default();
        return Some(Declaration {
            storage,
            interpolation: Vec::new(),
            ty: String::new(),
            names: vec![name],
            block: true,
        });
    }

    let body = code.strip_suffix(';')?;
    if body.contains(['(', ')', '{', '}', '=']) {
        return None;
    }

    let mut rest = body.split_whitespace().skip(1).peekable();
    let mut interpolation = Vec::new();
    while let Some(word) = rest.peek() {
        if PRECISION_QUALIFIERS.contains(word) {
            rest.next();
        } else if INTERPOLATION_QUALIFIERS.contains(word) {
            interpolation.push(word.to_string());
            rest.next();
        } else {
            break;
        }
    }

    let ty = rest.next()?.to_string();
    let names: Vec<String> = rest
        .collect::<Vec<_>>()
        .join(" ")
        .split(',')
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();
    if names.is_empty() {
        return None;
    }

    Some(Declaration {
        storage,
        interpolation,
        ty,
        names,
        block: false,
    })
}

fn base_name(name: &str) -> &str {
    name.split('[').next().unwrap_or(name).trim()
}

fn is_varying(stage: Stage, storage: Storage) -> bool {
    match (stage, storage) {
        (_, Storage::Varying) => true,
        (Stage::Vertex, Storage::Out) => true,
        (Stage::Fragment, Storage::In) => true,
        _ => false,
    }
}

fn collect_varyings(stage: Stage, lines: &[Line<'_>], into: &mut BTreeSet<String>) {
    for line in lines {
        if let Line::Declaration(declaration) = line {
            if is_varying(stage, declaration.storage) {
                into.extend(
                    declaration
                        .names
                        .iter()
                        .map(|name| base_name(name).to_string()),
                );
            }
        }
    }
}

fn rewrite(stage: Stage, lines: &[Line<'_>], varyings: &[String]) -> Result<String, ProgramError> {
    let mut body = String::new();
    let mut output: Option<String> = None;

    for line in lines {
        match line {
            Line::Skip => {}
            Line::Code(text) => {
                body.push_str(text);
                body.push('\n');
            }
            Line::LayoutOutput(text) => {
                if stage == Stage::Fragment {
                    let name = text
                        .trim()
                        .trim_end_matches(';')
                        .split_whitespace()
                        .last()
                        .unwrap_or_default()
                        .to_string();
                    claim_output(&mut output, name)?;
                }
                body.push_str(text);
                body.push('\n');
            }
            Line::Declaration(declaration) => {
                rewrite_declaration(stage, declaration, varyings, &mut output, &mut body)?;
            }
        }
    }

    let mut wrapped = String::from(COMMON_HEADER);
    match stage {
        Stage::Vertex => {
            wrapped.push_str(TEXTURE_ALIAS);
            wrapped.push_str(&body);
        }
        Stage::Fragment => {
            wrapped.push_str(FRAGMENT_HEADER);
            wrapped.push_str(TEXTURE_ALIAS);
            if output.is_none() {
                wrapped.push_str("layout(location = 0) out vec4 reefer_FragColor;\n");
                wrapped.push_str("#define gl_FragColor reefer_FragColor\n");
            }
            wrapped.push_str("#define main reefer_sketch_main\n");
            wrapped.push_str(&body);
            wrapped.push_str(FRAGMENT_FOOTER);
        }
    }
    Ok(wrapped)
}

fn claim_output(output: &mut Option<String>, name: String) -> Result<(), ProgramError> {
    match output {
        Some(first) => Err(ProgramError::MultipleOutputs {
            first: first.clone(),
            second: name,
        }),
        None => {
            *output = Some(name);
            Ok(())
        }
    }
}

fn rewrite_declaration(
    stage: Stage,
    declaration: &Declaration,
    varyings: &[String],
    output: &mut Option<String>,
    body: &mut String,
) -> Result<(), ProgramError> {
    if declaration.storage == Storage::Uniform {
        if declaration.block {
            return Err(ProgramError::UnknownUniform {
                stage,
                name: declaration.names.first().cloned().unwrap_or_default(),
            });
        }
        for name in &declaration.names {
            if !CONTRACT_UNIFORMS.contains(&base_name(name)) {
                return Err(ProgramError::UnknownUniform {
                    stage,
                    name: base_name(name).to_string(),
                });
            }
        }
        // Definitions come from the header.
        body.push('\n');
        return Ok(());
    }

    if is_varying(stage, declaration.storage) {
        let direction = match stage {
            Stage::Vertex => "out",
            Stage::Fragment => "in",
        };
        let qualifiers: String = declaration
            .interpolation
            .iter()
            .map(|word| format!("{word} "))
            .collect();
        for name in &declaration.names {
            let location = varyings
                .iter()
                .position(|candidate| candidate == base_name(name))
                .unwrap_or_default();
            body.push_str(&format!(
                "layout(location = {location}) {qualifiers}{direction} {} {name};\n",
                declaration.ty
            ));
        }
        return Ok(());
    }

    match (stage, declaration.storage) {
        (Stage::Vertex, Storage::Attribute | Storage::In) => {
            for name in &declaration.names {
                let location = VERTEX_ATTRIBUTES
                    .iter()
                    .find(|(attribute, _)| *attribute == base_name(name))
                    .map(|(_, location)| *location)
                    .ok_or_else(|| ProgramError::UnknownAttribute {
                        stage,
                        name: base_name(name).to_string(),
                    })?;
                body.push_str(&format!(
                    "layout(location = {location}) in {} {name};\n",
                    declaration.ty
                ));
            }
            Ok(())
        }
        (Stage::Fragment, Storage::Out) => {
            for name in &declaration.names {
                claim_output(output, base_name(name).to_string())?;
                body.push_str(&format!(
                    "layout(location = 0) out {} {name};\n",
                    declaration.ty
                ));
            }
            Ok(())
        }
        _ => Err(ProgramError::UnknownAttribute {
            stage,
            name: declaration.names.first().cloned().unwrap_or_default(),
        }),
    }
}

/// GLSL prologue shared by both stages.
///
/// The block layout must match `SketchUniforms` in `gpu/uniforms.rs`.
const COMMON_HEADER: &str = r"#version 450

layout(std140, set = 0, binding = 0) uniform ReeferParams {
    vec2 _uResolution;
    vec2 _uImageResolution;
    vec2 _uMouse;
    vec2 _fragOrigin;
    float _millis;
} reefer_params;

#define millis reefer_params._millis
#define uMouse reefer_params._uMouse
#define uResolution reefer_params._uResolution
#define uImageResolution reefer_params._uImageResolution
#define uProjectionMatrix mat4(1.0)
#define uModelViewMatrix mat4(1.0)

";

/// Image bindings and the remapped fragment coordinate.
const FRAGMENT_HEADER: &str = r"layout(set = 1, binding = 0) uniform texture2D reefer_texture;
layout(set = 1, binding = 1) uniform sampler reefer_sampler;
#define uTexture sampler2D(reefer_texture, reefer_sampler)

vec4 reefer_FragCoord;
#define gl_FragCoord reefer_FragCoord

";

/// Must follow the `texture2D` image declaration.
const TEXTURE_ALIAS: &str = "#define texture2D texture\n";

/// Makes `gl_FragCoord` relative to the canvas's bottom-left corner and calls
/// the sketch's `main`.
const FRAGMENT_FOOTER: &str = r"
#undef main
#undef gl_FragCoord
void main() {
    vec2 origin = reefer_params._fragOrigin;
    reefer_FragCoord = vec4(gl_FragCoord.x - origin.x, origin.y - gl_FragCoord.y, gl_FragCoord.z, gl_FragCoord.w);
    reefer_sketch_main();
}
";
