/// WGSL Phong shader: one directional light, four point lights and a spot
/// light over a diffuse and a specular map.
///
/// The `Uniforms` layout must match [`crate::program::UniformLayout::phong`].
pub const PHONG_SHADER: &str = r#"
struct DirLight {
    direction: vec3<f32>,
    ambient: vec3<f32>,
    diffuse: vec3<f32>,
    specular: vec3<f32>,
};

struct PointLight {
    position: vec3<f32>,
    ambient: vec3<f32>,
    diffuse: vec3<f32>,
    specular: vec3<f32>,
    constant_term: f32,
    linear_term: f32,
    quadratic_term: f32,
};

struct SpotLight {
    position: vec3<f32>,
    direction: vec3<f32>,
    ambient: vec3<f32>,
    diffuse: vec3<f32>,
    specular: vec3<f32>,
    constant_term: f32,
    linear_term: f32,
    quadratic_term: f32,
    cut_off: f32,
    outer_cut_off: f32,
};

struct Uniforms {
    projection: mat4x4<f32>,
    view: mat4x4<f32>,
    model: mat4x4<f32>,
    view_pos: vec3<f32>,
    shininess: f32,
    dir_light: DirLight,
    point_lights: array<PointLight, 4>,
    spot_light: SpotLight,
};

@group(0) @binding(0)
var<uniform> u: Uniforms;

@group(1) @binding(0)
var diffuse_map: texture_2d<f32>;
@group(1) @binding(1)
var specular_map: texture_2d<f32>;
@group(1) @binding(2)
var material_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) tex_coords: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) tex_coords: vec2<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    let world = u.model * vec4<f32>(vertex.position, 1.0);
    var out: VertexOutput;
    out.clip_position = u.projection * u.view * world;
    out.world_pos = world.xyz;
    // model is a rigid transform, so it also carries normals
    out.normal = (u.model * vec4<f32>(vertex.normal, 0.0)).xyz;
    out.tex_coords = vertex.tex_coords;
    return out;
}

fn attenuation(c: f32, l: f32, q: f32, distance: f32) -> f32 {
    return 1.0 / max(c + l * distance + q * distance * distance, 1e-4);
}

fn specular_factor(light_dir: vec3<f32>, normal: vec3<f32>, view_dir: vec3<f32>) -> f32 {
    let reflect_dir = reflect(-light_dir, normal);
    return pow(max(dot(view_dir, reflect_dir), 0.0), u.shininess);
}

fn shade_directional(light: DirLight, normal: vec3<f32>, view_dir: vec3<f32>, albedo: vec3<f32>, gloss: vec3<f32>) -> vec3<f32> {
    let light_dir = normalize(-light.direction);
    let diff = max(dot(normal, light_dir), 0.0);
    let spec = specular_factor(light_dir, normal, view_dir);
    return light.ambient * albedo + light.diffuse * diff * albedo + light.specular * spec * gloss;
}

fn shade_point(light: PointLight, normal: vec3<f32>, frag_pos: vec3<f32>, view_dir: vec3<f32>, albedo: vec3<f32>, gloss: vec3<f32>) -> vec3<f32> {
    let to_light = light.position - frag_pos;
    let light_dir = normalize(to_light);
    let diff = max(dot(normal, light_dir), 0.0);
    let spec = specular_factor(light_dir, normal, view_dir);
    let att = attenuation(light.constant_term, light.linear_term, light.quadratic_term, length(to_light));
    return (light.ambient * albedo + light.diffuse * diff * albedo + light.specular * spec * gloss) * att;
}

fn shade_spot(light: SpotLight, normal: vec3<f32>, frag_pos: vec3<f32>, view_dir: vec3<f32>, albedo: vec3<f32>, gloss: vec3<f32>) -> vec3<f32> {
    let to_light = light.position - frag_pos;
    let light_dir = normalize(to_light);
    let diff = max(dot(normal, light_dir), 0.0);
    let spec = specular_factor(light_dir, normal, view_dir);
    let att = attenuation(light.constant_term, light.linear_term, light.quadratic_term, length(to_light));
    let theta = dot(light_dir, normalize(-light.direction));
    let epsilon = max(light.cut_off - light.outer_cut_off, 1e-4);
    let intensity = clamp((theta - light.outer_cut_off) / epsilon, 0.0, 1.0);
    return (light.ambient * albedo + (light.diffuse * diff * albedo + light.specular * spec * gloss) * intensity) * att;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let albedo = textureSample(diffuse_map, material_sampler, in.tex_coords).rgb;
    let gloss = textureSample(specular_map, material_sampler, in.tex_coords).rgb;

    let has_normal = dot(in.normal, in.normal) > 0.0;
    let normal = select(vec3<f32>(0.0, 0.0, 0.0), normalize(in.normal), has_normal);
    let view_dir = normalize(u.view_pos - in.world_pos);

    var color = shade_directional(u.dir_light, normal, view_dir, albedo, gloss);
    for (var i = 0u; i < 4u; i = i + 1u) {
        color += shade_point(u.point_lights[i], normal, in.world_pos, view_dir, albedo, gloss);
    }
    color += shade_spot(u.spot_light, normal, in.world_pos, view_dir, albedo, gloss);
    return vec4<f32>(color, 1.0);
}
"#;
