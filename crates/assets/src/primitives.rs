use crate::vertex::Vertex;
use glam::Vec3;

/// Unit cube centred at the origin: four vertices per face so every face
/// gets its own normal, tangent frame and full 0..1 texture coordinates.
pub fn cube() -> (Vec<Vertex>, Vec<u32>) {
    // (normal, tangent) per face; bitangent = normal x tangent.
    let faces = [
        (Vec3::Z, Vec3::X),
        (Vec3::NEG_Z, Vec3::NEG_X),
        (Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_X, Vec3::Z),
        (Vec3::Y, Vec3::X),
        (Vec3::NEG_Y, Vec3::X),
    ];
    let corners = [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, tangent) in faces {
        let bitangent = normal.cross(tangent);
        let base = vertices.len() as u32;
        for (u, v) in corners {
            let position = normal * 0.5 + tangent * u + bitangent * v;
            vertices.push(Vertex {
                position: position.to_array(),
                normal: normal.to_array(),
                tex_coords: [u + 0.5, v + 0.5],
                tangent: tangent.to_array(),
                bitangent: bitangent.to_array(),
                ..Vertex::default()
            });
        }
        indices.extend([base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_six_quads() {
        let (vertices, indices) = cube();
        assert_eq!(vertices.len(), 24);
        assert_eq!(indices.len(), 36);
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    }

    #[test]
    fn triangles_wind_counter_clockwise_outward() {
        let (vertices, indices) = cube();
        for tri in indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(vertices[i as usize].position));
            let face_normal = (b - a).cross(c - a).normalize();
            let stored = Vec3::from(vertices[tri[0] as usize].normal);
            assert!(face_normal.dot(stored) > 0.99, "{face_normal} vs {stored}");
        }
    }

    #[test]
    fn positions_lie_on_unit_cube() {
        let (vertices, _) = cube();
        for v in &vertices {
            let p = Vec3::from(v.position);
            assert!((p.abs().max_element() - 0.5).abs() < 1e-6);
            assert!(v.tex_coords.iter().all(|t| (0.0..=1.0).contains(t)));
        }
    }
}
